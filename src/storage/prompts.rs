// Prompt override rows backing the template store

use super::StorageError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

pub fn save_override(
    conn: &Connection,
    name: &str,
    system: &str,
    user: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO prompt_overrides (name, system_prompt, user_prompt, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(name) DO UPDATE SET
            system_prompt = excluded.system_prompt,
            user_prompt = excluded.user_prompt,
            updated_at = excluded.updated_at",
        params![name, system, user, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

pub fn get_override(
    conn: &Connection,
    name: &str,
) -> Result<Option<(String, String)>, StorageError> {
    Ok(conn
        .query_row(
            "SELECT system_prompt, user_prompt FROM prompt_overrides WHERE name = ?1",
            params![name],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?)
}

/// Remove an override so the builtin takes effect again. Returns whether
/// anything was actually deleted.
pub fn delete_override(conn: &Connection, name: &str) -> Result<bool, StorageError> {
    let deleted = conn.execute("DELETE FROM prompt_overrides WHERE name = ?1", params![name])?;
    Ok(deleted > 0)
}

pub fn load_overrides(conn: &Connection) -> Result<HashMap<String, (String, String)>, StorageError> {
    let mut stmt =
        conn.prepare("SELECT name, system_prompt, user_prompt FROM prompt_overrides")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            (row.get::<_, String>(1)?, row.get::<_, String>(2)?),
        ))
    })?;

    let mut overrides = HashMap::new();
    for row in rows {
        let (name, pair) = row?;
        overrides.insert(name, pair);
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_database;

    #[test]
    fn test_save_and_get_override() {
        let db = test_database();
        save_override(db.get_connection(), "section_problem", "sys", "user").unwrap();

        let pair = get_override(db.get_connection(), "section_problem")
            .unwrap()
            .unwrap();
        assert_eq!(pair, ("sys".to_string(), "user".to_string()));
    }

    #[test]
    fn test_save_replaces_existing() {
        let db = test_database();
        save_override(db.get_connection(), "section_problem", "v1", "v1").unwrap();
        save_override(db.get_connection(), "section_problem", "v2", "v2").unwrap();

        let pair = get_override(db.get_connection(), "section_problem")
            .unwrap()
            .unwrap();
        assert_eq!(pair.0, "v2");
    }

    #[test]
    fn test_delete_override() {
        let db = test_database();
        save_override(db.get_connection(), "section_problem", "sys", "user").unwrap();

        assert!(delete_override(db.get_connection(), "section_problem").unwrap());
        assert!(!delete_override(db.get_connection(), "section_problem").unwrap());
        assert!(get_override(db.get_connection(), "section_problem")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_all_overrides() {
        let db = test_database();
        save_override(db.get_connection(), "a", "sys-a", "user-a").unwrap();
        save_override(db.get_connection(), "b", "sys-b", "user-b").unwrap();

        let overrides = load_overrides(db.get_connection()).unwrap();
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides["a"].1, "user-a");
    }
}
