// Project rows

use super::{parse_timestamp, StorageError};
use crate::models::Project;
use crate::utils::generate_id;
use chrono::Utc;
use rusqlite::{params, Connection};

fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_timestamp(2, row.get(2)?)?,
        updated_at: parse_timestamp(3, row.get(3)?)?,
    })
}

pub fn create_project(conn: &Connection, name: &str) -> Result<Project, StorageError> {
    let now = Utc::now();
    let project = Project {
        id: generate_id(),
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO projects (id, name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            project.id,
            project.name,
            project.created_at.to_rfc3339(),
            project.updated_at.to_rfc3339(),
        ],
    )?;

    Ok(project)
}

pub fn get_project(conn: &Connection, project_id: &str) -> Result<Project, StorageError> {
    conn.query_row(
        "SELECT id, name, created_at, updated_at FROM projects WHERE id = ?1",
        params![project_id],
        project_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            StorageError::NotFound(format!("Project '{}' not found", project_id))
        }
        other => StorageError::Sqlite(other),
    })
}

/// All projects, most recently touched first
pub fn list_projects(conn: &Connection) -> Result<Vec<Project>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at, updated_at
         FROM projects
         ORDER BY updated_at DESC, id ASC",
    )?;

    let projects = stmt.query_map([], project_from_row)?;
    Ok(projects.collect::<rusqlite::Result<_>>()?)
}

/// Bump updated_at after a write touching the project's data
pub fn touch_project(conn: &Connection, project_id: &str) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE projects SET updated_at = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), project_id],
    )?;
    Ok(())
}

pub fn delete_project(conn: &Connection, project_id: &str) -> Result<(), StorageError> {
    conn.execute("DELETE FROM projects WHERE id = ?1", params![project_id])?;
    Ok(())
}
