// Refinement iteration history, append-only

use super::StorageError;
use crate::models::ImprovementIteration;
use rusqlite::{params, Connection};

pub fn insert_iteration(
    conn: &Connection,
    project_id: &str,
    iteration: &ImprovementIteration,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO improvement_iterations (project_id, iteration, created_at)
         VALUES (?1, ?2, ?3)",
        params![
            project_id,
            serde_json::to_string(iteration)?,
            iteration.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Append a whole run's worth of iterations, returning how many landed
pub fn append_iterations(
    conn: &Connection,
    project_id: &str,
    iterations: &[ImprovementIteration],
) -> Result<usize, StorageError> {
    for iteration in iterations {
        insert_iteration(conn, project_id, iteration)?;
    }
    Ok(iterations.len())
}

/// Full history, oldest first
pub fn list_iterations(
    conn: &Connection,
    project_id: &str,
) -> Result<Vec<ImprovementIteration>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT iteration FROM improvement_iterations
         WHERE project_id = ?1
         ORDER BY created_at ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![project_id], |row| row.get::<_, String>(0))?;
    let mut iterations = Vec::new();
    for row in rows {
        iterations.push(serde_json::from_str(&row?)?);
    }
    Ok(iterations)
}
