// Validation report history, append-only

use super::StorageError;
use crate::models::ValidationReport;
use rusqlite::{params, Connection};

pub fn insert_report(
    conn: &Connection,
    project_id: &str,
    report: &ValidationReport,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO validation_reports (project_id, report, created_at)
         VALUES (?1, ?2, ?3)",
        params![
            project_id,
            serde_json::to_string(report)?,
            report.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn latest_report(
    conn: &Connection,
    project_id: &str,
) -> Result<ValidationReport, StorageError> {
    let text: String = conn
        .query_row(
            "SELECT report FROM validation_reports
             WHERE project_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
            params![project_id],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StorageError::NotFound(format!(
                "Project '{}' has no validation report",
                project_id
            )),
            other => StorageError::Sqlite(other),
        })?;

    Ok(serde_json::from_str(&text)?)
}

/// Full history, oldest first
pub fn list_reports(
    conn: &Connection,
    project_id: &str,
) -> Result<Vec<ValidationReport>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT report FROM validation_reports
         WHERE project_id = ?1
         ORDER BY created_at ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![project_id], |row| row.get::<_, String>(0))?;
    let mut reports = Vec::new();
    for row in rows {
        reports.push(serde_json::from_str(&row?)?);
    }
    Ok(reports)
}
