// Copies one project's rows between database files

use super::{Database, StorageError};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// Per-table row counts from a copy
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CopySummary {
    pub projects: usize,
    pub stages: usize,
    pub reports: usize,
    pub iterations: usize,
    pub refinement_states: usize,
}

impl CopySummary {
    pub fn total(&self) -> usize {
        self.projects + self.stages + self.reports + self.iterations + self.refinement_states
    }
}

/// Copy a project and everything hanging off it into another database.
/// The project row and per-project state are upserted; history rows are
/// appended, so running the copy twice doubles the history in the target.
pub fn copy_project(
    source: &Database,
    target: &Database,
    project_id: &str,
) -> Result<CopySummary, StorageError> {
    let src = source.get_connection();
    let dst = target.get_connection();

    let summary = CopySummary {
        projects: copy_project_row(src, dst, project_id)?,
        stages: copy_stage_rows(src, dst, project_id)?,
        reports: copy_history_rows(
            src,
            dst,
            project_id,
            "SELECT report, created_at FROM validation_reports
             WHERE project_id = ?1 ORDER BY created_at ASC, id ASC",
            "INSERT INTO validation_reports (project_id, report, created_at) VALUES (?1, ?2, ?3)",
        )?,
        iterations: copy_history_rows(
            src,
            dst,
            project_id,
            "SELECT iteration, created_at FROM improvement_iterations
             WHERE project_id = ?1 ORDER BY created_at ASC, id ASC",
            "INSERT INTO improvement_iterations (project_id, iteration, created_at) VALUES (?1, ?2, ?3)",
        )?,
        refinement_states: copy_refinement_row(src, dst, project_id)?,
    };

    log::info!(
        "Copied project '{}': {} row(s) across {} projects / {} stages / {} reports / {} iterations / {} refinement states",
        project_id,
        summary.total(),
        summary.projects,
        summary.stages,
        summary.reports,
        summary.iterations,
        summary.refinement_states,
    );

    Ok(summary)
}

fn copy_project_row(
    src: &Connection,
    dst: &Connection,
    project_id: &str,
) -> Result<usize, StorageError> {
    let row = src
        .query_row(
            "SELECT id, name, created_at, updated_at FROM projects WHERE id = ?1",
            params![project_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| StorageError::NotFound(format!("Project '{}' not found", project_id)))?;

    dst.execute(
        "INSERT INTO projects (id, name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            updated_at = excluded.updated_at",
        params![row.0, row.1, row.2, row.3],
    )?;
    Ok(1)
}

fn copy_stage_rows(
    src: &Connection,
    dst: &Connection,
    project_id: &str,
) -> Result<usize, StorageError> {
    let mut stmt = src.prepare(
        "SELECT stage, input, output, updated_at FROM stage_records WHERE project_id = ?1",
    )?;
    let rows = stmt.query_map(params![project_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut copied = 0;
    for row in rows {
        let (stage, input, output, updated_at) = row?;
        dst.execute(
            "INSERT INTO stage_records (project_id, stage, input, output, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(project_id, stage) DO UPDATE SET
                input = excluded.input,
                output = excluded.output,
                updated_at = excluded.updated_at",
            params![project_id, stage, input, output, updated_at],
        )?;
        copied += 1;
    }
    Ok(copied)
}

fn copy_history_rows(
    src: &Connection,
    dst: &Connection,
    project_id: &str,
    select_sql: &str,
    insert_sql: &str,
) -> Result<usize, StorageError> {
    let mut stmt = src.prepare(select_sql)?;
    let rows = stmt.query_map(params![project_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut copied = 0;
    for row in rows {
        let (payload, created_at) = row?;
        dst.execute(insert_sql, params![project_id, payload, created_at])?;
        copied += 1;
    }
    Ok(copied)
}

fn copy_refinement_row(
    src: &Connection,
    dst: &Connection,
    project_id: &str,
) -> Result<usize, StorageError> {
    let row = src
        .query_row(
            "SELECT overview, pillars, updated_at FROM refinement_state WHERE project_id = ?1",
            params![project_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((overview, pillars, updated_at)) => {
            dst.execute(
                "INSERT INTO refinement_state (project_id, overview, pillars, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(project_id) DO UPDATE SET
                    overview = excluded.overview,
                    pillars = excluded.pillars,
                    updated_at = excluded.updated_at",
                params![project_id, overview, pillars, updated_at],
            )?;
            Ok(1)
        }
        None => Ok(0),
    }
}
