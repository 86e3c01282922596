// Stage input/output blobs, one row per (project, stage)

use super::{parse_timestamp, StorageError};
use crate::models::{StageName, StageRecord, StageStatus, StageStatusEntry};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

fn record_from_row(stage: StageName, row: &rusqlite::Row<'_>) -> rusqlite::Result<StageRecord> {
    let input: Option<String> = row.get(0)?;
    let output: Option<String> = row.get(1)?;
    Ok(StageRecord {
        stage,
        input: input.and_then(|text| serde_json::from_str(&text).ok()),
        output: output.and_then(|text| serde_json::from_str(&text).ok()),
        updated_at: parse_timestamp(2, row.get(2)?)?,
    })
}

pub fn load_stage(
    conn: &Connection,
    project_id: &str,
    stage: StageName,
) -> Result<StageRecord, StorageError> {
    conn.query_row(
        "SELECT input, output, updated_at FROM stage_records
         WHERE project_id = ?1 AND stage = ?2",
        params![project_id, stage.as_str()],
        |row| record_from_row(stage, row),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => StorageError::NotFound(format!(
            "Stage '{}' has no record for project '{}'",
            stage.as_str(),
            project_id
        )),
        other => StorageError::Sqlite(other),
    })
}

/// Read/modify/write: fields passed as None keep whatever the row already
/// holds, so saving an output does not clobber a previously saved input.
pub fn save_stage(
    conn: &Connection,
    project_id: &str,
    stage: StageName,
    input: Option<&serde_json::Value>,
    output: Option<&serde_json::Value>,
) -> Result<StageRecord, StorageError> {
    let existing = conn
        .query_row(
            "SELECT input, output, updated_at FROM stage_records
             WHERE project_id = ?1 AND stage = ?2",
            params![project_id, stage.as_str()],
            |row| record_from_row(stage, row),
        )
        .optional()?;

    let now = Utc::now();
    let merged = StageRecord {
        stage,
        input: input
            .cloned()
            .or(existing.as_ref().and_then(|r| r.input.clone())),
        output: output
            .cloned()
            .or(existing.as_ref().and_then(|r| r.output.clone())),
        updated_at: now,
    };

    let input_text = merged
        .input
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let output_text = merged
        .output
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO stage_records (project_id, stage, input, output, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(project_id, stage) DO UPDATE SET
            input = excluded.input,
            output = excluded.output,
            updated_at = excluded.updated_at",
        params![
            project_id,
            stage.as_str(),
            input_text,
            output_text,
            now.to_rfc3339(),
        ],
    )?;

    Ok(merged)
}

/// Stored records for a project, in pipeline order (missing stages skipped)
pub fn list_stages(conn: &Connection, project_id: &str) -> Result<Vec<StageRecord>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT stage, input, output, updated_at FROM stage_records
         WHERE project_id = ?1",
    )?;

    let mut by_stage: HashMap<StageName, StageRecord> = HashMap::new();
    let rows = stmt.query_map(params![project_id], |row| {
        let stage_text: String = row.get(0)?;
        let input: Option<String> = row.get(1)?;
        let output: Option<String> = row.get(2)?;
        Ok((stage_text, input, output, row.get::<_, String>(3)?))
    })?;

    for row in rows {
        let (stage_text, input, output, updated_at) = row?;
        let stage: StageName = match stage_text.parse() {
            Ok(stage) => stage,
            Err(_) => {
                log::warn!("Skipping stage record with unknown stage '{}'", stage_text);
                continue;
            }
        };
        by_stage.insert(
            stage,
            StageRecord {
                stage,
                input: input.and_then(|text| serde_json::from_str(&text).ok()),
                output: output.and_then(|text| serde_json::from_str(&text).ok()),
                updated_at: parse_timestamp(3, updated_at)?,
            },
        );
    }

    Ok(StageName::all()
        .iter()
        .filter_map(|stage| by_stage.remove(stage))
        .collect())
}

/// Derived status for every stage: complete once it has an output,
/// in progress once it has any data at all
pub fn pipeline_view(
    conn: &Connection,
    project_id: &str,
) -> Result<Vec<StageStatusEntry>, StorageError> {
    let records = list_stages(conn, project_id)?;
    let by_stage: HashMap<StageName, &StageRecord> =
        records.iter().map(|r| (r.stage, r)).collect();

    Ok(StageName::all()
        .iter()
        .map(|stage| {
            let record = by_stage.get(stage);
            let status = match record {
                Some(r) if r.output.is_some() => StageStatus::Complete,
                Some(_) => StageStatus::InProgress,
                None => StageStatus::NotStarted,
            };
            StageStatusEntry {
                stage: *stage,
                status,
                updated_at: record.map(|r| r.updated_at),
            }
        })
        .collect())
}
