// Latest refined document and pillar scores, replaced wholesale per project

use super::{parse_timestamp, StorageError};
use crate::models::{PillarResult, ProductOverview};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementState {
    pub overview: ProductOverview,
    pub pillars: Vec<PillarResult>,
    pub updated_at: DateTime<Utc>,
}

pub fn save_refinement_state(
    conn: &Connection,
    project_id: &str,
    overview: &ProductOverview,
    pillars: &[PillarResult],
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO refinement_state (project_id, overview, pillars, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(project_id) DO UPDATE SET
            overview = excluded.overview,
            pillars = excluded.pillars,
            updated_at = excluded.updated_at",
        params![
            project_id,
            serde_json::to_string(overview)?,
            serde_json::to_string(pillars)?,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn load_refinement_state(
    conn: &Connection,
    project_id: &str,
) -> Result<RefinementState, StorageError> {
    let (overview_text, pillars_text, updated_at) = conn
        .query_row(
            "SELECT overview, pillars, updated_at FROM refinement_state
             WHERE project_id = ?1",
            params![project_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    parse_timestamp(2, row.get(2)?)?,
                ))
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StorageError::NotFound(format!(
                "Project '{}' has no refinement state",
                project_id
            )),
            other => StorageError::Sqlite(other),
        })?;

    Ok(RefinementState {
        overview: serde_json::from_str(&overview_text)?,
        pillars: serde_json::from_str(&pillars_text)?,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pillar;
    use crate::storage::projects::create_project;
    use crate::storage::test_database;

    fn overview(pitch: &str) -> ProductOverview {
        let mut document = ProductOverview::default();
        document.ensure_populated();
        document.refined_pitch = pitch.to_string();
        document
    }

    fn pillar_results(score: f64) -> Vec<PillarResult> {
        Pillar::all()
            .iter()
            .map(|pillar| PillarResult {
                pillar_id: *pillar,
                pillar_name: pillar.display_name().to_string(),
                score,
                analysis: "analysis".to_string(),
                strength: "strength".to_string(),
                weakness: "weakness".to_string(),
                improvement_suggestion: "suggestion".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let db = test_database();
        let project = create_project(db.get_connection(), "Test").unwrap();

        save_refinement_state(
            db.get_connection(),
            &project.id,
            &overview("First pitch"),
            &pillar_results(6.0),
        )
        .unwrap();

        let state = load_refinement_state(db.get_connection(), &project.id).unwrap();
        assert_eq!(state.overview.refined_pitch, "First pitch");
        assert_eq!(state.pillars.len(), 7);
        assert_eq!(state.pillars[0].score, 6.0);
    }

    #[test]
    fn test_save_replaces_wholesale() {
        let db = test_database();
        let project = create_project(db.get_connection(), "Test").unwrap();

        save_refinement_state(
            db.get_connection(),
            &project.id,
            &overview("First pitch"),
            &pillar_results(5.0),
        )
        .unwrap();
        save_refinement_state(
            db.get_connection(),
            &project.id,
            &overview("Second pitch"),
            &pillar_results(8.0),
        )
        .unwrap();

        let state = load_refinement_state(db.get_connection(), &project.id).unwrap();
        assert_eq!(state.overview.refined_pitch, "Second pitch");
        assert_eq!(state.pillars[0].score, 8.0);

        let rows: i64 = db
            .get_connection()
            .query_row("SELECT COUNT(*) FROM refinement_state", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_missing_state_is_not_found() {
        let db = test_database();
        let project = create_project(db.get_connection(), "Test").unwrap();

        let err = load_refinement_state(db.get_connection(), &project.id).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
