// Integration tests for the SQLite layer
// On-disk databases: every scenario here closes and reopens the file to
// prove the rows actually persist, which the in-memory unit tests cannot

#[cfg(test)]
mod storage_tests {
    use chrono::Utc;
    use ideaforge_lib::storage::{
        iterations, projects, refinement_state, reports, stages, transfer, Database, StorageError,
    };
    use ideaforge_lib::{
        ImprovementIteration, Pillar, PillarResult, ProductOverview, Recommendation,
        SectionDimension, SectionResult, StageName, StageStatus, ValidationReport,
    };
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::TempDir;

    fn open(path: &Path) -> Database {
        let db = Database::new(path).expect("open database");
        db.init().expect("run migrations");
        db
    }

    fn sample_report(confidence: u8) -> ValidationReport {
        let mut sections = BTreeMap::new();
        sections.insert(
            SectionDimension::Problem,
            SectionResult {
                score: confidence,
                summary: "Clear enough to test".to_string(),
                actions: vec!["Talk to ten users".to_string()],
                insight_breakdown: None,
                suggestions: None,
            },
        );
        ValidationReport {
            sections,
            overall_confidence: confidence,
            recommendation: Recommendation::Revise,
            created_at: Utc::now(),
        }
    }

    fn sample_iteration(accepted: bool, delta: f64) -> ImprovementIteration {
        ImprovementIteration {
            pillar_impacted: Pillar::ProblemClarity,
            score_delta: delta,
            differences: vec!["problemSummary rewritten (24 -> 31 chars)".to_string()],
            before_section: "problemSummary: before".to_string(),
            after_section: "problemSummary: after".to_string(),
            accepted,
            created_at: Utc::now(),
        }
    }

    fn sample_pillars() -> Vec<PillarResult> {
        vec![PillarResult {
            pillar_id: Pillar::MarketSize,
            pillar_name: Pillar::MarketSize.display_name().to_string(),
            score: 7.5,
            analysis: "growing niche".to_string(),
            strength: "clear demand".to_string(),
            weakness: "hard to reach".to_string(),
            improvement_suggestion: "narrow the segment".to_string(),
        }]
    }

    #[test]
    fn test_rows_survive_reopening_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forge.db");

        let project_id = {
            let db = open(&path);
            let project = projects::create_project(db.get_connection(), "Courier radar").unwrap();
            stages::save_stage(
                db.get_connection(),
                &project.id,
                StageName::Ideate,
                Some(&json!({ "raw": "route planning for couriers" })),
                None,
            )
            .unwrap();
            project.id
        };

        // A fresh handle on the same file must see everything
        let db = open(&path);
        let project = projects::get_project(db.get_connection(), &project_id).unwrap();
        assert_eq!(project.name, "Courier radar");

        let record =
            stages::load_stage(db.get_connection(), &project_id, StageName::Ideate).unwrap();
        assert_eq!(
            record.input,
            Some(json!({ "raw": "route planning for couriers" }))
        );
        assert!(record.output.is_none());

        let pipeline = stages::pipeline_view(db.get_connection(), &project_id).unwrap();
        assert_eq!(pipeline.len(), 6);
        assert_eq!(pipeline[0].stage, StageName::Ideate);
        assert_eq!(pipeline[0].status, StageStatus::InProgress);
        assert_eq!(pipeline[1].status, StageStatus::NotStarted);
    }

    #[test]
    fn test_stage_merge_across_sessions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forge.db");

        let project_id = {
            let db = open(&path);
            let project = projects::create_project(db.get_connection(), "Merge check").unwrap();
            stages::save_stage(
                db.get_connection(),
                &project.id,
                StageName::Validate,
                Some(&json!({ "question": "is there demand" })),
                None,
            )
            .unwrap();
            project.id
        };

        // Second session writes only the output half
        {
            let db = open(&path);
            stages::save_stage(
                db.get_connection(),
                &project_id,
                StageName::Validate,
                None,
                Some(&json!({ "confidence": 64 })),
            )
            .unwrap();
        }

        let db = open(&path);
        let record =
            stages::load_stage(db.get_connection(), &project_id, StageName::Validate).unwrap();
        assert_eq!(record.input, Some(json!({ "question": "is there demand" })));
        assert_eq!(record.output, Some(json!({ "confidence": 64 })));

        let pipeline = stages::pipeline_view(db.get_connection(), &project_id).unwrap();
        let validate = pipeline
            .iter()
            .find(|entry| entry.stage == StageName::Validate)
            .unwrap();
        assert_eq!(validate.status, StageStatus::Complete);
    }

    #[test]
    fn test_copy_project_moves_the_whole_graph() {
        let dir = TempDir::new().unwrap();
        let source_path = dir.path().join("laptop.db");
        let target_path = dir.path().join("workstation.db");

        let source = open(&source_path);
        let conn = source.get_connection();
        let project = projects::create_project(conn, "Portable project").unwrap();

        stages::save_stage(
            conn,
            &project.id,
            StageName::Ideate,
            Some(&json!({ "raw": "idea" })),
            None,
        )
        .unwrap();
        stages::save_stage(
            conn,
            &project.id,
            StageName::Validate,
            None,
            Some(&json!({ "confidence": 58 })),
        )
        .unwrap();
        reports::insert_report(conn, &project.id, &sample_report(58)).unwrap();
        iterations::append_iterations(
            conn,
            &project.id,
            &[sample_iteration(true, 2.0), sample_iteration(false, -0.5)],
        )
        .unwrap();

        let mut overview = ProductOverview::default();
        overview.ensure_populated();
        overview.refined_pitch = "Carries across machines".to_string();
        refinement_state::save_refinement_state(conn, &project.id, &overview, &sample_pillars())
            .unwrap();

        let summary = {
            let target = open(&target_path);
            transfer::copy_project(&source, &target, &project.id).unwrap()
        };
        assert_eq!(summary.projects, 1);
        assert_eq!(summary.stages, 2);
        assert_eq!(summary.reports, 1);
        assert_eq!(summary.iterations, 2);
        assert_eq!(summary.refinement_states, 1);
        assert_eq!(summary.total(), 7);

        // Read the target back through a fresh handle
        let target = open(&target_path);
        let conn = target.get_connection();
        let copied = projects::get_project(conn, &project.id).unwrap();
        assert_eq!(copied.name, "Portable project");

        let copied_stages = stages::list_stages(conn, &project.id).unwrap();
        assert_eq!(copied_stages.len(), 2);

        let report = reports::latest_report(conn, &project.id).unwrap();
        assert_eq!(report.overall_confidence, 58);

        let history = iterations::list_iterations(conn, &project.id).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].accepted);
        assert!(!history[1].accepted);

        let state = refinement_state::load_refinement_state(conn, &project.id).unwrap();
        assert_eq!(state.overview.refined_pitch, "Carries across machines");
        assert_eq!(state.pillars.len(), 1);
        assert_eq!(state.pillars[0].pillar_id, Pillar::MarketSize);
    }

    #[test]
    fn test_copying_a_missing_project_is_not_found() {
        let dir = TempDir::new().unwrap();
        let source = open(&dir.path().join("a.db"));
        let target = open(&dir.path().join("b.db"));

        let result = transfer::copy_project(&source, &target, "no-such-id");

        match result {
            Err(StorageError::NotFound(message)) => assert!(message.contains("no-such-id")),
            other => panic!("expected NotFound, got {:?}", other.map(|s| s.total())),
        }
    }
}
