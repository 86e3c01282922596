//! Validation fan-out and report routes

use super::{optional, result};
use crate::llm::CallOptions;
use crate::models::StageName;
use crate::prompts::PromptResolver;
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::storage::{projects, prompts as prompt_rows, reports, stages, StorageError};
use crate::validation::{build_idea_context, score_all_sections};
use axum::extract::{Path, State};
use axum::Json;

/// Run the seven section scorers, aggregate and persist the report
pub async fn validate_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Gather everything from storage up front so the lock is not held
    // across LLM calls
    let (project, idea, overrides) = {
        let db = state.db.lock().await;
        let conn = db.get_connection();
        let project = projects::get_project(conn, &id)?;
        let ideate = optional(stages::load_stage(conn, &id, StageName::Ideate))?;
        let prior_report = optional(reports::latest_report(conn, &id))?;
        let idea = build_idea_context(&project.name, ideate.as_ref(), prior_report.as_ref());
        let overrides = prompt_rows::load_overrides(conn)?;
        (project, idea, overrides)
    };

    log::info!("Validating project '{}' ({})", project.name, project.id);
    let mut resolver = PromptResolver::new().with_overrides(overrides);
    let report =
        score_all_sections(&state.llm, &mut resolver, &idea, &CallOptions::default()).await?;

    {
        let db = state.db.lock().await;
        let conn = db.get_connection();
        reports::insert_report(conn, &id, &report)?;
        let output = serde_json::to_value(&report).map_err(StorageError::from)?;
        stages::save_stage(conn, &id, StageName::Validate, None, Some(&output))?;
        projects::touch_project(conn, &id)?;
    }

    log::info!(
        "Project '{}' validated: confidence {}, recommendation {}",
        project.name,
        report.overall_confidence,
        report.recommendation
    );
    Ok(result(report))
}

pub async fn latest_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().await;
    projects::get_project(db.get_connection(), &id)?;
    let report = reports::latest_report(db.get_connection(), &id)?;
    Ok(result(report))
}
