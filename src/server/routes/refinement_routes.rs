//! Refinement loop and iteration history routes

use super::{optional, result};
use crate::llm::CallOptions;
use crate::models::StageName;
use crate::prompts::PromptResolver;
use crate::refinement::{
    draft_overview, RefinementConfig, RefinementEngine, DEFAULT_MAX_ITERATIONS,
    DEFAULT_TARGET_CONFIDENCE,
};
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::storage::{iterations, projects, prompts as prompt_rows, refinement_state, reports, stages};
use crate::validation::build_idea_context;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefineRequest {
    pub target_confidence: Option<u8>,
    pub max_iterations: Option<u32>,
}

/// Run the refinement loop against the project's overview document.
/// The document comes from the stored refinement state when one exists;
/// otherwise a fresh draft is generated first.
pub async fn refine_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RefineRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (project, idea, overrides, saved) = {
        let db = state.db.lock().await;
        let conn = db.get_connection();
        let project = projects::get_project(conn, &id)?;
        let ideate = optional(stages::load_stage(conn, &id, StageName::Ideate))?;
        let prior_report = optional(reports::latest_report(conn, &id))?;
        let idea = build_idea_context(&project.name, ideate.as_ref(), prior_report.as_ref());
        let overrides = prompt_rows::load_overrides(conn)?;
        let saved = optional(refinement_state::load_refinement_state(conn, &id))?;
        (project, idea, overrides, saved)
    };

    let mut resolver = PromptResolver::new().with_overrides(overrides);
    let options = CallOptions::default();

    let document = match saved {
        Some(saved) => saved.overview,
        None => {
            log::info!("Drafting an overview for project '{}'", project.name);
            draft_overview(&state.llm, &mut resolver, &idea, &options).await?
        }
    };

    let config = RefinementConfig {
        target_confidence: body.target_confidence.unwrap_or(DEFAULT_TARGET_CONFIDENCE),
        max_iterations: body.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
        ..Default::default()
    };

    log::info!(
        "Refining project '{}' (target {}, cap {})",
        project.name,
        config.target_confidence,
        config.max_iterations
    );
    let mut engine = RefinementEngine::new(&state.llm, &mut resolver, config);
    let outcome = engine.run(&idea, document).await;

    {
        let db = state.db.lock().await;
        let conn = db.get_connection();
        iterations::append_iterations(conn, &id, &outcome.iterations)?;
        // An aborted run with no scores would otherwise wipe good state
        if !outcome.pillar_results.is_empty() {
            refinement_state::save_refinement_state(
                conn,
                &id,
                &outcome.document,
                &outcome.pillar_results,
            )?;
        }
        projects::touch_project(conn, &id)?;
    }

    Ok(result(outcome))
}

pub async fn list_iterations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().await;
    projects::get_project(db.get_connection(), &id)?;
    let history = iterations::list_iterations(db.get_connection(), &id)?;
    Ok(result(history))
}
