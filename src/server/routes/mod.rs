//! API route modules
//!
//! Routes are organized into focused sub-modules by domain:
//! - project_routes: Project creation, listing and the pipeline view
//! - stage_routes: Stage input/output blobs
//! - validation_routes: Section-scorer fan-out and validation reports
//! - refinement_routes: Refinement loop runs and iteration history
//! - template_routes: Prompt template listing and overrides

pub mod project_routes;
pub mod refinement_routes;
pub mod stage_routes;
pub mod template_routes;
pub mod validation_routes;

use super::state::AppState;
use crate::storage::StorageError;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

/// Wrap a payload in the uniform success envelope
pub fn result<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(json!({ "result": data }))
}

/// Treat a missing row as None, keep every other failure
pub(crate) fn optional<T>(result: Result<T, StorageError>) -> Result<Option<T>, StorageError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StorageError::NotFound(_)) => Ok(None),
        Err(other) => Err(other),
    }
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/projects",
            post(project_routes::create_project).get(project_routes::list_projects),
        )
        .route("/api/projects/:id", get(project_routes::get_project))
        .route("/api/projects/:id/pipeline", get(project_routes::pipeline))
        .route(
            "/api/projects/:id/stages/:stage",
            get(stage_routes::get_stage).post(stage_routes::save_stage),
        )
        .route(
            "/api/projects/:id/validate",
            post(validation_routes::validate_project),
        )
        .route(
            "/api/projects/:id/report",
            get(validation_routes::latest_report),
        )
        .route(
            "/api/projects/:id/refine",
            post(refinement_routes::refine_project),
        )
        .route(
            "/api/projects/:id/iterations",
            get(refinement_routes::list_iterations),
        )
        .route("/api/templates", get(template_routes::list_templates))
        .route(
            "/api/templates/:name",
            get(template_routes::get_template)
                .put(template_routes::save_template)
                .delete(template_routes::delete_template),
        )
}
