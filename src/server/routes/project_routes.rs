//! Project creation, listing and the pipeline view

use super::result;
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::storage::{projects, stages};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Project name must not be empty"));
    }

    let db = state.db.lock().await;
    let project = projects::create_project(db.get_connection(), name)?;
    log::info!("Created project '{}' ({})", project.name, project.id);
    Ok(result(project))
}

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().await;
    let projects = projects::list_projects(db.get_connection())?;
    Ok(result(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().await;
    let project = projects::get_project(db.get_connection(), &id)?;
    Ok(result(project))
}

pub async fn pipeline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().await;
    projects::get_project(db.get_connection(), &id)?;
    let view = stages::pipeline_view(db.get_connection(), &id)?;
    Ok(result(view))
}
