//! Stage input/output blob routes

use super::result;
use crate::models::StageName;
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::storage::{projects, stages};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SaveStageRequest {
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
}

pub(crate) fn parse_stage(stage: &str) -> Result<StageName, ApiError> {
    stage
        .parse()
        .map_err(|_| ApiError::not_found(format!("Unknown stage '{}'", stage)))
}

pub async fn get_stage(
    State(state): State<AppState>,
    Path((id, stage)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stage = parse_stage(&stage)?;

    let db = state.db.lock().await;
    projects::get_project(db.get_connection(), &id)?;
    let record = stages::load_stage(db.get_connection(), &id, stage)?;
    Ok(result(record))
}

pub async fn save_stage(
    State(state): State<AppState>,
    Path((id, stage)): Path<(String, String)>,
    Json(body): Json<SaveStageRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stage = parse_stage(&stage)?;
    if body.input.is_none() && body.output.is_none() {
        return Err(ApiError::bad_request(
            "Provide at least one of 'input' or 'output'",
        ));
    }

    let db = state.db.lock().await;
    projects::get_project(db.get_connection(), &id)?;
    let record = stages::save_stage(
        db.get_connection(),
        &id,
        stage,
        body.input.as_ref(),
        body.output.as_ref(),
    )?;
    projects::touch_project(db.get_connection(), &id)?;

    log::debug!("Saved stage '{}' for project '{}'", stage.as_str(), id);
    Ok(result(record))
}
