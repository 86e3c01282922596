//! Prompt template listing and override management

use super::result;
use crate::prompts::{builtin, validate_template, PromptResolver, PromptSource};
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::storage::prompts as prompt_rows;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct SaveTemplateRequest {
    pub system: String,
    pub user: String,
}

pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let overrides = {
        let db = state.db.lock().await;
        prompt_rows::load_overrides(db.get_connection())?
    };

    let resolver = PromptResolver::new().with_overrides(overrides);
    let entries: Vec<serde_json::Value> = resolver
        .list_all()
        .into_iter()
        .map(|(name, source)| json!({ "name": name, "source": source.as_str() }))
        .collect();
    Ok(result(entries))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let overrides = {
        let db = state.db.lock().await;
        prompt_rows::load_overrides(db.get_connection())?
    };

    let mut resolver = PromptResolver::new().with_overrides(overrides);
    let resolved = resolver.resolve(&name)?;
    Ok(result(json!({
        "name": resolved.name,
        "system": resolved.system,
        "user": resolved.user,
        "source": resolved.source.as_str(),
    })))
}

/// Save an override after checking that both halves actually render
pub async fn save_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<SaveTemplateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Template name must not be empty"));
    }

    validate_template(&body.system)
        .map_err(|e| ApiError::bad_request(format!("System template is invalid: {}", e)))?;
    validate_template(&body.user)
        .map_err(|e| ApiError::bad_request(format!("User template is invalid: {}", e)))?;

    let db = state.db.lock().await;
    prompt_rows::save_override(db.get_connection(), name, &body.system, &body.user)?;
    log::info!("Saved prompt override '{}'", name);
    Ok(result(json!({
        "name": name,
        "source": PromptSource::Override.as_str(),
    })))
}

/// Remove an override; the builtin takes effect again on the next resolve
pub async fn delete_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().await;
    let deleted = prompt_rows::delete_override(db.get_connection(), &name)?;

    if !deleted && !builtin::is_builtin_name(&name) {
        return Err(ApiError::not_found(format!("Unknown prompt '{}'", name)));
    }

    if deleted {
        log::info!("Deleted prompt override '{}'", name);
    }
    Ok(result(json!({ "name": name, "deleted": deleted })))
}
