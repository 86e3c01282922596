//! API error type mapping internal failures onto HTTP statuses
//!
//! Every failure leaves the server as `{"error": "message"}`. Internal error
//! types and backtraces stay out of the body.

use crate::llm::LlmError;
use crate::prompts::PromptError;
use crate::refinement::RefineError;
use crate::storage::StorageError;
use crate::validation::ScoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::warn!("Request failed with {}: {}", self.status, self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn status_for_llm(error: &LlmError) -> StatusCode {
    match error {
        // Configuration problems are the operator's, not the provider's
        LlmError::MissingApiKey | LlmError::InvalidApiKey => StatusCode::INTERNAL_SERVER_ERROR,
        LlmError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        LlmError::Schema(_)
        | LlmError::RateLimited
        | LlmError::Provider { .. }
        | LlmError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}

impl From<LlmError> for ApiError {
    fn from(error: LlmError) -> Self {
        Self::new(status_for_llm(&error), error.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(message) => Self::not_found(message),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<PromptError> for ApiError {
    fn from(error: PromptError) -> Self {
        match &error {
            PromptError::UnknownPrompt(_) => Self::not_found(error.to_string()),
            PromptError::Render(_) => Self::internal(error.to_string()),
        }
    }
}

impl From<ScoreError> for ApiError {
    fn from(error: ScoreError) -> Self {
        let status = match error.llm_error() {
            Some(llm) => status_for_llm(llm),
            // Structural validation failures mean the provider sent junk
            None => match &error {
                ScoreError::Invalid { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        Self::new(status, error.to_string())
    }
}

impl From<RefineError> for ApiError {
    fn from(error: RefineError) -> Self {
        let status = match &error {
            RefineError::Llm(llm) => status_for_llm(llm),
            RefineError::Schema(_) => StatusCode::BAD_GATEWAY,
            RefineError::Prompt(_) | RefineError::Document(_) | RefineError::State(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_internal() {
        assert_eq!(
            ApiError::from(LlmError::MissingApiKey).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(LlmError::InvalidApiKey).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_timeout_maps_to_504() {
        assert_eq!(
            ApiError::from(LlmError::Timeout { attempts: 3 }).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_provider_class_maps_to_502() {
        assert_eq!(
            ApiError::from(LlmError::RateLimited).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(LlmError::Schema("junk".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(LlmError::Transport("reset".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_storage_not_found_maps_to_404() {
        assert_eq!(
            ApiError::from(StorageError::NotFound("Project 'x' not found".to_string())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unknown_prompt_maps_to_404() {
        assert_eq!(
            ApiError::from(PromptError::UnknownPrompt("ghost".to_string())).status(),
            StatusCode::NOT_FOUND
        );
    }
}
