// Typed errors for the structured LLM caller

use thiserror::Error;

/// Errors surfaced by the LLM caller.
///
/// Credential errors are fatal and never retried. Transport-class failures
/// (network, timeout, rate limit, 5xx) are retried per the backoff policy
/// before being surfaced. A response that is present but not valid JSON also
/// counts as a retryable failure; it surfaces as `Schema` once attempts are
/// exhausted.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API key is not configured")]
    MissingApiKey,

    #[error("LLM API key was rejected by the provider")]
    InvalidApiKey,

    #[error("LLM call timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("LLM response failed validation: {0}")]
    Schema(String),

    #[error("LLM provider rate limited the request")]
    RateLimited,

    #[error("LLM provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("LLM transport error: {0}")]
    Transport(String),
}

impl LlmError {
    /// Whether another attempt may succeed
    pub fn should_retry(&self) -> bool {
        match self {
            LlmError::MissingApiKey | LlmError::InvalidApiKey => false,
            LlmError::Timeout { .. } => true,
            LlmError::Schema(_) => true,
            LlmError::RateLimited => true,
            LlmError::Provider { status, .. } => *status >= 500,
            LlmError::Transport(_) => true,
        }
    }

    /// Whether this is a configuration problem the operator must fix
    pub fn is_config(&self) -> bool {
        matches!(self, LlmError::MissingApiKey | LlmError::InvalidApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_never_retry() {
        assert!(!LlmError::MissingApiKey.should_retry());
        assert!(!LlmError::InvalidApiKey.should_retry());
        assert!(LlmError::MissingApiKey.is_config());
    }

    #[test]
    fn test_transport_class_errors_retry() {
        assert!(LlmError::Timeout { attempts: 1 }.should_retry());
        assert!(LlmError::RateLimited.should_retry());
        assert!(LlmError::Transport("connection reset".to_string()).should_retry());
        assert!(LlmError::Schema("not json".to_string()).should_retry());
    }

    #[test]
    fn test_server_errors_retry_client_errors_do_not() {
        assert!(LlmError::Provider {
            status: 503,
            body: "overloaded".to_string()
        }
        .should_retry());
        assert!(!LlmError::Provider {
            status: 400,
            body: "bad request".to_string()
        }
        .should_retry());
    }
}
