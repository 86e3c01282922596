//! Server application state shared across handlers

use crate::llm::LlmClient;
use crate::shutdown::ShutdownState;
use crate::storage::Database;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared state for the server: the database handle, the LLM client and
/// the shutdown flag. Everything else is built per request.
#[derive(Clone)]
pub struct AppState {
    /// SQLite handle, serialized behind an async mutex
    pub db: Arc<Mutex<Database>>,

    /// LLM client with its retry policy
    pub llm: Arc<LlmClient>,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl AppState {
    pub fn new(db: Database, llm: LlmClient, shutdown_state: ShutdownState) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            llm: Arc::new(llm),
            shutdown_state,
        }
    }
}
