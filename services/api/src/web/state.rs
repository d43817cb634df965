//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_companion_core::study::StudyService;
use tokio_util::sync::CancellationToken;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub study: Arc<StudyService>,
    pub config: Arc<Config>,
    /// Cancelled when the server begins shutting down; open WebSockets close on it.
    pub shutdown: CancellationToken,
}
