//! Shared state for the HTTP layer.

use chrono::{DateTime, Utc};

/// State injected into Axum handlers.
///
/// The probe is deliberately thin: it reports process liveness, not
/// pipeline progress — the chain itself is the observable record of
/// fulfillment.
#[derive(Debug, Clone)]
pub struct AppState {
    /// When the process finished startup.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Captures the current instant as the service start time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
