use std::time::Duration;

use crate::navigator::NavState;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Browser error")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("No element matches {locator}")]
    ElementNotFound { locator: String },

    #[error("Timed out after {after:?} waiting for {operation}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("No history entry before the current page")]
    NoHistory,

    #[error("Page script failed: {0}")]
    Script(String),

    #[error("Navigator is {found:?}, expected {expected:?}")]
    State { expected: NavState, found: NavState },

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}
