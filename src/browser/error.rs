//! Browser session errors.

use thiserror::Error;

pub type BrowserResult<T> = Result<T, BrowserError>;

/// Errors raised by a [`super::BrowserSession`].
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Chrome/Chromium not found: {0}")]
    NotInstalled(String),

    #[error("Failed to start browser: {0}")]
    Launch(String),

    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Navigation timed out after {secs}s for {url}")]
    Timeout { url: String, secs: u64 },

    #[error("No element matches {0}")]
    NotFound(String),

    #[error("Locator not supported in this context: {0}")]
    Unsupported(String),

    #[error("Browser session is closed")]
    Closed,

    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

impl BrowserError {
    /// True when the error only means "nothing matched".
    pub fn is_not_found(&self) -> bool {
        matches!(self, BrowserError::NotFound(_))
    }
}

#[cfg(feature = "browser")]
impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Protocol(e.to_string())
    }
}
