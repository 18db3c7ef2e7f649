use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("failed to launch browser: {reason}")]
    Launch { reason: String },

    #[error("page evaluation failed for {context}: {reason}")]
    Evaluate { context: String, reason: String },
}
