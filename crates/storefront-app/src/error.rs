//! Storefront: startup error types.

use storefront_core::error::DomainError;
use thiserror::Error;

/// Startup errors for the storefront process.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The event log could not be reached, read, or replayed.
    #[error("event log error: {0}")]
    EventLog(#[from] DomainError),
}
