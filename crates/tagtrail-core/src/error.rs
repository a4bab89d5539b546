//! Error types for Tagtrail

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using Tagtrail's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Tagtrail error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Account errors (E001-E099)
    #[error("No judge account linked for user '{0}'. Run `tagtrail account link` first.")]
    AccountNotLinked(Uuid),

    #[error("User '{0}' not found.")]
    UserNotFound(Uuid),

    // Tag errors (E100-E199)
    #[error("Tag '{0}' not found. Run `tagtrail tags` to see all active tags.")]
    TagNotFound(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountNotLinked(_) => "E001",
            Self::UserNotFound(_) => "E002",
            Self::TagNotFound(_) => "E100",
            Self::DatabaseError(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::AccountNotLinked(_) => Some("tagtrail account link".to_string()),
            Self::TagNotFound(_) => Some("tagtrail tags".to_string()),
            _ => None,
        }
    }
}
