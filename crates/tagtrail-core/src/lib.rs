//! Tagtrail Core Library
//!
//! This crate provides the core functionality for Tagtrail, including:
//! - The recommendation engine (skill matching, scoring, weighted sampling,
//!   search criteria, reasons)
//! - Storage (SQLite with versioned migrations)
//! - Configuration with file persistence
//! - Error types with stable codes

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::recommendation::{
        RecommendationCandidate, RecommendationRepository, RecommendationRequest,
        RecommendationService,
    };
    pub use crate::error::{Error, Result};
    pub use crate::storage::Database;
}
