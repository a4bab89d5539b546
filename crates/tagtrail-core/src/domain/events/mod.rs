//! Domain event infrastructure
//!
//! Provides the base trait for domain events across all aggregates.
//! Events are immutable facts about the past, used here to make the
//! recommendation pipeline inspectable through structured logging.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all domain events
pub trait DomainEvent: Send + Sync {
    /// Get the event type as a string
    fn event_type(&self) -> &str;

    /// Get the aggregate ID this event belongs to
    fn aggregate_id(&self) -> Uuid;

    /// Get the timestamp when this event occurred
    fn timestamp(&self) -> DateTime<Utc>;

    /// Get optional event data as JSON
    fn data(&self) -> Option<&serde_json::Value>;
}
