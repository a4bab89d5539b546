//! Recommendation domain events
//!
//! One event per pipeline stage so a recommendation run can be inspected
//! through structured logging without coupling the engine to console
//! output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::DomainEvent;

/// Type of recommendation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationEventType {
    /// The scored candidate pool was built
    CandidatePoolBuilt,
    /// One tag was drawn from the pool
    TagSampled,
    /// Search criteria were built for a sampled tag
    CriteriaBuilt,
    /// A looked-up problem was rejected during validation
    ProblemRejected,
    /// A recommendation was accepted
    RecommendationAccepted,
    /// The selection loop terminated
    SelectionFinished,
}

impl RecommendationEventType {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CandidatePoolBuilt => "candidate_pool_built",
            Self::TagSampled => "tag_sampled",
            Self::CriteriaBuilt => "criteria_built",
            Self::ProblemRejected => "problem_rejected",
            Self::RecommendationAccepted => "recommendation_accepted",
            Self::SelectionFinished => "selection_finished",
        }
    }
}

impl std::fmt::Display for RecommendationEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recommendation domain event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationEvent {
    /// Unique event identifier
    pub id: Uuid,
    /// The user whose recommendation run produced the event
    pub user_id: Uuid,
    /// Type of event
    pub event_type: RecommendationEventType,
    /// Event data
    pub data: Option<serde_json::Value>,
    /// When the event occurred
    pub created_at: DateTime<Utc>,
}

impl RecommendationEvent {
    /// Create a new recommendation event
    pub fn new(
        user_id: Uuid,
        event_type: RecommendationEventType,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_type,
            data,
            created_at: Utc::now(),
        }
    }

    /// Create a candidate-pool-built event
    pub fn pool_built(user_id: Uuid, pool_size: usize, excluded: usize, ineligible: usize) -> Self {
        let data = serde_json::json!({
            "pool_size": pool_size,
            "excluded_tags": excluded,
            "ineligible_tags": ineligible,
        });
        Self::new(user_id, RecommendationEventType::CandidatePoolBuilt, Some(data))
    }

    /// Create a tag-sampled event
    pub fn tag_sampled(user_id: Uuid, tag_id: i64, score: f64) -> Self {
        let data = serde_json::json!({
            "tag_id": tag_id,
            "score": score,
        });
        Self::new(user_id, RecommendationEventType::TagSampled, Some(data))
    }

    /// Create a criteria-built event
    pub fn criteria_built(user_id: Uuid, tag_id: i64, criteria_count: usize) -> Self {
        let data = serde_json::json!({
            "tag_id": tag_id,
            "criteria_count": criteria_count,
        });
        Self::new(user_id, RecommendationEventType::CriteriaBuilt, Some(data))
    }

    /// Create a problem-rejected event
    pub fn problem_rejected(user_id: Uuid, problem_id: i64, reason: &str) -> Self {
        let data = serde_json::json!({
            "problem_id": problem_id,
            "reason": reason,
        });
        Self::new(user_id, RecommendationEventType::ProblemRejected, Some(data))
    }

    /// Create a recommendation-accepted event
    pub fn accepted(user_id: Uuid, problem_id: i64, tag_id: i64) -> Self {
        let data = serde_json::json!({
            "problem_id": problem_id,
            "tag_id": tag_id,
        });
        Self::new(
            user_id,
            RecommendationEventType::RecommendationAccepted,
            Some(data),
        )
    }

    /// Create a selection-finished event
    pub fn finished(user_id: Uuid, accepted: usize, requested: usize, failed_attempts: usize) -> Self {
        let data = serde_json::json!({
            "accepted": accepted,
            "requested": requested,
            "failed_attempts": failed_attempts,
        });
        Self::new(user_id, RecommendationEventType::SelectionFinished, Some(data))
    }

    /// Emit the event through structured logging
    pub fn emit(&self) {
        tracing::debug!(
            event = %self.event_type,
            user_id = %self.user_id,
            data = ?self.data,
            "recommendation pipeline event"
        );
    }
}

impl DomainEvent for RecommendationEvent {
    fn event_type(&self) -> &str {
        self.event_type.as_str()
    }

    fn aggregate_id(&self) -> Uuid {
        self.user_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }
}
