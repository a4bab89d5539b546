//! Recommendation domain module
//!
//! Turns raw per-tag solve statistics into a ranked, sampled, and justified
//! set of problem suggestions.
//!
//! # Architecture
//!
//! - **Entities**: `TagNode`, `TagAccountStat`, `SkillRequirement`,
//!   `LevelFilter`, `RecommendationRequest`, `RecommendationCandidate`
//! - **Algorithms**: `SkillMatcher`, `PrerequisiteChecker`, `ScoringEngine`,
//!   `WeightedSampler`, `SearchCriteriaBuilder`, `ReasonGenerator`
//! - **Repository**: `RecommendationRepository` for database operations
//! - **Service**: `RecommendationService` for the sampling/selection loop
//!
//! # Example
//!
//! ```ignore
//! use tagtrail_core::domain::recommendation::{
//!     RecommendationRepository, RecommendationRequest, RecommendationService,
//! };
//! use std::sync::Arc;
//!
//! let repository = RecommendationRepository::new(pool.clone());
//! let service = RecommendationService::new(Arc::new(repository));
//!
//! let request = RecommendationRequest::new(user_id, 3);
//! let recommendations = service.recommend(&request).await?;
//! for recommendation in recommendations {
//!     println!("{}: {:?}", recommendation.problem.title, recommendation.reasons);
//! }
//! ```

pub mod criteria;
pub mod entity;
pub mod event;
pub mod reason;
pub mod repository;
pub mod repository_trait;
pub mod sampler;
pub mod scoring;
pub mod service;
pub mod skill;

// Re-export main types
pub use criteria::{MAX_TIER, RateRange, SearchCriteria, SearchCriteriaBuilder, TierRange};
pub use entity::{
    ActiveTarget, ExclusionMode, ExclusionState, FilterCode, LevelFilter, LevelFilterTable,
    LinkedAccount, Problem, RecommendationCandidate, RecommendationLog, RecommendationRequest,
    SkillCode, SkillRequirement, SkillRequirementTable, TagAccountStat, TagGraph, TagNode,
};
pub use event::{RecommendationEvent, RecommendationEventType};
pub use reason::{ReasonContext, ReasonGenerator};
pub use repository::RecommendationRepository;
pub use repository_trait::RecommendationRepositoryTrait;
pub use sampler::{MIN_WEIGHT, WeightedSampler};
pub use scoring::{Candidate, ScoreBreakdown, ScoringEngine};
pub use service::RecommendationService;
pub use skill::{PrerequisiteChecker, SkillMatcher};
