//! Repository trait for recommendation data providers
//!
//! This module defines the read-only collaborators the engine consumes.
//! The trait abstracts over different storage backends (SQLite, etc.);
//! everything is loaded once per recommendation call except the
//! per-iteration problem lookup.

use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::Result;

use super::criteria::SearchCriteria;
use super::entity::{
    ActiveTarget, ExclusionState, LevelFilter, LinkedAccount, Problem, RecommendationLog,
    SkillRequirement, TagAccountStat, TagNode,
};

/// Repository trait for recommendation data access
///
/// Provider failures propagate unchanged; the engine never retries them.
#[async_trait]
pub trait RecommendationRepositoryTrait: Send + Sync {
    // ========== Judge Data ==========

    /// All active tags with parent relations and target associations
    async fn list_active_tags(&self) -> Result<Vec<TagNode>>;

    /// All active skill requirement rows
    async fn list_skill_requirements(&self) -> Result<Vec<SkillRequirement>>;

    /// All level filter rows
    async fn list_level_filters(&self) -> Result<Vec<LevelFilter>>;

    // ========== User State ==========

    /// The user's linked judge account, if any
    async fn get_linked_account(&self, user_id: Uuid) -> Result<Option<LinkedAccount>>;

    /// Per-tag solve statistics for the user's linked account
    async fn list_tag_stats(&self, user_id: Uuid) -> Result<Vec<TagAccountStat>>;

    /// The user's aggregate exclusion state
    async fn get_exclusion_state(&self, user_id: Uuid) -> Result<ExclusionState>;

    /// The user's currently active target, if any
    async fn get_active_target(&self, user_id: Uuid) -> Result<Option<ActiveTarget>>;

    // ========== Problem Lookup ==========

    /// Find at most one problem under a tag matching any criterion
    ///
    /// Applies the solver-count floor and skips every id in `exclude_ids`.
    async fn find_problem(
        &self,
        tag_id: i64,
        criteria: &[SearchCriteria],
        min_solver_count: i64,
        exclude_ids: &HashSet<i64>,
    ) -> Result<Option<Problem>>;

    // ========== Audit Log ==========

    /// Record one recommendation run for the audit trail
    async fn log_recommendation(&self, log: &RecommendationLog) -> Result<()>;
}
