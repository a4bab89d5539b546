//! Recommendation service
//!
//! Orchestrates one recommendation call: loads an immutable snapshot of the
//! user's statistics and the judge data, builds the scored candidate pool,
//! then repeatedly samples a tag, builds search criteria, looks up one
//! problem, and validates it until the requested count is met or the retry
//! budget is exhausted. A short result is a normal outcome, not an error.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::config::RecommendationConfig;
use crate::error::{Error, Result};

use super::criteria::SearchCriteriaBuilder;
use super::entity::{
    ActiveTarget, ExclusionMode, ExclusionState, LevelFilterTable, LinkedAccount,
    RecommendationCandidate, RecommendationLog, RecommendationRequest, SkillRequirementTable,
    TagAccountStat, TagGraph, TagNode,
};
use super::event::RecommendationEvent;
use super::reason::{ReasonContext, ReasonGenerator};
use super::repository_trait::RecommendationRepositoryTrait;
use super::sampler::WeightedSampler;
use super::scoring::{Candidate, ScoringEngine};
use super::skill::{PrerequisiteChecker, SkillMatcher};

/// Immutable per-call snapshot of everything the engine reads up front
struct Snapshot {
    account: LinkedAccount,
    graph: TagGraph,
    requirements: SkillRequirementTable,
    filters: LevelFilterTable,
    stats: HashMap<i64, TagAccountStat>,
    exclusions: ExclusionState,
    target: Option<ActiveTarget>,
}

/// Service producing problem recommendations for one user at a time
pub struct RecommendationService {
    repository: Arc<dyn RecommendationRepositoryTrait>,
    settings: RecommendationConfig,
}

impl RecommendationService {
    /// Create a service with default settings
    pub fn new(repository: Arc<dyn RecommendationRepositoryTrait>) -> Self {
        Self {
            repository,
            settings: RecommendationConfig::default(),
        }
    }

    /// Override the engine settings
    pub fn with_settings(mut self, settings: RecommendationConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Run one recommendation call
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationCandidate>> {
        let snapshot = self.load_snapshot(request.user_id).await?;
        let today = Utc::now().date_naive();

        self.recommend_from_snapshot(request, &snapshot, today).await
    }

    /// Load the per-call snapshot; fails fast when no account is linked
    async fn load_snapshot(&self, user_id: Uuid) -> Result<Snapshot> {
        let account = self
            .repository
            .get_linked_account(user_id)
            .await?
            .ok_or(Error::AccountNotLinked(user_id))?;

        let graph = TagGraph::from_nodes(self.repository.list_active_tags().await?);
        let requirements =
            SkillRequirementTable::from_rows(self.repository.list_skill_requirements().await?);
        let filters = LevelFilterTable::from_rows(self.repository.list_level_filters().await?);

        let stats: HashMap<i64, TagAccountStat> = self
            .repository
            .list_tag_stats(user_id)
            .await?
            .into_iter()
            .map(|stat| (stat.tag_id, stat))
            .collect();

        let exclusions = self.repository.get_exclusion_state(user_id).await?;
        let target = self.repository.get_active_target(user_id).await?;

        Ok(Snapshot {
            account,
            graph,
            requirements,
            filters,
            stats,
            exclusions,
            target,
        })
    }

    /// The selection loop over an already-loaded snapshot
    async fn recommend_from_snapshot(
        &self,
        request: &RecommendationRequest,
        snapshot: &Snapshot,
        today: NaiveDate,
    ) -> Result<Vec<RecommendationCandidate>> {
        let pool = self.build_candidate_pool(request, snapshot, today)?;
        let weights: Vec<f64> = pool.iter().map(|candidate| candidate.score).collect();

        let mut sampler = match request.seed {
            Some(seed) => WeightedSampler::with_seed(seed),
            None => WeightedSampler::new(),
        };

        let builder = SearchCriteriaBuilder::new(&snapshot.filters);
        let filter_codes = request.effective_filters();
        let explicit = request.has_explicit_tags();

        let mut exclude_ids = snapshot.exclusions.problem_exclusions();
        let mut recommended_ids: HashSet<i64> = HashSet::new();
        let mut accepted: Vec<RecommendationCandidate> = Vec::new();
        let mut failed_attempts = 0usize;
        let budget = request.count * self.settings.retry_factor;

        while accepted.len() < request.count && failed_attempts < budget {
            // SAMPLING: one tag from the weighted pool
            let Some(&index) = sampler.sample_indices(&weights, 1).first() else {
                break;
            };
            let candidate = &pool[index];
            let Some(tag) = snapshot.graph.get(candidate.tag_id) else {
                failed_attempts += 1;
                continue;
            };
            RecommendationEvent::tag_sampled(request.user_id, tag.id, candidate.score).emit();

            // CRITERIA_BUILD: tier/skill-rate windows for the drawn tag
            let stat = snapshot
                .stats
                .get(&tag.id)
                .cloned()
                .unwrap_or_else(|| TagAccountStat::empty(tag.id));
            let criteria = builder.build(
                snapshot.account.tier,
                &stat,
                candidate.matched_skill,
                &filter_codes,
                explicit,
            );
            RecommendationEvent::criteria_built(request.user_id, tag.id, criteria.len()).emit();
            if criteria.is_empty() {
                failed_attempts += 1;
                continue;
            }

            // QUERY: at most one problem matching any window
            let found = self
                .repository
                .find_problem(
                    tag.id,
                    &criteria,
                    self.settings.min_solver_count,
                    &exclude_ids,
                )
                .await?;
            let Some(problem) = found else {
                failed_attempts += 1;
                continue;
            };

            // VALIDATE: STRICT mode rejects any touch of an excluded tag.
            // The tag itself stays in the pool and may be redrawn.
            if request.exclusion_mode == ExclusionMode::Strict
                && problem
                    .tag_ids
                    .iter()
                    .any(|tag_id| snapshot.exclusions.is_tag_excluded(*tag_id))
            {
                RecommendationEvent::problem_rejected(
                    request.user_id,
                    problem.id,
                    "excluded tag present",
                )
                .emit();
                failed_attempts += 1;
                continue;
            }

            // ACCEPT
            let Some(matched) = snapshot.requirements.get(tag.id, candidate.matched_skill) else {
                failed_attempts += 1;
                continue;
            };
            let next = candidate
                .matched_skill
                .next()
                .and_then(|skill| snapshot.requirements.get(tag.id, skill));
            let target = snapshot
                .target
                .as_ref()
                .filter(|target| target.applies_to(tag.id));

            let reasons = ReasonGenerator::generate(
                &ReasonContext {
                    tag,
                    stat: &stat,
                    matched,
                    next,
                    target,
                    today,
                },
                &mut sampler,
            );

            RecommendationEvent::accepted(request.user_id, problem.id, tag.id).emit();
            exclude_ids.insert(problem.id);
            recommended_ids.insert(problem.id);
            accepted.push(RecommendationCandidate {
                tag_name: tag.display_name.clone(),
                primary_tag_id: tag.id,
                reasons,
                problem,
            });
        }

        RecommendationEvent::finished(
            request.user_id,
            accepted.len(),
            request.count,
            failed_attempts,
        )
        .emit();
        info!(
            user_id = %request.user_id,
            accepted = accepted.len(),
            requested = request.count,
            failed_attempts = failed_attempts,
            "Recommendation run finished"
        );

        let log = RecommendationLog::new(
            request.user_id,
            request.count as u32,
            accepted.len() as u32,
            failed_attempts as u32,
            request.exclusion_mode,
            accepted.iter().map(|c| c.problem.id).collect(),
        );
        // Audit logging must not fail the run
        let _ = self.repository.log_recommendation(&log).await;

        Ok(accepted)
    }

    /// Build the scored candidate pool for this call
    ///
    /// Excluded tags and tags with unmet prerequisites never enter the
    /// pool; tags without requirement rows are unscoreable this call.
    fn build_candidate_pool(
        &self,
        request: &RecommendationRequest,
        snapshot: &Snapshot,
        today: NaiveDate,
    ) -> Result<Vec<Candidate>> {
        let nodes: Vec<&TagNode> = if request.has_explicit_tags() {
            request
                .tag_keys
                .iter()
                .map(|key| {
                    snapshot
                        .graph
                        .get_by_key(key)
                        .ok_or_else(|| Error::TagNotFound(key.clone()))
                })
                .collect::<Result<_>>()?
        } else {
            snapshot.graph.tags().collect()
        };

        let mut pool = Vec::new();
        let mut excluded = 0usize;
        let mut ineligible = 0usize;

        for tag in nodes {
            if snapshot.exclusions.is_tag_excluded(tag.id) {
                excluded += 1;
                continue;
            }
            if !PrerequisiteChecker::check(
                tag,
                &snapshot.stats,
                &snapshot.requirements,
                snapshot.account.tier,
            ) {
                ineligible += 1;
                continue;
            }

            let stat = snapshot
                .stats
                .get(&tag.id)
                .cloned()
                .unwrap_or_else(|| TagAccountStat::empty(tag.id));
            let Some(matched) = SkillMatcher::match_requirement(
                &stat,
                snapshot.requirements.for_tag(tag.id),
                snapshot.account.tier,
            ) else {
                ineligible += 1;
                continue;
            };

            let next = matched
                .skill_code
                .next()
                .and_then(|skill| snapshot.requirements.get(tag.id, skill));
            let aligned = snapshot
                .target
                .as_ref()
                .is_some_and(|target| target.applies_to(tag.id));

            let breakdown = ScoringEngine::score(&stat, matched, next, aligned, today);
            pool.push(Candidate {
                tag_id: tag.id,
                matched_skill: matched.skill_code,
                score: breakdown.total(),
            });
        }

        RecommendationEvent::pool_built(request.user_id, pool.len(), excluded, ineligible).emit();
        Ok(pool)
    }
}
