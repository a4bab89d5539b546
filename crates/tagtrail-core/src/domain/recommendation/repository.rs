//! Recommendation repository for database operations
//!
//! SQLite implementation of the recommendation data providers.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::{Error, Result};

use super::criteria::SearchCriteria;
use super::entity::{
    ActiveTarget, ExclusionState, FilterCode, LevelFilter, LinkedAccount, Problem,
    RecommendationLog, SkillCode, SkillRequirement, TagAccountStat, TagNode,
};
use super::repository_trait::RecommendationRepositoryTrait;

/// Repository for recommendation database operations
#[derive(Debug, Clone)]
pub struct RecommendationRepository {
    pool: SqlitePool,
}

impl RecommendationRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Tag ids attached to a problem, primary tag first
    async fn problem_tag_ids(&self, problem_id: i64) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT tag_id FROM problem_tags WHERE problem_id = ? ORDER BY position",
        )
        .bind(problem_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

#[async_trait]
impl RecommendationRepositoryTrait for RecommendationRepository {
    async fn list_active_tags(&self) -> Result<Vec<TagNode>> {
        let tag_rows: Vec<(i64, String, String, i64)> = sqlx::query_as(
            "SELECT id, key, display_name, level FROM tags WHERE status = 'active' ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let parent_rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT tag_id, parent_id FROM tag_parents")
                .fetch_all(&self.pool)
                .await?;

        let target_rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT tag_id, target_id FROM target_tags")
                .fetch_all(&self.pool)
                .await?;

        let mut parents: HashMap<i64, Vec<i64>> = HashMap::new();
        for (tag_id, parent_id) in parent_rows {
            parents.entry(tag_id).or_default().push(parent_id);
        }

        let mut targets: HashMap<i64, Vec<Uuid>> = HashMap::new();
        for (tag_id, target_id) in target_rows {
            let id = Uuid::parse_str(&target_id)
                .map_err(|e| Error::InvalidInput(format!("Bad target id '{}': {}", target_id, e)))?;
            targets.entry(tag_id).or_default().push(id);
        }

        Ok(tag_rows
            .into_iter()
            .map(|(id, key, display_name, level)| TagNode {
                id,
                key,
                display_name,
                level,
                parent_ids: parents.remove(&id).unwrap_or_default(),
                target_ids: targets.remove(&id).unwrap_or_default(),
            })
            .collect())
    }

    async fn list_skill_requirements(&self) -> Result<Vec<SkillRequirement>> {
        let rows: Vec<(i64, String, i64, i32, i32, i64)> = sqlx::query_as(
            r#"
            SELECT tag_id, skill_code, min_solved_problem, min_user_tier,
                   min_solved_problem_tier, recommendation_period_days
            FROM skill_requirements
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(tag_id, code, min_solved, min_tier, min_solved_tier, period)| {
                let skill_code = SkillCode::from_str(&code)
                    .ok_or_else(|| Error::InvalidInput(format!("Unknown skill code '{}'", code)))?;
                Ok(SkillRequirement {
                    tag_id,
                    skill_code,
                    min_solved_problem: min_solved,
                    min_user_tier: min_tier,
                    min_solved_problem_tier: min_solved_tier,
                    recommendation_period_days: period,
                })
            })
            .collect()
    }

    async fn list_level_filters(&self) -> Result<Vec<LevelFilter>> {
        let rows: Vec<(String, String, Option<i32>, Option<i32>, Option<f64>, Option<f64>)> =
            sqlx::query_as(
                r#"
                SELECT filter_code, skill_code, min_tier_diff, max_tier_diff,
                       min_skill_rate, max_skill_rate
                FROM level_filters
                "#,
            )
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(filter, skill, min_diff, max_diff, min_rate, max_rate)| {
                let filter_code = FilterCode::from_str(&filter).ok_or_else(|| {
                    Error::InvalidInput(format!("Unknown filter code '{}'", filter))
                })?;
                let skill_code = SkillCode::from_str(&skill)
                    .ok_or_else(|| Error::InvalidInput(format!("Unknown skill code '{}'", skill)))?;
                Ok(LevelFilter {
                    filter_code,
                    skill_code,
                    min_tier_diff: min_diff,
                    max_tier_diff: max_diff,
                    min_skill_rate: min_rate,
                    max_skill_rate: max_rate,
                })
            })
            .collect()
    }

    async fn get_linked_account(&self, user_id: Uuid) -> Result<Option<LinkedAccount>> {
        let row: Option<(String, i32)> =
            sqlx::query_as("SELECT handle, tier FROM linked_accounts WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(handle, tier)| LinkedAccount {
            user_id,
            handle,
            tier,
        }))
    }

    async fn list_tag_stats(&self, user_id: Uuid) -> Result<Vec<TagAccountStat>> {
        let rows: Vec<(i64, i64, Option<i32>, Option<NaiveDate>)> = sqlx::query_as(
            r#"
            SELECT tag_id, solved_problem_count, highest_tier_achieved, last_solved_date
            FROM tag_account_stats
            WHERE user_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(tag_id, count, highest, last)| TagAccountStat {
                tag_id,
                solved_problem_count: count,
                highest_tier_achieved: highest,
                last_solved_date: last,
            })
            .collect())
    }

    async fn get_exclusion_state(&self, user_id: Uuid) -> Result<ExclusionState> {
        let id = user_id.to_string();

        let excluded: Vec<(i64,)> =
            sqlx::query_as("SELECT tag_id FROM excluded_tags WHERE user_id = ?")
                .bind(&id)
                .fetch_all(&self.pool)
                .await?;

        let solved: Vec<(i64,)> =
            sqlx::query_as("SELECT problem_id FROM solved_problems WHERE user_id = ?")
                .bind(&id)
                .fetch_all(&self.pool)
                .await?;

        let banned: Vec<(i64,)> =
            sqlx::query_as("SELECT problem_id FROM banned_problems WHERE user_id = ?")
                .bind(&id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ExclusionState {
            excluded_tag_ids: excluded.into_iter().map(|(i,)| i).collect(),
            solved_problem_ids: solved.into_iter().map(|(i,)| i).collect(),
            banned_problem_ids: banned.into_iter().map(|(i,)| i).collect(),
        })
    }

    async fn get_active_target(&self, user_id: Uuid) -> Result<Option<ActiveTarget>> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT id, name FROM targets
            WHERE user_id = ? AND active = 1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some((target_id, name)) = row else {
            return Ok(None);
        };

        let id = Uuid::parse_str(&target_id)
            .map_err(|e| Error::InvalidInput(format!("Bad target id '{}': {}", target_id, e)))?;

        let tag_rows: Vec<(i64,)> =
            sqlx::query_as("SELECT tag_id FROM target_tags WHERE target_id = ?")
                .bind(&target_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(Some(ActiveTarget {
            id,
            name,
            tag_ids: tag_rows.into_iter().map(|(i,)| i).collect(),
        }))
    }

    async fn find_problem(
        &self,
        tag_id: i64,
        criteria: &[SearchCriteria],
        min_solver_count: i64,
        exclude_ids: &HashSet<i64>,
    ) -> Result<Option<Problem>> {
        if criteria.is_empty() {
            return Ok(None);
        }

        // Random order so repeated calls within a run surface different
        // problems; criteria and exclusions are applied while scanning.
        let rows: Vec<(i64, String, i32, i64, f64)> = sqlx::query_as(
            r#"
            SELECT p.id, p.title, p.tier, p.solver_count, p.skill_rate
            FROM problems p
            JOIN problem_tags pt ON pt.problem_id = p.id
            WHERE pt.tag_id = ? AND p.solver_count >= ?
            ORDER BY RANDOM()
            "#,
        )
        .bind(tag_id)
        .bind(min_solver_count)
        .fetch_all(&self.pool)
        .await?;

        for (id, title, tier, solver_count, skill_rate) in rows {
            if exclude_ids.contains(&id) {
                continue;
            }
            if !criteria.iter().any(|c| c.matches(tier, skill_rate)) {
                continue;
            }

            let tag_ids = self.problem_tag_ids(id).await?;
            return Ok(Some(Problem {
                id,
                title,
                tier,
                solver_count,
                skill_rate,
                tag_ids,
            }));
        }

        Ok(None)
    }

    async fn log_recommendation(&self, log: &RecommendationLog) -> Result<()> {
        let problem_ids = serde_json::to_string(&log.problem_ids)
            .map_err(|e| Error::Other(format!("Failed to serialize problem ids: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO recommendation_logs (
                id, user_id, requested_count, accepted_count, failed_attempts,
                exclusion_mode, problem_ids, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(log.id.to_string())
        .bind(log.user_id.to_string())
        .bind(log.requested_count)
        .bind(log.accepted_count)
        .bind(log.failed_attempts)
        .bind(log.exclusion_mode.as_str())
        .bind(&problem_ids)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
