//! Candidate scoring
//!
//! Computes a non-negative sampling weight per eligible tag from three
//! independent components: recency of practice, imminent level-up, and
//! active-target alignment. The total is only ever used as a relative
//! weight, never compared to an absolute threshold.

use chrono::NaiveDate;

use super::entity::{SkillCode, SkillRequirement, TagAccountStat};

/// Upper clamp of the review-due component
const REVIEW_SCORE_CAP: f64 = 50.0;

/// Review score for a tag that has never been solved
const NEVER_SOLVED_SCORE: f64 = 40.0;

/// Review score for solved tags whose history predates stat tracking
const LEGACY_HISTORY_SCORE: f64 = 20.0;

/// Bonus when the next skill level is within reach
const LEVEL_UP_BONUS: f64 = 30.0;

/// Solves-remaining window that counts as "within reach" (exclusive)
const LEVEL_UP_WINDOW: i64 = 5;

/// Bonus when the tag counts toward the active target
const TARGET_BONUS: f64 = 30.0;

/// An ephemeral scored tag in the candidate pool
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The scored tag
    pub tag_id: i64,
    /// The tag's currently matched skill level
    pub matched_skill: SkillCode,
    /// Total sampling weight
    pub score: f64,
}

/// The three score components for one tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Recency-of-practice component (0-50)
    pub review: f64,
    /// Imminent level-up bonus (0 or 30)
    pub level_up: f64,
    /// Active-target alignment bonus (0 or 30)
    pub target: f64,
}

impl ScoreBreakdown {
    /// Sum of all components; never negative, no upper clamp
    pub fn total(&self) -> f64 {
        self.review + self.level_up + self.target
    }
}

/// Computes sampling weights for candidate tags
#[derive(Debug)]
pub struct ScoringEngine;

impl ScoringEngine {
    /// Score one tag from its stat and matched requirement
    pub fn score(
        stat: &TagAccountStat,
        matched: &SkillRequirement,
        next: Option<&SkillRequirement>,
        target_aligned: bool,
        today: NaiveDate,
    ) -> ScoreBreakdown {
        ScoreBreakdown {
            review: Self::review_score(stat, matched, today),
            level_up: if Self::is_level_up_imminent(stat, next) {
                LEVEL_UP_BONUS
            } else {
                0.0
            },
            target: if target_aligned { TARGET_BONUS } else { 0.0 },
        }
    }

    /// Recency component: grows past the matched skill's review period
    fn review_score(stat: &TagAccountStat, matched: &SkillRequirement, today: NaiveDate) -> f64 {
        match stat.last_solved_date {
            Some(date) => {
                let days = (today - date).num_days();
                let period = matched.recommendation_period_days;
                if days >= period {
                    (((days - period) * 2 + 10) as f64).min(REVIEW_SCORE_CAP)
                } else {
                    0.0
                }
            }
            None if stat.is_unsolved() => NEVER_SOLVED_SCORE,
            None => LEGACY_HISTORY_SCORE,
        }
    }

    /// Days since the tag was last solved, if a date is recorded
    pub fn days_since_last_solve(stat: &TagAccountStat, today: NaiveDate) -> Option<i64> {
        stat.last_solved_date.map(|date| (today - date).num_days())
    }

    /// Whether the matched skill's review period has been exceeded
    pub fn is_review_due(
        stat: &TagAccountStat,
        matched: &SkillRequirement,
        today: NaiveDate,
    ) -> bool {
        Self::days_since_last_solve(stat, today)
            .is_some_and(|days| days >= matched.recommendation_period_days)
    }

    /// Additional solves needed to reach the next skill level
    pub fn problems_to_next_level(
        stat: &TagAccountStat,
        next: Option<&SkillRequirement>,
    ) -> Option<i64> {
        next.map(|requirement| requirement.min_solved_problem - stat.solved_problem_count)
    }

    /// Solves needed to reach the next level, when strictly within the
    /// bonus window
    pub fn imminent_level_up(stat: &TagAccountStat, next: Option<&SkillRequirement>) -> Option<i64> {
        Self::problems_to_next_level(stat, next).filter(|&needed| needed > 0 && needed < LEVEL_UP_WINDOW)
    }

    /// Whether the next skill level is strictly within the bonus window
    pub fn is_level_up_imminent(stat: &TagAccountStat, next: Option<&SkillRequirement>) -> bool {
        Self::imminent_level_up(stat, next).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(skill_code: SkillCode, min_solved: i64, period_days: i64) -> SkillRequirement {
        SkillRequirement {
            tag_id: 1,
            skill_code,
            min_solved_problem: min_solved,
            min_user_tier: 0,
            min_solved_problem_tier: 0,
            recommendation_period_days: period_days,
        }
    }

    fn stat(solved: i64, last_solved: Option<NaiveDate>) -> TagAccountStat {
        TagAccountStat {
            tag_id: 1,
            solved_problem_count: solved,
            highest_tier_achieved: None,
            last_solved_date: last_solved,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_review_score_overdue_formula() {
        // Solved 10 days ago with a 3-day period: (10 - 3) * 2 + 10 = 24
        let today = day(2025, 6, 15);
        let matched = requirement(SkillCode::Intermediate, 5, 3);
        let breakdown = ScoringEngine::score(
            &stat(20, Some(day(2025, 6, 5))),
            &matched,
            None,
            false,
            today,
        );

        assert_eq!(breakdown.review, 24.0);
        assert_eq!(breakdown.total(), 24.0);
    }

    #[test]
    fn test_review_score_clamped_at_fifty() {
        let today = day(2025, 6, 15);
        let matched = requirement(SkillCode::Intermediate, 5, 3);
        let breakdown = ScoringEngine::score(
            &stat(20, Some(day(2025, 1, 1))),
            &matched,
            None,
            false,
            today,
        );

        assert_eq!(breakdown.review, 50.0);
    }

    #[test]
    fn test_review_score_zero_inside_period() {
        let today = day(2025, 6, 15);
        let matched = requirement(SkillCode::Intermediate, 5, 7);
        let breakdown = ScoringEngine::score(
            &stat(20, Some(day(2025, 6, 13))),
            &matched,
            None,
            false,
            today,
        );

        assert_eq!(breakdown.review, 0.0);
    }

    #[test]
    fn test_never_solved_scores_forty() {
        let today = day(2025, 6, 15);
        let matched = requirement(SkillCode::Intermediate, 5, 7);
        let breakdown = ScoringEngine::score(&stat(0, None), &matched, None, false, today);

        assert_eq!(breakdown.review, 40.0);
        assert_eq!(breakdown.total(), 40.0);
    }

    #[test]
    fn test_legacy_history_scores_twenty() {
        // Solved before stat tracking started: count > 0 but no date
        let today = day(2025, 6, 15);
        let matched = requirement(SkillCode::Intermediate, 5, 7);
        let breakdown = ScoringEngine::score(&stat(12, None), &matched, None, false, today);

        assert_eq!(breakdown.review, 20.0);
    }

    #[test]
    fn test_level_up_window_is_exclusive() {
        let next = requirement(SkillCode::Advanced, 20, 7);

        // Exactly at the threshold: 0 needed, no bonus
        assert!(!ScoringEngine::is_level_up_imminent(&stat(20, None), Some(&next)));
        // 1-4 needed: bonus
        assert!(ScoringEngine::is_level_up_imminent(&stat(19, None), Some(&next)));
        assert!(ScoringEngine::is_level_up_imminent(&stat(16, None), Some(&next)));
        // 5 needed: no bonus
        assert!(!ScoringEngine::is_level_up_imminent(&stat(15, None), Some(&next)));
        // Past MAS there is no next level
        assert!(!ScoringEngine::is_level_up_imminent(&stat(19, None), None));
    }

    #[test]
    fn test_level_up_and_target_bonuses_sum() {
        let today = day(2025, 6, 15);
        let matched = requirement(SkillCode::Intermediate, 5, 3);
        let next = requirement(SkillCode::Advanced, 20, 7);

        let breakdown = ScoringEngine::score(
            &stat(18, Some(day(2025, 6, 5))),
            &matched,
            Some(&next),
            true,
            today,
        );

        assert_eq!(breakdown.review, 24.0);
        assert_eq!(breakdown.level_up, 30.0);
        assert_eq!(breakdown.target, 30.0);
        assert_eq!(breakdown.total(), 84.0);
    }

    #[test]
    fn test_components_are_non_negative() {
        let today = day(2025, 6, 15);
        let matched = requirement(SkillCode::Intermediate, 5, 30);
        let breakdown = ScoringEngine::score(
            &stat(3, Some(day(2025, 6, 14))),
            &matched,
            None,
            false,
            today,
        );

        assert!(breakdown.review >= 0.0);
        assert!(breakdown.level_up >= 0.0);
        assert!(breakdown.target >= 0.0);
    }

    #[test]
    fn test_review_due_predicate() {
        let today = day(2025, 6, 15);
        let matched = requirement(SkillCode::Intermediate, 5, 3);

        assert!(ScoringEngine::is_review_due(
            &stat(20, Some(day(2025, 6, 10))),
            &matched,
            today
        ));
        assert!(!ScoringEngine::is_review_due(
            &stat(20, Some(day(2025, 6, 14))),
            &matched,
            today
        ));
        assert!(!ScoringEngine::is_review_due(&stat(20, None), &matched, today));
    }
}
