//! Search criteria value types and builder
//!
//! Turns a matched skill level and the requested difficulty filters into
//! concrete tier/skill-rate search windows for the problem lookup.

use serde::{Deserialize, Serialize};

use super::entity::{FilterCode, LevelFilterTable, SkillCode, TagAccountStat};

/// The highest tier the judge assigns to problems or accounts
pub const MAX_TIER: i32 = 30;

/// A closed tier range; `None` bounds are unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRange {
    /// Inclusive lower bound
    pub min: Option<i32>,
    /// Inclusive upper bound
    pub max: Option<i32>,
}

impl TierRange {
    /// Create a range with the given bounds
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    /// A range matching every tier
    pub fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Check whether a tier falls inside the range
    pub fn contains(&self, tier: i32) -> bool {
        self.min.is_none_or(|min| tier >= min) && self.max.is_none_or(|max| tier <= max)
    }
}

/// A closed skill-rate band; `None` bounds are unbounded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRange {
    /// Inclusive lower bound
    pub min: Option<f64>,
    /// Inclusive upper bound
    pub max: Option<f64>,
}

impl RateRange {
    /// Create a band with the given bounds
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// A band matching every rate
    pub fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Check whether a rate falls inside the band
    pub fn contains(&self, rate: f64) -> bool {
        self.min.is_none_or(|min| rate >= min) && self.max.is_none_or(|max| rate <= max)
    }
}

/// One concrete search window for the problem lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Difficulty intent the window was built from
    pub filter_code: FilterCode,
    /// Tier window
    pub tier: TierRange,
    /// Skill-rate band
    pub skill_rate: RateRange,
}

impl SearchCriteria {
    /// Check whether a problem's tier and rate match this window
    pub fn matches(&self, tier: i32, skill_rate: f64) -> bool {
        self.tier.contains(tier) && self.skill_rate.contains(skill_rate)
    }
}

/// Builds search criteria from the level-filter table
#[derive(Debug)]
pub struct SearchCriteriaBuilder<'a> {
    filters: &'a LevelFilterTable,
}

impl<'a> SearchCriteriaBuilder<'a> {
    /// Create a builder over the loaded filter table
    pub fn new(filters: &'a LevelFilterTable) -> Self {
        Self { filters }
    }

    /// Build one criterion per resolvable filter code
    ///
    /// Unresolvable (skill, filter) pairs are skipped; an empty result means
    /// the tag currently has no usable search window. When the caller
    /// requested the tag explicitly, tier windows are discarded and only the
    /// skill-rate band is kept.
    pub fn build(
        &self,
        account_tier: i32,
        stat: &TagAccountStat,
        matched_skill: SkillCode,
        filter_codes: &[FilterCode],
        explicit_tag: bool,
    ) -> Vec<SearchCriteria> {
        let mut criteria = Vec::with_capacity(filter_codes.len());

        for &filter_code in filter_codes {
            let Some(filter) = self.filters.get(matched_skill, filter_code) else {
                continue;
            };

            let mut min = filter
                .min_tier_diff
                .map(|diff| (account_tier + diff).max(0));
            let mut max = filter.max_tier_diff.map(|diff| account_tier + diff);

            // An EXTREME window must stay above what the user has already
            // cleared, and is open-ended at the top.
            if filter_code == FilterCode::Extreme {
                let floor = stat.highest_tier_or_zero() + 2;
                min = Some(min.unwrap_or(0).max(floor));
                max = Some(MAX_TIER);
            }

            let tier = if explicit_tag {
                TierRange::unbounded()
            } else {
                TierRange::new(min, max)
            };

            criteria.push(SearchCriteria {
                filter_code,
                tier,
                skill_rate: RateRange::new(filter.min_skill_rate, filter.max_skill_rate),
            });
        }

        criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::entity::LevelFilter;

    fn filter_table(rows: Vec<LevelFilter>) -> LevelFilterTable {
        LevelFilterTable::from_rows(rows)
    }

    fn filter(
        filter_code: FilterCode,
        skill_code: SkillCode,
        min_tier_diff: Option<i32>,
        max_tier_diff: Option<i32>,
    ) -> LevelFilter {
        LevelFilter {
            filter_code,
            skill_code,
            min_tier_diff,
            max_tier_diff,
            min_skill_rate: Some(0.2),
            max_skill_rate: None,
        }
    }

    #[test]
    fn test_tier_range_contains() {
        let range = TierRange::new(Some(5), Some(10));
        assert!(range.contains(5));
        assert!(range.contains(10));
        assert!(!range.contains(4));
        assert!(!range.contains(11));
        assert!(TierRange::unbounded().contains(-3));
    }

    #[test]
    fn test_rate_range_contains() {
        let band = RateRange::new(Some(0.2), Some(0.5));
        assert!(band.contains(0.2));
        assert!(band.contains(0.5));
        assert!(!band.contains(0.19));
        assert!(!band.contains(0.51));
        assert!(RateRange::new(None, Some(0.3)).contains(0.0));
    }

    #[test]
    fn test_build_normal_window() {
        let table = filter_table(vec![filter(
            FilterCode::Normal,
            SkillCode::Intermediate,
            Some(-1),
            Some(1),
        )]);
        let builder = SearchCriteriaBuilder::new(&table);
        let stat = TagAccountStat::empty(1);

        let criteria = builder.build(
            10,
            &stat,
            SkillCode::Intermediate,
            &[FilterCode::Normal],
            false,
        );

        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria[0].tier, TierRange::new(Some(9), Some(11)));
        assert!(criteria[0].matches(10, 0.4));
        assert!(!criteria[0].matches(12, 0.4));
    }

    #[test]
    fn test_build_floors_min_at_zero() {
        let table = filter_table(vec![filter(
            FilterCode::Easy,
            SkillCode::Intermediate,
            Some(-5),
            Some(-2),
        )]);
        let builder = SearchCriteriaBuilder::new(&table);
        let stat = TagAccountStat::empty(1);

        let criteria = builder.build(
            2,
            &stat,
            SkillCode::Intermediate,
            &[FilterCode::Easy],
            false,
        );

        assert_eq!(criteria[0].tier.min, Some(0));
        assert_eq!(criteria[0].tier.max, Some(0));
    }

    #[test]
    fn test_unresolvable_filter_is_skipped() {
        let table = filter_table(vec![filter(
            FilterCode::Normal,
            SkillCode::Intermediate,
            Some(-1),
            Some(1),
        )]);
        let builder = SearchCriteriaBuilder::new(&table);
        let stat = TagAccountStat::empty(1);

        // The table has no HARD row for this skill
        let criteria = builder.build(
            10,
            &stat,
            SkillCode::Intermediate,
            &[FilterCode::Hard],
            false,
        );
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_extreme_correction_lifts_floor() {
        let table = filter_table(vec![filter(
            FilterCode::Extreme,
            SkillCode::Advanced,
            Some(3),
            None,
        )]);
        let builder = SearchCriteriaBuilder::new(&table);

        // User cleared tier 18 under this tag; account tier 10 would give
        // min = 13, but the correction lifts it to 18 + 2 = 20.
        let stat = TagAccountStat {
            tag_id: 1,
            solved_problem_count: 12,
            highest_tier_achieved: Some(18),
            last_solved_date: None,
        };

        let criteria = builder.build(
            10,
            &stat,
            SkillCode::Advanced,
            &[FilterCode::Extreme],
            false,
        );

        assert_eq!(criteria[0].tier.min, Some(20));
        assert_eq!(criteria[0].tier.max, Some(MAX_TIER));
    }

    #[test]
    fn test_extreme_correction_keeps_higher_computed_min() {
        let table = filter_table(vec![filter(
            FilterCode::Extreme,
            SkillCode::Advanced,
            Some(3),
            None,
        )]);
        let builder = SearchCriteriaBuilder::new(&table);

        // Computed min (25 + 3 = 28) is above achieved + 2 = 7
        let stat = TagAccountStat {
            tag_id: 1,
            solved_problem_count: 3,
            highest_tier_achieved: Some(5),
            last_solved_date: None,
        };

        let criteria = builder.build(
            25,
            &stat,
            SkillCode::Advanced,
            &[FilterCode::Extreme],
            false,
        );

        assert_eq!(criteria[0].tier.min, Some(28));
    }

    #[test]
    fn test_explicit_tag_discards_tier_window() {
        let table = filter_table(vec![filter(
            FilterCode::Normal,
            SkillCode::Intermediate,
            Some(-1),
            Some(1),
        )]);
        let builder = SearchCriteriaBuilder::new(&table);
        let stat = TagAccountStat::empty(1);

        let criteria = builder.build(
            10,
            &stat,
            SkillCode::Intermediate,
            &[FilterCode::Normal],
            true,
        );

        assert_eq!(criteria[0].tier, TierRange::unbounded());
        // The rate band survives the override
        assert_eq!(criteria[0].skill_rate.min, Some(0.2));
        assert!(criteria[0].matches(1, 0.4));
        assert!(!criteria[0].matches(1, 0.1));
    }

    #[test]
    fn test_multiple_filters_build_multiple_windows() {
        let table = filter_table(vec![
            filter(FilterCode::Easy, SkillCode::Intermediate, Some(-5), Some(-2)),
            filter(FilterCode::Normal, SkillCode::Intermediate, Some(-1), Some(1)),
        ]);
        let builder = SearchCriteriaBuilder::new(&table);
        let stat = TagAccountStat::empty(1);

        let criteria = builder.build(
            10,
            &stat,
            SkillCode::Intermediate,
            &[FilterCode::Easy, FilterCode::Normal],
            false,
        );

        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria[0].filter_code, FilterCode::Easy);
        assert_eq!(criteria[1].filter_code, FilterCode::Normal);
    }
}
