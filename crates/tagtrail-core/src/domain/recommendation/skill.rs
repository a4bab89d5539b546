//! Skill matching and prerequisite checks
//!
//! Determines the highest skill level a tag's statistics satisfy, and
//! whether a tag's parent tags are practiced enough for the tag to be
//! recommendable at all.

use std::collections::HashMap;

use super::entity::{
    SkillCode, SkillRequirement, SkillRequirementTable, TagAccountStat, TagNode,
};

/// Matches a tag's statistics against its skill requirements
#[derive(Debug)]
pub struct SkillMatcher;

impl SkillMatcher {
    /// Find the highest skill requirement the stat satisfies
    ///
    /// Requirements are evaluated from the highest skill down; the first one
    /// whose three threshold conditions all hold wins. If none hold, the
    /// lowest defined requirement is returned. `None` means the tag has no
    /// requirement rows at all and cannot be scored this call.
    pub fn match_requirement<'a>(
        stat: &TagAccountStat,
        requirements: &'a [SkillRequirement],
        account_tier: i32,
    ) -> Option<&'a SkillRequirement> {
        if requirements.is_empty() {
            return None;
        }

        // `requirements` is sorted highest skill first by the table
        for requirement in requirements {
            if Self::satisfies(stat, requirement, account_tier) {
                return Some(requirement);
            }
        }

        requirements.last()
    }

    /// Find the highest satisfied skill level (see [`match_requirement`])
    ///
    /// [`match_requirement`]: Self::match_requirement
    pub fn match_skill(
        stat: &TagAccountStat,
        requirements: &[SkillRequirement],
        account_tier: i32,
    ) -> Option<SkillCode> {
        Self::match_requirement(stat, requirements, account_tier).map(|r| r.skill_code)
    }

    /// Check one requirement's three threshold conditions
    fn satisfies(stat: &TagAccountStat, requirement: &SkillRequirement, account_tier: i32) -> bool {
        stat.solved_problem_count >= requirement.min_solved_problem
            && account_tier >= requirement.min_user_tier
            && stat.highest_tier_or_zero() >= requirement.min_solved_problem_tier
    }
}

/// Validates that a tag's parent tags are minimally mastered
///
/// Failing this check removes the tag from the candidate pool entirely; an
/// under-prepared tag is never merely deprioritized.
#[derive(Debug)]
pub struct PrerequisiteChecker;

impl PrerequisiteChecker {
    /// Check whether every parent of the tag has been practiced
    ///
    /// A parent qualifies when a stat row exists for it and its matched
    /// skill is at least the lowest level. Tags without parents are always
    /// eligible.
    pub fn check(
        tag: &TagNode,
        stats: &HashMap<i64, TagAccountStat>,
        requirements: &SkillRequirementTable,
        account_tier: i32,
    ) -> bool {
        tag.parent_ids.iter().all(|parent_id| {
            let Some(stat) = stats.get(parent_id) else {
                return false;
            };
            match SkillMatcher::match_skill(stat, requirements.for_tag(*parent_id), account_tier) {
                Some(skill) => skill >= SkillCode::lowest(),
                None => false,
            }
        })
    }
}
