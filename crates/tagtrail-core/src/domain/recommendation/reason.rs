//! Human-readable justifications for accepted recommendations
//!
//! Builds the per-recommendation reason list in priority order: target
//! alignment, brand-new tag (which stands alone), review overdue, imminent
//! level-up, and a generic fallback. Accumulated reasons are returned in
//! randomized order.

use chrono::NaiveDate;

use super::entity::{ActiveTarget, SkillRequirement, TagAccountStat, TagNode};
use super::sampler::WeightedSampler;
use super::scoring::ScoringEngine;

/// Everything the generator needs to justify one recommendation
#[derive(Debug)]
pub struct ReasonContext<'a> {
    /// The tag that produced the recommendation
    pub tag: &'a TagNode,
    /// The tag's statistics
    pub stat: &'a TagAccountStat,
    /// The tag's matched skill requirement
    pub matched: &'a SkillRequirement,
    /// The next skill level's requirement, if one exists
    pub next: Option<&'a SkillRequirement>,
    /// The active target, when the tag counts toward it
    pub target: Option<&'a ActiveTarget>,
    /// Reference date for overdue calculations
    pub today: NaiveDate,
}

/// Produces justification messages for accepted recommendations
#[derive(Debug)]
pub struct ReasonGenerator;

impl ReasonGenerator {
    /// Build the reason list for one accepted recommendation
    pub fn generate(ctx: &ReasonContext<'_>, sampler: &mut WeightedSampler) -> Vec<String> {
        let mut reasons = Vec::new();
        let tag_name = &ctx.tag.display_name;

        if let Some(target) = ctx.target {
            reasons.push(format!("'{}' 목표 달성에 필요한 분야예요!", target.name));
        }

        // A brand-new tag is its own justification; nothing below applies
        if ctx.stat.is_unsolved() {
            reasons.push(format!("새로운 '{}' 분야에 도전해보세요!", tag_name));
            return reasons;
        }

        let imminent = ScoringEngine::imminent_level_up(ctx.stat, ctx.next);

        match ctx.stat.last_solved_date {
            None => {
                // History predates stat tracking: only the level-up
                // condition can be checked
                if let Some(needed) = imminent {
                    reasons.push(Self::level_up_message(needed, tag_name));
                } else {
                    reasons.push(format!("'{}' 실력을 한 단계 끌어올려 보세요!", tag_name));
                }
            }
            Some(date) => {
                let days = (ctx.today - date).num_days();
                if days >= ctx.matched.recommendation_period_days {
                    reasons.push(format!(
                        "'{}' 문제를 푼 지 {}일이 지났어요. 복습해 볼까요?",
                        tag_name, days
                    ));
                }
                if let Some(needed) = imminent {
                    reasons.push(Self::level_up_message(needed, tag_name));
                }
                if reasons.is_empty() {
                    reasons.push(format!("'{}' 분야를 꾸준히 연습해 보세요!", tag_name));
                }
            }
        }

        if reasons.len() > 1 {
            sampler.shuffle(&mut reasons);
        }
        reasons
    }

    fn level_up_message(needed: i64, tag_name: &str) -> String {
        format!("{}문제만 더 풀면 '{}' 숙련도가 올라가요!", needed, tag_name)
    }
}
