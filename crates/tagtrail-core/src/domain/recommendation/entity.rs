//! Recommendation entities and related types
//!
//! Defines the core types for practice statistics and problem recommendations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Per-tag proficiency level, ordered from lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SkillCode {
    /// Intermediate - has practiced the tag
    Intermediate,
    /// Advanced - comfortable with the tag
    Advanced,
    /// Mastered - the tag is a strength
    Mastered,
}

impl SkillCode {
    /// Convert to the wire/database code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intermediate => "IM",
            Self::Advanced => "AD",
            Self::Mastered => "MAS",
        }
    }

    /// Create from the wire/database code
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "IM" => Some(Self::Intermediate),
            "AD" => Some(Self::Advanced),
            "MAS" => Some(Self::Mastered),
            _ => None,
        }
    }

    /// The lowest skill level
    pub fn lowest() -> Self {
        Self::Intermediate
    }

    /// The next skill level up, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Intermediate => Some(Self::Advanced),
            Self::Advanced => Some(Self::Mastered),
            Self::Mastered => None,
        }
    }

    /// All skill levels from highest to lowest
    pub fn descending() -> [Self; 3] {
        [Self::Mastered, Self::Advanced, Self::Intermediate]
    }
}

impl fmt::Display for SkillCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named difficulty intent for a recommendation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCode {
    /// Below the user's comfortable range
    Easy,
    /// Around the user's comfortable range
    Normal,
    /// Above the user's comfortable range
    Hard,
    /// Well above anything the user has cleared
    Extreme,
}

impl FilterCode {
    /// Convert to the wire/database code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Normal => "NORMAL",
            Self::Hard => "HARD",
            Self::Extreme => "EXTREME",
        }
    }

    /// Create from the wire/database code
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EASY" => Some(Self::Easy),
            "NORMAL" => Some(Self::Normal),
            "HARD" => Some(Self::Hard),
            "EXTREME" => Some(Self::Extreme),
            _ => None,
        }
    }

    /// Get all filter codes
    pub fn all() -> Vec<Self> {
        vec![Self::Easy, Self::Normal, Self::Hard, Self::Extreme]
    }
}

impl fmt::Display for FilterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How strictly user-excluded tags are enforced during validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionMode {
    /// Reject any problem touching an excluded tag, even a secondary one
    Strict,
    /// Excluded tags are only kept out of the sampled candidate pool
    #[default]
    Lenient,
}

impl ExclusionMode {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

impl fmt::Display for ExclusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A problem tag (topic/technique) with its prerequisite and target links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagNode {
    /// Judge-side tag identifier
    pub id: i64,

    /// Short key used in requests (e.g. "dp")
    pub key: String,

    /// Human-readable name
    pub display_name: String,

    /// Coarse difficulty level of the tag itself
    pub level: i64,

    /// Parent tags that must be practiced before this one (one hop only)
    pub parent_ids: Vec<i64>,

    /// Targets this tag counts toward
    pub target_ids: Vec<Uuid>,
}

impl TagNode {
    /// Create a new tag node
    pub fn new(id: i64, key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            display_name: display_name.into(),
            level: 0,
            parent_ids: Vec::new(),
            target_ids: Vec::new(),
        }
    }

    /// Set the tag level
    pub fn with_level(mut self, level: i64) -> Self {
        self.level = level;
        self
    }

    /// Set the parent tag ids
    pub fn with_parents(mut self, parent_ids: Vec<i64>) -> Self {
        self.parent_ids = parent_ids;
        self
    }

    /// Set the associated target ids
    pub fn with_targets(mut self, target_ids: Vec<Uuid>) -> Self {
        self.target_ids = target_ids;
        self
    }

    /// Check if this tag has prerequisites
    pub fn has_parents(&self) -> bool {
        !self.parent_ids.is_empty()
    }
}

/// The tag graph, stored as an adjacency map keyed by tag id
///
/// Parent relations are looked up by id and never traversed transitively.
/// Iteration order is ascending id so sampling with a fixed seed is
/// reproducible.
#[derive(Debug, Clone, Default)]
pub struct TagGraph {
    by_id: HashMap<i64, TagNode>,
    id_by_key: HashMap<String, i64>,
    ordered_ids: Vec<i64>,
}

impl TagGraph {
    /// Build a graph from a list of tag nodes
    pub fn from_nodes(nodes: Vec<TagNode>) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut id_by_key = HashMap::with_capacity(nodes.len());
        let mut ordered_ids = Vec::with_capacity(nodes.len());

        for node in nodes {
            id_by_key.insert(node.key.clone(), node.id);
            ordered_ids.push(node.id);
            by_id.insert(node.id, node);
        }
        ordered_ids.sort_unstable();
        ordered_ids.dedup();

        Self {
            by_id,
            id_by_key,
            ordered_ids,
        }
    }

    /// Look up a tag by id
    pub fn get(&self, id: i64) -> Option<&TagNode> {
        self.by_id.get(&id)
    }

    /// Look up a tag by its short key
    pub fn get_by_key(&self, key: &str) -> Option<&TagNode> {
        self.id_by_key.get(key).and_then(|id| self.by_id.get(id))
    }

    /// Iterate over all tags in ascending id order
    pub fn tags(&self) -> impl Iterator<Item = &TagNode> {
        self.ordered_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Number of tags in the graph
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Per-tag solve statistics for one user's linked judge account
///
/// An absent row is equivalent to `TagAccountStat::empty`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagAccountStat {
    /// Tag these statistics belong to
    pub tag_id: i64,

    /// Number of problems solved under this tag
    pub solved_problem_count: i64,

    /// Highest problem tier cleared under this tag, if any
    pub highest_tier_achieved: Option<i32>,

    /// When the user last solved a problem under this tag; `None` for tags
    /// whose history predates stat tracking
    pub last_solved_date: Option<NaiveDate>,
}

impl TagAccountStat {
    /// The empty stat used when no row exists for a tag
    pub fn empty(tag_id: i64) -> Self {
        Self {
            tag_id,
            solved_problem_count: 0,
            highest_tier_achieved: None,
            last_solved_date: None,
        }
    }

    /// Check whether the tag has never been solved
    pub fn is_unsolved(&self) -> bool {
        self.solved_problem_count == 0
    }

    /// Highest achieved tier, treating absent as 0
    pub fn highest_tier_or_zero(&self) -> i32 {
        self.highest_tier_achieved.unwrap_or(0)
    }
}

/// Thresholds a tag's statistics must meet to count as one skill level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRequirement {
    /// Tag this requirement applies to
    pub tag_id: i64,

    /// Skill level this requirement defines
    pub skill_code: SkillCode,

    /// Minimum problems solved under the tag
    pub min_solved_problem: i64,

    /// Minimum overall account tier
    pub min_user_tier: i32,

    /// Minimum tier of the hardest problem solved under the tag
    pub min_solved_problem_tier: i32,

    /// Days after which practice at this level is due for review
    pub recommendation_period_days: i64,
}

/// Skill requirements indexed by tag id, highest skill first
#[derive(Debug, Clone, Default)]
pub struct SkillRequirementTable {
    by_tag: HashMap<i64, Vec<SkillRequirement>>,
}

impl SkillRequirementTable {
    /// Build the table from requirement rows
    pub fn from_rows(rows: Vec<SkillRequirement>) -> Self {
        let mut by_tag: HashMap<i64, Vec<SkillRequirement>> = HashMap::new();
        for row in rows {
            by_tag.entry(row.tag_id).or_default().push(row);
        }
        for requirements in by_tag.values_mut() {
            requirements.sort_by(|a, b| b.skill_code.cmp(&a.skill_code));
        }
        Self { by_tag }
    }

    /// Requirements for a tag, highest skill first; empty if none configured
    pub fn for_tag(&self, tag_id: i64) -> &[SkillRequirement] {
        self.by_tag.get(&tag_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up the requirement for one (tag, skill) pair
    pub fn get(&self, tag_id: i64, skill_code: SkillCode) -> Option<&SkillRequirement> {
        self.for_tag(tag_id)
            .iter()
            .find(|r| r.skill_code == skill_code)
    }
}

/// A difficulty intent mapped to a concrete tier/skill-rate window
///
/// Tier diffs are relative to the account tier; `None` bounds are unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelFilter {
    /// Difficulty intent this filter implements
    pub filter_code: FilterCode,

    /// Skill level this filter applies to
    pub skill_code: SkillCode,

    /// Lower tier bound relative to the account tier
    pub min_tier_diff: Option<i32>,

    /// Upper tier bound relative to the account tier
    pub max_tier_diff: Option<i32>,

    /// Lower bound of the solve-rate band
    pub min_skill_rate: Option<f64>,

    /// Upper bound of the solve-rate band
    pub max_skill_rate: Option<f64>,
}

/// Level filters indexed by (skill, filter) pair
#[derive(Debug, Clone, Default)]
pub struct LevelFilterTable {
    by_key: HashMap<(SkillCode, FilterCode), LevelFilter>,
}

impl LevelFilterTable {
    /// Build the table from filter rows
    pub fn from_rows(rows: Vec<LevelFilter>) -> Self {
        let mut by_key = HashMap::with_capacity(rows.len());
        for row in rows {
            by_key.insert((row.skill_code, row.filter_code), row);
        }
        Self { by_key }
    }

    /// Look up the filter for one (skill, filter) pair
    pub fn get(&self, skill_code: SkillCode, filter_code: FilterCode) -> Option<&LevelFilter> {
        self.by_key.get(&(skill_code, filter_code))
    }
}

/// A problem as returned by the problem lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Judge-side problem identifier
    pub id: i64,

    /// Problem title
    pub title: String,

    /// Difficulty tier
    pub tier: i32,

    /// Number of accounts that have solved it
    pub solver_count: i64,

    /// Fraction of attempts that succeed, in `[0, 1]`
    pub skill_rate: f64,

    /// Tags attached to the problem, primary tag first
    pub tag_ids: Vec<i64>,
}

impl Problem {
    /// Check whether the problem carries a given tag
    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tag_ids.contains(&tag_id)
    }
}

/// The user's linked judge account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedAccount {
    /// Owning user
    pub user_id: Uuid,

    /// Judge-side handle
    pub handle: String,

    /// Overall proficiency tier of the account
    pub tier: i32,
}

/// Aggregate exclusion state for one user
#[derive(Debug, Clone, Default)]
pub struct ExclusionState {
    /// Tags the user never wants recommended
    pub excluded_tag_ids: HashSet<i64>,

    /// Problems the user has already solved
    pub solved_problem_ids: HashSet<i64>,

    /// Problems the user has banned
    pub banned_problem_ids: HashSet<i64>,
}

impl ExclusionState {
    /// Check whether a tag is excluded
    pub fn is_tag_excluded(&self, tag_id: i64) -> bool {
        self.excluded_tag_ids.contains(&tag_id)
    }

    /// The union of solved and banned problem ids
    pub fn problem_exclusions(&self) -> HashSet<i64> {
        self.solved_problem_ids
            .union(&self.banned_problem_ids)
            .copied()
            .collect()
    }
}

/// The user's currently active goal and its required tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTarget {
    /// Target identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Tags the target requires
    pub tag_ids: HashSet<i64>,
}

impl ActiveTarget {
    /// Check whether a tag counts toward this target
    pub fn applies_to(&self, tag_id: i64) -> bool {
        self.tag_ids.contains(&tag_id)
    }
}

/// Parameters of one recommendation call
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    /// The requesting user
    pub user_id: Uuid,

    /// How many problems to recommend
    pub count: usize,

    /// Requested difficulty filters; empty means NORMAL
    pub filter_codes: Vec<FilterCode>,

    /// Explicit tag keys to draw from, bypassing tag sampling
    pub tag_keys: Vec<String>,

    /// How strictly excluded tags are enforced
    pub exclusion_mode: ExclusionMode,

    /// Fixed RNG seed for reproducible sampling (tests)
    pub seed: Option<u64>,
}

impl RecommendationRequest {
    /// Create a request with default settings
    pub fn new(user_id: Uuid, count: usize) -> Self {
        Self {
            user_id,
            count,
            filter_codes: Vec::new(),
            tag_keys: Vec::new(),
            exclusion_mode: ExclusionMode::default(),
            seed: None,
        }
    }

    /// Add a difficulty filter
    pub fn with_filter(mut self, filter_code: FilterCode) -> Self {
        if !self.filter_codes.contains(&filter_code) {
            self.filter_codes.push(filter_code);
        }
        self
    }

    /// Restrict the request to explicit tag keys
    pub fn with_tags(mut self, tag_keys: Vec<String>) -> Self {
        self.tag_keys = tag_keys;
        self
    }

    /// Set the exclusion mode
    pub fn with_exclusion_mode(mut self, mode: ExclusionMode) -> Self {
        self.exclusion_mode = mode;
        self
    }

    /// Fix the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The effective filter list (defaults to NORMAL)
    pub fn effective_filters(&self) -> Vec<FilterCode> {
        if self.filter_codes.is_empty() {
            vec![FilterCode::Normal]
        } else {
            self.filter_codes.clone()
        }
    }

    /// Whether explicit tags were requested
    pub fn has_explicit_tags(&self) -> bool {
        !self.tag_keys.is_empty()
    }
}

/// One accepted recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationCandidate {
    /// The recommended problem
    pub problem: Problem,

    /// Display name of the tag that produced the recommendation
    pub tag_name: String,

    /// Human-readable justifications, in presentation order
    pub reasons: Vec<String>,

    /// Id of the tag that produced the recommendation
    pub primary_tag_id: i64,
}

/// Audit record of one recommendation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationLog {
    /// Unique log entry id
    pub id: Uuid,

    /// The requesting user
    pub user_id: Uuid,

    /// How many problems were requested
    pub requested_count: u32,

    /// How many problems were accepted
    pub accepted_count: u32,

    /// Failed attempts consumed before termination
    pub failed_attempts: u32,

    /// Exclusion mode of the run
    pub exclusion_mode: ExclusionMode,

    /// Ids of the accepted problems
    pub problem_ids: Vec<i64>,

    /// When the run happened
    pub created_at: DateTime<Utc>,
}

impl RecommendationLog {
    /// Create a new log entry
    pub fn new(
        user_id: Uuid,
        requested_count: u32,
        accepted_count: u32,
        failed_attempts: u32,
        exclusion_mode: ExclusionMode,
        problem_ids: Vec<i64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            requested_count,
            accepted_count,
            failed_attempts,
            exclusion_mode,
            problem_ids,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_code_conversion() {
        assert_eq!(SkillCode::Mastered.as_str(), "MAS");
        assert_eq!(SkillCode::from_str("im"), Some(SkillCode::Intermediate));
        assert_eq!(SkillCode::from_str("invalid"), None);
    }

    #[test]
    fn test_skill_code_ordering() {
        assert!(SkillCode::Intermediate < SkillCode::Advanced);
        assert!(SkillCode::Advanced < SkillCode::Mastered);
        assert_eq!(SkillCode::lowest(), SkillCode::Intermediate);
        assert_eq!(
            SkillCode::descending(),
            [
                SkillCode::Mastered,
                SkillCode::Advanced,
                SkillCode::Intermediate
            ]
        );
    }

    #[test]
    fn test_skill_code_next() {
        assert_eq!(SkillCode::Intermediate.next(), Some(SkillCode::Advanced));
        assert_eq!(SkillCode::Advanced.next(), Some(SkillCode::Mastered));
        assert_eq!(SkillCode::Mastered.next(), None);
    }

    #[test]
    fn test_filter_code_conversion() {
        assert_eq!(FilterCode::Extreme.as_str(), "EXTREME");
        assert_eq!(FilterCode::from_str("normal"), Some(FilterCode::Normal));
        assert_eq!(FilterCode::from_str("bogus"), None);
        assert_eq!(FilterCode::all().len(), 4);
    }

    #[test]
    fn test_tag_graph_lookup() {
        let graph = TagGraph::from_nodes(vec![
            TagNode::new(7, "graph", "Graph Traversal"),
            TagNode::new(3, "dp", "Dynamic Programming").with_parents(vec![7]),
        ]);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get(3).unwrap().key, "dp");
        assert_eq!(graph.get_by_key("graph").unwrap().id, 7);
        assert!(graph.get_by_key("missing").is_none());

        // Iteration is ascending by id
        let ids: Vec<i64> = graph.tags().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 7]);
    }

    #[test]
    fn test_empty_stat_semantics() {
        let stat = TagAccountStat::empty(1);
        assert!(stat.is_unsolved());
        assert_eq!(stat.highest_tier_or_zero(), 0);
        assert!(stat.last_solved_date.is_none());
    }

    #[test]
    fn test_requirement_table_sorted_descending() {
        let table = SkillRequirementTable::from_rows(vec![
            requirement(1, SkillCode::Intermediate, 5),
            requirement(1, SkillCode::Mastered, 50),
            requirement(1, SkillCode::Advanced, 20),
        ]);

        let codes: Vec<SkillCode> = table.for_tag(1).iter().map(|r| r.skill_code).collect();
        assert_eq!(
            codes,
            vec![
                SkillCode::Mastered,
                SkillCode::Advanced,
                SkillCode::Intermediate
            ]
        );
        assert!(table.for_tag(99).is_empty());
        assert_eq!(
            table.get(1, SkillCode::Advanced).unwrap().min_solved_problem,
            20
        );
    }

    #[test]
    fn test_request_builder_defaults() {
        let user = Uuid::new_v4();
        let request = RecommendationRequest::new(user, 3);

        assert_eq!(request.exclusion_mode, ExclusionMode::Lenient);
        assert_eq!(request.effective_filters(), vec![FilterCode::Normal]);
        assert!(!request.has_explicit_tags());

        let request = request
            .with_filter(FilterCode::Hard)
            .with_filter(FilterCode::Hard)
            .with_tags(vec!["dp".to_string()])
            .with_exclusion_mode(ExclusionMode::Strict)
            .with_seed(42);

        assert_eq!(request.effective_filters(), vec![FilterCode::Hard]);
        assert!(request.has_explicit_tags());
        assert_eq!(request.seed, Some(42));
    }

    #[test]
    fn test_exclusion_state_union() {
        let mut state = ExclusionState::default();
        state.solved_problem_ids.insert(1);
        state.solved_problem_ids.insert(2);
        state.banned_problem_ids.insert(2);
        state.banned_problem_ids.insert(3);

        let union = state.problem_exclusions();
        assert_eq!(union.len(), 3);
        assert!(union.contains(&1) && union.contains(&2) && union.contains(&3));
    }

    fn requirement(tag_id: i64, skill_code: SkillCode, min_solved: i64) -> SkillRequirement {
        SkillRequirement {
            tag_id,
            skill_code,
            min_solved_problem: min_solved,
            min_user_tier: 0,
            min_solved_problem_tier: 0,
            recommendation_period_days: 7,
        }
    }
}
