//! Core data model: retention levels, patterns, utterances, memory items and entities.
//!
//! Every type here is the shared vocabulary between the scoring, oracle, entity
//! linking and orchestration layers. Types that cross the (external) persistence
//! or transport boundary derive `Serialize`/`Deserialize`, matching the wider
//! corpus convention of keeping data-model types transport-ready from the start.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three retention tiers an utterance's derived memory item can be assigned.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetentionLevel {
    /// Discarded as noise; never produces entity updates.
    ImmediateDiscard,
    /// Kept for a handful of turns, subject to decay.
    ShortTerm,
    /// Kept indefinitely (subject only to external persistence policy).
    LongTerm,
}

impl std::fmt::Display for RetentionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RetentionLevel::ImmediateDiscard => "IMMEDIATE_DISCARD",
            RetentionLevel::ShortTerm => "SHORT_TERM",
            RetentionLevel::LongTerm => "LONG_TERM",
        };
        write!(f, "{s}")
    }
}

/// An immutable, compiled entry in the pattern catalog (see `patterns` module for
/// the loader). This is the runtime, post-compile shape; `patterns::PatternSpec`
/// is the declarative source shape it is built from.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub name: String,
    pub weight: i32,
    pub category: String,
    pub modifier_tags: BTreeSet<String>,
}

/// A single turn of dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub turn_index: u32,
    pub speaker: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Stable reference back to the utterance a `MemoryItem` was derived from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtteranceRef {
    pub turn_index: u32,
    pub speaker: String,
}

impl From<&Utterance> for UtteranceRef {
    fn from(u: &Utterance) -> Self {
        UtteranceRef {
            turn_index: u.turn_index,
            speaker: u.speaker.clone(),
        }
    }
}

/// One contribution to an adjusted score, in the order it was applied. Sufficient
/// to reconstruct the adjusted score bit-exactly (modulo the documented 0.1 rounding
/// on the user-weight step).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "camelCase")]
pub enum TraceEntry {
    Pattern { name: String, delta: i32 },
    SeverityMod { trigger: String, delta: i32 },
    PermanenceMod { trigger: String, delta: i32 },
    UrgencyMod { trigger: String, delta: i32 },
    LengthBonus { delta: i32 },
    FirstPersonBonus { delta: i32 },
    NumericBonus { delta: i32 },
    UserWeight { name: String, delta: f64 },
    ContradictionBonus { delta: f64 },
    OracleAdjust { delta: f64, note: String },
}

impl TraceEntry {
    /// The signed contribution this entry makes to the adjusted score.
    pub fn delta(&self) -> f64 {
        match self {
            TraceEntry::Pattern { delta, .. } => *delta as f64,
            TraceEntry::SeverityMod { delta, .. } => *delta as f64,
            TraceEntry::PermanenceMod { delta, .. } => *delta as f64,
            TraceEntry::UrgencyMod { delta, .. } => *delta as f64,
            TraceEntry::LengthBonus { delta } => *delta as f64,
            TraceEntry::FirstPersonBonus { delta } => *delta as f64,
            TraceEntry::NumericBonus { delta } => *delta as f64,
            TraceEntry::UserWeight { delta, .. } => *delta,
            TraceEntry::ContradictionBonus { delta } => *delta,
            TraceEntry::OracleAdjust { delta, .. } => *delta,
        }
    }
}

/// A matched pattern together with the spans it matched at, as returned by
/// `PatternRegistry::match_all`.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub pattern: Pattern,
    pub spans: Vec<(usize, usize)>,
}

/// The classification output for a single utterance.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryItem {
    pub utterance_ref: UtteranceRef,
    pub raw_score: i32,
    pub adjusted_score: f64,
    pub retention: RetentionLevel,
    pub matched_patterns: Vec<MatchedPatternContribution>,
    pub categories: BTreeSet<String>,
    pub entity_refs: BTreeSet<String>,
    pub superseded_by: Option<UtteranceRef>,
    pub reasoning: String,
    /// Full scoring trace (pattern matches + every modifier), kept separately
    /// from `matched_patterns` (which is pattern-only, per §3) for the
    /// trace-reconstruction property in the spec's testable properties.
    /// Serialized (not skipped): the round-trip property requires trace
    /// ordering to survive a serialize/deserialize cycle.
    pub trace: Vec<TraceEntry>,
    /// `adjusted_score` as of right after scoring + contradiction, before any
    /// decay pass ever ran. `decay::apply` always decays from this value, not
    /// from the (possibly already-decayed) `adjusted_score`, so repeated decay
    /// passes are idempotent regardless of how many times or at what turn
    /// they're invoked.
    pub base_score: f64,
}

/// `(pattern_name, weight_contribution)` pair recorded on a `MemoryItem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPatternContribution {
    pub pattern_name: String,
    pub weight_contribution: i32,
}

impl MemoryItem {
    /// True when this item's retention permits entity accrual (invariant #2).
    pub fn allows_entities(&self) -> bool {
        self.retention != RetentionLevel::ImmediateDiscard
    }
}

/// Closed set of entity kinds the linker recognizes.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Location,
    MedicalCondition,
    Organization,
    Event,
    Other,
}

/// A cross-turn identity accumulator.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub entity_id: String,
    pub entity_type: EntityType,
    pub canonical_name: String,
    pub aliases: BTreeSet<String>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub first_turn: u32,
    pub last_turn: u32,
    pub mention_count: u32,
    pub importance_score: f64,
}

/// A value accumulated onto an entity, with provenance of which turn produced it.
/// Values are kept per-turn rather than overwritten so conflicting attributes
/// (e.g. two different ages) are preserved (§4.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    pub value: String,
    pub turn_index: u32,
}

/// Heuristic: a single capitalized token with no spaces reads as a proper
/// noun; multi-word descriptive phrases ("my daughter") do not.
fn is_proper_noun_str(s: &str) -> bool {
    !s.contains(' ')
        && s.chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false)
}

impl Entity {
    pub fn new(entity_id: String, entity_type: EntityType, canonical_name: String, turn: u32) -> Self {
        Entity {
            entity_id,
            entity_type,
            canonical_name,
            aliases: BTreeSet::new(),
            attributes: BTreeMap::new(),
            first_turn: turn,
            last_turn: turn,
            mention_count: 0,
            importance_score: 0.0,
        }
    }

    /// Record a fresh surface form as an alias, possibly promoting it to
    /// `canonical_name`.
    ///
    /// A proper-noun surface form (e.g. "Emily") always wins over a
    /// descriptive phrase (e.g. "my daughter") even when shorter: a real name
    /// is more identifying than a kinship description. Among two
    /// non-proper-noun forms, or two proper nouns, the longer (more
    /// descriptive) one is promoted, which is what keeps `canonical_name`
    /// at least as long as every alias in the common case.
    pub fn absorb_surface_form(&mut self, surface: &str, is_proper_noun: bool) {
        let surface_norm = surface.trim();
        if surface_norm.is_empty() || surface_norm == self.canonical_name {
            return;
        }
        let canonical_is_proper = is_proper_noun_str(&self.canonical_name);
        let promote = if is_proper_noun && !canonical_is_proper {
            true
        } else if is_proper_noun == canonical_is_proper {
            surface_norm.len() > self.canonical_name.len()
        } else {
            false
        };
        if promote {
            self.aliases.insert(self.canonical_name.clone());
            self.canonical_name = surface_norm.to_string();
        } else {
            self.aliases.insert(surface_norm.to_string());
        }
    }

    pub fn touch(&mut self, turn: u32) {
        self.last_turn = self.last_turn.max(turn);
        self.first_turn = self.first_turn.min(turn);
        self.mention_count += 1;
    }

    pub fn set_attribute(&mut self, name: &str, value: &str, turn: u32) {
        self.attributes.insert(
            name.to_string(),
            AttributeValue {
                value: value.to_string(),
                turn_index: turn,
            },
        );
    }
}

/// Per-user, per-pattern weight adjustment learned from feedback (§4.7).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWeight {
    pub weight_adjustment: f64,
    pub feedback_count: u32,
}

impl Default for UserWeight {
    fn default() -> Self {
        UserWeight {
            weight_adjustment: 0.0,
            feedback_count: 0,
        }
    }
}

/// The classification categories feedback can apply to a statement.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    /// User expected LONG_TERM, the system produced something lower.
    ForgotImportant,
    /// User expected IMMEDIATE_DISCARD, the system produced something higher.
    RememberedTrivial,
    /// Retention tier was right but the category assignment was wrong.
    WrongCategory,
    /// The system's classification matched the user's expectation.
    Correct,
}

/// A single recorded feedback event, as accepted by `append_feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub user_id: String,
    pub statement: String,
    pub actual_retention: RetentionLevel,
    pub expected_retention: RetentionLevel,
    pub feedback_type: FeedbackType,
    pub timestamp: DateTime<Utc>,
}
