//! # retention-core
//!
//! Deterministic retention classification and memory management for
//! multi-turn dialogue.
//!
//! Utterances flow turn-by-turn through four cooperating layers:
//!
//! - **L1 — [`PatternScorer`]** (`scoring`): a deterministic, explainable
//!   additive scoring engine over a [`patterns`] catalog, with severity,
//!   permanence, urgency, length, first-person and numeric-content
//!   modifiers, plus per-user weight adjustment.
//! - **L2 — [`SemanticOracle`]** (`oracle`): a selective, cached fallback to
//!   a remote semantic classifier for borderline or emotive utterances, with
//!   cost control via a monthly token budget.
//! - **L3 — [`EntityLinker`]** (`entities`): cross-turn entity extraction,
//!   pronoun resolution and attribute accumulation.
//! - **L4 — [`UserWeightStore`]** (`weights`): online per-user pattern-weight
//!   adaptation from feedback.
//!
//! [`ContradictionDetector`](contradiction) and [`DecayEngine`](decay) sit
//! between L1/L2 and L3: contradiction detection flags and supersedes
//! earlier conflicting items, and turn-based decay reclassifies stale
//! SHORT_TERM items. [`PipelineOrchestrator`] (`orchestrator`) composes all
//! of the above behind two entry points: `process_conversation` and
//! `feedback`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use retention_core::{PipelineConfig, PipelineOrchestrator};
//! use retention_core::parsing::parse_conversation;
//!
//! # async fn run() -> retention_core::Result<()> {
//! let orchestrator = PipelineOrchestrator::offline(PipelineConfig::default())?;
//! let transcript = "Speaker1: Hello, how are you today?\n\
//!                    Speaker2: I have a severe peanut allergy and my EpiPen expired.";
//! let parsed = parse_conversation(transcript);
//! let outcome = orchestrator
//!     .process_conversation("user-1", "conversation-1", &parsed.utterances)
//!     .await?;
//! for item in &outcome.items {
//!     println!("{:?}: {} ({})", item.utterance_ref, item.retention, item.reasoning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! - `oracle-http` (default): enables [`oracle::HttpTransport`], a
//!   `reqwest`-backed production transport for the semantic oracle. Disable
//!   to depend only on the offline mock transport.

#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod contradiction;
pub mod decay;
pub mod entities;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod oracle;
pub mod parsing;
pub mod patterns;
pub mod persistence;
pub mod scoring;
pub mod weights;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use model::{
    AttributeValue, Entity, EntityType, FeedbackRecord, FeedbackType, MatchedPatternContribution,
    MemoryItem, Pattern, PatternMatch, RetentionLevel, TraceEntry, UserWeight, Utterance,
    UtteranceRef,
};

pub use contradiction::detect_and_apply as detect_contradictions;
pub use decay::{apply as apply_decay, DecayReport};
pub use entities::{ConversationState, EntityLinker, LinkResult};
pub use oracle::{OracleTransport, OracleVerdict, SemanticOracle};
pub use orchestrator::{PipelineOrchestrator, ProcessOutcome};
pub use parsing::{parse_conversation, ParseResult, SkippedLine};
pub use patterns::{PatternRegistry, PatternSpec};
pub use persistence::{InMemoryPersistence, MemoryPersistence};
pub use scoring::{PatternScorer, ScoringResult};
pub use weights::UserWeightStore;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generate a fresh conversation id (teacher's convention throughout, e.g.
/// `KnowledgeEdge::new`, is a `uuid::Uuid` v4). Unlike `entity_id` — which
/// must stay deterministic across conversations for the same user (§3) and
/// so is derived rather than randomly generated (see DESIGN.md) —
/// conversation ids have no such constraint.
pub fn new_conversation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::{
        Entity, EntityType, FeedbackType, MemoryItem, PipelineConfig, PipelineError,
        PipelineOrchestrator, ProcessOutcome, Result, RetentionLevel, Utterance,
    };
    pub use crate::parsing::parse_conversation;
}
