//! PipelineOrchestrator (C8): composes L1–L4 into `process_conversation` and
//! `feedback`, the crate's two public entry points.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::config::PipelineConfig;
use crate::contradiction;
use crate::decay;
use crate::entities::EntityLinker;
use crate::error::Result;
use crate::model::{
    Entity, FeedbackRecord, FeedbackType, MatchedPatternContribution, MemoryItem, RetentionLevel,
    TraceEntry, UserWeight, Utterance, UtteranceRef,
};
use crate::oracle::{merge_oracle_verdict, OracleTransport, SemanticOracle};
use crate::patterns::PatternRegistry;
use crate::persistence::MemoryPersistence;
use crate::scoring::{PatternScorer, ScoringResult};
use crate::weights::UserWeightStore;

/// Output of `process_conversation`: the final `MemoryItem` vector in input
/// turn order, and the entity graph accumulated while processing it.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    pub items: Vec<MemoryItem>,
    pub entities: Vec<Entity>,
}

/// Composes PatternRegistry, SemanticOracle, EntityLinker, ContradictionDetector,
/// DecayEngine and UserWeightStore into the two operations named in §2's
/// component table. Takes `&self` throughout (teacher's `Storage` convention
/// of `&self` methods backed by internal locking), so it is `Send + Sync` and
/// usable behind a plain `Arc` — conversations run concurrently without an
/// external synchronization wrapper (§5).
pub struct PipelineOrchestrator {
    registry: Arc<PatternRegistry>,
    config: PipelineConfig,
    oracle: SemanticOracle,
    weight_store: UserWeightStore,
    persistence: Arc<dyn MemoryPersistence>,
}

impl PipelineOrchestrator {
    pub fn new(
        registry: Arc<PatternRegistry>,
        config: PipelineConfig,
        transport: Box<dyn OracleTransport>,
        persistence: Arc<dyn MemoryPersistence>,
    ) -> Self {
        let oracle = SemanticOracle::new(transport, &config);
        PipelineOrchestrator {
            registry,
            config,
            oracle,
            weight_store: UserWeightStore::new(),
            persistence,
        }
    }

    /// Construct an orchestrator that never leaves the process: the default
    /// catalog, the offline mock oracle transport, and in-memory persistence.
    /// Used by the core's own tests and by callers happy to run fully
    /// offline (`l2_mock_mode`).
    pub fn offline(config: PipelineConfig) -> Result<Self> {
        let registry = Arc::new(PatternRegistry::with_default_catalog()?);
        let oracle = SemanticOracle::mock(&config);
        Ok(PipelineOrchestrator {
            registry,
            oracle,
            weight_store: UserWeightStore::new(),
            persistence: Arc::new(crate::persistence::InMemoryPersistence::new()),
            config,
        })
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn weight_store(&self) -> &UserWeightStore {
        &self.weight_store
    }

    /// Hydrate the in-process weight store from external persistence. Call
    /// once per `user_id` before processing, e.g. at conversation start.
    pub async fn load_user_weights(&self, user_id: &str) -> Result<()> {
        let loaded = self.persistence.load_user_weights(user_id).await?;
        for (pattern_name, weight) in loaded {
            self.weight_store.set(user_id, &pattern_name, weight);
        }
        Ok(())
    }

    /// Run the full pipeline over one conversation's utterances, in turn
    /// order (§4.8). Persists the resulting items and entity graph through
    /// the injected `MemoryPersistence` before returning.
    pub async fn process_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
        utterances: &[Utterance],
    ) -> Result<ProcessOutcome> {
        let user_weights: HashMap<String, UserWeight> = if self.config.enable_learning {
            self.weight_store.weights_for_user(user_id)
        } else {
            HashMap::new()
        };

        let scorer = PatternScorer::new(&self.registry, &self.config);
        let entity_linker = EntityLinker::new(&self.registry);
        let mut conversation_state = crate::entities::ConversationState::new(Some(user_id.to_string()));

        // (item, source utterance text) so the contradiction detector can
        // re-read the text that produced each prior item.
        let mut accumulated: Vec<(MemoryItem, String)> = Vec::with_capacity(utterances.len());

        for utterance in utterances {
            let l1 = scorer.score(utterance, &user_weights);
            let (mut retention, mut reasoning) = (l1.retention, build_l1_reasoning(&l1));

            let mut trace = l1.trace.clone();
            if self.config.enable_l2_oracle && self.oracle.should_gate(&utterance.text, &l1, &self.config) {
                if let Some(verdict) = self.oracle.classify(&utterance.text).await {
                    let (merged_retention, merge_note) =
                        merge_oracle_verdict(retention, l1.raw_score, &verdict);
                    retention = merged_retention;
                    reasoning = format!("{reasoning}; {merge_note}");
                    trace.push(TraceEntry::OracleAdjust {
                        delta: 0.0,
                        note: merge_note,
                    });
                }
            }

            let mut item = MemoryItem {
                utterance_ref: UtteranceRef::from(utterance),
                raw_score: l1.raw_score,
                adjusted_score: l1.adjusted_score,
                retention,
                matched_patterns: l1.matched_patterns.clone(),
                categories: l1.categories.clone(),
                entity_refs: Default::default(),
                superseded_by: None,
                reasoning,
                trace,
                base_score: l1.adjusted_score,
            };

            contradiction::detect_and_apply(&mut item, &utterance.text, &mut accumulated);

            // Re-derive retention from the (possibly contradiction-bumped)
            // adjusted_score so the LONG_TERM invariant in §8 holds even
            // after the +5 bonus pushes a borderline item over threshold.
            if item.adjusted_score >= self.config.long_term_threshold {
                item.retention = RetentionLevel::LongTerm;
            }
            // The contradiction bonus is part of the pre-decay baseline too —
            // decay must never erase it on a later pass.
            item.base_score = item.adjusted_score;

            if item.allows_entities() && self.config.enable_entities {
                let link_result =
                    entity_linker.link(&utterance.text, utterance.turn_index, &mut conversation_state);
                item.entity_refs = link_result.entities_touched.into_iter().collect();
            }

            accumulated.push((item, utterance.text.clone()));

            let mut current_items: Vec<MemoryItem> = accumulated.iter().map(|(i, _)| i.clone()).collect();
            decay::apply(&mut current_items, utterance.turn_index, &self.config);
            for (slot, refreshed) in accumulated.iter_mut().zip(current_items.into_iter()) {
                slot.0 = refreshed;
            }
        }

        let items: Vec<MemoryItem> = accumulated.into_iter().map(|(i, _)| i).collect();
        self.persistence.append_memory_items(conversation_id, &items).await?;
        if self.config.enable_entities {
            self.persistence
                .upsert_entities(user_id, &conversation_state.entities)
                .await?;
        }

        tracing::info!(
            conversation_id,
            user_id,
            turns = utterances.len(),
            items = items.len(),
            entities = conversation_state.entities.len(),
            "conversation processed"
        );

        Ok(ProcessOutcome {
            items,
            entities: conversation_state.entities,
        })
    }

    /// Apply one feedback event (§4.7) and persist both the feedback record
    /// and every pattern weight it touched.
    pub async fn feedback(
        &self,
        user_id: &str,
        statement: &str,
        actual_retention: RetentionLevel,
        expected_retention: RetentionLevel,
        feedback_type: FeedbackType,
    ) -> Result<()> {
        if !self.config.enable_learning {
            return Ok(());
        }
        let touched = self
            .weight_store
            .apply_feedback(&self.registry, user_id, statement, feedback_type);

        for pattern_name in &touched {
            let w = self.weight_store.get(user_id, pattern_name);
            self.persistence
                .save_user_weight(user_id, pattern_name, w.weight_adjustment, w.feedback_count)
                .await?;
        }

        let record = FeedbackRecord {
            user_id: user_id.to_string(),
            statement: statement.to_string(),
            actual_retention,
            expected_retention,
            feedback_type,
            timestamp: Utc::now(),
        };
        self.persistence.append_feedback(&record).await?;
        Ok(())
    }
}

/// Build the L1-only reasoning string: matched pattern names and every
/// modifier that fired. Every `MemoryItem` carries a non-empty reasoning
/// (§7), so even a no-match utterance produces one ("no patterns matched").
fn build_l1_reasoning(result: &ScoringResult) -> String {
    if result.matched_patterns.is_empty() && result.trace.is_empty() {
        return format!(
            "no patterns matched; adjusted_score={:.1} -> {}",
            result.adjusted_score, result.retention
        );
    }
    let pattern_names: Vec<String> = result
        .matched_patterns
        .iter()
        .map(|MatchedPatternContribution { pattern_name, weight_contribution }| {
            format!("{pattern_name}({weight_contribution:+})")
        })
        .collect();
    let modifiers: Vec<String> = result
        .trace
        .iter()
        .filter(|t| !matches!(t, TraceEntry::Pattern { .. }))
        .map(describe_modifier)
        .collect();
    let mut reasoning = format!(
        "matched [{}], adjusted_score={:.1} -> {}",
        pattern_names.join(", "),
        result.adjusted_score,
        result.retention
    );
    if !modifiers.is_empty() {
        reasoning.push_str(&format!("; modifiers: {}", modifiers.join(", ")));
    }
    reasoning
}

fn describe_modifier(entry: &TraceEntry) -> String {
    match entry {
        TraceEntry::Pattern { .. } => unreachable!("filtered out above"),
        TraceEntry::SeverityMod { trigger, delta } => format!("severity[{trigger}]({delta:+})"),
        TraceEntry::PermanenceMod { trigger, delta } => format!("permanence[{trigger}]({delta:+})"),
        TraceEntry::UrgencyMod { trigger, delta } => format!("urgency[{trigger}]({delta:+})"),
        TraceEntry::LengthBonus { delta } => format!("length({delta:+})"),
        TraceEntry::FirstPersonBonus { delta } => format!("first_person({delta:+})"),
        TraceEntry::NumericBonus { delta } => format!("numeric({delta:+})"),
        TraceEntry::UserWeight { name, delta } => format!("user_weight[{name}]({delta:+.1})"),
        TraceEntry::ContradictionBonus { delta } => format!("contradiction({delta:+.1})"),
        TraceEntry::OracleAdjust { delta, note } => format!("oracle({delta:+.1}: {note})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn utterance(turn: u32, speaker: &str, text: &str) -> Utterance {
        Utterance {
            turn_index: turn,
            speaker: speaker.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_conversation_yields_empty_result_no_errors() {
        let orch = PipelineOrchestrator::offline(PipelineConfig::default()).unwrap();
        let outcome = orch.process_conversation("u1", "c1", &[]).await.unwrap();
        assert!(outcome.items.is_empty());
        assert!(outcome.entities.is_empty());
    }

    #[tokio::test]
    async fn peanut_allergy_scenario_is_long_term() {
        let orch = PipelineOrchestrator::offline(PipelineConfig::default()).unwrap();
        let text = "I have a severe peanut allergy and my EpiPen expired \u{2014} it's life-threatening if we don't have one.";
        let u = vec![utterance(0, "Speaker2", text)];
        let outcome = orch.process_conversation("u1", "c1", &u).await.unwrap();
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].retention, RetentionLevel::LongTerm);
        assert!(outcome.items[0].adjusted_score >= 25.0);
        assert!(!outcome.items[0].reasoning.is_empty());
    }

    #[tokio::test]
    async fn greeting_scenario_is_immediate_discard() {
        let orch = PipelineOrchestrator::offline(PipelineConfig::default()).unwrap();
        let u = vec![utterance(0, "Speaker1", "Hello, how are you today?")];
        let outcome = orch.process_conversation("u1", "c1", &u).await.unwrap();
        assert_eq!(outcome.items[0].retention, RetentionLevel::ImmediateDiscard);
        assert!(outcome.items[0].adjusted_score <= 2.0);
        assert!(outcome.items[0].entity_refs.is_empty());
    }

    #[tokio::test]
    async fn discarded_items_never_produce_entities() {
        let orch = PipelineOrchestrator::offline(PipelineConfig::default()).unwrap();
        let u = vec![utterance(0, "Speaker1", "Hello, how are you today?")];
        let outcome = orch.process_conversation("u1", "c1", &u).await.unwrap();
        assert!(outcome.entities.is_empty());
    }

    #[tokio::test]
    async fn contradiction_scenario_supersedes_earlier_turn() {
        let orch = PipelineOrchestrator::offline(PipelineConfig::default()).unwrap();
        let u = vec![
            utterance(3, "Speaker2", "I love sushi."),
            utterance(9, "Speaker2", "I can't eat sushi anymore \u{2014} shellfish allergy."),
        ];
        let outcome = orch.process_conversation("u1", "c1", &u).await.unwrap();
        assert_eq!(outcome.items.len(), 2);
        assert!(outcome.items[0].superseded_by.is_some());
        let sup = outcome.items[0].superseded_by.as_ref().unwrap();
        assert!(sup.turn_index > outcome.items[0].utterance_ref.turn_index);
        assert_eq!(outcome.items[1].retention, RetentionLevel::LongTerm);
    }

    #[tokio::test]
    async fn pronoun_linking_scenario_produces_single_entity() {
        let orch = PipelineOrchestrator::offline(PipelineConfig::default()).unwrap();
        let u = vec![
            utterance(13, "Speaker2", "My daughter Emily just started kindergarten."),
            utterance(18, "Speaker2", "She had a nightmare last night."),
        ];
        let outcome = orch.process_conversation("u1", "c1", &u).await.unwrap();
        assert_eq!(outcome.entities.len(), 1);
        let e = &outcome.entities[0];
        assert_eq!(e.canonical_name, "Emily");
        assert!(e.aliases.contains("my daughter"));
        assert!(e.aliases.contains("she"));
        assert_eq!(e.mention_count, 2);
    }

    #[tokio::test]
    async fn borderline_emotive_scenario_upgrades_via_mock_oracle() {
        let orch = PipelineOrchestrator::offline(PipelineConfig::default()).unwrap();
        let u = vec![utterance(0, "Speaker1", "Flying absolutely terrifies me.")];
        let outcome = orch.process_conversation("u1", "c1", &u).await.unwrap();
        assert_eq!(outcome.items[0].retention, RetentionLevel::LongTerm);
        assert!(outcome.items[0].reasoning.contains("oracle"));
    }

    #[tokio::test]
    async fn feedback_increases_weight_and_is_visible_on_next_conversation() {
        let orch = PipelineOrchestrator::offline(PipelineConfig::default()).unwrap();
        orch.feedback(
            "u1",
            "I have an allergy",
            RetentionLevel::ShortTerm,
            RetentionLevel::LongTerm,
            FeedbackType::ForgotImportant,
        )
        .await
        .unwrap();
        let w = orch.weight_store().get("u1", "medical_allergy");
        assert!(w.weight_adjustment > 0.0);
    }
}
