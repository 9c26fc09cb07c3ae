//! DecayEngine (C6): temporal decay of short-term items. Pure function over
//! `&mut [MemoryItem]` — no I/O, no async, ignores cancellation by design (§5).

use crate::config::PipelineConfig;
use crate::model::{MemoryItem, RetentionLevel};

/// Outcome of one `apply` pass: which utterance_refs were reclassified to
/// IMMEDIATE_DISCARD and should be considered for eviction by the caller.
#[derive(Debug, Clone, Default)]
pub struct DecayReport {
    pub evicted: Vec<crate::model::UtteranceRef>,
}

/// Apply turn-based decay to every SHORT_TERM item in `items`, using
/// `current_turn` as the reference point (§4.6). LONG_TERM items are
/// untouched. Idempotent: every pass decays from `item.base_score` (the
/// score as of right after scoring + contradiction, never mutated here), so
/// calling this any number of times, at the same or a later `current_turn`,
/// always produces the same `adjusted_score` for as long as the item stays
/// SHORT_TERM.
pub fn apply(items: &mut [MemoryItem], current_turn: u32, config: &PipelineConfig) -> DecayReport {
    let mut report = DecayReport::default();
    for item in items.iter_mut() {
        if item.retention != RetentionLevel::ShortTerm {
            continue;
        }
        let turns_ago = current_turn.saturating_sub(item.utterance_ref.turn_index);
        if turns_ago <= config.decay_window_turns {
            item.adjusted_score = item.base_score;
            continue;
        }
        let decay = config.decay_rate * (turns_ago - config.decay_window_turns) as f64;
        let decayed = item.base_score - decay;
        item.adjusted_score = decayed;
        tracing::debug!(
            turn = item.utterance_ref.turn_index,
            current_turn,
            turns_ago,
            decayed_score = decayed,
            "decay applied"
        );
        if decayed < config.short_term_threshold {
            item.retention = RetentionLevel::ImmediateDiscard;
            item.reasoning = format!(
                "{} (decayed to {:.1} after {} turns, reclassified IMMEDIATE_DISCARD)",
                item.reasoning, decayed, turns_ago
            );
            report.evicted.push(item.utterance_ref.clone());
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UtteranceRef;
    use std::collections::BTreeSet;

    fn short_term_item(turn: u32, score: f64) -> MemoryItem {
        MemoryItem {
            utterance_ref: UtteranceRef {
                turn_index: turn,
                speaker: "Speaker1".into(),
            },
            raw_score: score as i32,
            adjusted_score: score,
            retention: RetentionLevel::ShortTerm,
            matched_patterns: vec![],
            categories: BTreeSet::new(),
            entity_refs: BTreeSet::new(),
            superseded_by: None,
            reasoning: "short-term test item".into(),
            trace: vec![],
            base_score: score,
        }
    }

    #[test]
    fn not_yet_decayed_at_exactly_the_window() {
        let config = PipelineConfig::default();
        let mut items = vec![short_term_item(5, 4.0)];
        apply(&mut items, 10, &config);
        assert!((items[0].adjusted_score - 4.0).abs() < 1e-9);
        assert_eq!(items[0].retention, RetentionLevel::ShortTerm);
    }

    #[test]
    fn loses_half_point_one_turn_past_window() {
        let config = PipelineConfig::default();
        let mut items = vec![short_term_item(5, 4.0)];
        apply(&mut items, 11, &config);
        assert!((items[0].adjusted_score - 3.5).abs() < 1e-9);
    }

    #[test]
    fn reclassifies_to_immediate_discard_below_short_term_threshold() {
        let config = PipelineConfig::default();
        let mut items = vec![short_term_item(3, 4.0)];
        let report = apply(&mut items, 12, &config);
        // turns_ago = 9, decay = 0.5 * (9-5) = 2.0, decayed = 2.0 < 3.0
        assert!((items[0].adjusted_score - 2.0).abs() < 1e-9);
        assert_eq!(items[0].retention, RetentionLevel::ImmediateDiscard);
        assert_eq!(report.evicted.len(), 1);
    }

    #[test]
    fn long_term_items_are_untouched() {
        let config = PipelineConfig::default();
        let mut item = short_term_item(1, 2.0);
        item.retention = RetentionLevel::LongTerm;
        let mut items = vec![item];
        apply(&mut items, 100, &config);
        assert!((items[0].adjusted_score - 2.0).abs() < 1e-9);
        assert_eq!(items[0].retention, RetentionLevel::LongTerm);
    }

    #[test]
    fn decay_is_idempotent_once_reclassified() {
        let config = PipelineConfig::default();
        let mut items = vec![short_term_item(3, 4.0)];
        apply(&mut items, 12, &config);
        let after_first = items[0].adjusted_score;
        // A second pass at the same current_turn only revisits SHORT_TERM
        // items; this one already flipped to IMMEDIATE_DISCARD, so it is
        // skipped and the score is unchanged.
        apply(&mut items, 12, &config);
        assert!((items[0].adjusted_score - after_first).abs() < 1e-9);
    }

    #[test]
    fn repeated_passes_do_not_compound_while_still_short_term() {
        let config = PipelineConfig::default();
        let mut items = vec![short_term_item(3, 10.0)];
        // turns_ago = 6, decay = 0.5 * (6-5) = 0.5, decayed = 9.5, still SHORT_TERM.
        apply(&mut items, 9, &config);
        assert!((items[0].adjusted_score - 9.5).abs() < 1e-9);
        assert_eq!(items[0].retention, RetentionLevel::ShortTerm);
        // Calling again at the same turn must not subtract a second time.
        apply(&mut items, 9, &config);
        assert!((items[0].adjusted_score - 9.5).abs() < 1e-9);
        // Nor does a later-turn call compound on top of the already-decayed
        // value rather than the original base_score.
        apply(&mut items, 12, &config);
        assert!((items[0].adjusted_score - 8.0).abs() < 1e-9, "got {}", items[0].adjusted_score);
    }
}
