//! ContradictionDetector (C5): flags and supersedes earlier conflicting
//! items. Pure function over `&mut [MemoryItem]` — no I/O, no async.

use crate::model::{MemoryItem, TraceEntry};

const NEGATION_TOKENS: &[&str] = &["not", "no longer", "can't", "cannot", "won't", "doesn't", "isn't"];

/// Stopwords excluded when looking for a shared "salient noun" between two
/// utterances' texts.
const STOPWORDS: &[&str] = &[
    "i", "a", "an", "the", "is", "are", "was", "were", "my", "me", "it", "and", "or", "to", "of",
    "in", "on", "for", "have", "has", "had", "that", "this", "anymore", "we", "don't",
];

/// Compare `new_item` (with its source text) against every prior retained
/// item for the same user and, on contradiction, bump the new item's score
/// and mark the older item as superseded. Both items are kept (§4.5).
pub fn detect_and_apply(
    new_item: &mut MemoryItem,
    new_text: &str,
    prior: &mut [(MemoryItem, String)],
) {
    if new_item.retention == crate::model::RetentionLevel::ImmediateDiscard {
        return;
    }
    for (older, older_text) in prior.iter_mut() {
        if older.retention == crate::model::RetentionLevel::ImmediateDiscard {
            continue;
        }
        if older.utterance_ref.turn_index >= new_item.utterance_ref.turn_index {
            continue;
        }
        if !shares_contradiction_category(&older.categories, &new_item.categories) {
            continue;
        }
        let older_negates = has_negation(older_text);
        let new_negates = has_negation(new_text);
        if older_negates == new_negates {
            continue;
        }
        if !shares_salient_noun(older_text, new_text) {
            continue;
        }

        new_item.adjusted_score += 5.0;
        new_item.trace.push(TraceEntry::ContradictionBonus { delta: 5.0 });
        new_item.reasoning = format!(
            "{} contradiction bonus +5 applied (supersedes turn {})",
            new_item.reasoning, older.utterance_ref.turn_index
        );
        older.superseded_by = Some(new_item.utterance_ref.clone());
        tracing::info!(
            older_turn = older.utterance_ref.turn_index,
            newer_turn = new_item.utterance_ref.turn_index,
            "contradiction detected"
        );
    }
}

fn shares_contradiction_category(a: &std::collections::BTreeSet<String>, b: &std::collections::BTreeSet<String>) -> bool {
    const CONTRADICTION_CATEGORIES: &[&str] = &["preference", "fact"];
    CONTRADICTION_CATEGORIES
        .iter()
        .any(|c| a.contains(*c) && b.contains(*c))
        || a.intersection(b).next().is_some()
}

fn has_negation(text: &str) -> bool {
    let lower = text.to_lowercase();
    NEGATION_TOKENS.iter().any(|t| lower.contains(t))
}

fn shares_salient_noun(a: &str, b: &str) -> bool {
    let words_a = salient_words(a);
    let words_b = salient_words(b);
    words_a.iter().any(|w| words_b.contains(w))
}

fn salient_words(text: &str) -> std::collections::HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3 && !STOPWORDS.contains(w))
        .map(|w| w.to_string())
        .collect()
}
