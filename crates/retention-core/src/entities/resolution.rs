//! Coreference resolution: matching non-pronoun candidates against existing
//! entities, and resolving pronouns to a recent antecedent.

use crate::model::EntityType;

use super::extraction::PronounConstraint;
use super::{Candidate, ConversationState};

/// Resolve a non-pronoun candidate against existing entities of the same
/// type (§4.4.1): canonical-name equality, substring inclusion either way,
/// or alias equality (all case-insensitive). Ties broken by recency
/// (highest `last_turn`), then by longer `canonical_name`.
pub fn resolve_non_pronoun(state: &ConversationState, candidate: &Candidate) -> Option<String> {
    let surface_lower = candidate.surface.to_lowercase();
    let mut best: Option<(&str, u32, usize)> = None;

    for entity in &state.entities {
        if entity.entity_type != candidate.entity_type {
            continue;
        }
        let canonical_lower = entity.canonical_name.to_lowercase();
        let matches = canonical_lower == surface_lower
            || canonical_lower.contains(&surface_lower)
            || surface_lower.contains(&canonical_lower)
            || entity
                .aliases
                .iter()
                .any(|a| a.to_lowercase() == surface_lower);
        if !matches {
            continue;
        }
        let candidate_tuple = (entity.entity_id.as_str(), entity.last_turn, entity.canonical_name.len());
        best = Some(match best {
            None => candidate_tuple,
            Some(current) => pick_more_recent(current, candidate_tuple),
        });
    }

    best.map(|(id, ..)| id.to_string())
}

fn pick_more_recent<'a>(a: (&'a str, u32, usize), b: (&'a str, u32, usize)) -> (&'a str, u32, usize) {
    if b.1 > a.1 {
        b
    } else if b.1 == a.1 && b.2 > a.2 {
        b
    } else {
        a
    }
}

/// Resolve a pronoun to the most recent matching entity among the
/// `window` most-recently-touched entities of a compatible type (see
/// DESIGN.md for why this is a count-based window rather than a turn-index
/// cutoff). Returns `None` (pronoun discarded) when nothing qualifies.
pub fn resolve_pronoun(state: &ConversationState, candidate: &Candidate, window: usize) -> Option<String> {
    let constraint = match candidate.pronoun_constraint {
        Some(c) => c,
        None => return None,
    };
    let mut ranked: Vec<&crate::model::Entity> = state
        .entities
        .iter()
        .filter(|e| pronoun_type_compatible(constraint, e.entity_type))
        .collect();
    ranked.sort_by(|a, b| b.last_turn.cmp(&a.last_turn).then(b.canonical_name.len().cmp(&a.canonical_name.len())));
    ranked.truncate(window.max(1));
    ranked.first().map(|e| e.entity_id.clone())
}

/// `PersonOnly` covers he/she/him/her; `PersonOrOther` covers they/them;
/// `NonPerson` covers it.
fn pronoun_type_compatible(constraint: PronounConstraint, candidate: EntityType) -> bool {
    match constraint {
        PronounConstraint::PersonOnly => candidate == EntityType::Person,
        PronounConstraint::PersonOrOther => matches!(candidate, EntityType::Person | EntityType::Other),
        PronounConstraint::NonPerson => candidate != EntityType::Person,
    }
}
