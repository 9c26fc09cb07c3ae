//! Candidate-mention extraction: proper nouns, kinship + possessives,
//! prepositional locations, capitalized-multiword organizations, L1-matched
//! medical conditions, and pronoun references.

use regex::Regex;

use crate::model::EntityType;
use crate::patterns::PatternRegistry;

/// Type constraint a pronoun carries into resolution (§4.4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PronounConstraint {
    /// he/she/him/her: PERSON only.
    PersonOnly,
    /// they/them: PERSON or OTHER.
    PersonOrOther,
    /// it: non-PERSON.
    NonPerson,
}

/// A candidate mention found in one utterance, prior to resolution. For
/// non-pronoun candidates, `entity_type` is the type to resolve/create
/// against. For pronouns, `entity_type` is unused and `pronoun_constraint`
/// carries the real matching rule instead.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub surface: String,
    pub entity_type: EntityType,
    pub is_pronoun: bool,
    pub is_proper_noun: bool,
    pub pronoun_constraint: Option<PronounConstraint>,
    /// An attribute clue directly implied by the extraction itself (e.g. the
    /// kinship term becomes `relationship`). Adjacency-based clues elsewhere
    /// in the utterance (age, medical condition) are handled separately.
    pub attribute: Option<(String, String)>,
}

const SENTENCE_START_STOPWORDS: &[&str] = &[
    "I", "She", "He", "They", "The", "A", "An", "My", "Your", "His", "Her", "Their", "It", "We", "You",
];

#[allow(clippy::too_many_arguments)]
pub fn extract_candidates(
    text: &str,
    registry: &PatternRegistry,
    kinship_re: &Regex,
    pronoun_re: &Regex,
    location_re: &Regex,
    organization_re: &Regex,
    proper_noun_re: &Regex,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut consumed_spans: Vec<(usize, usize)> = Vec::new();

    // Kinship + possessive, optionally followed by a proper noun: "my
    // daughter Emily".
    for cap in kinship_re.captures_iter(text) {
        let whole = cap.get(0).unwrap();
        consumed_spans.push((whole.start(), whole.end()));
        let relation = cap[1].to_lowercase();
        if let Some(name) = cap.get(2) {
            consumed_spans.push((name.start(), name.end()));
            out.push(Candidate {
                surface: name.as_str().to_string(),
                entity_type: EntityType::Person,
                is_pronoun: false,
                is_proper_noun: true,
                pronoun_constraint: None,
                attribute: Some(("relationship".to_string(), relation)),
            });
        } else {
            out.push(Candidate {
                surface: format!("my {relation}"),
                entity_type: EntityType::Person,
                is_pronoun: false,
                is_proper_noun: false,
                pronoun_constraint: None,
                attribute: Some(("relationship".to_string(), relation)),
            });
        }
    }

    // Organizations: capitalized multiword phrase ending in a corporate/
    // institutional suffix.
    for cap in organization_re.captures_iter(text) {
        let m = cap.get(1).unwrap();
        consumed_spans.push((m.start(), m.end()));
        out.push(Candidate {
            surface: m.as_str().to_string(),
            entity_type: EntityType::Organization,
            is_pronoun: false,
            is_proper_noun: true,
            pronoun_constraint: None,
            attribute: None,
        });
    }

    // Locations: proper noun following a preposition.
    for cap in location_re.captures_iter(text) {
        let m = cap.get(1).unwrap();
        if overlaps(&consumed_spans, m.start(), m.end()) {
            continue;
        }
        consumed_spans.push((m.start(), m.end()));
        out.push(Candidate {
            surface: m.as_str().to_string(),
            entity_type: EntityType::Location,
            is_pronoun: false,
            is_proper_noun: true,
            pronoun_constraint: None,
            attribute: None,
        });
    }

    // Medical conditions: surface text of any L1 pattern tagged "medical".
    for m in registry.match_all(text) {
        if m.pattern.category != "medical" {
            continue;
        }
        for (start, end) in &m.spans {
            if overlaps(&consumed_spans, *start, *end) {
                continue;
            }
            if let Some(slice) = text.get(*start..*end) {
                consumed_spans.push((*start, *end));
                out.push(Candidate {
                    surface: slice.to_string(),
                    entity_type: EntityType::MedicalCondition,
                    is_pronoun: false,
                    is_proper_noun: false,
                    pronoun_constraint: None,
                    attribute: None,
                });
            }
        }
    }

    // Remaining bare proper nouns -> PERSON, unless they are common
    // sentence-starter words or already consumed by a more specific
    // recognizer above.
    for m in proper_noun_re.find_iter(text) {
        if overlaps(&consumed_spans, m.start(), m.end()) {
            continue;
        }
        if SENTENCE_START_STOPWORDS.contains(&m.as_str()) {
            continue;
        }
        out.push(Candidate {
            surface: m.as_str().to_string(),
            entity_type: EntityType::Person,
            is_pronoun: false,
            is_proper_noun: true,
            pronoun_constraint: None,
            attribute: None,
        });
    }

    // Pronouns are candidate references only, never new entities.
    for m in pronoun_re.find_iter(text) {
        let lower = m.as_str().to_lowercase();
        out.push(Candidate {
            surface: lower.clone(),
            entity_type: EntityType::Other,
            is_pronoun: true,
            is_proper_noun: false,
            pronoun_constraint: Some(pronoun_constraint(&lower)),
            attribute: None,
        });
    }

    out
}

/// The type constraint a pronoun carries into resolution (§4.4.2).
fn pronoun_constraint(pronoun: &str) -> PronounConstraint {
    match pronoun {
        "he" | "she" | "him" | "her" => PronounConstraint::PersonOnly,
        "they" | "them" => PronounConstraint::PersonOrOther,
        _ => PronounConstraint::NonPerson,
    }
}

fn overlaps(spans: &[(usize, usize)], start: usize, end: usize) -> bool {
    spans.iter().any(|(s, e)| start < *e && *s < end)
}
