//! Literal conversation fixtures for the six end-to-end scenarios in the
//! spec's testable-properties section, plus the small `Utterance`-builder
//! helper they're assembled from.

use chrono::Utc;
use retention_core::Utterance;

/// Build one `Utterance` at a given turn, with the timestamp pinned to the
/// moment the fixture is constructed (decay and ordering only ever key off
/// `turn_index`, never off wall-clock time — see `decay` module docs).
pub fn turn(turn_index: u32, speaker: &str, text: &str) -> Utterance {
    Utterance {
        turn_index,
        speaker: speaker.to_string(),
        text: text.to_string(),
        timestamp: Utc::now(),
    }
}

/// Scenario 1: peanut allergy emergency.
pub fn peanut_allergy_emergency() -> Vec<Utterance> {
    vec![turn(
        0,
        "Speaker2",
        "I have a severe peanut allergy and my EpiPen expired \u{2014} it's life-threatening if we don't have one.",
    )]
}

/// Scenario 2: greeting.
pub fn greeting() -> Vec<Utterance> {
    vec![turn(0, "Speaker1", "Hello, how are you today?")]
}

/// Scenario 3: contradiction across turns 4 and 10.
pub fn sushi_contradiction() -> Vec<Utterance> {
    vec![
        turn(4, "Speaker2", "I love sushi."),
        turn(10, "Speaker2", "I can't eat sushi anymore \u{2014} shellfish allergy."),
    ]
}

/// Scenario 4: pronoun linking across turns 13 and 18.
pub fn daughter_pronoun_linking() -> Vec<Utterance> {
    vec![
        turn(13, "Speaker2", "My daughter Emily just started kindergarten."),
        turn(18, "Speaker2", "She had a nightmare last night."),
    ]
}

/// Scenario 5: borderline utterance that only clears LONG_TERM via the
/// mock L2 oracle.
pub fn flying_terrifies_me() -> Vec<Utterance> {
    vec![turn(0, "Speaker1", "Flying absolutely terrifies me.")]
}
