//! PatternScorer (C2): additive scoring, modifiers, and the retention decision.

use std::collections::BTreeSet;

use crate::config::PipelineConfig;
use crate::model::{
    MatchedPatternContribution, PatternMatch, RetentionLevel, TraceEntry, UserWeight, Utterance,
};
use crate::patterns::PatternRegistry;

/// First-person singular indicators consulted by the first-person bonus (§4.2.5).
const FIRST_PERSON_TOKENS: &[&str] = &["i", "i'm", "i've", "i'll", "i'd", "me", "my", "mine", "myself"];

/// Everything `PatternScorer::score` produces for one utterance.
#[derive(Debug, Clone)]
pub struct ScoringResult {
    pub raw_score: i32,
    pub adjusted_score: f64,
    pub retention: RetentionLevel,
    pub trace: Vec<TraceEntry>,
    pub categories: BTreeSet<String>,
    pub matched_patterns: Vec<MatchedPatternContribution>,
    pub matches: Vec<PatternMatch>,
    /// True when `adjusted_score` falls in the configured borderline band —
    /// the first of L2's two gating conditions (§4.3).
    pub is_borderline: bool,
}

impl ScoringResult {
    /// True if any matched pattern belongs to the given category.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// Deterministic, explainable additive scoring engine (C2).
pub struct PatternScorer<'a> {
    registry: &'a PatternRegistry,
    config: &'a PipelineConfig,
}

impl<'a> PatternScorer<'a> {
    pub fn new(registry: &'a PatternRegistry, config: &'a PipelineConfig) -> Self {
        PatternScorer { registry, config }
    }

    /// Score one utterance against the catalog, applying modifiers and the
    /// supplied per-user weight adjustments, and derive a retention verdict.
    pub fn score(
        &self,
        utterance: &Utterance,
        user_weights: &std::collections::HashMap<String, UserWeight>,
    ) -> ScoringResult {
        let text = &utterance.text;
        let matches = self.registry.match_all(text);

        let mut raw_score: i32 = 0;
        let mut trace = Vec::new();
        let mut categories = BTreeSet::new();
        let mut matched_patterns = Vec::new();
        let mut has_positive_match = false;
        let mut has_severity_amplifiable = false;

        for m in &matches {
            raw_score += m.pattern.weight;
            if m.pattern.weight > 0 {
                has_positive_match = true;
            }
            if m.pattern.modifier_tags.contains("severity_amplifiable") {
                has_severity_amplifiable = true;
            }
            categories.insert(m.pattern.category.clone());
            matched_patterns.push(MatchedPatternContribution {
                pattern_name: m.pattern.name.clone(),
                weight_contribution: m.pattern.weight,
            });
            trace.push(TraceEntry::Pattern {
                name: m.pattern.name.clone(),
                delta: m.pattern.weight,
            });
        }

        let mut adjusted = raw_score as f64;
        let lower = text.to_lowercase();

        // 1. Severity modifiers: +5 per distinct trigger, cumulative.
        if has_severity_amplifiable {
            for token in &self.config.severity_tokens {
                if contains_token(&lower, token) {
                    adjusted += 5.0;
                    trace.push(TraceEntry::SeverityMod {
                        trigger: token.clone(),
                        delta: 5,
                    });
                }
            }
        }

        // 2. Permanence modifiers: +3 flat, not cumulative (unlike severity,
        // the spec does not say "each" here) — fires once on the first
        // matching trigger, requires a positive-weight match.
        if has_positive_match {
            if let Some(token) = self
                .config
                .permanence_tokens
                .iter()
                .find(|t| contains_token(&lower, t))
            {
                adjusted += 3.0;
                trace.push(TraceEntry::PermanenceMod {
                    trigger: token.clone(),
                    delta: 3,
                });
            }
        }

        // 3. Urgency modifiers: +4 flat, not cumulative, requires a
        // positive-weight match.
        if has_positive_match {
            if let Some(token) = self
                .config
                .urgency_tokens
                .iter()
                .find(|t| contains_token(&lower, t))
            {
                adjusted += 4.0;
                trace.push(TraceEntry::UrgencyMod {
                    trigger: token.clone(),
                    delta: 4,
                });
            }
        }

        // 4. Length/complexity bonus: independent of matches.
        let token_count = text.split_whitespace().count();
        if token_count >= 24 {
            adjusted += 2.0;
            trace.push(TraceEntry::LengthBonus { delta: 2 });
        } else if token_count >= 12 {
            adjusted += 1.0;
            trace.push(TraceEntry::LengthBonus { delta: 1 });
        }

        // 5. First-person bonus: requires >=1 positive match.
        if has_positive_match && contains_first_person(&lower) {
            adjusted += 1.0;
            trace.push(TraceEntry::FirstPersonBonus { delta: 1 });
        }

        // 6. Numeric/date content: requires >=1 positive match.
        if has_positive_match && contains_digit_sequence(text) {
            adjusted += 1.0;
            trace.push(TraceEntry::NumericBonus { delta: 1 });
        }

        // 7. User weight adjustment, rounded to nearest 0.1 overall.
        for m in &matches {
            let adj = user_weights
                .get(&m.pattern.name)
                .map(|w| w.weight_adjustment)
                .unwrap_or(0.0);
            if adj != 0.0 {
                adjusted += adj;
                trace.push(TraceEntry::UserWeight {
                    name: m.pattern.name.clone(),
                    delta: adj,
                });
            }
        }
        adjusted = round_to_tenth(adjusted);

        let is_borderline = adjusted >= self.config.borderline_low && adjusted <= self.config.borderline_high;
        let retention = if adjusted >= self.config.long_term_threshold {
            RetentionLevel::LongTerm
        } else if is_borderline {
            // Default when L2 is disabled: SHORT_TERM (§4.2).
            RetentionLevel::ShortTerm
        } else if adjusted >= self.config.short_term_threshold {
            RetentionLevel::ShortTerm
        } else {
            RetentionLevel::ImmediateDiscard
        };

        tracing::debug!(
            turn = utterance.turn_index,
            raw_score,
            adjusted_score = adjusted,
            retention = %retention,
            matches = matches.len(),
            "utterance scored"
        );

        ScoringResult {
            raw_score,
            adjusted_score: adjusted,
            retention,
            trace,
            categories,
            matched_patterns,
            matches,
            is_borderline,
        }
    }
}

fn contains_token(lower_text: &str, token: &str) -> bool {
    let token = token.to_lowercase();
    if token.contains(' ') || token.contains('-') {
        return lower_text.contains(&token);
    }
    lower_text
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|w| w == token)
}

fn contains_first_person(lower_text: &str) -> bool {
    FIRST_PERSON_TOKENS.iter().any(|t| contains_token(lower_text, t))
}

fn contains_digit_sequence(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// Round to the nearest tenth, as required for the user-weight step (§4.2.7).
pub fn round_to_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
