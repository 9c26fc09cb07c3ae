//! UserWeightStore (L4, C7): per-user, per-pattern weight adjustment learned
//! from explicit feedback.
//!
//! The default in-memory implementation guards one `HashMap` behind a
//! `Mutex`, the same coarse-locking choice the teacher makes for its
//! `Storage` connections (`Mutex<Connection>`) rather than fine-grained
//! sharding — adequate for the per-row contention this system sees, and it
//! gives the atomic read-modify-write §5 requires on `weight_adjustment` for
//! free (the lock is held across the whole read-modify-write).

use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::{FeedbackType, UserWeight};
use crate::patterns::PatternRegistry;

const WEIGHT_CLAMP_MIN: f64 = -10.0;
const WEIGHT_CLAMP_MAX: f64 = 10.0;

/// In-memory `(user_id, pattern_name) -> UserWeight` table (C7).
pub struct UserWeightStore {
    rows: Mutex<HashMap<(String, String), UserWeight>>,
}

impl Default for UserWeightStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserWeightStore {
    pub fn new() -> Self {
        UserWeightStore {
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of every weight adjustment for `user_id`, keyed by pattern
    /// name, as consumed by `PatternScorer::score`. A user with no feedback
    /// has all-zero adjustments (an empty map, which `score` treats as
    /// default-0 per pattern).
    pub fn weights_for_user(&self, user_id: &str) -> HashMap<String, UserWeight> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|((uid, _), _)| uid == user_id)
            .map(|((_, pattern), w)| (pattern.clone(), *w))
            .collect()
    }

    /// Apply one feedback event (§4.7). Locates the patterns that matched
    /// `statement` via the registry (scoring-free — no `PatternScorer`
    /// instance needed, matched patterns are all this rule consults) and
    /// adjusts each one's weight per `feedback_type`. `wrong_category` and
    /// `correct` do not change `weight_adjustment`; every matched pattern
    /// still gets `feedback_count` incremented.
    pub fn apply_feedback(
        &self,
        registry: &PatternRegistry,
        user_id: &str,
        statement: &str,
        feedback_type: FeedbackType,
    ) -> Vec<String> {
        let delta = match feedback_type {
            FeedbackType::ForgotImportant => 2.0,
            FeedbackType::RememberedTrivial => -2.0,
            FeedbackType::WrongCategory | FeedbackType::Correct => 0.0,
        };

        let matched: Vec<String> = registry
            .match_all(statement)
            .into_iter()
            .map(|m| m.pattern.name)
            .collect();

        let mut rows = self.rows.lock().unwrap();
        for pattern_name in &matched {
            let key = (user_id.to_string(), pattern_name.clone());
            let row = rows.entry(key).or_default();
            row.weight_adjustment = (row.weight_adjustment + delta).clamp(WEIGHT_CLAMP_MIN, WEIGHT_CLAMP_MAX);
            row.feedback_count += 1;
        }
        tracing::info!(
            user_id,
            ?feedback_type,
            matched_count = matched.len(),
            "feedback applied"
        );
        matched
    }

    /// Seed or overwrite one row directly (used when restoring from external
    /// persistence via `load_user_weights`).
    pub fn set(&self, user_id: &str, pattern_name: &str, weight: UserWeight) {
        self.rows
            .lock()
            .unwrap()
            .insert((user_id.to_string(), pattern_name.to_string()), weight);
    }

    pub fn get(&self, user_id: &str, pattern_name: &str) -> UserWeight {
        self.rows
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), pattern_name.to_string()))
            .copied()
            .unwrap_or_default()
    }
}
