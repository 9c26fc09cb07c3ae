//! SemanticOracle (L2, C3): gated fallback to a remote semantic classifier,
//! with normalized-text caching and a monthly token budget.
//!
//! The remote call is modeled behind an object-safe `OracleTransport` trait so
//! the crate's default production transport (a thin `reqwest`-based JSON
//! client, see `transport::HttpTransport`, feature `oracle-http`) and its
//! mock/offline transport share one seam — the same shape the teacher uses
//! for its embedding backends behind a feature-gated implementation.

mod transport;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use lru::LruCache;
use sha2::{Digest, Sha256};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::model::RetentionLevel;
use crate::scoring::ScoringResult;

pub use transport::{MockTransport, OracleTransport};
#[cfg(feature = "oracle-http")]
pub use transport::HttpTransport;

/// The structured verdict a remote classifier returns for one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleVerdict {
    pub retention: RetentionLevel,
    pub importance_0_to_30: f64,
    pub categories: BTreeSet<String>,
    pub reasoning: String,
}

/// Gated fallback to a remote semantic classifier, with caching and cost
/// control (C3).
pub struct SemanticOracle {
    transport: Box<dyn OracleTransport>,
    cache: Mutex<LruCache<String, OracleVerdict>>,
    tokens_spent: AtomicU64,
    monthly_budget: u64,
    budget_exhausted: std::sync::atomic::AtomicBool,
    timeout: Duration,
}

impl SemanticOracle {
    pub fn new(transport: Box<dyn OracleTransport>, config: &PipelineConfig) -> Self {
        let cap = std::num::NonZeroUsize::new(config.l2_cache_max_entries.max(1)).unwrap();
        SemanticOracle {
            transport,
            cache: Mutex::new(LruCache::new(cap)),
            tokens_spent: AtomicU64::new(0),
            monthly_budget: config.l2_monthly_token_budget,
            budget_exhausted: std::sync::atomic::AtomicBool::new(false),
            timeout: Duration::from_millis(config.l2_timeout_ms),
        }
    }

    /// Construct an oracle running entirely offline against the deterministic
    /// mock transport, using the configured emotive lexicon.
    pub fn mock(config: &PipelineConfig) -> Self {
        Self::new(Box::new(MockTransport::new(config.emotive_lexicon.clone())), config)
    }

    /// Gating per §4.3: fires iff the L1 result is borderline, or an emotive
    /// token is present without a strong (category `medical`) match.
    pub fn should_gate(&self, text: &str, l1: &ScoringResult, config: &PipelineConfig) -> bool {
        if l1.is_borderline {
            return true;
        }
        let lower = text.to_lowercase();
        let has_emotive = config
            .emotive_lexicon
            .iter()
            .any(|tok| lower.split_whitespace().any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()) == *tok));
        has_emotive && !l1.has_category("medical")
    }

    /// Run the gated remote classification, consulting the cache first.
    /// Returns `None` on any recoverable failure (timeout, transport error,
    /// exhausted budget) — the pipeline falls back to the L1 verdict.
    pub async fn classify(&self, text: &str) -> Option<OracleVerdict> {
        let key = cache_key(text);
        if let Some(hit) = self.cache.lock().unwrap().get(&key).cloned() {
            tracing::debug!(%key, "oracle cache hit");
            return Some(hit);
        }

        if self.budget_exhausted.load(Ordering::Relaxed) {
            tracing::warn!("oracle budget already exhausted, skipping call");
            return None;
        }

        let call = self.transport.classify(text);
        let verdict = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(v)) => v,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "oracle transport error");
                return None;
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "oracle call timed out");
                return None;
            }
        };

        if let Err(e) = self.charge_budget(estimate_tokens(text)) {
            tracing::warn!(error = %e, "oracle budget exceeded, disabling for remainder of process");
            self.budget_exhausted.store(true, Ordering::Relaxed);
            return None;
        }

        self.cache.lock().unwrap().put(key, verdict.clone());
        Some(verdict)
    }

    fn charge_budget(&self, tokens: u64) -> Result<()> {
        if self.monthly_budget == 0 {
            return Ok(());
        }
        let spent = self.tokens_spent.fetch_add(tokens, Ordering::Relaxed) + tokens;
        if spent > self.monthly_budget {
            return Err(PipelineError::OracleBudgetExceeded {
                spent,
                budget: self.monthly_budget,
            });
        }
        Ok(())
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}

/// Cache key per §4.3: SHA-256 of normalized (lowercased, whitespace-collapsed)
/// text. Deliberately user-agnostic: the oracle is not personalized.
fn cache_key(text: &str) -> String {
    let normalized = text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn estimate_tokens(text: &str) -> u64 {
    (text.split_whitespace().count() as u64).max(1)
}

/// Merge policy (§4.3): upgrade to LONG_TERM on importance > 15; downgrade to
/// IMMEDIATE_DISCARD when the oracle says so and L1's raw score was weak;
/// otherwise the L1 verdict stands. Returns the merged retention plus a
/// reasoning fragment describing what happened.
pub fn merge_oracle_verdict(
    l1_retention: RetentionLevel,
    l1_raw_score: i32,
    verdict: &OracleVerdict,
) -> (RetentionLevel, String) {
    if verdict.importance_0_to_30 > 15.0 {
        return (
            RetentionLevel::LongTerm,
            format!(
                "oracle upgraded to LONG_TERM (importance={:.1}): {}",
                verdict.importance_0_to_30, verdict.reasoning
            ),
        );
    }
    if verdict.retention == RetentionLevel::ImmediateDiscard && l1_raw_score < 8 {
        return (
            RetentionLevel::ImmediateDiscard,
            format!("oracle downgraded to IMMEDIATE_DISCARD: {}", verdict.reasoning),
        );
    }
    (
        l1_retention,
        format!("oracle consulted, L1 verdict stands: {}", verdict.reasoning),
    )
}
