//! Pipeline configuration.
//!
//! One small, `Clone` config struct carrying every option enumerated in the
//! spec's configuration table, following the teacher's convention of passing
//! small config structs by value into constructors (its `WatcherConfig`,
//! `DreamConfig`, `CompressionConfig`).

/// Tunables for the retention pipeline. Construct with [`PipelineConfig::default`]
/// and override individual fields, or use the `with_*` builder methods.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Gate calls to the semantic oracle (L2) on or off.
    pub enable_l2_oracle: bool,
    /// Return deterministic verdicts from the oracle without a remote call.
    pub l2_mock_mode: bool,
    /// Per-call oracle timeout.
    pub l2_timeout_ms: u64,
    /// LRU bound on the oracle cache.
    pub l2_cache_max_entries: usize,
    /// Monthly oracle token budget; 0 disables budget enforcement.
    pub l2_monthly_token_budget: u64,
    /// Toggle entity linking (C4).
    pub enable_entities: bool,
    /// Toggle per-user weight reads/writes (C7).
    pub enable_learning: bool,
    /// Grace period (in turns) before decay starts.
    pub decay_window_turns: u32,
    /// Score lost per turn past the decay window.
    pub decay_rate: f64,
    /// Adjusted-score threshold at/above which retention is LONG_TERM.
    pub long_term_threshold: f64,
    /// Lower bound of the borderline range handed to L2.
    pub borderline_low: f64,
    /// Upper bound (inclusive) of the borderline range handed to L2.
    pub borderline_high: f64,
    /// Adjusted-score threshold at/above which retention is SHORT_TERM.
    pub short_term_threshold: f64,
    /// Literal tokens that trigger the severity modifier when paired with a
    /// `severity_amplifiable` match.
    pub severity_tokens: Vec<String>,
    /// Literal tokens that trigger the permanence modifier.
    pub permanence_tokens: Vec<String>,
    /// Literal tokens that trigger the urgency modifier.
    pub urgency_tokens: Vec<String>,
    /// Tokens whose presence gates L2 even outside the borderline range.
    pub emotive_lexicon: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            enable_l2_oracle: true,
            l2_mock_mode: true,
            l2_timeout_ms: 2_000,
            l2_cache_max_entries: 10_000,
            l2_monthly_token_budget: 0,
            enable_entities: true,
            enable_learning: true,
            decay_window_turns: 5,
            decay_rate: 0.5,
            long_term_threshold: 15.0,
            borderline_low: 10.0,
            borderline_high: 14.0,
            short_term_threshold: 3.0,
            severity_tokens: [
                "severe",
                "severely",
                "life-threatening",
                "critical",
                "emergency",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            permanence_tokens: ["always", "never", "every", "forever"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            urgency_tokens: ["now", "today", "immediately", "right now"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            emotive_lexicon: [
                "terrifies",
                "terrified",
                "devastated",
                "thrilled",
                "scared",
                "panic",
                "panicking",
                "heartbroken",
                "ecstatic",
                "dread",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl PipelineConfig {
    pub fn with_l2_oracle(mut self, enabled: bool) -> Self {
        self.enable_l2_oracle = enabled;
        self
    }

    pub fn with_l2_mock_mode(mut self, mock: bool) -> Self {
        self.l2_mock_mode = mock;
        self
    }

    pub fn with_entities(mut self, enabled: bool) -> Self {
        self.enable_entities = enabled;
        self
    }

    pub fn with_learning(mut self, enabled: bool) -> Self {
        self.enable_learning = enabled;
        self
    }

    pub fn with_decay_window_turns(mut self, turns: u32) -> Self {
        self.decay_window_turns = turns;
        self
    }
}
