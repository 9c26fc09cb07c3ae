//! Crate-wide error types.
//!
//! One `#[non_exhaustive]` enum per the teacher's `StorageError` convention:
//! typed variants, `#[error("...: {0}")]` messages, `#[from]` conversions where
//! there is a single underlying cause, and a crate-level `Result<T>` alias.

use thiserror::Error;

/// Errors surfaced by the retention pipeline.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Raised at `PatternRegistry` construction; fatal at init.
    #[error("pattern compile error: {0}")]
    PatternCompile(String),

    /// A regex in the catalog failed to compile.
    #[error("pattern regex error: {0}")]
    PatternRegex(#[from] regex::Error),

    /// A conversation-input line could not be parsed. Never fatal: the
    /// orchestrator collects these and continues.
    #[error("malformed input at line {line}: {reason}")]
    InputMalformed { line: usize, reason: String },

    /// L2 remote call exceeded its deadline. Recovered locally; the L1
    /// verdict stands.
    #[error("oracle call timed out after {0}ms")]
    OracleTimeout(u64),

    /// L2 transport-level failure (network, deserialization, non-2xx).
    /// Recovered locally; the L1 verdict stands.
    #[error("oracle transport error: {0}")]
    OracleTransport(String),

    /// The configured monthly token budget has been exhausted; the oracle
    /// disables itself for the remainder of the process.
    #[error("oracle budget exceeded ({spent}/{budget} tokens)")]
    OracleBudgetExceeded { spent: u64, budget: u64 },

    /// Surfaced to the caller; the core leaves in-memory state consistent.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Raised at startup for invalid configuration; fatal at init.
    #[error("config error: {0}")]
    Config(String),
}

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;
