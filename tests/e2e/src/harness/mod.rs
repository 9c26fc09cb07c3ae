//! Builds a fully-wired orchestrator for end-to-end tests, keeping the
//! concrete [`InMemoryPersistence`] handle alongside it so a test can assert
//! on what actually reached the persistence boundary — not just on the
//! `ProcessOutcome` returned from `process_conversation`.
//!
//! `PipelineOrchestrator::offline` (used by the core crate's own inline
//! tests) builds and discards its own persistence handle; this harness calls
//! `PipelineOrchestrator::new` directly so the e2e suite can inspect it.

use std::sync::Arc;

use retention_core::oracle::MockTransport;
use retention_core::{InMemoryPersistence, PatternRegistry, PipelineConfig, PipelineOrchestrator};

/// An orchestrator plus the persistence handle it was built with.
pub struct Harness {
    pub orchestrator: PipelineOrchestrator,
    pub persistence: Arc<InMemoryPersistence>,
}

/// Build a harness over the default pattern catalog, the deterministic mock
/// oracle transport, and a fresh in-memory persistence store.
pub fn build(config: PipelineConfig) -> Harness {
    let registry = Arc::new(
        PatternRegistry::with_default_catalog().expect("default catalog compiles"),
    );
    let transport = Box::new(MockTransport::new(config.emotive_lexicon.clone()));
    let persistence = Arc::new(InMemoryPersistence::new());
    let orchestrator = PipelineOrchestrator::new(registry, config, transport, persistence.clone());
    Harness {
        orchestrator,
        persistence,
    }
}

/// Convenience: a harness over `PipelineConfig::default()`.
pub fn build_default() -> Harness {
    build(PipelineConfig::default())
}
