//! Support crate for `retention-core`'s end-to-end test suite.
//!
//! Two small modules, mirroring the teacher's `tests/e2e` layout: `harness`
//! builds a fully-wired [`retention_core::PipelineOrchestrator`] with an
//! inspectable in-memory persistence handle, and `fixtures` supplies the
//! literal conversation inputs from the six end-to-end scenarios.

pub mod fixtures;
pub mod harness;
