//! PatternRegistry (C1): loads and compiles the pattern catalog, exposes
//! matching over free text.
//!
//! The catalog ships as an in-crate `const` table (no required external file
//! at runtime, matching the teacher's own in-crate `FSRS6_WEIGHTS` table) and
//! is also loadable/dumpable as JSON for callers that want to override it from
//! the declarative document format described in the external-interfaces spec.

mod catalog;

use std::collections::{BTreeSet, HashSet};

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::model::{Pattern, PatternMatch};

pub use catalog::default_catalog;

/// Declarative, pre-compile shape of a catalog entry — the JSON document
/// format described in the spec's external-interfaces section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSpec {
    pub name: String,
    pub regex: String,
    pub weight: i32,
    pub category: String,
    #[serde(default)]
    pub modifier_tags: Vec<String>,
}

struct CompiledPattern {
    pattern: Pattern,
    regex: regex::Regex,
}

/// Read-only, shareable catalog of compiled patterns. Build once at startup;
/// never mutated afterwards, so it can be handed out as `Arc<PatternRegistry>`
/// without interior locking.
pub struct PatternRegistry {
    compiled: Vec<CompiledPattern>,
}

impl PatternRegistry {
    /// Build a registry from declarative specs, compiling each regex
    /// case-insensitively. Rejects duplicate pattern names.
    pub fn new(specs: &[PatternSpec]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.name.clone()) {
                return Err(PipelineError::PatternCompile(format!(
                    "duplicate pattern name: {}",
                    spec.name
                )));
            }
            let regex = RegexBuilder::new(&spec.regex)
                .case_insensitive(true)
                .build()?;
            compiled.push(CompiledPattern {
                pattern: Pattern {
                    name: spec.name.clone(),
                    weight: spec.weight,
                    category: spec.category.clone(),
                    modifier_tags: spec.modifier_tags.iter().cloned().collect::<BTreeSet<_>>(),
                },
                regex,
            });
        }
        tracing::debug!(pattern_count = compiled.len(), "pattern registry compiled");
        Ok(PatternRegistry { compiled })
    }

    /// The built-in ~40-entry catalog described in the spec.
    pub fn with_default_catalog() -> Result<Self> {
        Self::new(&default_catalog())
    }

    /// Load a catalog from the JSON document format. Unknown fields are
    /// ignored by `serde`; a missing `modifier_tags` defaults to empty.
    pub fn from_json(json: &str) -> Result<Self> {
        let specs: Vec<PatternSpec> = serde_json::from_str(json)
            .map_err(|e| PipelineError::PatternCompile(format!("invalid catalog json: {e}")))?;
        Self::new(&specs)
    }

    /// Dump the registry back to the JSON document format.
    pub fn to_json(&self) -> Result<String> {
        let specs: Vec<PatternSpec> = self
            .compiled
            .iter()
            .map(|c| PatternSpec {
                name: c.pattern.name.clone(),
                regex: c.regex.as_str().to_string(),
                weight: c.pattern.weight,
                category: c.pattern.category.clone(),
                modifier_tags: c.pattern.modifier_tags.iter().cloned().collect(),
            })
            .collect();
        serde_json::to_string_pretty(&specs)
            .map_err(|e| PipelineError::PatternCompile(format!("serialize failed: {e}")))
    }

    /// Every pattern in the registry that matches `text`, with its match
    /// spans. No ordering guarantee other than registry order.
    pub fn match_all(&self, text: &str) -> Vec<PatternMatch> {
        let mut out = Vec::new();
        for c in &self.compiled {
            let spans: Vec<(usize, usize)> = c
                .regex
                .find_iter(text)
                .map(|m| (m.start(), m.end()))
                .collect();
            if !spans.is_empty() {
                out.push(PatternMatch {
                    pattern: c.pattern.clone(),
                    spans,
                });
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
