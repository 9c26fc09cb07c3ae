//! Persistence interface (§6): the five operations the core consumes but
//! does not implement. CLI wrappers, HTTP transport, database migrations and
//! the concrete SQL schema are out of scope (§1) and live in an external
//! collaborator; this crate owns only the trait and an in-memory
//! implementation sufficient for its own tests, matching the teacher's
//! pattern of an object-safe async trait at the storage seam
//! (`OracleTransport`, `EmbeddingService`-style backends).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Entity, FeedbackRecord, MemoryItem, UserWeight};

/// The five persistence operations named in §6, as one object-safe trait.
#[async_trait]
pub trait MemoryPersistence: Send + Sync {
    async fn load_user_weights(&self, user_id: &str) -> Result<HashMap<String, UserWeight>>;

    async fn save_user_weight(
        &self,
        user_id: &str,
        pattern_name: &str,
        adjustment: f64,
        feedback_count: u32,
    ) -> Result<()>;

    async fn append_memory_items(&self, conversation_id: &str, items: &[MemoryItem]) -> Result<()>;

    async fn upsert_entities(&self, user_id: &str, entities: &[Entity]) -> Result<()>;

    async fn append_feedback(&self, record: &FeedbackRecord) -> Result<()>;
}

/// Reference in-memory implementation. Sufficient for the core's own test
/// suite and for callers who don't need durability (§6: "the core must
/// function with an in-memory implementation of this interface").
#[derive(Default)]
pub struct InMemoryPersistence {
    weights: Mutex<HashMap<(String, String), UserWeight>>,
    items: Mutex<HashMap<String, Vec<MemoryItem>>>,
    entities: Mutex<HashMap<String, Vec<Entity>>>,
    feedback: Mutex<Vec<FeedbackRecord>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/inspection helper: every memory item ever appended for a
    /// conversation, in append order.
    pub fn items_for(&self, conversation_id: &str) -> Vec<MemoryItem> {
        self.items
            .lock()
            .unwrap()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn entities_for(&self, user_id: &str) -> Vec<Entity> {
        self.entities
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn feedback_log(&self) -> Vec<FeedbackRecord> {
        self.feedback.lock().unwrap().clone()
    }
}

#[async_trait]
impl MemoryPersistence for InMemoryPersistence {
    async fn load_user_weights(&self, user_id: &str) -> Result<HashMap<String, UserWeight>> {
        Ok(self
            .weights
            .lock()
            .unwrap()
            .iter()
            .filter(|((uid, _), _)| uid == user_id)
            .map(|((_, pattern), w)| (pattern.clone(), *w))
            .collect())
    }

    async fn save_user_weight(
        &self,
        user_id: &str,
        pattern_name: &str,
        adjustment: f64,
        feedback_count: u32,
    ) -> Result<()> {
        self.weights.lock().unwrap().insert(
            (user_id.to_string(), pattern_name.to_string()),
            UserWeight {
                weight_adjustment: adjustment,
                feedback_count,
            },
        );
        Ok(())
    }

    async fn append_memory_items(&self, conversation_id: &str, items: &[MemoryItem]) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .entry(conversation_id.to_string())
            .or_default()
            .extend_from_slice(items);
        Ok(())
    }

    async fn upsert_entities(&self, user_id: &str, entities: &[Entity]) -> Result<()> {
        let mut guard = self.entities.lock().unwrap();
        let slot = guard.entry(user_id.to_string()).or_default();
        for incoming in entities {
            if let Some(existing) = slot.iter_mut().find(|e| e.entity_id == incoming.entity_id) {
                *existing = incoming.clone();
            } else {
                slot.push(incoming.clone());
            }
        }
        Ok(())
    }

    async fn append_feedback(&self, record: &FeedbackRecord) -> Result<()> {
        self.feedback.lock().unwrap().push(record.clone());
        Ok(())
    }
}
