//! Oracle transport seam: a production HTTP client and a deterministic mock,
//! sharing one object-safe trait.

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;

use super::OracleVerdict;
use crate::model::RetentionLevel;

/// Transport-level error from a remote classification call.
#[derive(Debug)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// A remote (or mock) semantic classifier, queried as a single structured
/// request per utterance. Object-safe so production and mock transports can
/// share one `Box<dyn OracleTransport>` seam.
#[async_trait]
pub trait OracleTransport: Send + Sync {
    async fn classify(&self, text: &str) -> Result<OracleVerdict, TransportError>;
}

/// Deterministic, offline verdict generator used for tests and the
/// `l2_mock_mode` configuration option. Derives its verdict purely from
/// lexicon presence, never calling out over the network.
pub struct MockTransport {
    emotive_lexicon: Vec<String>,
}

impl MockTransport {
    pub fn new(emotive_lexicon: Vec<String>) -> Self {
        MockTransport { emotive_lexicon }
    }
}

#[async_trait]
impl OracleTransport for MockTransport {
    async fn classify(&self, text: &str) -> Result<OracleVerdict, TransportError> {
        let lower = text.to_lowercase();
        let emotive_hits = self
            .emotive_lexicon
            .iter()
            .filter(|tok| lower.split_whitespace().any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()) == **tok))
            .count();

        let (retention, importance) = if emotive_hits >= 1 {
            (RetentionLevel::LongTerm, 20.0 + emotive_hits as f64)
        } else if lower.split_whitespace().count() <= 3 {
            (RetentionLevel::ImmediateDiscard, 1.0)
        } else {
            (RetentionLevel::ShortTerm, 8.0)
        };

        let mut categories = BTreeSet::new();
        if emotive_hits >= 1 {
            categories.insert("emotion".to_string());
        }

        Ok(OracleVerdict {
            retention,
            importance_0_to_30: importance,
            categories,
            reasoning: format!("mock oracle: {emotive_hits} emotive lexicon hit(s)"),
        })
    }
}

/// Production transport: a thin JSON client over `reqwest`, asking the remote
/// classifier for `{retention, importance_0_to_30, categories, reasoning}`.
#[cfg(feature = "oracle-http")]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

#[cfg(feature = "oracle-http")]
impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpTransport {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[cfg(feature = "oracle-http")]
#[derive(serde::Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[cfg(feature = "oracle-http")]
#[derive(serde::Deserialize)]
struct ClassifyResponse {
    retention: String,
    importance_0_to_30: f64,
    categories: Vec<String>,
    reasoning: String,
}

#[cfg(feature = "oracle-http")]
#[async_trait]
impl OracleTransport for HttpTransport {
    async fn classify(&self, text: &str) -> Result<OracleVerdict, TransportError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(TransportError(format!("oracle returned status {}", resp.status())));
        }

        let body: ClassifyResponse = resp.json().await.map_err(|e| TransportError(e.to_string()))?;
        let retention = match body.retention.as_str() {
            "LONG_TERM" => RetentionLevel::LongTerm,
            "SHORT_TERM" => RetentionLevel::ShortTerm,
            _ => RetentionLevel::ImmediateDiscard,
        };

        Ok(OracleVerdict {
            retention,
            importance_0_to_30: body.importance_0_to_30,
            categories: body.categories.into_iter().collect(),
            reasoning: body.reasoning,
        })
    }
}
