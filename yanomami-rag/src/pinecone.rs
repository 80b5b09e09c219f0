//! Pinecone vector index backend.
//!
//! Provides [`PineconeIndex`], a [`VectorIndex`] over Pinecone's REST API:
//! the control plane (`https://api.pinecone.io`) for index provisioning
//! and the per-index data plane host for upserts and queries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::document::{IndexRecord, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// The Pinecone control-plane endpoint.
const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

/// How long to wait for a freshly created index to become queryable.
/// Pinecone needs provisioning time; queries against a not-yet-ready
/// index are undefined.
const READY_WAIT: Duration = Duration::from_secs(60);

/// Interval between readiness polls.
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A [`VectorIndex`] backed by [Pinecone](https://www.pinecone.io/).
///
/// Indexes are created serverless with cosine similarity. The data-plane
/// host is resolved from the control plane on first use and cached.
///
/// # Example
///
/// ```rust,ignore
/// use yanomami_rag::PineconeIndex;
///
/// let index = PineconeIndex::from_env()?;
/// index.ensure_index("langchain-demo", 1536).await?;
/// ```
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: String,
    control_url: String,
    /// Data-plane host of the index, cached after the first describe call.
    host: RwLock<Option<String>>,
}

impl PineconeIndex {
    /// Create a new Pinecone index adapter with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::VectorIndex {
                backend: "Pinecone".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            control_url: CONTROL_PLANE_URL.to_string(),
            host: RwLock::new(None),
        })
    }

    /// Create a new adapter using the `PINECONE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PINECONE_API_KEY").map_err(|_| RagError::VectorIndex {
            backend: "Pinecone".into(),
            message: "PINECONE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Override the control-plane URL (for test doubles).
    pub fn with_control_url(mut self, url: impl Into<String>) -> Self {
        self.control_url = url.into();
        self
    }

    fn store_err(message: impl Into<String>) -> RagError {
        RagError::VectorIndex { backend: "Pinecone".into(), message: message.into() }
    }

    /// Describe the named index on the control plane.
    async fn describe(&self, name: &str) -> Result<IndexDescription> {
        let url = format!("{}/indexes/{name}", self.control_url);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Self::store_err(format!("describe request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::store_err(format!("describe returned {status}: {body}")));
        }

        response
            .json::<IndexDescription>()
            .await
            .map_err(|e| Self::store_err(format!("failed to parse describe response: {e}")))
    }

    /// Resolve and cache the data-plane host for the named index.
    async fn data_plane_url(&self, name: &str) -> Result<String> {
        if let Some(host) = self.host.read().await.as_deref() {
            return Ok(format!("https://{host}"));
        }

        let description = self.describe(name).await?;
        let mut cached = self.host.write().await;
        *cached = Some(description.host.clone());
        Ok(format!("https://{}", description.host))
    }

    /// Poll the control plane until the index reports ready, up to
    /// [`READY_WAIT`]. Also primes the data-plane host cache.
    async fn wait_until_ready(&self, name: &str) -> Result<()> {
        let deadline = tokio::time::Instant::now() + READY_WAIT;

        loop {
            match self.describe(name).await {
                Ok(description) if description.status.ready => {
                    let mut cached = self.host.write().await;
                    *cached = Some(description.host);
                    return Ok(());
                }
                Ok(_) => debug!(index = name, "index not ready yet"),
                // Describe can 404 briefly right after creation.
                Err(e) => debug!(index = name, error = %e, "describe failed while waiting"),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(RagError::IndexProvision(format!(
                    "index '{name}' did not become ready within {}s",
                    READY_WAIT.as_secs()
                )));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

// ── Pinecone API request/response types ────────────────────────────

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Deserialize)]
struct IndexDescription {
    name: String,
    host: String,
    status: IndexStatus,
}

#[derive(Deserialize)]
struct IndexStatus {
    ready: bool,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: RecordMetadata<'a>,
}

#[derive(Serialize)]
struct RecordMetadata<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<MatchMetadata>,
}

#[derive(Deserialize)]
struct MatchMetadata {
    #[serde(default)]
    text: String,
}

// ── VectorIndex implementation ─────────────────────────────────────

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn ensure_index(&self, name: &str, dimensions: usize) -> Result<()> {
        let url = format!("{}/indexes", self.control_url);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Self::store_err(format!("list indexes failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::store_err(format!("list indexes returned {status}")));
        }

        let list: IndexList = response
            .json()
            .await
            .map_err(|e| Self::store_err(format!("failed to parse index list: {e}")))?;

        if list.indexes.iter().any(|i| i.name == name) {
            debug!(index = name, "index already exists, skipping creation");
            return self.wait_until_ready(name).await;
        }

        info!(index = name, dimensions, "creating index");
        let body = json!({
            "name": name,
            "dimension": dimensions,
            "metric": "cosine",
            "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } },
        });

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::IndexProvision(format!("create index failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            // A concurrent creator may win the race; that is success.
            if status == reqwest::StatusCode::CONFLICT || detail.contains("already exists") {
                warn!(index = name, "index was created concurrently, continuing");
            } else {
                return Err(RagError::IndexProvision(format!(
                    "create index returned {status}: {detail}"
                )));
            }
        }

        self.wait_until_ready(name).await
    }

    async fn upsert(&self, name: &str, records: &[IndexRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let base = self.data_plane_url(name).await?;
        let vectors: Vec<UpsertVector<'_>> = records
            .iter()
            .map(|r| UpsertVector {
                id: &r.id,
                values: &r.embedding,
                metadata: RecordMetadata { text: &r.text },
            })
            .collect();

        let response = self
            .client
            .post(format!("{base}/vectors/upsert"))
            .header("Api-Key", &self.api_key)
            .json(&UpsertRequest { vectors })
            .send()
            .await
            .map_err(|e| Self::store_err(format!("upsert request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::store_err(format!("upsert returned {status}: {body}")));
        }

        debug!(index = name, count = records.len(), "upserted records");
        Ok(())
    }

    async fn query(
        &self,
        name: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let base = self.data_plane_url(name).await?;
        let body = json!({
            "vector": embedding,
            "topK": top_k,
            "includeMetadata": true,
        });

        let response = self
            .client
            .post(format!("{base}/query"))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::store_err(format!("query request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::store_err(format!("query returned {status}: {body}")));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| Self::store_err(format!("failed to parse query response: {e}")))?;

        Ok(query_response
            .matches
            .into_iter()
            .map(|m| SearchResult {
                id: m.id,
                text: m.metadata.map(|md| md.text).unwrap_or_default(),
                score: m.score,
            })
            .collect())
    }
}
