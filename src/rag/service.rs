//! Backend traits, wire records and service errors.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Failure talking to an embedding, index or model backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Non-success HTTP status.
    #[error("{}", explain_status(*status, body))]
    Http {
        /// Response status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The backend could not be reached.
    #[error("Network error: cannot connect to {0}")]
    Network(String),

    /// The caller-side deadline passed before the backend answered.
    #[error("{operation} timed out after {millis}ms")]
    Timeout {
        /// Operation name.
        operation: &'static str,
        /// Deadline in milliseconds.
        millis: u64,
    },

    /// Credentials or host are missing.
    #[error("Service not configured: {0}")]
    NotConfigured(String),

    /// The backend answered without usable content.
    #[error("Empty response from service")]
    EmptyResponse,

    /// The configured index host is not a valid URL.
    #[error("Invalid index host URL `{0}`")]
    InvalidHost(String),
}

/// Human-readable explanation for an HTTP status.
#[must_use]
pub fn explain_status(status: u16, body: &str) -> String {
    match status {
        400 => format!("Bad request: invalid request format or parameters. {body}"),
        401 => "Authentication failed: check the API key.".to_string(),
        403 => "Access denied: the API key lacks permission for this operation.".to_string(),
        404 => "Not found: verify the index host URL.".to_string(),
        429 => "Rate limit exceeded: wait before making more requests.".to_string(),
        500..=599 => format!("Server error ({status}): {body}"),
        _ => format!("Request failed with status {status}. Response: {body}"),
    }
}

/// Await `fut` for at most `limit`.
///
/// On timeout the future is dropped; a response that arrives later is never
/// observed.
///
/// # Errors
///
/// Returns the future's own error, or `ServiceError::Timeout`.
pub async fn with_timeout<T, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
        Err(ServiceError::Timeout {
            operation,
            millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        })
    })
}

/// Normalize a vector index host: trim, strip trailing slashes and default
/// the scheme to `https://`.
///
/// # Errors
///
/// Returns `ServiceError::InvalidHost` when the result is not a URL with a
/// host.
pub fn normalize_index_host(raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    match Url::parse(&host) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(host),
        _ => Err(ServiceError::InvalidHost(raw.to_string())),
    }
}

/// Stored credentials for the retrieval backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSettings {
    /// Key for the embedding and answer model provider.
    pub model_api_key: Option<String>,
    /// Key for the vector index.
    pub index_api_key: Option<String>,
    /// Vector index host.
    pub index_host: Option<String>,
}

impl ServiceSettings {
    /// Check every field is present and normalize the host.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotConfigured` naming the first missing field,
    /// or `ServiceError::InvalidHost`.
    pub fn validated(&self) -> Result<Self, ServiceError> {
        fn present(value: Option<&String>, name: &str) -> Result<String, ServiceError> {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ServiceError::NotConfigured(name.to_string()))
        }

        let model_api_key = present(self.model_api_key.as_ref(), "modelApiKey")?;
        let index_api_key = present(self.index_api_key.as_ref(), "indexApiKey")?;
        let index_host = normalize_index_host(&present(self.index_host.as_ref(), "indexHost")?)?;
        Ok(Self {
            model_api_key: Some(model_api_key),
            index_api_key: Some(index_api_key),
            index_host: Some(index_host),
        })
    }
}

/// Metadata stored alongside each vector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorMetadata {
    /// Chunk text.
    pub text: String,
    /// Source page URL.
    pub url: String,
    /// Source page title.
    pub title: String,
    /// Source page hostname.
    pub domain: String,
    /// Chunk type (`p`, `h2`, `text-node`, ...).
    #[serde(rename = "type")]
    pub kind: String,
}

/// One vector to upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// `{domain}_{index}_{millis}`.
    pub id: String,
    /// Embedding values.
    pub values: Vec<f32>,
    /// Stored metadata.
    pub metadata: VectorMetadata,
}

/// One similarity search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    /// Record id.
    pub id: String,
    /// Similarity score.
    pub score: f32,
    /// Stored metadata.
    pub metadata: VectorMetadata,
}

/// Text embedding backend.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;
}

/// Vector index backend.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace records.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), ServiceError>;

    /// The `top_k` nearest records to `vector`.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, ServiceError>;

    /// Remove every record.
    async fn delete_all(&self) -> Result<(), ServiceError>;
}

/// Language model used to phrase answers.
#[async_trait]
pub trait AnswerModel: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}
