//! Delivery of stored files to the downstream ingestion API.
//!
//! Each stored file is re-read from the content store, parsed as JSON,
//! wrapped in a metadata envelope, and POSTed with an `Authorization: ApiKey`
//! header. Dispatch is fire-and-forget: the pipeline returns once the request
//! task is spawned and does not await the API's response, trading delivery
//! confirmation for crawl throughput. Request failures are logged, not
//! retried.

use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::collect::CollectionRun;
use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::source::DataType;
use crate::store::RetrievedFile;

/// Accepts stored files for submission to the ingestion API.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Deliverer: Send + Sync {
    /// Submit one stored file. Returns once submission has been dispatched;
    /// the file is considered consumed afterwards.
    async fn deliver(&self, run: &CollectionRun, file: &RetrievedFile) -> Result<()>;
}

/// The metadata-wrapped payload sent to the ingestion API, one per stored
/// file. Not retained after dispatch.
#[derive(Debug, Serialize)]
pub struct DeliveryEnvelope {
    pub collection_source: String,
    pub collection_data_version: String,
    pub collection_sample: u8,
    pub file_name: PathBuf,
    pub file_url: String,
    pub file_data_type: DataType,
    pub file_encoding: String,
    pub local_path: PathBuf,
    pub data: serde_json::Value,
}

/// Delivery pipeline bound to one ingestion API.
///
/// Refuses to construct when the file URL, item URL, or API key is absent:
/// a missing setting is a configuration error, never a silent no-op.
#[derive(Debug, Clone)]
pub struct DeliveryPipeline {
    file_url: String,
    /// Item-submission endpoint. Required configuration; envelope routing by
    /// data type is an upstream decision, so file envelopes currently all go
    /// to `file_url`.
    pub item_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl DeliveryPipeline {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        let file_url = config
            .file_url
            .clone()
            .ok_or_else(|| Error::config("ingest.file_url", "ingestion file URL not configured"))?;
        let item_url = config
            .item_url
            .clone()
            .ok_or_else(|| Error::config("ingest.item_url", "ingestion item URL not configured"))?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::config("ingest.api_key", "ingestion API key not configured"))?;

        Ok(Self {
            file_url,
            item_url,
            api_key,
            client: reqwest::Client::new(),
        })
    }

    /// Build the envelope for a stored file from its persisted bytes.
    ///
    /// The file is re-opened from the store rather than taken from memory:
    /// the invariant is that every envelope references content the store has
    /// completely written.
    async fn envelope(&self, run: &CollectionRun, file: &RetrievedFile) -> Result<DeliveryEnvelope> {
        let bytes = tokio::fs::read(&file.storage_path).await?;
        let data: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|source| Error::Parse {
                path: file.storage_path.clone(),
                source,
            })?;

        Ok(DeliveryEnvelope {
            collection_source: run.publisher_id.clone(),
            collection_data_version: run.data_version(),
            collection_sample: u8::from(run.sample),
            file_name: file.storage_path.clone(),
            file_url: file.target.url.clone(),
            file_data_type: file.target.data_type,
            file_encoding: "utf-8".to_string(),
            local_path: file.storage_path.clone(),
            data,
        })
    }
}

#[async_trait]
impl Deliverer for DeliveryPipeline {
    async fn deliver(&self, run: &CollectionRun, file: &RetrievedFile) -> Result<()> {
        let envelope = self.envelope(run, file).await?;

        let request = self
            .client
            .post(&self.file_url)
            .header("Authorization", format!("ApiKey {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&envelope);

        let url = self.file_url.clone();
        let file_url = envelope.file_url.clone();

        // Fire and forget: dispatch without blocking the collection run.
        tokio::spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(url = %url, file_url = %file_url, "envelope submitted");
                }
                Ok(response) => {
                    warn!(
                        url = %url,
                        file_url = %file_url,
                        status = %response.status(),
                        "ingestion API rejected envelope"
                    );
                }
                Err(e) => {
                    warn!(url = %url, file_url = %file_url, error = %e, "envelope submission failed");
                }
            }
        });

        Ok(())
    }
}
