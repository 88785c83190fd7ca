use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Fully merged runtime configuration for a collection run.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Root directory of the content store.
    pub storage_root: PathBuf,
    pub ingest: IngestConfig,
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            storage_root = %self.storage_root.display(),
            ingest_file_url = self.ingest.file_url.as_deref().unwrap_or("<unset>"),
            api_key_present = self.ingest.api_key.is_some(),
            "Loaded Config"
        );
        debug!(storage_root = %self.storage_root.display(), "Config loaded (full debug)");
    }
}

/// Ingestion API settings. All three are required for delivery to activate;
/// the delivery pipeline refuses to construct when any is absent.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Endpoint receiving file envelopes.
    pub file_url: Option<String>,
    /// Endpoint receiving item submissions.
    pub item_url: Option<String>,
    /// Static API key sent as `Authorization: ApiKey <key>`. Injected from
    /// the environment, never read from the config file.
    #[serde(skip)]
    pub api_key: Option<String>,
}
