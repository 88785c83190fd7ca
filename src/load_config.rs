use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{Config, IngestConfig};

/// Environment variable holding the ingestion API key (never in the file).
pub const API_KEY_ENV: &str = "OCDS_API_KEY";

#[derive(Deserialize)]
struct StaticConfig {
    storage_root: std::path::PathBuf,
    #[serde(default)]
    ingest: IngestSection,
}

#[derive(Default, Deserialize)]
struct IngestSection {
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    item_url: Option<String>,
}

/// Loads a static YAML config file (no secrets) and injects the API key from
/// the environment. Returns a fully merged [`Config`].
///
/// A missing API key is not an error here: collection without delivery is
/// still meaningful, and the delivery pipeline enforces its own configuration
/// when it is activated.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read config file {:?}", path_ref))?;

    let static_conf: StaticConfig =
        serde_yaml::from_str(&config_content).context("Failed to parse config YAML")?;

    let api_key = match std::env::var(API_KEY_ENV) {
        Ok(key) => {
            info!("{API_KEY_ENV} found in env");
            Some(key)
        }
        Err(_) => {
            warn!("{API_KEY_ENV} not set; delivery will refuse to activate");
            None
        }
    };

    let config = Config {
        storage_root: static_conf.storage_root,
        ingest: IngestConfig {
            file_url: static_conf.ingest.file_url,
            item_url: static_conf.ingest.item_url,
            api_key,
        },
    };

    config.trace_loaded();
    Ok(config)
}
