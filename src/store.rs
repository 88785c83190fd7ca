//! Content-addressed persistence for retrieved files.
//!
//! Files land under `{publisher_id}/{run stamp}/{sha1(url)}{ext}` below a
//! configured storage root. The hash keys on the URL, not the body, so
//! re-requesting the same URL is idempotent and writes are path-disjoint
//! across targets. Writes go through a temp file in the destination directory
//! followed by an atomic rename, so a partially written file is never visible
//! to readers.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};
use tracing::debug;
use url::Url;

use crate::collect::CollectionRun;
use crate::error::{Error, Result};
use crate::source::DownloadTarget;

/// A successfully persisted download. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct RetrievedFile {
    pub target: DownloadTarget,
    /// Hex sha1 of the target URL; the file's stable identity in the store.
    pub local_identity: String,
    pub storage_path: PathBuf,
    pub retrieved_at: DateTime<Utc>,
}

/// Writes retrieved content into the run-partitioned directory layout.
///
/// The store has no deletion or eviction responsibility; retention is handled
/// externally.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic, collision-resistant destination path for a URL within a
    /// run: `{publisher_id}/{YYYYMMDD_HHMMSS}/{sha1(url)}{ext}`.
    pub fn path_for(&self, run: &CollectionRun, url: &str) -> PathBuf {
        let digest = Sha1::digest(url.as_bytes());
        let name = format!("{:x}{}", digest, extension_for(url));
        self.root
            .join(&run.publisher_id)
            .join(run.directory_stamp())
            .join(name)
    }

    /// Persist downloaded bytes for a target, returning the file's identity.
    ///
    /// The destination only becomes visible once the content is fully written
    /// and flushed; a failed write leaves nothing behind at the final path.
    pub fn write(
        &self,
        run: &CollectionRun,
        target: &DownloadTarget,
        content: &[u8],
    ) -> Result<RetrievedFile> {
        use std::io::Write;

        let path = self.path_for(run, &target.url);
        let dir = path
            .parent()
            .expect("store paths always have a parent directory");

        let persist = || -> std::io::Result<()> {
            std::fs::create_dir_all(dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
            tmp.write_all(content)?;
            tmp.flush()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        };

        persist().map_err(|source| Error::Persistence {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), bytes = content.len(), "stored retrieved file");

        Ok(RetrievedFile {
            target: target.clone(),
            local_identity: format!("{:x}", Sha1::digest(target.url.as_bytes())),
            storage_path: path,
            retrieved_at: Utc::now(),
        })
    }
}

/// Extension taken from the URL's path suffix, defaulting to `.json`.
fn extension_for(url: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    match Path::new(&path).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => ".json".to_string(),
    }
}
