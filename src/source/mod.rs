//! Per-publisher source adapters and the registry that dispatches to them.
//!
//! A source adapter declares what to download first for a publisher and, given
//! a just-downloaded file, which follow-up targets (pagination) to schedule.
//! Each publisher is one variant of [`Source`]; dispatch is an exhaustive
//! `match`, and [`Source::from_id`] is the process-wide registry.

use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod colombia;

pub use colombia::ColombiaSource;

/// Page ceiling applied per lineage when a run is in sample mode.
pub const SAMPLE_PAGE_CEILING: u32 = 3;

/// The kind of OCDS document a target points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    ReleasePackage,
    RecordPackage,
}

/// One thing to download: where from, what to call it, and what it contains.
///
/// Identity is `(url, filename)`; immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DownloadTarget {
    pub url: String,
    pub filename: String,
    pub data_type: DataType,
}

/// Run-scoped arguments a source may consume (e.g., a starting page override).
#[derive(Debug, Clone, Default)]
pub struct SourceArgs {
    /// Optional starting page. Absent or unparseable values default to page 1.
    pub page: Option<String>,
}

impl SourceArgs {
    /// The starting page number, defaulting to 1 when absent or malformed.
    pub fn start_page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(1)
    }
}

/// Successful continuation inspection: follow-up targets plus any warnings.
#[derive(Debug, Default)]
pub struct Continuation {
    pub additional: Vec<DownloadTarget>,
    pub warnings: Vec<String>,
}

/// Failed continuation inspection. No additional targets are emitted on this
/// arm, regardless of whether a next-link would otherwise exist.
#[derive(Debug, Default)]
pub struct ContinuationFailure {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// The per-publisher collection protocol.
///
/// `initial_targets` must be deterministic for identical arguments.
/// `continuation_targets` is only invoked after the target's content has been
/// durably stored; within one lineage it is strictly serial, so page N+1 is
/// discovered only after page N has been retrieved and parsed.
pub trait SourceAdapter {
    /// Stable identifier used for storage partitioning. Unique process-wide.
    fn source_id(&self) -> &'static str;

    /// Human-readable publisher name used in delivery metadata.
    fn publisher_name(&self) -> &'static str;

    /// The starting set of things to fetch for a run.
    fn initial_targets(&self, args: &SourceArgs) -> Vec<DownloadTarget>;

    /// Inspect just-downloaded content for a next-page pointer.
    fn continuation_targets(
        &self,
        target: &DownloadTarget,
        content: &[u8],
        file_path: &Path,
        sample: bool,
    ) -> Result<Continuation, ContinuationFailure>;
}

/// Registry of all known publishers. One variant per source.
#[derive(Debug, Clone)]
pub enum Source {
    Colombia(ColombiaSource),
}

impl Source {
    /// Look up a source by its stable id.
    pub fn from_id(id: &str) -> Result<Source, crate::error::Error> {
        match id {
            colombia::SOURCE_ID => Ok(Source::Colombia(ColombiaSource)),
            other => Err(crate::error::Error::UnknownSource(other.to_string())),
        }
    }

    /// All registered source ids, for CLI listings and diagnostics.
    pub fn registered_ids() -> &'static [&'static str] {
        &[colombia::SOURCE_ID]
    }
}

impl SourceAdapter for Source {
    fn source_id(&self) -> &'static str {
        match self {
            Source::Colombia(s) => s.source_id(),
        }
    }

    fn publisher_name(&self) -> &'static str {
        match self {
            Source::Colombia(s) => s.publisher_name(),
        }
    }

    fn initial_targets(&self, args: &SourceArgs) -> Vec<DownloadTarget> {
        match self {
            Source::Colombia(s) => s.initial_targets(args),
        }
    }

    fn continuation_targets(
        &self,
        target: &DownloadTarget,
        content: &[u8],
        file_path: &Path,
        sample: bool,
    ) -> Result<Continuation, ContinuationFailure> {
        match self {
            Source::Colombia(s) => s.continuation_targets(target, content, file_path, sample),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_known_id() {
        let source = Source::from_id("colombia").expect("colombia should be registered");
        assert_eq!(source.source_id(), "colombia");
        assert_eq!(source.publisher_name(), "Colombia");
    }

    #[test]
    fn registry_rejects_unknown_id() {
        let err = Source::from_id("atlantis").unwrap_err();
        assert!(matches!(err, crate::error::Error::UnknownSource(ref id) if id == "atlantis"));
    }

    #[test]
    fn start_page_defaults_to_one() {
        assert_eq!(SourceArgs::default().start_page(), 1);
        let malformed = SourceArgs {
            page: Some("not-a-number".into()),
        };
        assert_eq!(malformed.start_page(), 1);
        let explicit = SourceArgs {
            page: Some("7".into()),
        };
        assert_eq!(explicit.start_page(), 7);
    }
}
