//! Collection run driver: expands a source's targets to completion.
//!
//! The driver owns its pending-target queue. A target moves
//! `Pending → Fetching → {Stored, Failed}`; a stored target may enqueue new
//! pending targets discovered by the source adapter, and the run terminates
//! when the queue is empty. Continuation is only attempted against content
//! that was durably stored, which also makes per-lineage pagination strictly
//! serial: page N+1 is never fetched before page N has been stored and
//! parsed. A failed target terminates its own lineage and nothing else.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::deliver::Deliverer;
use crate::fetch::Fetcher;
use crate::source::{DownloadTarget, SourceAdapter, SourceArgs};
use crate::store::{ContentStore, RetrievedFile};

/// Identity of one invocation of a source adapter.
///
/// `started_at` is captured once at construction and reused for every file
/// path and metadata record produced by the run, so all files from one run
/// share a stable directory and version stamp even though individual
/// downloads complete at different times.
#[derive(Debug, Clone)]
pub struct CollectionRun {
    pub publisher_id: String,
    pub started_at: DateTime<Utc>,
    pub sample: bool,
}

impl CollectionRun {
    pub fn new(publisher_id: impl Into<String>, sample: bool) -> Self {
        Self {
            publisher_id: publisher_id.into(),
            started_at: Utc::now(),
            sample,
        }
    }

    /// Version stamp shared by every delivery envelope in the run.
    pub fn data_version(&self) -> String {
        self.started_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Compact stamp used in the storage directory layout.
    pub fn directory_stamp(&self) -> String {
        self.started_at.format("%Y%m%d_%H%M%S").to_string()
    }
}

/// A target that could not be completed, with everything recorded against it.
#[derive(Debug)]
pub struct TargetFailure {
    pub target: DownloadTarget,
    pub errors: Vec<String>,
}

/// What a finished run produced: the stored files, plus per-target failures
/// and adapter warnings. A run partially succeeds; files that were retrieved
/// are stored and delivered even if sibling pages failed.
#[derive(Debug, Default)]
pub struct RunReport {
    pub stored: Vec<RetrievedFile>,
    pub failures: Vec<TargetFailure>,
    pub warnings: Vec<String>,
}

impl RunReport {
    fn record_failure(&mut self, target: DownloadTarget, errors: Vec<String>) {
        error!(url = %target.url, filename = %target.filename, ?errors, "target failed");
        self.failures.push(TargetFailure { target, errors });
    }
}

/// Drive one source to completion: fetch, persist, follow continuation links,
/// and hand each stored file to the delivery pipeline.
pub async fn collect<S, F, D>(
    source: &S,
    args: &SourceArgs,
    run: &CollectionRun,
    store: &ContentStore,
    fetcher: &F,
    deliverer: &D,
) -> RunReport
where
    S: SourceAdapter,
    F: Fetcher,
    D: Deliverer,
{
    let mut report = RunReport::default();
    let mut pending: VecDeque<DownloadTarget> = source.initial_targets(args).into();
    let mut seen: HashSet<String> = HashSet::new();

    info!(
        publisher = %run.publisher_id,
        data_version = %run.data_version(),
        sample = run.sample,
        initial_targets = pending.len(),
        "starting collection run"
    );

    while let Some(target) = pending.pop_front() {
        if !seen.insert(target.url.clone()) {
            warn!(url = %target.url, "duplicate target within run, skipping");
            continue;
        }

        let body = match fetcher.fetch(&target).await {
            Ok(body) => body,
            Err(e) => {
                report.record_failure(target, vec![e.to_string()]);
                continue;
            }
        };

        // Persist before anything else: continuation and delivery must never
        // see content that failed to reach the store.
        let retrieved = match store.write(run, &target, &body) {
            Ok(retrieved) => retrieved,
            Err(e) => {
                report.record_failure(target, vec![e.to_string()]);
                continue;
            }
        };

        match source.continuation_targets(&target, &body, &retrieved.storage_path, run.sample) {
            Ok(continuation) => {
                report.warnings.extend(continuation.warnings);
                pending.extend(continuation.additional);
            }
            Err(failure) => {
                report.warnings.extend(failure.warnings);
                report.record_failure(target.clone(), failure.errors);
            }
        }

        if let Err(e) = deliverer.deliver(run, &retrieved).await {
            report.record_failure(target, vec![format!("delivery failed: {e}")]);
        }

        report.stored.push(retrieved);
    }

    info!(
        publisher = %run.publisher_id,
        stored = report.stored.len(),
        failed = report.failures.len(),
        warnings = report.warnings.len(),
        "collection run finished"
    );

    report
}
