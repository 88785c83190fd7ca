pub mod collect;
pub mod config;
pub mod deliver;
pub mod error;
pub mod fetch;
pub mod load_config;
pub mod source;
pub mod store;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use collect::{collect, CollectionRun};
use deliver::DeliveryPipeline;
use fetch::HttpFetcher;
use load_config::load_config;
use source::{Source, SourceAdapter, SourceArgs};
use store::ContentStore;

#[derive(Parser)]
#[clap(
    name = "ocds-collect",
    version,
    about = "Collect OCDS release/record packages from government publishers and forward them to an ingestion API"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one source to completion using the given config file
    Collect {
        /// Registered source id (see `sources`)
        source: String,
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Cap each pagination lineage for an inexpensive smoke run
        #[clap(long)]
        sample: bool,
        /// Starting page override for page-based sources
        #[clap(long)]
        page: Option<String>,
    },
    /// List all registered source ids
    Sources,
}

/// Extracted async CLI logic entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Collect {
            source,
            config,
            sample,
            page,
        } => {
            let config = load_config(config)?;
            let source = Source::from_id(&source)?;
            let args = SourceArgs { page };

            let run = CollectionRun::new(source.source_id(), sample);
            let store = ContentStore::new(&config.storage_root);
            let fetcher = HttpFetcher::new();
            // Delivery configuration is validated before any request is issued.
            let pipeline = DeliveryPipeline::new(&config.ingest)?;

            println!(
                "Collecting {} (run {})...",
                source.publisher_name(),
                run.data_version()
            );
            let report = collect(&source, &args, &run, &store, &fetcher, &pipeline).await;

            println!(
                "Collection complete: {} stored, {} failed, {} warnings.",
                report.stored.len(),
                report.failures.len(),
                report.warnings.len()
            );
            for failure in &report.failures {
                eprintln!("[FAILED] {}: {}", failure.target.url, failure.errors.join("; "));
            }
            for warning in &report.warnings {
                eprintln!("[WARN] {warning}");
            }
            Ok(())
        }
        Commands::Sources => {
            for id in Source::registered_ids() {
                println!("{id}");
            }
            Ok(())
        }
    }
}
