//! Colombia Compra Eficiente releases API.
//!
//! API documentation and bulk downloads:
//! <https://www.colombiacompra.gov.co/transparencia/gestion-documental/datos-abiertos>
//!
//! The API is a linear page chain: each response embeds the absolute URL of
//! the next page under `links.next`. Filenames encode the page number
//! positionally (`page-N-.json`), and the next page number is always derived
//! from the current filename rather than a counter, so retried or out-of-order
//! completions cannot desynchronize numbering.

use std::path::Path;

use tracing::debug;

use super::{
    Continuation, ContinuationFailure, DataType, DownloadTarget, SourceAdapter, SourceArgs,
    SAMPLE_PAGE_CEILING,
};

pub const SOURCE_ID: &str = "colombia";

const BASE_URL: &str = "https://apiocds.colombiacompra.gov.co:8443/apiCCE2.0/rest/releases?page=";

/// Source adapter for Colombia's OCDS releases endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColombiaSource;

impl ColombiaSource {
    fn page_filename(page: u32) -> String {
        format!("page-{}-.json", page)
    }

    /// Extract the page number encoded in a `page-N-.json` filename.
    fn page_from_filename(filename: &str) -> Option<u32> {
        filename.split('-').nth(1)?.parse().ok()
    }
}

impl SourceAdapter for ColombiaSource {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    fn publisher_name(&self) -> &'static str {
        "Colombia"
    }

    fn initial_targets(&self, args: &SourceArgs) -> Vec<DownloadTarget> {
        let page = args.start_page();
        vec![DownloadTarget {
            url: format!("{}{}", BASE_URL, page),
            filename: Self::page_filename(page),
            data_type: DataType::ReleasePackage,
        }]
    }

    fn continuation_targets(
        &self,
        target: &DownloadTarget,
        content: &[u8],
        file_path: &Path,
        sample: bool,
    ) -> Result<Continuation, ContinuationFailure> {
        let body: serde_json::Value = serde_json::from_slice(content).map_err(|e| {
            ContinuationFailure {
                errors: vec![format!(
                    "could not parse {} as JSON: {}",
                    file_path.display(),
                    e
                )],
                warnings: Vec::new(),
            }
        })?;

        let page = match Self::page_from_filename(&target.filename) {
            Some(page) => page,
            None => {
                return Err(ContinuationFailure {
                    errors: vec![format!(
                        "filename {:?} does not encode a page number",
                        target.filename
                    )],
                    warnings: Vec::new(),
                })
            }
        };

        let mut continuation = Continuation::default();

        // A missing next pointer is not an error: the lineage simply ends here.
        let next = body
            .get("links")
            .and_then(|links| links.get("next"))
            .and_then(|next| next.as_str());

        match next {
            Some(next_url) if !sample || page < SAMPLE_PAGE_CEILING => {
                continuation.additional.push(DownloadTarget {
                    url: next_url.to_string(),
                    filename: Self::page_filename(page + 1),
                    data_type: DataType::ReleasePackage,
                });
            }
            Some(_) => {
                debug!(page, "sample mode page ceiling reached, not following next link");
            }
            None => {
                debug!(page, "no next link, lineage complete");
            }
        }

        Ok(continuation)
    }
}
