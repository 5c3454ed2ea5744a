//! Loading the start page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;
use url::Url;

use crate::dom::LiveDocument;
use crate::error_handling::DocumentError;
use crate::fetch::PageFetcher;

/// Where the start page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Fetched over HTTP(S).
    Remote(Url),
    /// Read from disk; links resolve against `base_url`.
    File { path: PathBuf, base_url: Url },
}

impl DocumentSource {
    /// Interprets a CLI `source` argument.
    ///
    /// `http://` and `https://` sources are fetched; anything else is a file
    /// path and needs `base_url`.
    pub fn parse(source: &str, base_url: Option<&str>) -> Result<Self, DocumentError> {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            if base_url.is_some() {
                debug!("Ignoring --base-url for remote source {source}");
            }
            return Ok(DocumentSource::Remote(Url::parse(source)?));
        }

        let base_url = base_url.ok_or(DocumentError::MissingBaseUrl)?;
        Ok(DocumentSource::File {
            path: PathBuf::from(source),
            base_url: Url::parse(base_url)?,
        })
    }
}

/// Loads and parses the start page.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched (any non-200 answer
/// included) or the file cannot be read.
pub async fn load_document(source: &DocumentSource, fetcher: &PageFetcher) -> Result<LiveDocument> {
    match source {
        DocumentSource::Remote(url) => {
            let markup = fetcher
                .fetch(url)
                .await
                .with_context(|| format!("Failed to fetch start page {url}"))?;
            Ok(LiveDocument::parse(&markup, url.clone()))
        }
        DocumentSource::File { path, base_url } => {
            let markup = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| DocumentError::Read {
                    path: path.clone(),
                    source,
                })?;
            Ok(LiveDocument::parse(&markup, base_url.clone()))
        }
    }
}
