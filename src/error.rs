//! Error taxonomy for scraping, extraction and dataset I/O.
//!
//! Fetch and structure failures are expected for a share of the inputs and are
//! recovered inside the enrichment lookup. Missing mandatory listing fields
//! follow the configured [`MissingFieldPolicy`](crate::config::MissingFieldPolicy),
//! and malformed episode counts always propagate.

use std::num::ParseIntError;
use thiserror::Error;

/// Everything that can go wrong between fetching a page and writing the CSV.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport error or non-success response.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// An expected container or infobox is absent from the markup.
    #[error("expected structure not found: {0}")]
    StructureNotFound(String),

    /// A listing item lacks a field every record depends on.
    #[error("listing item {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// Episode text that is not a base-10 integer once "eps" is removed.
    #[error("episode count {raw:?} is not an integer")]
    Format {
        raw: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid request header {name:?}")]
    Header { name: String },

    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("title index entry {position} is not a single title -> url object")]
    IndexFormat { position: usize },

    /// A CSV data row with more cells than the header has columns.
    #[error("CSV row on line {line} has {cells} cells but the header has {columns} columns")]
    RowWidth { line: u64, cells: usize, columns: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    /// True for failures the enrichment step treats as "no data".
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScrapeError::Fetch { .. } | ScrapeError::StructureNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
