//! Scrapers for the two sites the dataset is built from.
//!
//! | Site | Module | Page kind | Output |
//! |------|--------|-----------|--------|
//! | IMDb | [`imdb`] | ranked list page | [`ListingRecord`](crate::models::ListingRecord)s |
//! | Wikipedia | [`wikipedia`] | article page | [`BiographyFields`](crate::models::BiographyFields) |
//!
//! Both follow the same shape: a pure extractor over a parsed [`scraper::Html`]
//! document, plus a thin async wrapper that gets the markup from a
//! [`PageSource`](crate::fetch::PageSource). Only the wrappers touch the network.

use crate::error::{Result, ScrapeError};
use scraper::Selector;

pub mod imdb;
pub mod wikipedia;

/// Compile a selector that came from configuration.
pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
