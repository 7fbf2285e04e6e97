//! Data models for scraped listings and their Wikipedia enrichment.
//!
//! - [`ListingRecord`]: one drama as it appears on an IMDb list page
//! - [`BiographyFields`]: what a Wikipedia infobox yielded for one article
//! - [`Enrichment`]: the flattened columns merged into a record
//! - [`EnrichedRecord`]: a listing record plus optional enrichment
//!
//! All values are owned; nothing here is shared or mutated after a run
//! hands it to the CSV writer.

/// Where a rating score came from. IMDb is the only source today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RatingKind {
    #[default]
    Imdb,
}

impl RatingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingKind::Imdb => "imdb",
        }
    }
}

/// A drama entry extracted from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    /// Title with the rank prefix ("12. ") removed.
    pub title: String,
    /// Release year text, copied verbatim (e.g. "2016" or "2016–2017").
    pub release_year: String,
    pub episode_count: u32,
    pub rating_kind: RatingKind,
    /// Empty when the item carried no rating.
    pub rating_score: String,
    /// Credited cast in document order; empty, never absent.
    pub cast: Vec<String>,
    pub short_description: String,
}

/// Fields read from an article's infobox and synopsis section.
///
/// `None` means the section was not found, which is different from a section
/// that was found but empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiographyFields {
    pub writers: Option<Vec<String>>,
    pub directors: Option<Vec<String>>,
    pub network: Option<String>,
    pub synopsis: Option<String>,
}

/// Enrichment columns as they are written to the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub network_provider: String,
    /// Writers joined with ", ".
    pub screenwriter: String,
    /// Directors joined with ", ".
    pub director: String,
    pub plot: String,
    /// The article URL the fields were read from.
    pub source: String,
}

impl Enrichment {
    /// Flatten extracted fields, leaving missing sections blank.
    pub fn from_biography(fields: BiographyFields, source: &str) -> Self {
        Self {
            network_provider: fields.network.unwrap_or_default(),
            screenwriter: fields.writers.unwrap_or_default().join(", "),
            director: fields.directors.unwrap_or_default().join(", "),
            plot: fields.synopsis.unwrap_or_default(),
            source: source.to_string(),
        }
    }
}

/// A listing record with optional enrichment.
///
/// `enrichment` stays `None` when no article was mapped or the lookup came
/// back empty, so "not attempted" never looks like "attempted but blank".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub listing: ListingRecord,
    pub enrichment: Option<Enrichment>,
}

impl From<ListingRecord> for EnrichedRecord {
    fn from(listing: ListingRecord) -> Self {
        Self {
            listing,
            enrichment: None,
        }
    }
}
