//! Joining scraped records with Wikipedia data.
//!
//! A record is enriched when its title has an entry in the [`TitleUrlIndex`]
//! and the [`BiographyLookup`] for that URL yields fields. Anything else leaves
//! the record exactly as it was.
//!
//! Title matching is exact and case-sensitive. A title spelled differently on
//! IMDb and in the index is simply not enriched.

use crate::error::{Result, ScrapeError};
use crate::models::{BiographyFields, EnrichedRecord, Enrichment};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Title -> article URL, built once per run from the title index file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleUrlIndex {
    urls: HashMap<String, String>,
}

impl TitleUrlIndex {
    /// Parse `[{"Title": "https://..."}, ...]`.
    ///
    /// Later entries win over earlier ones with the same title. Entries whose
    /// URL does not parse are skipped with a warning.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::IndexFormat`] for an element that is not an object with
    /// exactly one string value.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let entries: Vec<serde_json::Map<String, Value>> = serde_json::from_str(text)?;
        let mut urls = HashMap::with_capacity(entries.len());

        for (position, entry) in entries.into_iter().enumerate() {
            if entry.len() != 1 {
                return Err(ScrapeError::IndexFormat { position });
            }
            let Some((title, Value::String(url))) = entry.into_iter().next() else {
                return Err(ScrapeError::IndexFormat { position });
            };
            if let Err(e) = Url::parse(&url) {
                warn!(%title, %url, error = %e, "Skipping title index entry with invalid URL");
                continue;
            }
            urls.insert(title, url);
        }

        Ok(Self { urls })
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let index = Self::from_json_str(&text)?;
        info!(titles = index.len(), "Loaded title index");
        Ok(index)
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.urls.get(title).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

#[cfg(test)]
impl<T: Into<String>, U: Into<String>> FromIterator<(T, U)> for TitleUrlIndex {
    fn from_iter<I: IntoIterator<Item = (T, U)>>(iter: I) -> Self {
        Self {
            urls: iter
                .into_iter()
                .map(|(title, url)| (title.into(), url.into()))
                .collect(),
        }
    }
}

/// Resolves an article URL to its extracted fields, or `None` for "no data".
pub trait BiographyLookup {
    async fn lookup(&self, url: &str) -> Option<BiographyFields>;
}

/// Something that can receive enrichment columns.
pub trait Enrich {
    /// Title used as the index key.
    fn title(&self) -> &str;
    fn apply(&mut self, enrichment: Enrichment);
}

impl Enrich for EnrichedRecord {
    fn title(&self) -> &str {
        &self.listing.title
    }

    fn apply(&mut self, enrichment: Enrichment) {
        self.enrichment = Some(enrichment);
    }
}

/// What happened to a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// Blank title or no index entry; no lookup was made.
    NotIndexed,
    /// Lookup made but it produced nothing.
    NoData,
    Enriched,
}

/// Enrich one record in place.
pub async fn enrich_one<R, L>(record: &mut R, index: &TitleUrlIndex, lookup: &L) -> EnrichOutcome
where
    R: Enrich,
    L: BiographyLookup,
{
    let title = record.title().trim();
    if title.is_empty() {
        return EnrichOutcome::NotIndexed;
    }
    let Some(url) = index.get(title) else {
        debug!(%title, "No article mapped for title");
        return EnrichOutcome::NotIndexed;
    };

    match lookup.lookup(url).await {
        Some(fields) => {
            record.apply(Enrichment::from_biography(fields, url));
            EnrichOutcome::Enriched
        }
        None => EnrichOutcome::NoData,
    }
}

/// Totals over a whole enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub attempted: usize,
    pub succeeded: usize,
}

/// Enrich `records` in order, reporting progress after every `chunk_size` rows.
///
/// Chunking only groups the progress lines; records are still handled one at
/// a time in their original order.
#[instrument(level = "info", skip_all, fields(total = records.len(), chunk_size = chunk_size))]
pub async fn enrich_all<R, L>(
    records: &mut [R],
    index: &TitleUrlIndex,
    lookup: &L,
    chunk_size: usize,
) -> EnrichSummary
where
    R: Enrich,
    L: BiographyLookup,
{
    let chunk_size = chunk_size.max(1);
    let mut summary = EnrichSummary::default();

    for (chunk_index, chunk) in records.chunks_mut(chunk_size).enumerate() {
        let first = chunk_index * chunk_size + 1;
        let last = first + chunk.len() - 1;
        let mut attempted = 0usize;
        let mut succeeded = 0usize;

        for record in chunk.iter_mut() {
            match enrich_one(record, index, lookup).await {
                EnrichOutcome::NotIndexed => {}
                EnrichOutcome::NoData => attempted += 1,
                EnrichOutcome::Enriched => {
                    attempted += 1;
                    succeeded += 1;
                }
            }
        }

        println!(
            "Chunk {}: rows {}-{} | attempted {} Wikipedia lookups | successes {}",
            chunk_index + 1,
            first,
            last,
            attempted,
            succeeded
        );
        info!(chunk = chunk_index + 1, first, last, attempted, succeeded, "Enriched chunk");

        summary.attempted += attempted;
        summary.succeeded += succeeded;
    }

    info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        "Enrichment complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingRecord, RatingKind};
    use std::cell::RefCell;

    /// Serves fixed fields per URL and records every lookup.
    #[derive(Default)]
    struct StubLookup {
        fields: HashMap<String, BiographyFields>,
        calls: RefCell<Vec<String>>,
    }

    impl StubLookup {
        fn with(mut self, url: &str, fields: BiographyFields) -> Self {
            self.fields.insert(url.to_string(), fields);
            self
        }
    }

    impl BiographyLookup for StubLookup {
        async fn lookup(&self, url: &str) -> Option<BiographyFields> {
            self.calls.borrow_mut().push(url.to_string());
            self.fields.get(url).cloned()
        }
    }

    fn record(title: &str) -> EnrichedRecord {
        EnrichedRecord::from(ListingRecord {
            title: title.to_string(),
            release_year: "2016".to_string(),
            episode_count: 16,
            rating_kind: RatingKind::Imdb,
            rating_score: "8.4".to_string(),
            cast: vec!["Lee Je-hoon".to_string()],
            short_description: String::new(),
        })
    }

    fn signal_fields() -> BiographyFields {
        BiographyFields {
            writers: Some(vec!["Kim Eun-hee".to_string(), "Lee Soo-yeon".to_string()]),
            directors: Some(vec!["Kim Won-seok".to_string()]),
            network: Some("tvN".to_string()),
            synopsis: Some("A radio links two eras.".to_string()),
        }
    }

    const SIGNAL_URL: &str = "https://en.wikipedia.org/wiki/Signal_(TV_series)";

    #[test]
    fn test_index_last_write_wins() {
        let json = r#"[
            {"Signal": "https://en.wikipedia.org/wiki/Signal"},
            {"Goblin": "https://en.wikipedia.org/wiki/Guardian:_The_Lonely_and_Great_God"},
            {"Signal": "https://en.wikipedia.org/wiki/Signal_(TV_series)"}
        ]"#;
        let index = TitleUrlIndex::from_json_str(json).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Signal"), Some(SIGNAL_URL));
        assert_eq!(index.get("signal"), None);
    }

    #[test]
    fn test_index_rejects_multi_key_objects() {
        let json = r#"[{"A": "https://a.example/"}, {"B": "https://b.example/", "C": "https://c.example/"}]"#;
        let err = TitleUrlIndex::from_json_str(json).unwrap_err();
        assert!(matches!(err, ScrapeError::IndexFormat { position: 1 }));
    }

    #[test]
    fn test_index_rejects_non_string_url() {
        let err = TitleUrlIndex::from_json_str(r#"[{"A": 3}]"#).unwrap_err();
        assert!(matches!(err, ScrapeError::IndexFormat { position: 0 }));
    }

    #[test]
    fn test_index_skips_invalid_urls() {
        let index = TitleUrlIndex::from_json_str(r#"[{"A": "not a url"}, {"B": "https://b.example/"}]"#).unwrap();
        assert_eq!(index.get("A"), None);
        assert_eq!(index.get("B"), Some("https://b.example/"));
    }

    #[tokio::test]
    async fn test_index_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikipedia_list.json");
        tokio::fs::write(&path, format!(r#"[{{"Signal": "{SIGNAL_URL}"}}]"#))
            .await
            .unwrap();
        let index = TitleUrlIndex::load(&path).await.unwrap();
        assert_eq!(index.get("Signal"), Some(SIGNAL_URL));
    }

    #[tokio::test]
    async fn test_unindexed_title_is_untouched() {
        let index = TitleUrlIndex::default();
        let lookup = StubLookup::default();
        let mut rec = record("Signal");
        let outcome = enrich_one(&mut rec, &index, &lookup).await;
        assert_eq!(outcome, EnrichOutcome::NotIndexed);
        assert!(rec.enrichment.is_none());
        assert!(lookup.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_no_data_leaves_record_unchanged() {
        let index: TitleUrlIndex = [("Signal", SIGNAL_URL)].into_iter().collect();
        let lookup = StubLookup::default();
        let mut rec = record("Signal");
        let before = rec.clone();
        assert_eq!(enrich_one(&mut rec, &index, &lookup).await, EnrichOutcome::NoData);
        assert_eq!(rec, before);
    }

    #[tokio::test]
    async fn test_enriches_mapped_title() {
        let index: TitleUrlIndex = [("Signal", SIGNAL_URL)].into_iter().collect();
        let lookup = StubLookup::default().with(SIGNAL_URL, signal_fields());
        let mut rec = record("Signal");
        assert_eq!(enrich_one(&mut rec, &index, &lookup).await, EnrichOutcome::Enriched);

        let enrichment = rec.enrichment.unwrap();
        assert_eq!(enrichment.network_provider, "tvN");
        assert_eq!(enrichment.screenwriter, "Kim Eun-hee, Lee Soo-yeon");
        assert_eq!(enrichment.director, "Kim Won-seok");
        assert_eq!(enrichment.plot, "A radio links two eras.");
        assert_eq!(enrichment.source, SIGNAL_URL);
    }

    #[tokio::test]
    async fn test_enrichment_is_idempotent() {
        let index: TitleUrlIndex = [("Signal", SIGNAL_URL)].into_iter().collect();
        let lookup = StubLookup::default().with(SIGNAL_URL, signal_fields());

        let mut once = record("Signal");
        enrich_one(&mut once, &index, &lookup).await;
        let mut twice = once.clone();
        enrich_one(&mut twice, &index, &lookup).await;
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_enrich_all_counts_and_keeps_order() {
        let index: TitleUrlIndex = [
            ("Signal", SIGNAL_URL),
            ("Goblin", "https://en.wikipedia.org/wiki/Goblin"),
        ]
        .into_iter()
        .collect();
        let lookup = StubLookup::default().with(SIGNAL_URL, signal_fields());

        let mut records = vec![record("Signal"), record("Misaeng"), record("Goblin"), record("  ")];
        let summary = enrich_all(&mut records, &index, &lookup, 2).await;

        assert_eq!(summary, EnrichSummary { attempted: 2, succeeded: 1 });
        assert!(records[0].enrichment.is_some());
        assert!(records[1].enrichment.is_none());
        assert!(records[2].enrichment.is_none());
        assert_eq!(
            *lookup.calls.borrow(),
            vec![SIGNAL_URL.to_string(), "https://en.wikipedia.org/wiki/Goblin".to_string()]
        );
    }
}
