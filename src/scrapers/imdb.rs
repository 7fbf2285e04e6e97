//! IMDb list page scraper.
//!
//! A list page is a `ul` container of `li.ipc-metadata-list-summary-item`
//! entries. Each entry carries a ranked title (`"12. Signal"`), two metadata
//! spans (release year, then episode count), an optional star rating, the
//! credited cast and a short plot blurb.
//!
//! Title and metadata spans are mandatory; everything else degrades to empty
//! values. What happens to an item without its mandatory fields is decided by
//! [`MissingFieldPolicy`].

use crate::config::{ListingSelectorConfig, ListingSource, MissingFieldPolicy, Render, ScrapeConfig};
use crate::error::{Result, ScrapeError};
use crate::fetch::{PageSource, fetch_rendered};
use crate::models::{ListingRecord, RatingKind};
use crate::scrapers::parse_selector;
use crate::utils::{element_text, normalize_title, parse_episode_count};
use futures::stream::{self, StreamExt, TryStreamExt};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

/// Compiled selectors for one listing page.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    container: Selector,
    item: Selector,
    title: Selector,
    metadata: Selector,
    rating: Selector,
    cast: Selector,
    description: Selector,
}

impl ListingSelectors {
    pub fn new(container: &str, config: &ListingSelectorConfig) -> Result<Self> {
        Ok(Self {
            container: parse_selector(container)?,
            item: parse_selector(&config.item)?,
            title: parse_selector(&config.title)?,
            metadata: parse_selector(&config.metadata)?,
            rating: parse_selector(&config.rating)?,
            cast: parse_selector(&config.cast)?,
            description: parse_selector(&config.description)?,
        })
    }

    pub fn container(&self) -> &Selector {
        &self.container
    }
}

/// Extract one record per list item, in page order.
///
/// # Errors
///
/// - [`ScrapeError::StructureNotFound`] when the list container is absent
/// - [`ScrapeError::MissingField`] for an item without title or metadata
///   spans, unless `policy` is [`MissingFieldPolicy::Skip`]
/// - [`ScrapeError::Format`] for an unparseable episode count, regardless of
///   policy
pub fn extract_listing(
    document: &Html,
    selectors: &ListingSelectors,
    policy: MissingFieldPolicy,
) -> Result<Vec<ListingRecord>> {
    let container = document
        .select(&selectors.container)
        .next()
        .ok_or_else(|| ScrapeError::StructureNotFound("drama list container".to_string()))?;

    let mut records = Vec::new();
    for (index, item) in container.select(&selectors.item).enumerate() {
        match extract_item(item, index, selectors) {
            Ok(record) => records.push(record),
            Err(ScrapeError::MissingField { index, field })
                if policy == MissingFieldPolicy::Skip =>
            {
                warn!(index, missing = field, "Skipping listing item with missing field");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}

fn extract_item(item: ElementRef<'_>, index: usize, selectors: &ListingSelectors) -> Result<ListingRecord> {
    let title = item
        .select(&selectors.title)
        .next()
        .map(|h| normalize_title(&element_text(h)))
        .ok_or(ScrapeError::MissingField { index, field: "title" })?;

    let spans: Vec<String> = item.select(&selectors.metadata).take(2).map(element_text).collect();
    let [release_year, episodes] = <[String; 2]>::try_from(spans).map_err(|_| {
        ScrapeError::MissingField {
            index,
            field: "metadata spans",
        }
    })?;
    let episode_count = parse_episode_count(&episodes)?;

    let rating_score = item
        .select(&selectors.rating)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let cast = item.select(&selectors.cast).map(element_text).collect();

    let short_description = item
        .select(&selectors.description)
        .next()
        .map(element_text)
        .unwrap_or_default();

    Ok(ListingRecord {
        title,
        release_year,
        episode_count,
        rating_kind: RatingKind::Imdb,
        rating_score,
        cast,
        short_description,
    })
}

/// Fetch one configured list and extract its records.
#[instrument(level = "info", skip_all, fields(period = %listing.period, url = %listing.url))]
pub async fn scrape_listing<P: PageSource>(
    source: &P,
    listing: &ListingSource,
    config: &ScrapeConfig,
) -> Result<Vec<ListingRecord>> {
    let selectors = ListingSelectors::new(listing.container_selector(), &config.selectors)?;

    let html = match listing.render {
        Render::Static => source.fetch(&listing.url).await?,
        Render::Dynamic => {
            fetch_rendered(
                source,
                &listing.url,
                selectors.container(),
                config.container_wait(),
                config.container_poll(),
            )
            .await?
        }
    };

    let document = Html::parse_document(&html);
    let records = extract_listing(&document, &selectors, config.missing_field_policy)?;
    for record in &records {
        debug!(
            title = %record.title,
            year = %record.release_year,
            episodes = record.episode_count,
            rating = %record.rating_score,
            cast = ?record.cast,
            "Scraped drama"
        );
    }
    info!(count = records.len(), "Scraped IMDb list");
    Ok(records)
}

/// Scrape every configured list, one after another, in configuration order.
///
/// A list whose page cannot be fetched or lacks its container is logged and
/// contributes no records; the other lists still run. Any other error ends
/// the whole scrape.
#[instrument(level = "info", skip_all)]
pub async fn scrape_all<P: PageSource>(source: &P, config: &ScrapeConfig) -> Result<Vec<ListingRecord>> {
    let records: Vec<ListingRecord> = stream::iter(&config.listings)
        .then(|listing| async move {
            match scrape_listing(source, listing, config).await {
                Err(e) if e.is_recoverable() => {
                    warn!(period = %listing.period, url = %listing.url, error = %e, "Skipping IMDb list");
                    Ok(Vec::new())
                }
                other => other,
            }
        })
        .try_concat()
        .await?;

    info!(lists = config.listings.len(), count = records.len(), "Scraped all IMDb lists");
    Ok(records)
}
