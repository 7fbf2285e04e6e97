//! Wikipedia article scraper.
//!
//! Reads the infobox of a drama's article (writers, directors, network) and
//! the prose under its "Synopsis" or "Plot" heading.
//!
//! Article markup is inconsistent, so every step tolerates absence:
//!
//! - the infobox is looked up through an ordered chain of selectors
//! - a writer/director cell is either a `div.plainlist` list or plain text
//! - any section may be missing, which leaves that field `None`
//!
//! A page without any infobox yields no data at all. That is an ordinary
//! outcome for this site, not an error.

use crate::enrich::BiographyLookup;
use crate::fetch::PageSource;
use crate::models::BiographyFields;
use crate::utils::{element_text, truncate_for_log};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, instrument, warn};

pub const WRITER_LABEL: &str = "Written by";
pub const DIRECTOR_LABEL: &str = "Directed by";
pub const NETWORK_LABEL: &str = "Network";

/// Section anchors tried in order for the synopsis.
pub const SYNOPSIS_ANCHORS: [&str; 2] = ["Synopsis", "Plot"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

/// Most specific first.
static INFOBOX_CHAIN: Lazy<[Selector; 3]> = Lazy::new(|| {
    [
        selector("table.infobox.ib-tv.vevent"),
        selector("table.infobox.vevent"),
        selector("table.infobox"),
    ]
});

static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static LABEL: Lazy<Selector> = Lazy::new(|| selector("th.infobox-label"));
static DATA: Lazy<Selector> = Lazy::new(|| selector("td.infobox-data"));
static PLAINLIST: Lazy<Selector> = Lazy::new(|| selector("div.plainlist"));
static LIST_ENTRY: Lazy<Selector> = Lazy::new(|| selector("li"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a"));

/// First infobox matched by the fallback chain.
pub fn find_infobox(document: &Html) -> Option<ElementRef<'_>> {
    INFOBOX_CHAIN
        .iter()
        .find_map(|candidate| document.select(candidate).next())
}

/// Extract infobox fields and synopsis, or `None` when the page has no infobox.
pub fn extract_biography(document: &Html) -> Option<BiographyFields> {
    let infobox = find_infobox(document)?;
    let mut fields = BiographyFields::default();

    for row in infobox.select(&ROW) {
        let Some(label) = row.select(&LABEL).next() else {
            continue;
        };
        let label = element_text(label);
        let cell = row.select(&DATA).next();

        match label.as_str() {
            WRITER_LABEL => fields.writers = cell.map(cell_names),
            DIRECTOR_LABEL => fields.directors = cell.map(cell_names),
            NETWORK_LABEL => fields.network = cell.map(element_text),
            _ => {}
        }
    }

    fields.synopsis = extract_synopsis(document);
    Some(fields)
}

/// Names in a writer/director cell.
///
/// A `div.plainlist` cell yields one name per `li`, preferring the link text
/// inside the entry. Any other cell is one name.
fn cell_names(cell: ElementRef<'_>) -> Vec<String> {
    match cell.select(&PLAINLIST).next() {
        Some(list) => list
            .select(&LIST_ENTRY)
            .map(|entry| match entry.select(&LINK).next() {
                Some(link) => element_text(link),
                None => element_text(entry),
            })
            .collect(),
        None => vec![element_text(cell)],
    }
}

fn is_heading(element: ElementRef<'_>) -> bool {
    let value = element.value();
    matches!(value.name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
        || (value.name() == "div" && value.classes().any(|class| class == "mw-heading"))
}

/// The block whose siblings hold the section body.
///
/// The anchor id sits on the heading itself, on a span inside it, or on a
/// heading wrapped in `div.mw-heading`.
fn heading_block(anchor: ElementRef<'_>) -> ElementRef<'_> {
    match anchor.parent().and_then(ElementRef::wrap) {
        Some(parent) if is_heading(parent) => parent,
        _ => anchor,
    }
}

/// Paragraphs following the synopsis heading, up to the next heading.
fn extract_synopsis(document: &Html) -> Option<String> {
    let anchor = SYNOPSIS_ANCHORS.iter().find_map(|id| {
        let by_id = Selector::parse(&format!("[id=\"{id}\"]")).ok()?;
        document.select(&by_id).next()
    })?;

    let mut paragraphs = Vec::new();
    for sibling in heading_block(anchor).next_siblings().filter_map(ElementRef::wrap) {
        if is_heading(sibling) {
            break;
        }
        if sibling.value().name() == "p" {
            let text = element_text(sibling);
            if !text.is_empty() {
                paragraphs.push(text);
            }
        }
    }
    Some(paragraphs.join(" ").trim().to_string())
}

/// Fetches articles through a [`PageSource`] and extracts their fields.
///
/// Fetch failures and pages without an infobox both come back as `None`.
#[derive(Debug)]
pub struct WikipediaLookup<'a, P> {
    source: &'a P,
}

impl<'a, P: PageSource> WikipediaLookup<'a, P> {
    pub fn new(source: &'a P) -> Self {
        Self { source }
    }
}

impl<P: PageSource> BiographyLookup for WikipediaLookup<'_, P> {
    #[instrument(level = "info", skip(self))]
    async fn lookup(&self, url: &str) -> Option<BiographyFields> {
        let html = match self.source.fetch(url).await {
            Ok(html) => html,
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Article fetch failed; skipping");
                return None;
            }
            Err(e) => {
                error!(error = %e, "Article lookup failed; skipping");
                return None;
            }
        };

        let document = Html::parse_document(&html);
        match extract_biography(&document) {
            Some(fields) => {
                debug!(
                    writers = ?fields.writers,
                    directors = ?fields.directors,
                    network = ?fields.network,
                    plot = %truncate_for_log(fields.synopsis.as_deref().unwrap_or(""), 120),
                    "Extracted infobox"
                );
                Some(fields)
            }
            None => {
                warn!("No infobox on article; skipping");
                None
            }
        }
    }
}
