//! # kdrama_scrape
//!
//! Builds a Korean drama dataset by scraping ranked IMDb lists and enriching
//! each title with writer, director, network and plot data from its Wikipedia
//! article.
//!
//! ## Usage
//!
//! ```sh
//! kdrama_scrape scrape --config scrape.yaml -o data/kdrama_list.csv
//! kdrama_scrape enrich -i data/kdrama_list.csv -o data/kdrama_list_with_wiki.csv
//! ```
//!
//! ## Pipeline
//!
//! 1. **Listing**: fetch each configured IMDb list (waiting for client-side
//!    rendering where needed) and extract one record per item
//! 2. **Enrichment**: look titles up in the title -> article index and read
//!    the article infobox, one title at a time
//! 3. **Output**: write the CSV once, from memory, at the end
//!
//! Progress lines go to stdout; logs go to stderr.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod enrich;
mod error;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::{Cli, Command, EnrichArgs, ScrapeArgs};
use config::ScrapeConfig;
use enrich::{TitleUrlIndex, enrich_all};
use fetch::{HttpPageSource, PageSource};
use models::EnrichedRecord;
use outputs::csv::{CsvTable, ENRICHMENT_COLUMNS};
use scrapers::wikipedia::WikipediaLookup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Scrape(args) => run_scrape(args).await?,
        Command::Enrich(args) => run_enrich(args).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Scrape every configured list, enrich, and write the dataset.
#[instrument(level = "info", skip_all)]
async fn run_scrape(args: ScrapeArgs) -> Result<(), Box<dyn Error>> {
    let config = ScrapeConfig::load(args.config.as_deref()).await?;
    let source = HttpPageSource::new(&config)?;

    let listings = scrapers::imdb::scrape_all(&source, &config).await?;
    let mut records: Vec<EnrichedRecord> = listings.into_iter().map(EnrichedRecord::from).collect();
    info!(count = records.len(), "Dramas scraped");

    if !args.skip_enrichment {
        let index = TitleUrlIndex::load(&args.title_index).await?;
        if index.is_empty() {
            warn!(path = %args.title_index.display(), "Title index is empty; no dramas will be enriched");
        }
        let lookup = WikipediaLookup::new(&source);
        let summary = enrich_all(&mut records, &index, &lookup, config.chunk_size).await;
        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            "Wikipedia enrichment finished"
        );
    }

    let table = CsvTable::from_records(&records, !args.skip_enrichment);
    table.save(&args.output).await?;
    println!("Wrote {} dramas to {}", records.len(), args.output.display());
    Ok(())
}

/// Add Wikipedia columns to an existing dataset, keeping its own columns.
#[instrument(level = "info", skip_all)]
async fn run_enrich(args: EnrichArgs) -> Result<(), Box<dyn Error>> {
    let config = ScrapeConfig::load(args.config.as_deref()).await?;

    println!("Loading Wikipedia mapping from {}", args.title_index.display());
    let index = TitleUrlIndex::load(&args.title_index).await?;

    let source = HttpPageSource::new(&config)?;
    enrich_dataset(&source, &index, &args.input, &args.output, config.chunk_size).await?;
    Ok(())
}

/// Enrich the rows of `input` and write them to `output`.
///
/// Returns `false` without writing anything when `input` has no data rows.
async fn enrich_dataset<P: PageSource>(
    source: &P,
    index: &TitleUrlIndex,
    input: &Path,
    output: &Path,
    chunk_size: usize,
) -> error::Result<bool> {
    println!("Loading input CSV from {}", input.display());
    let mut table = CsvTable::load(input).await?;
    if table.rows.is_empty() {
        warn!(path = %input.display(), "Input CSV has no rows");
        println!("No rows found in input CSV. Nothing to enrich.");
        return Ok(false);
    }
    println!("Loaded {} dramas from {}", table.rows.len(), input.display());

    table.extend_headers(&ENRICHMENT_COLUMNS);
    let lookup = WikipediaLookup::new(source);
    enrich_all(&mut table.rows, index, &lookup, chunk_size).await;

    println!("Writing enriched CSV to {}", output.display());
    table.save(output).await?;
    println!("Done enriching drama list with Wikipedia data.");
    Ok(true)
}
