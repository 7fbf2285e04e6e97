//! CSV dataset reading and writing.
//!
//! Rows are kept as column -> value maps so an existing file can be read,
//! enriched and written back with its own columns intact. Typed records are
//! flattened into the same shape with [`CsvTable::from_records`].
//!
//! Multi-value fields (cast, writers, directors) are stored joined with
//! `", "` and read back as that joined string.

use crate::enrich::Enrich;
use crate::error::{Result, ScrapeError};
use crate::models::{EnrichedRecord, Enrichment};
use crate::utils::ensure_parent_dir;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const BASE_COLUMNS: [&str; 7] = [
    "title",
    "release_year",
    "num_episodes",
    "rating_type",
    "rating_score",
    "cast",
    "short_description",
];

pub const ENRICHMENT_COLUMNS: [&str; 5] = ["network_provider", "screenwriter", "director", "plot", "source"];

/// One data row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    cells: HashMap<String, String>,
}

impl CsvRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.cells.insert(column.to_string(), value.into());
    }
}

impl From<&EnrichedRecord> for CsvRow {
    fn from(record: &EnrichedRecord) -> Self {
        let listing = &record.listing;
        let mut row = CsvRow::default();
        row.set("title", listing.title.as_str());
        row.set("release_year", listing.release_year.as_str());
        row.set("num_episodes", listing.episode_count.to_string());
        row.set("rating_type", listing.rating_kind.as_str());
        row.set("rating_score", listing.rating_score.as_str());
        row.set("cast", listing.cast.join(", "));
        row.set("short_description", listing.short_description.as_str());
        if let Some(enrichment) = &record.enrichment {
            row.apply(enrichment.clone());
        }
        row
    }
}

impl Enrich for CsvRow {
    fn title(&self) -> &str {
        self.get("title").unwrap_or("")
    }

    fn apply(&mut self, enrichment: Enrichment) {
        self.set("network_provider", enrichment.network_provider);
        self.set("screenwriter", enrichment.screenwriter);
        self.set("director", enrichment.director);
        self.set("plot", enrichment.plot);
        self.set("source", enrichment.source);
    }
}

/// A header row plus data rows, held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    /// Flatten records; enrichment columns are included only when asked for.
    pub fn from_records(records: &[EnrichedRecord], include_enrichment: bool) -> Self {
        let mut table = CsvTable {
            headers: BASE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(CsvRow::from).collect(),
        };
        if include_enrichment {
            table.extend_headers(&ENRICHMENT_COLUMNS);
        }
        table
    }

    /// Append the columns that are not already in the header.
    pub fn extend_headers(&mut self, extra: &[&str]) {
        for column in extra {
            if !self.headers.iter().any(|h| h == column) {
                self.headers.push(column.to_string());
            }
        }
    }

    /// Read a header row and its data rows.
    ///
    /// Short rows leave the trailing columns absent.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::RowWidth`] for a row with more cells than the header.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(ScrapeError::RowWidth {
                    line: record.position().map_or(0, |p| p.line()),
                    cells: record.len(),
                    columns: headers.len(),
                });
            }
            let cells = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect();
            rows.push(CsvRow { cells });
        }
        Ok(Self { headers, rows })
    }

    /// Write the header and every row; missing cells are blank.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(self.headers.iter().map(|h| row.get(h).unwrap_or("")))?;
        }
        writer.flush()?;
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).await?;
        let table = Self::read_from(bytes.as_slice())?;
        info!(rows = table.rows.len(), columns = table.headers.len(), "Loaded CSV");
        Ok(table)
    }

    /// Serialize in memory, then write the file in one go.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn save(&self, path: &Path) -> Result<()> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        ensure_parent_dir(path).await?;
        fs::write(path, buffer).await?;
        info!(rows = self.rows.len(), "Wrote CSV");
        Ok(())
    }
}
