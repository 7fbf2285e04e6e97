//! Command-line interface definitions for kdrama_scrape.
//!
//! Two commands mirror the two ways the dataset gets built: `scrape` runs the
//! whole pipeline from IMDb lists, `enrich` adds Wikipedia columns to a CSV
//! that already exists.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for kdrama_scrape.
///
/// # Examples
///
/// ```sh
/// # Scrape the configured IMDb lists and enrich them
/// kdrama_scrape scrape --config scrape.yaml
///
/// # Only add Wikipedia columns to an existing dataset
/// kdrama_scrape enrich -i data/kdrama_list.csv -o data/kdrama_list_with_wiki.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape IMDb lists, enrich from Wikipedia and write the dataset
    Scrape(ScrapeArgs),
    /// Add Wikipedia columns to an existing dataset
    Enrich(EnrichArgs),
}

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "KDRAMA_SCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output CSV file
    #[arg(short, long, default_value = "data/kdrama_list.csv")]
    pub output: PathBuf,

    /// JSON list of {title: article URL} objects
    #[arg(short, long, default_value = "data/wikipedia_list.json")]
    pub title_index: PathBuf,

    /// Write IMDb columns only, without Wikipedia lookups
    #[arg(long)]
    pub skip_enrichment: bool,
}

#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "KDRAMA_SCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Existing CSV to enrich
    #[arg(short, long, default_value = "data/kdrama_list.csv")]
    pub input: PathBuf,

    /// JSON list of {title: article URL} objects
    #[arg(short, long, default_value = "data/wikipedia_list.json")]
    pub title_index: PathBuf,

    /// Enriched CSV to write
    #[arg(short, long, default_value = "data/kdrama_list_with_wiki.csv")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_defaults() {
        let cli = Cli::parse_from(["kdrama_scrape", "scrape"]);
        let Command::Scrape(args) = cli.command else {
            panic!("expected scrape command");
        };
        assert_eq!(args.output, PathBuf::from("data/kdrama_list.csv"));
        assert_eq!(args.title_index, PathBuf::from("data/wikipedia_list.json"));
        assert!(!args.skip_enrichment);
    }

    #[test]
    fn test_enrich_short_flags() {
        let cli = Cli::parse_from([
            "kdrama_scrape",
            "enrich",
            "-i",
            "/tmp/in.csv",
            "-t",
            "/tmp/index.json",
            "-o",
            "/tmp/out.csv",
        ]);
        let Command::Enrich(args) = cli.command else {
            panic!("expected enrich command");
        };
        assert_eq!(args.input, PathBuf::from("/tmp/in.csv"));
        assert_eq!(args.title_index, PathBuf::from("/tmp/index.json"));
        assert_eq!(args.output, PathBuf::from("/tmp/out.csv"));
    }

    #[test]
    fn test_scrape_skip_enrichment_flag() {
        let cli = Cli::parse_from(["kdrama_scrape", "scrape", "--skip-enrichment", "-o", "x.csv"]);
        let Command::Scrape(args) = cli.command else {
            panic!("expected scrape command");
        };
        assert!(args.skip_enrichment);
        assert_eq!(args.output, PathBuf::from("x.csv"));
    }
}
