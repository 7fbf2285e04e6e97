//! Text cleanup and small filesystem helpers shared by the scrapers and outputs.
//!
//! - Title normalization (rank prefix removal) and episode-count parsing
//! - Whitespace-collapsed element text for DOM extraction
//! - Log-friendly truncation of long strings
//! - Parent-directory creation before writing output files

use crate::error::{Result, ScrapeError};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

static RANK_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s+(.*)").expect("invalid regex: rank prefix"));

/// Strip a leading rank such as `"12. "` from a listing title.
///
/// Everything after the first period-plus-whitespace is kept, so
/// `"1. Mr. Sunshine"` becomes `"Mr. Sunshine"`. Titles without such a
/// separator are only trimmed.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_title("12. My Drama"), "My Drama");
/// assert_eq!(normalize_title("  No Period Here "), "No Period Here");
/// ```
pub fn normalize_title(raw: &str) -> String {
    match RANK_PREFIX.captures(raw).and_then(|caps| caps.get(1)) {
        Some(rest) => rest.as_str().trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Parse IMDb episode text like `"16 eps"` into a count.
///
/// # Errors
///
/// [`ScrapeError::Format`] when the text left after removing `"eps"` is not a
/// base-10 integer. Callers must not default this away.
pub fn parse_episode_count(raw: &str) -> Result<u32> {
    let cleaned = raw.replace("eps", "");
    cleaned
        .trim()
        .parse::<u32>()
        .map_err(|source| ScrapeError::Format {
            raw: raw.to_string(),
            source,
        })
}

/// Text content of an element with runs of whitespace collapsed to one space.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (moved back to a char boundary) with
/// `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Make sure the directory that will hold `path` exists.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
        debug!(dir = %parent.display(), "Output directory ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_normalize_title_strips_rank() {
        assert_eq!(normalize_title("12. My Drama"), "My Drama");
        assert_eq!(normalize_title("1.   Reply 1988  "), "Reply 1988");
    }

    #[test]
    fn test_normalize_title_without_prefix() {
        assert_eq!(normalize_title("No Period Here"), "No Period Here");
        assert_eq!(normalize_title("  Goblin "), "Goblin");
        assert_eq!(normalize_title("Version 2.0"), "Version 2.0");
    }

    #[test]
    fn test_normalize_title_keeps_remainder_after_first_separator() {
        assert_eq!(normalize_title("3. Mr. Sunshine"), "Mr. Sunshine");
        assert_eq!(normalize_title("Dr. Romantic"), "Romantic");
    }

    #[test]
    fn test_parse_episode_count() {
        assert_eq!(parse_episode_count("16 eps").unwrap(), 16);
        assert_eq!(parse_episode_count("20eps").unwrap(), 20);
        assert_eq!(parse_episode_count(" 8 ").unwrap(), 8);
    }

    #[test]
    fn test_parse_episode_count_rejects_non_numbers() {
        assert!(matches!(
            parse_episode_count("eps"),
            Err(ScrapeError::Format { .. })
        ));
        assert!(matches!(
            parse_episode_count("1 ep"),
            Err(ScrapeError::Format { .. })
        ));
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<div>\n  Two <b>friends</b>\n meet   again. </div>");
        let selector = Selector::parse("div").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(element_text(div), "Two friends meet again.");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let long = "a".repeat(500);
        let result = truncate_for_log(&long, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.ends_with("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let result = truncate_for_log("드라마드라마", 4);
        assert!(result.starts_with("드"));
    }

    #[tokio::test]
    async fn test_ensure_parent_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data/out/list.csv");
        ensure_parent_dir(&target).await.unwrap();
        assert!(dir.path().join("data/out").is_dir());
    }
}
