//! Run configuration: listing sources, request headers, selectors and batching.
//!
//! The configuration is an explicit value handed to each component. It is read
//! from an optional YAML file; any field left out falls back to its default.
//!
//! ```yaml
//! listings:
//!   - period: 2010s
//!     url: https://www.imdb.com/list/ls565286034/
//!     render: dynamic
//!   - period: 2020s
//!     url: https://www.imdb.com/list/ls000000000/
//!     render: static
//! missing_field_policy: skip
//! chunk_size: 25
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Container of server-rendered list pages.
pub const STATIC_CONTAINER: &str = "ul.ipc-metadata-list.detailed-list-view";
/// Container that only appears once the list page has rendered client-side.
pub const DYNAMIC_CONTAINER: &str =
    "div[data-testid='list-page-mc-list-content'] ul.ipc-metadata-list";

/// How a listing page becomes available as HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Render {
    /// Served complete; fetched once.
    #[default]
    Static,
    /// Filled in after load; re-fetched until the container shows up.
    ///
    /// Re-fetching does not run the page's scripts. This only works when the
    /// server eventually sends the container in the HTML itself.
    Dynamic,
}

/// One IMDb list to scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSource {
    /// Label used in logs, e.g. "2010s".
    pub period: String,
    pub url: String,
    #[serde(default)]
    pub render: Render,
    /// Overrides the container selector implied by `render`.
    #[serde(default)]
    pub container: Option<String>,
}

impl ListingSource {
    pub fn container_selector(&self) -> &str {
        match (&self.container, self.render) {
            (Some(custom), _) => custom,
            (None, Render::Static) => STATIC_CONTAINER,
            (None, Render::Dynamic) => DYNAMIC_CONTAINER,
        }
    }
}

/// CSS selectors for the parts of a listing item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectorConfig {
    pub item: String,
    pub title: String,
    pub metadata: String,
    pub rating: String,
    pub cast: String,
    pub description: String,
}

impl Default for ListingSelectorConfig {
    fn default() -> Self {
        Self {
            item: "li.ipc-metadata-list-summary-item".to_string(),
            title: "h3.ipc-title__text".to_string(),
            metadata: "span.dli-title-metadata-item".to_string(),
            rating: "span.ipc-rating-star--rating".to_string(),
            cast: "span.title-description-credit".to_string(),
            description: "div.ipc-html-content-inner-div".to_string(),
        }
    }
}

/// What to do with a listing item that lacks its title or metadata spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Fail the whole page.
    #[default]
    Abort,
    /// Log the item and continue with the next one.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub listings: Vec<ListingSource>,
    pub user_agent: String,
    /// Extra request headers sent with every fetch.
    pub headers: BTreeMap<String, String>,
    pub selectors: ListingSelectorConfig,
    pub missing_field_policy: MissingFieldPolicy,
    /// Rows per progress report during enrichment.
    pub chunk_size: usize,
    /// Hard ceiling for a dynamic page's container to appear.
    pub container_wait_secs: u64,
    pub container_poll_millis: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept-Language".to_string(), "en-US,en;q=0.9".to_string());
        Self {
            listings: vec![ListingSource {
                period: "2010s".to_string(),
                url: "https://www.imdb.com/list/ls565286034/".to_string(),
                render: Render::Dynamic,
                container: None,
            }],
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers,
            selectors: ListingSelectorConfig::default(),
            missing_field_policy: MissingFieldPolicy::default(),
            chunk_size: 10,
            container_wait_secs: 15,
            container_poll_millis: 1000,
        }
    }
}

impl ScrapeConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let mut config: ScrapeConfig = serde_yaml::from_str(text)?;
        if config.chunk_size == 0 {
            config.chunk_size = 1;
        }
        Ok(config)
    }

    /// Load from `path`, or use the defaults when no path was given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = tokio::fs::read_to_string(path).await?;
                let config = Self::from_yaml_str(&text)?;
                info!(path = %path.display(), listings = config.listings.len(), "Loaded configuration");
                Ok(config)
            }
            None => {
                info!("No configuration file given; using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn container_wait(&self) -> Duration {
        Duration::from_secs(self.container_wait_secs)
    }

    pub fn container_poll(&self) -> Duration {
        Duration::from_millis(self.container_poll_millis.max(1))
    }
}
