//! Page fetching behind a small trait seam.
//!
//! The extractors never do network I/O; they parse markup handed to them by a
//! [`PageSource`]. [`HttpPageSource`] is the production implementation. Tests
//! substitute in-memory sources.
//!
//! # Dynamic pages
//!
//! Some IMDb lists fill in their items client-side. [`fetch_rendered`] keeps
//! asking the source for the page until the list container is present, with a
//! hard ceiling after which the page is given up on. No script is executed:
//! over [`HttpPageSource`] this only succeeds when the server itself sends the
//! container, e.g. once a cached or server-rendered copy is served.

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

/// Anything that can hand back the HTML of a URL.
pub trait PageSource {
    /// Fetch the page body for `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP with the configured headers.
///
/// One client per command invocation; the connection pool goes away with it.
#[derive(Debug)]
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ScrapeError::Header { name: name.clone() })?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ScrapeError::Header { name: name.clone() })?;
            headers.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let t0 = Instant::now();
        let fetch_err = |source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(fetch_err)?
            .error_for_status()
            .map_err(fetch_err)?;
        let body = response.text().await.map_err(fetch_err)?;

        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Fetch `url` until `container` matches, giving up after `ceiling`.
///
/// Each attempt is a plain re-fetch through `source`. Client-side JavaScript
/// never runs, so a page whose list is only ever built in the browser will
/// time out here.
///
/// A transport error ends the wait immediately. Running out of time is a
/// [`ScrapeError::StructureNotFound`].
#[instrument(level = "info", skip(source, container))]
pub async fn fetch_rendered<P: PageSource>(
    source: &P,
    url: &str,
    container: &Selector,
    ceiling: Duration,
    poll: Duration,
) -> Result<String> {
    let wait = async {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            let html = source.fetch(url).await?;
            let ready = {
                let document = Html::parse_document(&html);
                document.select(container).next().is_some()
            };
            if ready {
                info!(attempt, "List container present");
                return Ok::<_, ScrapeError>(html);
            }
            debug!(attempt, ?poll, "List container not rendered yet");
            sleep(poll).await;
        }
    };

    match timeout(ceiling, wait).await {
        Ok(result) => result,
        Err(_) => {
            warn!(%url, ?ceiling, "Gave up waiting for list container");
            Err(ScrapeError::StructureNotFound(format!(
                "list container did not appear on {url} within {ceiling:?}"
            )))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{MemoryPages, RenderingPage};
    use super::*;

    const LOADING: &str = "<html><body><div id='spinner'></div></body></html>";
    const RENDERED: &str = "<html><body><div data-testid='list-page-mc-list-content'>\
        <ul class='ipc-metadata-list'><li>item</li></ul></div></body></html>";

    fn container() -> Selector {
        Selector::parse(crate::config::DYNAMIC_CONTAINER).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_rendered_waits_for_container() {
        let page = RenderingPage::new(&[LOADING, LOADING, RENDERED]);
        let html = fetch_rendered(
            &page,
            "https://www.imdb.com/list/ls1/",
            &container(),
            Duration::from_secs(5),
            Duration::from_millis(5),
        )
        .await
        .unwrap();
        assert!(html.contains("ipc-metadata-list"));
    }

    #[tokio::test]
    async fn test_fetch_rendered_gives_up_at_ceiling() {
        let page = RenderingPage::new(&[LOADING]);
        let err = fetch_rendered(
            &page,
            "https://www.imdb.com/list/ls1/",
            &container(),
            Duration::from_millis(50),
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScrapeError::StructureNotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_rendered_propagates_source_errors() {
        let pages = MemoryPages::default();
        let err = fetch_rendered(
            &pages,
            "https://missing.example/",
            &container(),
            Duration::from_secs(5),
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("no page for"));
        assert_eq!(pages.requests.borrow().len(), 1);
    }

    #[test]
    fn test_http_source_rejects_bad_header() {
        let mut config = ScrapeConfig::default();
        config.headers.insert("Bad Header".to_string(), "x".to_string());
        let err = HttpPageSource::new(&config).unwrap_err();
        assert!(matches!(err, ScrapeError::Header { .. }));
    }
}
