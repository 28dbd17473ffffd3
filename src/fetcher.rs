use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ScrapeError;
use crate::extract::ParsedDocument;
use crate::model::Location;
use crate::sanitize::enforce_https_url;

static USER_AGENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.66 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    ]
});

const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.66 Safari/537.36";

/// Adds retailer-specific state to an outgoing page request.
pub trait RequestDecorator: Send + Sync {
    /// `(name, value)` cookies to attach for `location`. Values must already
    /// be cookie-safe.
    fn cookies(&self, location: &Location) -> Vec<(String, String)>;
}

/// Store-affinity segment the retailer expects after the location fields.
/// It names a fixed set of nearby stores and is sent unchanged for every
/// location.
const STORE_AFFINITY: &str = "%3A%3A1%3A1|1fj%3B%3B5.94%2C2pl%3B%3B7.84%2C4m1%3B%3B13.65%2C1p2%3B%3B14.03%2C21e%3B%3B17.65%2C4mg%3B%3B18.19%2C4c9%3B%3B18.72%2C1dm%3B%3B19.08%2C1fs%3B%3B19.6%2C282%3B%3B19.8||7|1|1xri%3B16%3B0%3B1.44%2C1xi4%3B16%3B2%3B7.38%2C1xqu%3B16%3B4%3B10.14%2C1yev%3B16%3B5%3B11.29%2C1y2i%3B16%3B6%3B12.55";

const LOC_ZIP_STAMP: &str = "1606978188210";

/// The location cookies the retailer reads to pick the shopper's store.
#[derive(Debug, Clone, Default)]
pub struct LocationCookies;

impl RequestDecorator for LocationCookies {
    fn cookies(&self, location: &Location) -> Vec<(String, String)> {
        let zip = urlencoding::encode(&location.zip);
        let city = urlencoding::encode(&location.city);
        let state = urlencoding::encode(&location.state);
        vec![
            (
                "location-data".to_string(),
                format!("{zip}%3A{city}%3A{state}{STORE_AFFINITY}"),
            ),
            ("DL".to_string(), format!("{zip}%2C%2C%2Cip%2C{zip}%2C%2C")),
            ("t-loc-zip".to_string(), format!("{LOC_ZIP_STAMP}|{zip}")),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Fixed user agent; a browser one is picked per request when unset.
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
    pub enforce_https: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: None,
            enforce_https: true,
        }
    }
}

/// Fetches retailer pages with location cookies attached.
#[derive(Clone)]
pub struct Fetcher {
    config: FetchConfig,
    decorator: Arc<dyn RequestDecorator>,
}

impl Fetcher {
    pub fn new(config: FetchConfig, decorator: Arc<dyn RequestDecorator>) -> Self {
        Self { config, decorator }
    }

    pub fn with_location_cookies(config: FetchConfig) -> Self {
        Self::new(config, Arc::new(LocationCookies))
    }

    fn user_agent(&self) -> &str {
        match &self.config.user_agent {
            Some(ua) => ua.as_str(),
            None => USER_AGENTS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(FALLBACK_USER_AGENT),
        }
    }

    fn client_builder(&self) -> reqwest::ClientBuilder {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent())
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }

    fn resolve_url(&self, url: &str) -> Result<Url, ScrapeError> {
        let url = if self.config.enforce_https {
            enforce_https_url(url)
        } else {
            url.to_string()
        };
        Url::parse(&url).map_err(|e| ScrapeError::InvalidUrl {
            url,
            reason: e.to_string(),
        })
    }

    /// GETs `url` with the location cookies in a fresh cookie store and
    /// returns the body. Non-2xx responses become [`ScrapeError::Upstream`].
    pub async fn fetch_html(&self, url: &str, location: &Location) -> Result<String, ScrapeError> {
        let url = self.resolve_url(url)?;

        let jar = Arc::new(Jar::default());
        for (name, value) in self.decorator.cookies(location) {
            jar.add_cookie_str(&format!("{name}={value}; Path=/"), &url);
        }
        let client = self.client_builder().cookie_provider(jar).build()?;

        info!(url = %url, zip = %location.zip, "fetching page");
        let response = client
            .get(url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "upstream request failed");
                ScrapeError::Transport(e)
            })?;

        read_body(url, response).await
    }

    /// Same as [`Fetcher::fetch_html`] but sends `cookie_header` verbatim
    /// instead of going through a cookie store.
    pub async fn fetch_html_with_cookies(
        &self,
        url: &str,
        cookie_header: &str,
    ) -> Result<String, ScrapeError> {
        let url = self.resolve_url(url)?;
        let client = self.client_builder().build()?;

        info!(url = %url, "fetching page with raw cookie header");
        let response = client
            .get(url.clone())
            .header(COOKIE, cookie_header)
            .send()
            .await?;

        read_body(url, response).await
    }

    pub async fn fetch_document(
        &self,
        url: &str,
        location: &Location,
    ) -> Result<ParsedDocument, ScrapeError> {
        let body = self.fetch_html(url, location).await?;
        Ok(ParsedDocument::parse(&body))
    }
}

async fn read_body(url: Url, response: reqwest::Response) -> Result<String, ScrapeError> {
    let status = response.status();
    if !status.is_success() {
        warn!(url = %url, status = status.as_u16(), "upstream returned an error status");
        return Err(ScrapeError::Upstream {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    debug!(url = %url, bytes = body.len(), "fetched page");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie<'a>(cookies: &'a [(String, String)], name: &str) -> &'a str {
        cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_location_cookies_embed_location() {
        let cookies = LocationCookies.cookies(&Location::new("72712", "Bentonville", "AR"));
        assert_eq!(cookies.len(), 3);
        assert!(cookie(&cookies, "location-data").starts_with("72712%3ABentonville%3AAR%3A%3A1"));
        assert_eq!(cookie(&cookies, "DL"), "72712%2C%2C%2Cip%2C72712%2C%2C");
        assert_eq!(cookie(&cookies, "t-loc-zip"), "1606978188210|72712");
    }

    #[test]
    fn test_location_cookies_encode_spaces() {
        let cookies = LocationCookies.cookies(&Location::new("10001", "New York", "NY"));
        assert!(cookie(&cookies, "location-data").starts_with("10001%3ANew%20York%3ANY"));
        assert!(cookies.iter().all(|(_, v)| !v.contains(' ')));
    }

    #[test]
    fn test_resolve_url_enforces_https_by_default() {
        let fetcher = Fetcher::with_location_cookies(FetchConfig::default());
        let url = fetcher.resolve_url("http://www.walmart.com/ip/1").unwrap();
        assert_eq!(url.as_str(), "https://www.walmart.com/ip/1");
    }

    #[test]
    fn test_resolve_url_can_keep_plain_http() {
        let fetcher = Fetcher::with_location_cookies(FetchConfig {
            enforce_https: false,
            ..FetchConfig::default()
        });
        let url = fetcher.resolve_url("http://127.0.0.1:8080/ip/1").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_configured_user_agent_wins() {
        let fetcher = Fetcher::with_location_cookies(FetchConfig {
            user_agent: Some("test-agent/1.0".to_string()),
            ..FetchConfig::default()
        });
        assert_eq!(fetcher.user_agent(), "test-agent/1.0");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_reports_500() {
        let fetcher = Fetcher::with_location_cookies(FetchConfig {
            enforce_https: false,
            timeout: Some(Duration::from_secs(5)),
            ..FetchConfig::default()
        });
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher
            .fetch_html(&format!("http://{addr}/ip/1"), &Location::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), 500);
    }
}
