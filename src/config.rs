use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::fetcher::FetchConfig;
use crate::walmart::BASE_URL;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub retailer_base_url: String,
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            retailer_base_url: BASE_URL.to_string(),
            fetch: FetchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the process environment. Call after `dotenv()`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => defaults.port,
        };

        let retailer_base_url = lookup("RETAILER_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.retailer_base_url);

        let user_agent = lookup("SCRAPER_USER_AGENT").filter(|ua| !ua.trim().is_empty());

        let timeout = match lookup("FETCH_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.trim().parse::<u64>().with_context(
                || format!("FETCH_TIMEOUT_SECS must be whole seconds, got {raw:?}"),
            )?)),
            None => defaults.fetch.timeout,
        };

        let enforce_https = match lookup("ENFORCE_HTTPS") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("ENFORCE_HTTPS must be true or false, got {raw:?}"))?,
            None => defaults.fetch.enforce_https,
        };

        Ok(Self {
            port,
            retailer_base_url,
            fetch: FetchConfig {
                user_agent,
                timeout,
                enforce_https,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.retailer_base_url, "https://www.walmart.com");
        assert_eq!(config.fetch.user_agent, None);
        assert_eq!(config.fetch.timeout, None);
        assert!(config.fetch.enforce_https);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("RETAILER_BASE_URL", "http://localhost:9000/"),
            ("SCRAPER_USER_AGENT", "bot/2"),
            ("FETCH_TIMEOUT_SECS", "15"),
            ("ENFORCE_HTTPS", "false"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.retailer_base_url, "http://localhost:9000");
        assert_eq!(config.fetch.user_agent.as_deref(), Some("bot/2"));
        assert_eq!(config.fetch.timeout, Some(Duration::from_secs(15)));
        assert!(!config.fetch.enforce_https);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("FETCH_TIMEOUT_SECS", "-1")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("ENFORCE_HTTPS", "maybe")])).is_err());
    }
}
