//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use folio_core::domain::PostRules;
use folio_core::services::MAX_PAGE_SIZE;

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend root including `/api`. `None` selects the in-memory backend.
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub http_timeout: Duration,
    pub rules: PostRules,
    pub page_size: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = PostRules::default();
        let flag = |key: &str| {
            lookup(key)
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        Self {
            api_url: lookup("FOLIO_API_URL").filter(|v| !v.trim().is_empty()),
            token: lookup("FOLIO_TOKEN").filter(|v| !v.trim().is_empty()),
            http_timeout: Duration::from_secs(
                parsed(&lookup, "FOLIO_HTTP_TIMEOUT_SECS").unwrap_or(30),
            ),
            rules: PostRules {
                title_max_len: parsed(&lookup, "FOLIO_TITLE_MAX_LEN")
                    .unwrap_or(defaults.title_max_len),
                description_max_len: parsed(&lookup, "FOLIO_DESCRIPTION_MAX_LEN")
                    .unwrap_or(defaults.description_max_len),
                require_description: flag("FOLIO_REQUIRE_DESCRIPTION"),
                require_content: flag("FOLIO_REQUIRE_CONTENT"),
            },
            page_size: parsed(&lookup, "FOLIO_PAGE_SIZE")
                .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

/// Parsed value of `key`; unset or invalid values yield `None`.
fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.api_url, None);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.rules.title_max_len, 200);
        assert_eq!(config.page_size, 10);
        assert!(!config.rules.require_content);
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let config = config(&[
            ("FOLIO_API_URL", "https://blog.example.com/api"),
            ("FOLIO_TITLE_MAX_LEN", "80"),
            ("FOLIO_PAGE_SIZE", "lots"),
            ("FOLIO_REQUIRE_CONTENT", "TRUE"),
        ]);
        assert_eq!(config.api_url.as_deref(), Some("https://blog.example.com/api"));
        assert_eq!(config.rules.title_max_len, 80);
        assert_eq!(config.page_size, 10);
        assert!(config.rules.require_content);
    }

    #[test]
    fn test_page_size_outside_listing_bounds_falls_back() {
        assert_eq!(config(&[("FOLIO_PAGE_SIZE", "500")]).page_size, 10);
        assert_eq!(config(&[("FOLIO_PAGE_SIZE", "0")]).page_size, 10);
        assert_eq!(config(&[("FOLIO_PAGE_SIZE", "25")]).page_size, 25);
    }
}
