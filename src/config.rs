use tracing::warn;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://search.workhive.app/v1/search";
pub const DEFAULT_QUOTE_BASE_URL: &str = "https://quotes.workhive.app/v1/price";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 30;

/// Model endpoint configuration. A missing API key never panics; the
/// provider reports `ProviderUnavailable` on first use instead.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Runtime configuration for the AI layer, read from the environment.
/// Missing tool keys degrade that tool to its fallback reply.
#[derive(Debug, Clone)]
pub struct Settings {
    pub gemini: ProviderSettings,
    pub search_api_key: Option<String>,
    pub search_base_url: String,
    pub quote_api_key: Option<String>,
    pub quote_base_url: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lookup-backed constructor so configuration parsing stays testable
    /// without touching process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let gemini = ProviderSettings {
            api_key: get("WORKHIVE_GEMINI_API_KEY"),
            base_url: get("WORKHIVE_GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            model: get("WORKHIVE_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            timeout_secs: get("WORKHIVE_MODEL_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS),
        };

        let settings = Self {
            gemini,
            search_api_key: get("WORKHIVE_SEARCH_API_KEY"),
            search_base_url: get("WORKHIVE_SEARCH_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SEARCH_BASE_URL.to_string()),
            quote_api_key: get("WORKHIVE_QUOTE_API_KEY"),
            quote_base_url: get("WORKHIVE_QUOTE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_QUOTE_BASE_URL.to_string()),
        };

        if settings.gemini.api_key.is_none() {
            warn!("WORKHIVE_GEMINI_API_KEY not set; flows will fail as provider unavailable");
        }
        if settings.search_api_key.is_none() {
            warn!("WORKHIVE_SEARCH_API_KEY not set; search_web degrades to its fallback");
        }
        if settings.quote_api_key.is_none() {
            warn!("WORKHIVE_QUOTE_API_KEY not set; get_stock_price degrades to its fallback");
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.gemini.api_key, None);
        assert_eq!(settings.gemini.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(settings.gemini.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(settings.gemini.timeout_secs, 30);
        assert_eq!(settings.search_api_key, None);
        assert_eq!(settings.quote_api_key, None);
    }

    #[test]
    fn test_explicit_values_win() {
        let settings = Settings::from_lookup(lookup(&[
            ("WORKHIVE_GEMINI_API_KEY", "test-key"),
            ("WORKHIVE_GEMINI_MODEL", "gemini-2.0-pro"),
            ("WORKHIVE_MODEL_TIMEOUT_SECS", "5"),
            ("WORKHIVE_SEARCH_API_KEY", "search-key"),
        ]));
        assert_eq!(settings.gemini.api_key.as_deref(), Some("test-key"));
        assert_eq!(settings.gemini.model, "gemini-2.0-pro");
        assert_eq!(settings.gemini.timeout_secs, 5);
        assert_eq!(settings.search_api_key.as_deref(), Some("search-key"));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let settings = Settings::from_lookup(lookup(&[
            ("WORKHIVE_GEMINI_API_KEY", "   "),
            ("WORKHIVE_MODEL_TIMEOUT_SECS", "not-a-number"),
        ]));
        assert_eq!(settings.gemini.api_key, None);
        assert_eq!(settings.gemini.timeout_secs, 30);
    }
}
