//! Advisory runtime configuration, resolved once at startup.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REASONING_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_FAST_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Where and how the advisory layer reaches its completion service.
#[derive(Clone, Debug)]
pub struct AdvisoryConfig {
    /// Missing keys are tolerated here; every call then degrades to its sentinel.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Used for diagnostic narrative, symptom differential and risk scan.
    pub reasoning_model: String,
    /// Used for record summaries.
    pub fast_model: String,
    pub request_timeout: Duration,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_owned(),
            fast_model: DEFAULT_FAST_MODEL.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AdvisoryConfig {
    /// Builds a config from optional overrides, treating blank values as absent.
    pub fn from_parts(
        api_key: Option<String>,
        base_url: Option<String>,
        reasoning_model: Option<String>,
        fast_model: Option<String>,
    ) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: non_blank(api_key),
            base_url: non_blank(base_url).unwrap_or(defaults.base_url),
            reasoning_model: non_blank(reasoning_model).unwrap_or(defaults.reasoning_model),
            fast_model: non_blank(fast_model).unwrap_or(defaults.fast_model),
            request_timeout: defaults.request_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_ignores_blank_overrides() {
        let cfg = AdvisoryConfig::from_parts(
            Some("  ".into()),
            None,
            Some("custom-model".into()),
            Some(String::new()),
        );
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.reasoning_model, "custom-model");
        assert_eq!(cfg.fast_model, DEFAULT_FAST_MODEL);
    }
}
