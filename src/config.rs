use crate::error::ConfigError;
use crate::location::LocationConfig;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public REST endpoint of the photo-search API.
pub const DEFAULT_BASE_URL: &str = "https://api.flickr.com/services/rest/";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "FLICKR_API_KEY";

/// Optional environment override for the REST endpoint.
pub const BASE_URL_VAR: &str = "FLICKR_BASE_URL";

/// Settings for the whole photo map pipeline.
///
/// ```rust
/// # use photo_map::config::PhotoMapConfig;
/// let config = PhotoMapConfig::builder()
///     .api_key("my-key")
///     .search_radius_km(5.0)
///     .build();
/// assert_eq!(config.cache_capacity, 80);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMapConfig {
    /// Never written out when the config is serialized.
    #[builder(into)]
    #[serde(skip_serializing, default)]
    pub api_key: String,

    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,

    /// Radius of every nearby search, and the distance the viewport has to move before
    /// a new search is issued.
    #[builder(default = 20.0)]
    pub search_radius_km: f64,

    /// Maximum number of photos per search response.
    #[builder(default = 100)]
    pub per_page: u32,

    #[builder(default = Duration::from_secs(20))]
    pub request_timeout: Duration,

    /// Number of decoded images kept in memory.
    #[builder(default = 80)]
    pub cache_capacity: usize,

    #[builder(default)]
    #[serde(default)]
    pub location: LocationConfig,
}

impl PhotoMapConfig {
    /// Reads the API key (and optionally the endpoint) from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] if the key is unset or blank. This is a
    /// startup misconfiguration; nothing downstream retries it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;
        let base_url = std::env::var(BASE_URL_VAR).ok();

        let config = Self::builder()
            .api_key(api_key)
            .maybe_base_url(base_url)
            .build();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey(API_KEY_VAR));
        }
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        if !(self.search_radius_km.is_finite() && self.search_radius_km > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "search_radius_km",
                reason: format!("must be a positive distance, got {}", self.search_radius_km),
            });
        }
        if self.per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "per_page",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = PhotoMapConfig::builder().api_key("key").build();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.search_radius_km, 20.0);
        assert_eq!(config.per_page, 100);
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert_eq!(config.cache_capacity, 80);
        assert_eq!(config.location, LocationConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let config = PhotoMapConfig::builder().api_key("   ").build();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingApiKey(API_KEY_VAR))
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_url = PhotoMapConfig::builder()
            .api_key("key")
            .base_url("not a url")
            .build();
        assert!(matches!(
            bad_url.validate(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));

        let bad_radius = PhotoMapConfig::builder()
            .api_key("key")
            .search_radius_km(-1.0)
            .build();
        assert!(matches!(
            bad_radius.validate(),
            Err(ConfigError::InvalidValue {
                field: "search_radius_km",
                ..
            })
        ));

        let no_cache = PhotoMapConfig::builder()
            .api_key("key")
            .cache_capacity(0)
            .build();
        assert!(no_cache.validate().is_err());
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = PhotoMapConfig::builder().api_key("secret-key").build();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-key"));
        assert!(json.contains("searchRadiusKm"));
    }
}
