use crate::config::{DEFAULT_BASE_URL, PhotoMapConfig};
use crate::error::{ConfigError, PhotoMapError};
use crate::model::{GeoCoordinate, PhotoRecord};
use crate::network::error::PhotoClientError;
use crate::network::response::{check_api_status, parse_location_response, parse_search_response};
use bon::bon;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use reqwest::{RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const SEARCH_METHOD: &str = "flickr.photos.search";
const GEO_LOCATION_METHOD: &str = "flickr.photos.geo.getLocation";

/// Extra fields requested with every search.
pub const DEFAULT_EXTRAS: [&str; 5] = ["geo", "tags", "description", "owner_name", "date_taken"];

/// Outcome of [`PhotoSearchClient::resolve_locations`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeoResolution {
    /// All input photos, in their original order, with coordinates backfilled where found.
    pub photos: Vec<PhotoRecord>,
    pub resolved: usize,
    pub failed: usize,
}

/// Client for the photo search REST API.
///
/// Requests time out after the configured duration and are never retried.
pub struct PhotoSearchClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
    per_page: u32,
    extras: Vec<String>,
}

#[bon]
impl PhotoSearchClient {
    /// Builds a client.
    ///
    /// ```rust
    /// # use photo_map::network::PhotoSearchClient;
    /// let client = PhotoSearchClient::builder()
    ///     .api_key("my-key")
    ///     .per_page(50)
    ///     .build()
    ///     .unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if `base_url` is not a valid URL or the HTTP client cannot be created.
    #[builder]
    pub fn new(
        #[builder(into)] api_key: String,
        #[builder(into, default = DEFAULT_BASE_URL.to_string())] base_url: String,
        #[builder(default = 100)] per_page: u32,
        #[builder(default = Duration::from_secs(20))] timeout: Duration,
        extras: Option<Vec<String>>,
    ) -> Result<Self, PhotoMapError> {
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PhotoMapError::HttpClient)?;
        let extras = extras
            .unwrap_or_else(|| DEFAULT_EXTRAS.iter().map(ToString::to_string).collect());
        Ok(Self {
            http,
            api_key,
            base_url,
            per_page,
            extras,
        })
    }

    pub fn from_config(config: &PhotoMapConfig) -> Result<Self, PhotoMapError> {
        config.validate()?;
        Self::builder()
            .api_key(config.api_key.clone())
            .base_url(config.base_url.clone())
            .per_page(config.per_page)
            .timeout(config.request_timeout)
            .build()
    }

    /// Searches for photos within `radius_km` of `coordinate`.
    ///
    /// # Errors
    ///
    /// Transport failures, HTTP statuses outside `200..400`, bodies that are not JSON or
    /// lack the photo list, and API error envelopes. Individual malformed entries are
    /// dropped instead.
    #[instrument(skip(self), fields(lat = coordinate.latitude(), lon = coordinate.longitude()))]
    pub async fn search_nearby(
        &self,
        coordinate: GeoCoordinate,
        radius_km: f64,
    ) -> Result<Vec<PhotoRecord>, PhotoClientError> {
        let body = self.execute(self.search_request(coordinate, radius_km)).await?;
        let photos = parse_search_response(&body)
            .inspect_err(|e| warn!("Unusable search response: {e}"))?;
        info!(count = photos.len(), "Found photos nearby");
        Ok(photos)
    }

    /// Looks up the position of a single photo.
    #[instrument(skip(self))]
    pub async fn resolve_location(
        &self,
        photo_id: &str,
    ) -> Result<Option<GeoCoordinate>, PhotoClientError> {
        let body = self.execute(self.location_request(photo_id)).await?;
        parse_location_response(&body).inspect_err(|e| warn!("Unusable geo response: {e}"))
    }

    /// Resolves coordinates for every photo that lacks one, all lookups in flight at once.
    ///
    /// Completion order is irrelevant: the call returns once every lookup has reported,
    /// successfully or not.
    pub async fn resolve_locations(&self, mut photos: Vec<PhotoRecord>) -> GeoResolution {
        let mut lookups: FuturesUnordered<_> = photos
            .iter()
            .enumerate()
            .filter(|(_, photo)| photo.coordinate().is_none())
            .map(|(index, photo)| {
                let id = photo.remote_id.clone();
                async move { (index, self.resolve_location(&id).await) }
            })
            .collect();

        let mut outstanding = lookups.len();
        let mut resolved = 0;
        let mut failed = 0;
        while let Some((index, result)) = lookups.next().await {
            outstanding -= 1;
            match result {
                Ok(Some(coordinate)) => {
                    photos[index].set_coordinate(coordinate);
                    resolved += 1;
                }
                Ok(None) => {
                    debug!(id = %photos[index].remote_id, "Photo has no usable location");
                    failed += 1;
                }
                Err(_) => failed += 1,
            }
            debug!(outstanding, "Geo lookup completed");
        }

        info!(resolved, failed, "Geo lookups finished");
        GeoResolution {
            photos,
            resolved,
            failed,
        }
    }

    pub(crate) fn search_request(&self, coordinate: GeoCoordinate, radius_km: f64) -> RequestBuilder {
        self.request(&[
            ("method", SEARCH_METHOD.to_string()),
            ("lat", coordinate.latitude().to_string()),
            ("lon", coordinate.longitude().to_string()),
            ("radius", radius_km.to_string()),
            ("radius_units", "km".to_string()),
            ("per_page", self.per_page.to_string()),
            ("extras", self.extras.join(",")),
        ])
    }

    pub(crate) fn location_request(&self, photo_id: &str) -> RequestBuilder {
        self.request(&[
            ("method", GEO_LOCATION_METHOD.to_string()),
            ("photo_id", photo_id.to_string()),
        ])
    }

    fn request(&self, params: &[(&str, String)]) -> RequestBuilder {
        self.http
            .get(self.base_url.clone())
            .query(&[
                ("format", "json"),
                ("nojsoncallback", "1"),
                ("api_key", self.api_key.as_str()),
            ])
            .query(params)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value, PhotoClientError> {
        let response = request
            .send()
            .await
            .inspect_err(|e| warn!("Request failed: {e}"))?;

        let status = response.status().as_u16();
        if !(200..400).contains(&status) {
            warn!(status, "Invalid server response");
            return Err(PhotoClientError::Status(status));
        }

        let bytes = response
            .bytes()
            .await
            .inspect_err(|e| warn!("Could not read response body: {e}"))?;
        let body: Value = serde_json::from_slice(&bytes)
            .inspect_err(|e| warn!("Response is not valid JSON: {e}"))?;
        check_api_status(&body).inspect_err(|e| warn!("{e}"))?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client() -> PhotoSearchClient {
        PhotoSearchClient::builder()
            .api_key("test-key")
            .build()
            .unwrap()
    }

    fn query_of(request: RequestBuilder) -> (Url, HashMap<String, String>) {
        let request = request.build().unwrap();
        let url = request.url().clone();
        let pairs = url.query_pairs().into_owned().collect();
        (url, pairs)
    }

    #[test]
    fn test_search_request_parameters() {
        let coordinate = GeoCoordinate::new(34.022_276, -118.410_067).unwrap();
        let (url, query) = query_of(client().search_request(coordinate, 20.0));

        // --- Assertions ---
        assert_eq!(url.host_str(), Some("api.flickr.com"));
        assert_eq!(url.path(), "/services/rest/");
        assert_eq!(query["method"], "flickr.photos.search");
        assert_eq!(query["format"], "json");
        assert_eq!(query["nojsoncallback"], "1");
        assert_eq!(query["api_key"], "test-key");
        assert_eq!(query["lat"], "34.022276");
        assert_eq!(query["lon"], "-118.410067");
        assert_eq!(query["radius"], "20");
        assert_eq!(query["radius_units"], "km");
        assert_eq!(query["per_page"], "100");
        assert_eq!(query["extras"], "geo,tags,description,owner_name,date_taken");
    }

    #[test]
    fn test_extras_are_comma_joined_then_encoded() {
        let coordinate = GeoCoordinate::new(1.0, 2.0).unwrap();
        let client = PhotoSearchClient::builder()
            .api_key("k")
            .extras(vec!["owner name".to_string(), "tags".to_string()])
            .build()
            .unwrap();
        let (url, query) = query_of(client.search_request(coordinate, 0.5));

        assert_eq!(query["extras"], "owner name,tags");
        let raw = url.query().unwrap();
        assert!(
            raw.contains("extras=owner+name%2Ctags"),
            "Unexpected encoding: {raw}"
        );
    }

    #[test]
    fn test_location_request_parameters() {
        let (_, query) = query_of(client().location_request("28079125823"));

        assert_eq!(query["method"], "flickr.photos.geo.getLocation");
        assert_eq!(query["photo_id"], "28079125823");
        assert_eq!(query["api_key"], "test-key");
        assert!(!query.contains_key("lat"));
    }

    #[test]
    fn test_invalid_base_url_is_a_config_error() {
        let result = PhotoSearchClient::builder()
            .api_key("k")
            .base_url("::not a url::")
            .build();
        assert!(matches!(
            result,
            Err(PhotoMapError::Config(ConfigError::InvalidBaseUrl(_)))
        ));
    }

    #[test]
    fn test_from_config_rejects_missing_key() {
        let config = PhotoMapConfig::builder().api_key("").build();
        assert!(matches!(
            PhotoSearchClient::from_config(&config),
            Err(PhotoMapError::Config(ConfigError::MissingApiKey(_)))
        ));
    }
}
