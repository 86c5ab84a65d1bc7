use crate::config::PhotoMapConfig;
use crate::error::PhotoMapError;
use crate::images::{FetchedImage, ImageFetchCache};
use crate::location::LocationSample;
use crate::model::{GeoCoordinate, PhotoRecord};
use crate::network::{PhotoClientError, PhotoSearchClient};
use crate::viewport::{RefreshDecision, ViewportRefreshPolicy};
use bon::bon;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// The non-visual state of the photo map.
///
/// Owns the photos currently shown, keyed by id in the order they were first found, and
/// drives searches from location fixes and viewport changes. A failed search never
/// discards photos that are already shown, and a later batch never discards a coordinate
/// that is already known.
///
/// ```rust,no_run
/// # use photo_map::{PhotoMap, PhotoMapConfig, PhotoMapError};
/// # use photo_map::model::GeoCoordinate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), PhotoMapError> {
/// let config = PhotoMapConfig::from_env()?;
/// let mut map = PhotoMap::from_config(&config)?;
///
/// let santa_monica = GeoCoordinate::new(34.022_276, -118.410_067).unwrap();
/// map.search_around(santa_monica).await?;
/// for photo in map.photos() {
///     println!("{:?} -> {}", photo.title, photo.thumbnail_url());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PhotoMap {
    client: PhotoSearchClient,
    images: ImageFetchCache,
    policy: ViewportRefreshPolicy,
    photos: IndexMap<String, PhotoRecord>,
}

#[bon]
impl PhotoMap {
    #[builder]
    pub fn new(
        client: PhotoSearchClient,
        images: ImageFetchCache,
        #[builder(default = 20.0)] search_radius_km: f64,
    ) -> Self {
        Self {
            client,
            images,
            policy: ViewportRefreshPolicy::new(search_radius_km),
            photos: IndexMap::new(),
        }
    }

    /// Builds the client, cache and policy from one configuration.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration (such as a missing API key) or if an HTTP client
    /// cannot be created.
    pub fn from_config(config: &PhotoMapConfig) -> Result<Self, PhotoMapError> {
        let client = PhotoSearchClient::from_config(config)?;
        let images = ImageFetchCache::builder()
            .capacity(config.cache_capacity)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::builder()
            .client(client)
            .images(images)
            .search_radius_km(config.search_radius_km)
            .build())
    }

    pub fn photos(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.photos.values()
    }

    /// Photos that can be placed on the map.
    pub fn located_photos(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.photos.values().filter(|p| p.coordinate().is_some())
    }

    pub fn photo(&self, remote_id: &str) -> Option<&PhotoRecord> {
        self.photos.get(remote_id)
    }

    pub const fn policy(&self) -> &ViewportRefreshPolicy {
        &self.policy
    }

    pub const fn images(&self) -> &ImageFetchCache {
        &self.images
    }

    /// Runs the initial search around a freshly acquired location.
    ///
    /// Viewport tracking starts once this search has completed, whether or not it
    /// succeeded, so a later pan can still recover from a failed first search.
    #[instrument(skip(self, sample), fields(accuracy_m = sample.horizontal_accuracy_m))]
    pub async fn on_location_found(
        &mut self,
        sample: &LocationSample,
    ) -> Result<usize, PhotoClientError> {
        let result = self.search_around(sample.coordinate).await;
        self.policy.record_query(sample.coordinate);
        result
    }

    /// Re-queries if the viewport center moved beyond the search radius of the last query.
    pub async fn on_viewport_changed(
        &mut self,
        center: GeoCoordinate,
    ) -> Result<RefreshDecision, PhotoClientError> {
        let decision = self.policy.evaluate(center);
        if let RefreshDecision::Refresh { center, .. } = decision {
            self.search_around(center).await?;
        }
        Ok(decision)
    }

    /// Searches around `center` and merges the results into the shown photos.
    /// Returns how many photos were not shown before.
    pub async fn search_around(&mut self, center: GeoCoordinate) -> Result<usize, PhotoClientError> {
        let mut found = self
            .client
            .search_nearby(center, self.policy.search_radius_km())
            .await?;
        // A located photo never loses its position to a later batch, and is not looked up again.
        for photo in found.iter_mut().filter(|p| p.coordinate().is_none()) {
            if let Some(coordinate) = self.photo(&photo.remote_id).and_then(PhotoRecord::coordinate) {
                photo.set_coordinate(coordinate);
            }
        }
        if found.iter().any(|p| p.coordinate().is_none()) {
            found = self.client.resolve_locations(found).await.photos;
        }

        let before = self.photos.len();
        for photo in found {
            self.photos.insert(photo.remote_id.clone(), photo);
        }
        let added = self.photos.len() - before;
        info!(added, total = self.photos.len(), "Photos merged into map");
        Ok(added)
    }

    /// Thumbnail for a map annotation.
    pub async fn thumbnail(&self, photo: &PhotoRecord) -> Option<Arc<FetchedImage>> {
        self.images.fetch(photo.thumbnail_url(), false).await
    }

    /// Full-size image for the photo detail view.
    pub async fn full_image(&self, photo: &PhotoRecord) -> Option<Arc<FetchedImage>> {
        self.images.fetch(photo.full_image_url(), false).await
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }
}
