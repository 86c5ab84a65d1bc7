use crate::error::PhotoMapError;
use crate::images::error::ImageFetchError;
use crate::images::fifo_cache::FifoCache;
use bon::bon;
use image::DynamicImage;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

/// A downloaded and decoded image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    image: DynamicImage,
    encoded_len: usize,
}

impl FetchedImage {
    pub const fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Size of the downloaded file in bytes.
    pub const fn encoded_len(&self) -> usize {
        self.encoded_len
    }
}

/// Downloads images by URL and keeps the most recently inserted ones in memory.
///
/// The lock around the cache is only taken between awaits, never across one.
pub struct ImageFetchCache {
    http: reqwest::Client,
    cache: Mutex<FifoCache<Arc<FetchedImage>>>,
}

#[bon]
impl ImageFetchCache {
    #[builder]
    pub fn new(
        #[builder(default = 80)] capacity: usize,
        #[builder(default = Duration::from_secs(20))] timeout: Duration,
    ) -> Result<Self, PhotoMapError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PhotoMapError::HttpClient)?;
        Ok(Self {
            http,
            cache: Mutex::new(FifoCache::new(capacity)),
        })
    }

    /// Returns the image at `url`, or `None` if it could not be downloaded or decoded.
    ///
    /// Unless `bypass_cache` is set, a cached image is returned without network I/O and a
    /// freshly downloaded one is cached.
    pub async fn fetch(&self, url: &str, bypass_cache: bool) -> Option<Arc<FetchedImage>> {
        self.try_fetch(url, bypass_cache)
            .await
            .inspect_err(|e| warn!(url, "{e}"))
            .ok()
    }

    /// Same as [`fetch`](Self::fetch), but reports why an image is unavailable.
    #[instrument(skip(self))]
    pub async fn try_fetch(
        &self,
        url: &str,
        bypass_cache: bool,
    ) -> Result<Arc<FetchedImage>, ImageFetchError> {
        let cached = if bypass_cache {
            None
        } else {
            self.cache.lock().get(url).cloned()
        };
        if let Some(hit) = cached {
            trace!("Image cache hit");
            return Ok(hit);
        }

        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        if !(200..400).contains(&status) {
            return Err(ImageFetchError::Status(status));
        }
        let bytes = response.bytes().await?;
        let encoded_len = bytes.len();
        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await??;

        let fetched = Arc::new(FetchedImage { image, encoded_len });
        if !bypass_cache {
            let evicted = self
                .cache
                .lock()
                .insert(url.to_string(), Arc::clone(&fetched));
            if let Some((oldest, _)) = evicted {
                debug!(evicted = %oldest, "Evicted oldest cached image");
            }
        }
        Ok(fetched)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.cache.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.lock().capacity()
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}
