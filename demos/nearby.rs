//! Finds photos around a fixed location and downloads the first thumbnail.
//!
//! ```sh
//! FLICKR_API_KEY=... RUST_LOG=photo_map=debug cargo run --example nearby
//! ```

use async_trait::async_trait;
use chrono::Utc;
use photo_map::location::{
    AuthorizationStatus, ChannelDelegate, LocationAcquisitionEngine, LocationDelegate,
    LocationProvider, LocationSample,
};
use photo_map::model::GeoCoordinate;
use photo_map::{PhotoMap, PhotoMapConfig};
use std::error::Error;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Pretends to be a GPS receiver parked on the Santa Monica pier.
struct FixedProvider {
    coordinate: GeoCoordinate,
}

#[async_trait]
impl LocationProvider for FixedProvider {
    fn authorization_status(&self) -> AuthorizationStatus {
        AuthorizationStatus::AuthorizedWhenInUse
    }

    async fn request_authorization(&self) -> AuthorizationStatus {
        AuthorizationStatus::AuthorizedWhenInUse
    }

    fn start_updates(&self) -> mpsc::Receiver<LocationSample> {
        let (tx, rx) = mpsc::channel(1);
        let sample = LocationSample {
            coordinate: self.coordinate,
            horizontal_accuracy_m: 30.0,
            timestamp: Utc::now(),
        };
        if let Err(e) = tx.try_send(sample) {
            debug!("Could not queue fixed location: {e}");
        }
        rx
    }

    fn stop_updates(&self) {}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = PhotoMapConfig::from_env()?;
    let mut map = PhotoMap::from_config(&config)?;

    let coordinate = GeoCoordinate::new(34.0094, -118.4973).ok_or("invalid coordinate")?;
    let provider = Arc::new(FixedProvider { coordinate });
    let (delegate, mut found) = ChannelDelegate::new();
    let as_dyn: Arc<dyn LocationDelegate> = delegate;
    let weak: Weak<dyn LocationDelegate> = Arc::downgrade(&as_dyn);
    let handle = LocationAcquisitionEngine::new(provider, config.location.clone(), weak).start();

    let sample = found.recv().await.ok_or("location engine stopped without a fix")?;
    handle.join().await;

    let added = map.on_location_found(&sample).await?;
    println!("Found {added} photos near {coordinate:?}");
    for photo in map.located_photos().take(5) {
        println!("{}", serde_json::to_string_pretty(photo)?);
    }

    if let Some(photo) = map.photos().next()
        && let Some(thumbnail) = map.thumbnail(photo).await
    {
        println!(
            "Thumbnail of {}: {}x{} ({} bytes)",
            photo.remote_id,
            thumbnail.width(),
            thumbnail.height(),
            thumbnail.encoded_len()
        );
    }
    Ok(())
}
