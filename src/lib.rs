//! # Photo Map
//!
//! Discover geotagged photos around a location and keep them fresh as the map moves.
//!
//! This crate holds the non-visual core of a photo map: it finds out where the user is,
//! searches the Flickr API for photos nearby, downloads their images through a bounded
//! cache, and decides when a moved map needs a new search.
//!
//! ## Key Features
//!
//! - **Location**: Acquires a "best effort" fix, switching the sensor off between attempts to save power.
//! - **Photo Search**: Finds photos within a radius of a coordinate, with tags, owner, description and date taken.
//! - **Geo Lookup**: Backfills coordinates for photos whose search entry has none, all lookups in flight at once.
//! - **Image Cache**: Downloads and decodes thumbnails and full-size images, keeping the last 80 in memory.
//! - **Viewport Refresh**: Searches again once the map center leaves the radius of the last search.
//!
//! ## Usage
//!
//! Configure the API key through the `FLICKR_API_KEY` environment variable, create a
//! [`PhotoMap`] and feed it locations and viewport changes.
//!
//! ```rust,no_run
//! use photo_map::{PhotoMap, PhotoMapConfig, PhotoMapError};
//! use photo_map::model::GeoCoordinate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PhotoMapError> {
//!     let config = PhotoMapConfig::from_env()?;
//!     let mut map = PhotoMap::from_config(&config)?;
//!
//!     let venice_beach = GeoCoordinate::new(33.985, -118.4695).unwrap();
//!     map.search_around(venice_beach).await?;
//!
//!     for photo in map.located_photos() {
//!         println!("{:?} at {:?}", photo.title, photo.coordinate());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod images;
pub mod location;
pub mod model;
pub mod network;
pub mod photo_map;
pub mod viewport;

pub use config::PhotoMapConfig;
pub use error::{ConfigError, PhotoMapError};
pub use photo_map::PhotoMap;
