//! Plain data types shared by the location, network and map layers.
pub mod coordinate;
pub mod photo;

pub use coordinate::GeoCoordinate;
pub use photo::{ImageSize, PhotoRecord};
