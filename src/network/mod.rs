//! Photo search and per-photo geo lookup against the Flickr REST API.
mod client;
mod error;
mod response;

pub use client::{DEFAULT_EXTRAS, GeoResolution, PhotoSearchClient};
pub use error::{ErrorKind, PhotoClientError};
pub use response::{parse_location_response, parse_search_response};
