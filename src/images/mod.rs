//! Image download with a bounded, insertion-ordered in-memory cache.
mod error;
mod fetch;
mod fifo_cache;

pub use error::ImageFetchError;
pub use fetch::{FetchedImage, ImageFetchCache};
pub use fifo_cache::FifoCache;
