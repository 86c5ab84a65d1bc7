use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageFetchError {
    #[error("Image download failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Image server answered HTTP {0}")]
    Status(u16),

    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image decoding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
