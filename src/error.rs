use thiserror::Error;

/// The primary error type for the photo-map crate.
#[derive(Error, Debug)]
pub enum PhotoMapError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Photo search failed: {0}")]
    Search(#[from] crate::network::PhotoClientError),

    #[error("Image fetch failed: {0}")]
    Image(#[from] crate::images::ImageFetchError),

    #[error("Could not build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("No API key configured; set the {0} environment variable")]
    MissingApiKey(&'static str),

    #[error("Invalid base URL {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
