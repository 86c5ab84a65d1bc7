use crate::model::{GeoCoordinate, PhotoRecord};
use crate::network::error::PhotoClientError;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Fails the call if the API answered with its error envelope.
pub fn check_api_status(body: &Value) -> Result<(), PhotoClientError> {
    if body.get("stat").and_then(Value::as_str) != Some("fail") {
        return Ok(());
    }
    let code = body.get("code").and_then(Value::as_i64).unwrap_or_default();
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string();
    Err(PhotoClientError::Api { code, message })
}

/// Parses the `photos.photo` array of a search response.
///
/// Entries missing a required field are dropped one by one; a single bad entry never fails
/// the batch. Repeated ids keep their first occurrence.
pub fn parse_search_response(body: &Value) -> Result<Vec<PhotoRecord>, PhotoClientError> {
    let entries = body
        .get("photos")
        .and_then(|p| p.get("photo"))
        .and_then(Value::as_array)
        .ok_or(PhotoClientError::MissingField("photos.photo"))?;

    let mut seen = HashSet::with_capacity(entries.len());
    let mut photos = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;
    for entry in entries {
        match PhotoRecord::from_json(entry) {
            Some(photo) if seen.insert(photo.remote_id.clone()) => photos.push(photo),
            Some(photo) => debug!(id = %photo.remote_id, "Skipping duplicate photo"),
            None => {
                dropped += 1;
                debug!(%entry, "Dropping malformed photo entry");
            }
        }
    }

    if dropped > 0 {
        warn!(dropped, kept = photos.len(), "Some photo entries could not be parsed");
    }
    Ok(photos)
}

/// Parses a geo lookup response. An out-of-range or unparsable position yields `Ok(None)`.
pub fn parse_location_response(body: &Value) -> Result<Option<GeoCoordinate>, PhotoClientError> {
    let location = body
        .get("photo")
        .and_then(|p| p.get("location"))
        .ok_or(PhotoClientError::MissingField("photo.location"))?;
    Ok(GeoCoordinate::from_json(location))
}
