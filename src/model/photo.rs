use crate::model::GeoCoordinate;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DATE_TAKEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Size suffixes served by the static image host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ImageSize {
    /// 75x75 square.
    SmallSquare,
    /// 150x150 square.
    LargeSquare,
    /// 320 on the longest side.
    Small,
    /// 640 on the longest side.
    Medium,
    /// 800 on the longest side.
    MediumLarge,
    /// 1024 on the longest side.
    Large,
    /// 2048 on the longest side.
    ExtraLarge,
    Original,
}

impl ImageSize {
    pub const fn code(self) -> &'static str {
        match self {
            Self::SmallSquare => "s",
            Self::LargeSquare => "q",
            Self::Small => "n",
            Self::Medium => "z",
            Self::MediumLarge => "c",
            Self::Large => "b",
            Self::ExtraLarge => "k",
            Self::Original => "o",
        }
    }
}

/// A photo returned by a nearby search.
///
/// Image URLs are derived once at construction. Deserializing ignores any stored URLs and
/// derives them again from farm, server, id and secret.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", from = "StoredPhoto")]
pub struct PhotoRecord {
    pub remote_id: String,
    pub farm_id: u32,
    pub server_id: String,
    pub secret: String,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub owner_name: Option<String>,
    pub date_taken: Option<String>,
    pub description: Option<String>,
    coordinate: Option<GeoCoordinate>,
    thumbnail_url: String,
    full_image_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPhoto {
    remote_id: String,
    farm_id: u32,
    server_id: String,
    secret: String,
    title: Option<String>,
    tags: Option<Vec<String>>,
    owner_name: Option<String>,
    date_taken: Option<String>,
    description: Option<String>,
    coordinate: Option<GeoCoordinate>,
}

impl From<StoredPhoto> for PhotoRecord {
    fn from(stored: StoredPhoto) -> Self {
        let mut photo = Self::new(
            stored.remote_id,
            stored.farm_id,
            stored.server_id,
            stored.secret,
        );
        photo.title = stored.title;
        photo.tags = stored.tags;
        photo.owner_name = stored.owner_name;
        photo.date_taken = stored.date_taken;
        photo.description = stored.description;
        photo.coordinate = stored.coordinate;
        photo
    }
}

impl PhotoRecord {
    pub fn new(
        remote_id: impl Into<String>,
        farm_id: u32,
        server_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        let remote_id = remote_id.into();
        let server_id = server_id.into();
        let secret = secret.into();
        let thumbnail_url =
            image_url(farm_id, &server_id, &remote_id, &secret, ImageSize::SmallSquare);
        let full_image_url = image_url(farm_id, &server_id, &remote_id, &secret, ImageSize::Large);
        Self {
            remote_id,
            farm_id,
            server_id,
            secret,
            title: None,
            tags: None,
            owner_name: None,
            date_taken: None,
            description: None,
            coordinate: None,
            thumbnail_url,
            full_image_url,
        }
    }

    /// Builds a record from one entry of a search response's `photos.photo` array.
    ///
    /// Returns `None` when any of `id`, `farm`, `server` or `secret` is missing or has the
    /// wrong type. Optional fields that are malformed are simply left empty.
    pub fn from_json(entry: &Value) -> Option<Self> {
        let remote_id = get_string(entry, "id")?;
        let farm_id = entry
            .get("farm")
            .and_then(Value::as_u64)
            .and_then(|farm| u32::try_from(farm).ok())?;
        let server_id = get_string(entry, "server")?;
        let secret = get_string(entry, "secret")?;

        let mut photo = Self::new(remote_id, farm_id, server_id, secret);
        photo.title = get_string(entry, "title");
        photo.tags = get_string(entry, "tags")
            .map(|tags| tags.split_whitespace().map(str::to_owned).collect());
        photo.owner_name = get_string(entry, "ownername");
        photo.date_taken = get_string(entry, "datetaken");
        photo.description = entry
            .get("description")
            .and_then(|d| d.get("_content"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        photo.coordinate = GeoCoordinate::from_json(entry);
        Some(photo)
    }

    pub const fn coordinate(&self) -> Option<GeoCoordinate> {
        self.coordinate
    }

    /// Backfills the coordinate once a follow-up geo lookup has resolved it.
    pub fn set_coordinate(&mut self, coordinate: GeoCoordinate) {
        self.coordinate = Some(coordinate);
    }

    pub fn thumbnail_url(&self) -> &str {
        &self.thumbnail_url
    }

    pub fn full_image_url(&self) -> &str {
        &self.full_image_url
    }

    pub fn image_url(&self, size: ImageSize) -> String {
        image_url(
            self.farm_id,
            &self.server_id,
            &self.remote_id,
            &self.secret,
            size,
        )
    }

    /// The `datetaken` value as a naive local timestamp, if it is in the API's format.
    pub fn date_taken_parsed(&self) -> Option<NaiveDateTime> {
        self.date_taken
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), DATE_TAKEN_FORMAT).ok())
    }
}

fn image_url(farm: u32, server: &str, id: &str, secret: &str, size: ImageSize) -> String {
    format!(
        "https://farm{farm}.staticflickr.com/{server}/{id}_{secret}_{}.jpg",
        size.code()
    )
}

fn get_string(entry: &Value, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_derives_thumbnail_and_full_urls() {
        let entry = json!({
            "id": "1",
            "farm": 4,
            "server": "1234",
            "secret": "abcd",
            "title": "X"
        });

        let photo = PhotoRecord::from_json(&entry).expect("entry is well formed");

        assert_eq!(
            photo.thumbnail_url(),
            "https://farm4.staticflickr.com/1234/1_abcd_s.jpg"
        );
        assert_eq!(
            photo.full_image_url(),
            "https://farm4.staticflickr.com/1234/1_abcd_b.jpg"
        );
        assert_eq!(photo.title.as_deref(), Some("X"));
        assert!(photo.coordinate().is_none());
    }

    #[test]
    fn test_image_url_for_every_size() {
        let photo = PhotoRecord::new("9", 1, "77", "ff");
        let codes: Vec<String> = [
            ImageSize::SmallSquare,
            ImageSize::LargeSquare,
            ImageSize::Small,
            ImageSize::Medium,
            ImageSize::MediumLarge,
            ImageSize::Large,
            ImageSize::ExtraLarge,
            ImageSize::Original,
        ]
        .into_iter()
        .map(|size| photo.image_url(size))
        .collect();

        assert_eq!(codes[1], "https://farm1.staticflickr.com/77/9_ff_q.jpg");
        assert_eq!(codes[7], "https://farm1.staticflickr.com/77/9_ff_o.jpg");
        assert_eq!(codes[0], photo.thumbnail_url());
        assert_eq!(codes[5], photo.full_image_url());
    }

    #[test]
    fn test_parses_optional_extras() {
        let entry = json!({
            "id": "42",
            "farm": 2,
            "server": "500",
            "secret": "cafe",
            "title": "Sunset pier",
            "tags": "santa monica  pier\tsunset",
            "ownername": "jlew",
            "datetaken": "2016-07-15 18:44:02",
            "description": { "_content": "Golden hour" },
            "latitude": "34.0094",
            "longitude": "-118.4973"
        });

        let photo = PhotoRecord::from_json(&entry).unwrap();

        // --- Assertions ---
        assert_eq!(
            photo.tags,
            Some(vec![
                "santa".to_string(),
                "monica".to_string(),
                "pier".to_string(),
                "sunset".to_string()
            ])
        );
        assert_eq!(photo.owner_name.as_deref(), Some("jlew"));
        assert_eq!(photo.description.as_deref(), Some("Golden hour"));
        let coordinate = photo.coordinate().expect("coordinate should be embedded");
        assert_eq!(coordinate.latitude(), 34.0094);
        assert_eq!(coordinate.longitude(), -118.4973);

        let taken = photo.date_taken_parsed().expect("date should parse");
        assert_eq!(taken.year(), 2016);
        assert_eq!(taken.hour(), 18);
    }

    #[test]
    fn test_missing_required_field_yields_none() {
        for missing in ["id", "farm", "server", "secret"] {
            let mut entry = json!({
                "id": "1",
                "farm": 4,
                "server": "1234",
                "secret": "abcd"
            });
            entry.as_object_mut().unwrap().remove(missing);
            assert!(
                PhotoRecord::from_json(&entry).is_none(),
                "Entry without `{missing}` should be dropped"
            );
        }
    }

    #[test]
    fn test_wrongly_typed_farm_yields_none() {
        let entry = json!({ "id": "1", "farm": "four", "server": "1234", "secret": "abcd" });
        assert!(PhotoRecord::from_json(&entry).is_none());
    }

    #[test]
    fn test_out_of_range_embedded_coordinate_is_ignored() {
        let entry = json!({
            "id": "1",
            "farm": 4,
            "server": "1234",
            "secret": "abcd",
            "latitude": 200.0,
            "longitude": 10.0
        });
        let photo = PhotoRecord::from_json(&entry).unwrap();
        assert!(photo.coordinate().is_none());
    }

    #[test]
    fn test_set_coordinate_backfills() {
        let mut photo = PhotoRecord::new("1", 4, "1234", "abcd");
        let coordinate = GeoCoordinate::new(34.0, -118.0).unwrap();
        photo.set_coordinate(coordinate);
        assert_eq!(photo.coordinate(), Some(coordinate));
        // Derived URLs are unaffected.
        assert_eq!(
            photo.thumbnail_url(),
            "https://farm4.staticflickr.com/1234/1_abcd_s.jpg"
        );
    }

    #[test]
    fn test_deserialize_rederives_image_urls() {
        let stored = json!({
            "remoteId": "1",
            "farmId": 4,
            "serverId": "1234",
            "secret": "abcd",
            "title": "X",
            "coordinate": { "latitude": 34.0, "longitude": -118.0 },
            "thumbnailUrl": "https://example.com/elsewhere.jpg",
            "fullImageUrl": "https://example.com/elsewhere_b.jpg"
        });

        let photo: PhotoRecord = serde_json::from_value(stored).unwrap();

        // --- Assertions ---
        assert_eq!(
            photo.thumbnail_url(),
            "https://farm4.staticflickr.com/1234/1_abcd_s.jpg"
        );
        assert_eq!(
            photo.full_image_url(),
            "https://farm4.staticflickr.com/1234/1_abcd_b.jpg"
        );
        assert_eq!(photo.title.as_deref(), Some("X"));
        assert_eq!(photo.coordinate(), GeoCoordinate::new(34.0, -118.0));

        let round_trip: PhotoRecord =
            serde_json::from_value(serde_json::to_value(&photo).unwrap()).unwrap();
        assert_eq!(round_trip, photo);
    }

    #[test]
    fn test_unparsable_date_taken() {
        let mut photo = PhotoRecord::new("1", 4, "1234", "abcd");
        photo.date_taken = Some("last summer".to_string());
        assert!(photo.date_taken_parsed().is_none());
    }
}
