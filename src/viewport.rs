//! Decides when a moved map warrants a new nearby search.
//!
//! The decision is purely distance based: the map's zoom level and visible bounds are not
//! considered. At high zoom a pan of a full search radius can leave photos unrefreshed
//! for a long time, and at low zoom small pans already trigger new searches.
use crate::model::GeoCoordinate;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RefreshDecision {
    /// No location-derived search has completed yet.
    NotReady,
    /// The viewport is still inside the area covered by the last search.
    WithinRadius { distance_m: f64 },
    /// Search again around `center`, which is now the last query coordinate.
    Refresh { center: GeoCoordinate, distance_m: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportRefreshPolicy {
    search_radius_km: f64,
    last_query: Option<GeoCoordinate>,
}

impl ViewportRefreshPolicy {
    pub const fn new(search_radius_km: f64) -> Self {
        Self {
            search_radius_km,
            last_query: None,
        }
    }

    pub const fn search_radius_km(&self) -> f64 {
        self.search_radius_km
    }

    pub const fn last_query(&self) -> Option<GeoCoordinate> {
        self.last_query
    }

    /// Whether the first location-derived search has completed.
    pub const fn location_found(&self) -> bool {
        self.last_query.is_some()
    }

    /// Records a completed search around `coordinate`. Called for the initial
    /// location-derived search; enables [`evaluate`](Self::evaluate).
    pub fn record_query(&mut self, coordinate: GeoCoordinate) {
        self.last_query = Some(coordinate);
    }

    /// Evaluates a viewport change. On [`RefreshDecision::Refresh`] the new center becomes
    /// the last query coordinate.
    pub fn evaluate(&mut self, center: GeoCoordinate) -> RefreshDecision {
        let Some(last_query) = self.last_query else {
            return RefreshDecision::NotReady;
        };

        let distance_m = last_query.distance_to(&center);
        if distance_m > self.search_radius_km * 1000.0 {
            debug!(distance_m, "Viewport left the searched area");
            self.last_query = Some(center);
            RefreshDecision::Refresh { center, distance_m }
        } else {
            RefreshDecision::WithinRadius { distance_m }
        }
    }
}
