use crate::model::GeoCoordinate;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One fix reported by the positioning hardware.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub coordinate: GeoCoordinate,
    /// Radius of uncertainty in meters. Negative values mean the fix is invalid.
    pub horizontal_accuracy_m: f64,
    pub timestamp: DateTime<Utc>,
}

/// Permission state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Restricted,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse | Self::AuthorizedAlways)
    }
}

/// Lifecycle of a [`LocationAcquisitionEngine`](crate::location::LocationAcquisitionEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum EngineState {
    /// Not started, converged, or torn down.
    Idle,
    AwaitingPermission,
    /// Sensor is running and samples are being evaluated.
    Updating,
    /// Sensor is off until the restart timer fires.
    Suspended,
    /// Permission was denied or restricted. Terminal.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct LocationConfig {
    /// A fix at least this accurate ends the acquisition cycle.
    #[builder(default = 100.0)]
    pub desired_accuracy_m: f64,

    /// How long the sensor runs before it is suspended.
    #[builder(default = Duration::from_secs(30))]
    pub timeout: Duration,

    /// How long the sensor stays suspended before the next attempt.
    #[builder(default = Duration::from_secs(60))]
    pub restart_after: Duration,

    /// Samples older than this are cached fixes and get ignored.
    #[builder(default = Duration::from_secs(5))]
    pub max_sample_age: Duration,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
