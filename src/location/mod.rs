//! Best-effort location acquisition with sensor duty cycling.
//!
//! The [`LocationAcquisitionEngine`] runs the sensor until a fix meets the desired accuracy,
//! then stops it. If no such fix arrives within the configured timeout, the sensor is
//! suspended and retried later, which bounds power draw when a fix is slow or unobtainable.
mod engine;
mod structs;
mod tracker;

pub use engine::{
    ChannelDelegate, LocationAcquisitionEngine, LocationDelegate, LocationHandle,
    LocationProvider,
};
pub use structs::{AuthorizationStatus, EngineState, LocationConfig, LocationSample};
pub use tracker::{BestEffortTracker, SampleVerdict};
