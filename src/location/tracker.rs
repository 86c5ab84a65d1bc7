use crate::location::structs::{LocationConfig, LocationSample};
use chrono::{DateTime, TimeDelta, Utc};

/// What happened to a sample offered to the [`BestEffortTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleVerdict {
    /// Sensor error sentinel.
    NegativeAccuracy,
    /// Older than the configured maximum age.
    Stale,
    /// Valid, but no better than the current best.
    NotMoreAccurate,
    /// Became the new best, still short of the desired accuracy.
    Adopted,
    /// Became the new best and meets the desired accuracy.
    Converged(LocationSample),
}

/// Keeps the most accurate recent sample of one acquisition cycle.
#[derive(Debug, Clone)]
pub struct BestEffortTracker {
    desired_accuracy_m: f64,
    max_sample_age: TimeDelta,
    best: Option<LocationSample>,
}

impl BestEffortTracker {
    pub fn new(config: &LocationConfig) -> Self {
        Self {
            desired_accuracy_m: config.desired_accuracy_m,
            max_sample_age: TimeDelta::from_std(config.max_sample_age).unwrap_or(TimeDelta::MAX),
            best: None,
        }
    }

    pub const fn best(&self) -> Option<&LocationSample> {
        self.best.as_ref()
    }

    /// Starts a fresh cycle.
    pub fn reset(&mut self) {
        self.best = None;
    }

    /// Evaluates `sample` as of `now`. Rejected samples never touch the best slot.
    pub fn offer(&mut self, sample: LocationSample, now: DateTime<Utc>) -> SampleVerdict {
        if sample.horizontal_accuracy_m < 0.0 {
            return SampleVerdict::NegativeAccuracy;
        }
        if now.signed_duration_since(sample.timestamp) > self.max_sample_age {
            return SampleVerdict::Stale;
        }

        let improves = self
            .best
            .is_none_or(|best| sample.horizontal_accuracy_m < best.horizontal_accuracy_m);
        if !improves {
            return SampleVerdict::NotMoreAccurate;
        }

        self.best = Some(sample);
        if sample.horizontal_accuracy_m <= self.desired_accuracy_m {
            SampleVerdict::Converged(sample)
        } else {
            SampleVerdict::Adopted
        }
    }
}
