//! Horizon match filter.
//!
//! Decides which summary snapshots put a sonde above an observer's horizon
//! inside the time window of interest.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::ConfigError;
use crate::models::{Match, Observer, Slot, Snapshot, SondeRecord, TimeWindow};
use crate::spatial::look_angles;

/// Default minimum elevation: the geometric horizon.
pub const DEFAULT_MIN_ELEVATION_DEG: f64 = 0.0;

/// Run parameters for the filter.
#[derive(Debug, Clone, Serialize)]
pub struct FilterConfig {
    pub observer: Observer,
    /// Snapshots below this elevation never match
    pub min_elevation_deg: f64,
    /// Inclusive window; `None` accepts every timestamp
    pub window: Option<TimeWindow>,
}

impl FilterConfig {
    /// Config with the default threshold and no time window.
    pub fn new(observer: Observer) -> Self {
        Self {
            observer,
            min_elevation_deg: DEFAULT_MIN_ELEVATION_DEG,
            window: None,
        }
    }

    pub fn with_min_elevation(mut self, min_elevation_deg: f64) -> Result<Self, ConfigError> {
        if !min_elevation_deg.is_finite() || !(-90.0..=90.0).contains(&min_elevation_deg) {
            return Err(ConfigError::InvalidThreshold(min_elevation_deg));
        }
        self.min_elevation_deg = min_elevation_deg;
        Ok(self)
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Derive the window from the observer's reference time, if it has one.
    pub fn with_reference_window(self, half_width_secs: f64) -> Result<Self, ConfigError> {
        match self.observer.reference_time() {
            Some(center) => Ok(self.with_window(TimeWindow::around(center, half_width_secs)?)),
            None => Ok(self),
        }
    }
}

/// Classifies snapshots against a fixed configuration.
#[derive(Debug, Clone)]
pub struct HorizonFilter {
    config: FilterConfig,
}

impl HorizonFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Scan every record and return the visible snapshots.
    ///
    /// Output order follows the records, then launch, burst, landing within a record.
    pub fn run(&self, records: &[SondeRecord]) -> Vec<Match> {
        let mut matches = Vec::new();

        for record in records {
            for (slot, snapshot) in record.slots().iter() {
                if let Some(found) = self.check(record, slot, snapshot) {
                    tracing::debug!(
                        "Match {} ({}) at {}: el {:.2}, az {:.2}",
                        found.serial,
                        found.slot,
                        found.timestamp.to_rfc3339(),
                        found.elevation_deg,
                        found.azimuth_deg
                    );
                    matches.push(found);
                }
            }
        }

        matches
    }

    /// Classify a single snapshot.
    pub fn check(&self, record: &SondeRecord, slot: Slot, snapshot: &Snapshot) -> Option<Match> {
        if let Some(window) = &self.config.window {
            if !window.contains(snapshot.timestamp) {
                return None;
            }
        }

        let angles = look_angles(self.config.observer.position(), snapshot.position())?;
        if angles.elevation_deg < self.config.min_elevation_deg {
            return None;
        }

        Some(Match {
            serial: record.serial().to_string(),
            slot,
            timestamp: snapshot.timestamp,
            elevation_deg: angles.elevation_deg,
            azimuth_deg: angles.azimuth_deg,
            range_m: angles.straight_distance_m,
        })
    }
}

/// Unique serials in the order they first matched.
pub fn matched_serials(matches: &[Match]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut serials = Vec::new();
    for m in matches {
        if seen.insert(m.serial.as_str()) {
            serials.push(m.serial.clone());
        }
    }
    serials
}

/// Sort matches by timestamp, keeping scan order for ties.
pub fn sort_chronologically(matches: &mut [Match]) {
    matches.sort_by_key(|m| m.timestamp);
}
