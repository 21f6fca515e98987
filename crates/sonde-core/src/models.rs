//! Core data models for sky-window matching.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RecordError};

/// Observing site. Validated on construction and immutable for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observer {
    lat: f64,
    lon: f64,
    altitude_m: f64,
    /// Instant of interest, used to derive a window when none is given explicitly
    reference_time: Option<DateTime<Utc>>,
}

impl Observer {
    /// Create an observer at a geodetic position.
    ///
    /// # Arguments
    /// * `lat`, `lon` - Position in decimal degrees
    /// * `altitude_m` - Altitude above mean sea level in meters
    pub fn new(lat: f64, lon: f64, altitude_m: f64) -> Result<Self, ConfigError> {
        if !lat.is_finite() {
            return Err(ConfigError::NonFinite { field: "latitude" });
        }
        if !lon.is_finite() {
            return Err(ConfigError::NonFinite { field: "longitude" });
        }
        if !altitude_m.is_finite() {
            return Err(ConfigError::NonFinite { field: "altitude" });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ConfigError::LongitudeOutOfRange(lon));
        }

        Ok(Self {
            lat,
            lon,
            altitude_m,
            reference_time: None,
        })
    }

    /// Attach the instant of interest.
    pub fn with_reference_time(mut self, time: DateTime<Utc>) -> Self {
        self.reference_time = Some(time);
        self
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn altitude_m(&self) -> f64 {
        self.altitude_m
    }

    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        self.reference_time
    }

    /// (lat, lon, altitude_m) tuple for the spatial helpers.
    pub fn position(&self) -> (f64, f64, f64) {
        (self.lat, self.lon, self.altitude_m)
    }
}

/// A single radiosonde position fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub serial: String,
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

impl Snapshot {
    pub fn position(&self) -> (f64, f64, f64) {
        (self.lat, self.lon, self.altitude_m)
    }
}

/// Named positions kept in a sonde summary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// First received position
    Launch,
    /// Highest received position
    Burst,
    /// Last received position
    Landing,
}

impl Slot {
    /// Iteration order used everywhere slots are walked.
    pub const ALL: [Slot; 3] = [Slot::Launch, Slot::Burst, Slot::Landing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Launch => "launch",
            Slot::Burst => "burst",
            Slot::Landing => "landing",
        }
    }

    /// Resolve a slot name as written in summary files.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "launch" | "first" | "first_seen" => Some(Slot::Launch),
            "burst" | "peak" | "highest" => Some(Slot::Burst),
            "landing" | "last" | "last_seen" => Some(Slot::Landing),
            _ => None,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of snapshots available for a sonde at filtering time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummarySlots {
    pub launch: Option<Snapshot>,
    pub burst: Option<Snapshot>,
    pub landing: Option<Snapshot>,
}

impl SummarySlots {
    pub fn get(&self, slot: Slot) -> Option<&Snapshot> {
        match slot {
            Slot::Launch => self.launch.as_ref(),
            Slot::Burst => self.burst.as_ref(),
            Slot::Landing => self.landing.as_ref(),
        }
    }

    pub fn set(&mut self, slot: Slot, snapshot: Snapshot) {
        match slot {
            Slot::Launch => self.launch = Some(snapshot),
            Slot::Burst => self.burst = Some(snapshot),
            Slot::Landing => self.landing = Some(snapshot),
        }
    }

    /// Populated slots in launch, burst, landing order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &Snapshot)> + '_ {
        Slot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|snapshot| (slot, snapshot)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One sonde's summary, loaded from one archive file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SondeRecord {
    serial: String,
    slots: SummarySlots,
}

impl SondeRecord {
    /// Build a record. At least one slot must be populated.
    pub fn new(serial: impl Into<String>, slots: SummarySlots) -> Result<Self, RecordError> {
        if slots.is_empty() {
            return Err(RecordError::Empty);
        }
        Ok(Self {
            serial: serial.into(),
            slots,
        })
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn slots(&self) -> &SummarySlots {
        &self.slots
    }
}

/// A snapshot seen above the observer's horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub serial: String,
    pub slot: Slot,
    pub timestamp: DateTime<Utc>,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    /// Straight-line distance from the observer
    pub range_m: f64,
}

/// Inclusive UTC time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvertedWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Window spanning `half_width_secs` either side of `center`.
    pub fn around(center: DateTime<Utc>, half_width_secs: f64) -> Result<Self, ConfigError> {
        if !half_width_secs.is_finite() || half_width_secs < 0.0 {
            return Err(ConfigError::NegativeWindow(half_width_secs));
        }
        let millis = (half_width_secs * 1000.0).round();
        if millis > i64::MAX as f64 {
            return Err(ConfigError::WindowOutOfRange(half_width_secs));
        }
        let half = Duration::try_milliseconds(millis as i64)
            .ok_or(ConfigError::WindowOutOfRange(half_width_secs))?;
        let start = center
            .checked_sub_signed(half)
            .ok_or(ConfigError::WindowOutOfRange(half_width_secs))?;
        let end = center
            .checked_add_signed(half)
            .ok_or(ConfigError::WindowOutOfRange(half_width_secs))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Parse an ISO-8601 instant. Values without an offset are taken as UTC.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(ConfigError::InvalidTime(value.to_string()))
}
