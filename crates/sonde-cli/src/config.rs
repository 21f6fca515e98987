//! Observer and time-window arguments shared by the binaries.

use clap::Args;
use sonde_core::{parse_instant, ConfigError, FilterConfig, KmlOptions, Observer, TimeWindow};

/// Default site: Cape Girardeau, MO, on the 2024-04-08 eclipse path.
pub const DEFAULT_LAT: f64 = 37.4300;
pub const DEFAULT_LON: f64 = -89.6436;
pub const DEFAULT_ALT_M: f64 = 161.0;
pub const DEFAULT_DATETIME: &str = "2024-04-08T19:00:15Z";
pub const DEFAULT_WINDOW_SECS: f64 = 3600.0 * 4.0;

#[derive(Args, Debug, Clone)]
pub struct ObserverArgs {
    /// Latitude of observation site, in decimal degrees
    #[arg(long, default_value_t = DEFAULT_LAT, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of observation site, in decimal degrees
    #[arg(long, default_value_t = DEFAULT_LON, allow_negative_numbers = true)]
    pub lon: f64,

    /// Altitude AMSL of the observing site, in meters
    #[arg(long, default_value_t = DEFAULT_ALT_M, allow_negative_numbers = true)]
    pub alt: f64,

    /// Elevation threshold in degrees; snapshots below it are dropped
    #[arg(
        long = "min-el",
        default_value_t = sonde_core::DEFAULT_MIN_ELEVATION_DEG,
        allow_negative_numbers = true
    )]
    pub min_el: f64,

    /// Time of interest (ISO-8601, UTC if no offset)
    #[arg(long, default_value = DEFAULT_DATETIME)]
    pub datetime: String,

    /// Half-width of the window around --datetime, in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_SECS)]
    pub window: f64,

    /// Explicit window start; overrides --datetime/--window (requires --end)
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// Explicit window end (requires --start)
    #[arg(long, requires = "start")]
    pub end: Option<String>,

    /// Ignore time entirely and match across all available data
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub all_time: bool,
}

impl ObserverArgs {
    /// Validate everything and build the filter configuration.
    pub fn to_filter_config(&self) -> Result<FilterConfig, ConfigError> {
        let reference = parse_instant(&self.datetime)?;
        let observer = Observer::new(self.lat, self.lon, self.alt)?.with_reference_time(reference);
        let config = FilterConfig::new(observer).with_min_elevation(self.min_el)?;

        if self.all_time {
            return Ok(config);
        }

        match (&self.start, &self.end) {
            (Some(start), Some(end)) => {
                let window = TimeWindow::new(parse_instant(start)?, parse_instant(end)?)?;
                Ok(config.with_window(window))
            }
            _ => config.with_reference_window(self.window),
        }
    }
}

/// Track rendering flags for the KML converters.
#[derive(Args, Debug, Clone)]
pub struct KmlArgs {
    /// Clamp tracks to the ground instead of using absolute altitudes
    #[arg(long)]
    pub clamp_to_ground: bool,

    /// Do not draw a curtain from the track to the ground
    #[arg(long)]
    pub no_extrude: bool,

    /// Only emit the landing placemark for each flight
    #[arg(long)]
    pub last_only: bool,
}

impl KmlArgs {
    pub fn to_options(&self) -> KmlOptions {
        KmlOptions {
            absolute: !self.clamp_to_ground,
            extrude: !self.no_extrude,
            last_only: self.last_only,
        }
    }
}
