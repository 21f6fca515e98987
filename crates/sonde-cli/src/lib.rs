//! Sonde CLI - Command line tools for the sky-window pipeline.
//!
//! This crate provides the pipeline binaries:
//! - match_sondes: filter summary files against an observer's sky
//! - fetch_telemetry: download full telemetry for matched serials
//! - telemetry_to_kml: convert downloaded telemetry to KML
//! - amateur_to_kml: convert an amateur payload export to KML

pub mod config;
pub mod convert;
pub mod fetch;
pub mod logging;
pub mod serials;

pub use config::{KmlArgs, ObserverArgs};
pub use fetch::{FetchSummary, TelemetryClient};
pub use serials::{read_serial_list, write_serial_list};
