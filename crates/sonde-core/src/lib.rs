pub mod error;
pub mod filter;
pub mod kml;
pub mod models;
pub mod spatial;
pub mod summary;
pub mod track;

pub use error::{ConfigError, RecordError, TrackError};
pub use filter::{
    matched_serials, sort_chronologically, FilterConfig, HorizonFilter, DEFAULT_MIN_ELEVATION_DEG,
};
pub use kml::{KmlDocument, KmlOptions};
pub use models::{
    parse_instant, Match, Observer, Slot, Snapshot, SondeRecord, SummarySlots, TimeWindow,
};
pub use spatial::{haversine_distance, look_angles, LookAngles};
pub use summary::{load_summary_dir, load_summary_file, parse_summary, LoadReport};
pub use track::{load_track_file, parse_amateur_export, parse_track, FlightTrack, TrackPoint};
