//! Telemetry file to KML conversion.

use anyhow::{Context, Result};
use sonde_core::{load_track_file, parse_amateur_export, FlightTrack, KmlDocument, KmlOptions};
use std::fs;
use std::path::{Path, PathBuf};

/// List `*.json` files in a folder, sorted by name.
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Convert per-serial telemetry files into one document. Bad files are logged and skipped.
pub fn telemetry_files_to_kml(files: &[PathBuf], options: KmlOptions) -> KmlDocument {
    let mut doc = KmlDocument::new(options);
    for file in files {
        tracing::debug!("Converting {} to KML", file.display());
        match load_track_file(file) {
            Ok(track) => add_logged(&mut doc, &track),
            Err(e) => tracing::error!("Failed to convert {} to KML: {}", file.display(), e),
        }
    }
    doc
}

/// Convert an amateur payload export. Bad callsigns are logged and skipped.
pub fn amateur_export_to_kml(json: &str, options: KmlOptions) -> Result<KmlDocument> {
    let tracks = parse_amateur_export(json).context("Failed to parse amateur export")?;

    let mut doc = KmlDocument::new(options);
    for (callsign, track) in tracks {
        tracing::debug!("Converting {} to KML", callsign);
        match track {
            Ok(track) => add_logged(&mut doc, &track),
            Err(e) => tracing::error!("Failed to convert {} to KML: {}", callsign, e),
        }
    }
    Ok(doc)
}

fn add_logged(doc: &mut KmlDocument, track: &FlightTrack) {
    tracing::debug!(
        "{}: {} fixes, landed {:.1} km from first fix",
        track.serial,
        track.path.len(),
        track.drift_m() / 1000.0
    );
    doc.add_track(track);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_files_do_not_stop_conversion() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("22059930.json"),
            r#"[{"datetime": "2024-04-08T18:00:00Z", "lat": 37.0, "lon": -90.0, "alt": 100.0,
                 "serial": "22059930"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("corrupt.json"), "not json").unwrap();
        fs::write(dir.path().join("readme.md"), "# notes").unwrap();

        let files = json_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let doc = telemetry_files_to_kml(&files, KmlOptions::default());
        assert_eq!(doc.len(), 1);
        assert!(doc.render().contains("<name>22059930</name>"));
    }

    #[test]
    fn amateur_export_requires_valid_json() {
        assert!(amateur_export_to_kml("[1, 2", KmlOptions::default()).is_err());
        let doc = amateur_export_to_kml("{}", KmlOptions::default()).unwrap();
        assert!(doc.is_empty());
    }
}
