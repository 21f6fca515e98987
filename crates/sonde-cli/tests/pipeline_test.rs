//! Offline run of the pipeline: summaries to serial list, telemetry to KML.

use sonde_cli::convert::{json_files, telemetry_files_to_kml};
use sonde_cli::{read_serial_list, write_serial_list};
use sonde_core::{
    load_summary_dir, matched_serials, parse_instant, FilterConfig, HorizonFilter, KmlOptions,
    Observer, TimeWindow,
};
use std::fs;

fn entry(serial: &str, time: &str, lat: f64, lon: f64, alt: f64) -> String {
    format!(
        r#"{{"datetime": "{time}", "lat": {lat}, "lon": {lon}, "alt": {alt},
            "serial": "{serial}"}}"#
    )
}

fn summary(serial: &str, burst_time: &str, lat: f64, lon: f64) -> String {
    format!(
        "[{}, {}, {}]",
        entry(serial, "2024-04-08T17:00:00Z", lat, lon, 150.0),
        entry(serial, burst_time, lat, lon, 31000.0),
        entry(serial, "2024-04-08T22:00:00Z", lat, lon, 200.0)
    )
}

#[test]
fn test_matches_feed_serial_list_and_kml() {
    let workdir = tempfile::tempdir().unwrap();
    let summaries = workdir.path().join("summary_data");
    let telemetry = workdir.path().join("telemetry");
    fs::create_dir_all(&summaries).unwrap();
    fs::create_dir_all(&telemetry).unwrap();

    fs::write(summaries.join("A.json"), summary("A", "2024-04-08T19:10:00Z", 37.8, -89.2)).unwrap();
    fs::write(summaries.join("B.json"), summary("B", "2024-04-08T19:20:00Z", 37.1, -90.0)).unwrap();
    // Bursts well outside the window.
    fs::write(summaries.join("C.json"), summary("C", "2024-04-09T03:00:00Z", 37.5, -89.7)).unwrap();

    let observer = Observer::new(37.43, -89.6436, 161.0).unwrap();
    let window = TimeWindow::new(
        parse_instant("2024-04-08T18:00:00Z").unwrap(),
        parse_instant("2024-04-08T21:00:00Z").unwrap(),
    )
    .unwrap();
    let config = FilterConfig::new(observer).with_window(window);

    let report = load_summary_dir(&summaries).unwrap();
    let matches = HorizonFilter::new(config).run(&report.records);
    let serials = matched_serials(&matches);
    assert_eq!(serials, vec!["A", "B"]);

    let list = workdir.path().join("serial_matches.txt");
    write_serial_list(&list, &serials).unwrap();
    let serials = read_serial_list(&list).unwrap();

    // Stand-in for fetch_telemetry: write a short export per serial.
    for serial in &serials {
        fs::write(
            telemetry.join(format!("{serial}.json")),
            format!(
                "[{}, {}]",
                entry(serial, "2024-04-08T17:00:00Z", 37.0, -90.0, 150.0),
                entry(serial, "2024-04-08T19:00:00Z", 37.2, -89.8, 31000.0)
            ),
        )
        .unwrap();
    }

    let files = json_files(&telemetry).unwrap();
    let doc = telemetry_files_to_kml(&files, KmlOptions::default());
    assert_eq!(doc.len(), 2);

    let output = workdir.path().join("outputs.kml");
    doc.write_to(&output).unwrap();
    let kml = fs::read_to_string(&output).unwrap();
    assert!(kml.contains("<name>A</name>"));
    assert!(kml.contains("<name>B</name>"));
    assert!(!kml.contains("<name>C</name>"));
    assert_eq!(kml.matches("<LineString>").count(), 2);
}
