//! KML export of flight tracks for Google Earth and friends.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use chrono::SecondsFormat;

use crate::track::{FlightTrack, TrackPoint};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const LANDING_ICON: &str = "https://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";
const TRACK_COLOR: &str = "ff03bafc";
const POLY_COLOR: &str = "8003bafc";
const TRACK_WIDTH: f64 = 2.0;
const ICON_SCALE: f64 = 1.0;

/// How tracks are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmlOptions {
    /// Use absolute altitudes instead of clamping to ground
    pub absolute: bool,
    /// Draw a curtain from the track down to the ground
    pub extrude: bool,
    /// Emit only the landing placemark
    pub last_only: bool,
}

impl Default for KmlOptions {
    fn default() -> Self {
        Self {
            absolute: true,
            extrude: true,
            last_only: false,
        }
    }
}

/// A KML document assembled one flight at a time.
#[derive(Debug, Clone)]
pub struct KmlDocument {
    options: KmlOptions,
    folders: String,
    flights: usize,
}

impl KmlDocument {
    pub fn new(options: KmlOptions) -> Self {
        Self {
            options,
            folders: String::new(),
            flights: 0,
        }
    }

    /// Number of flights added so far.
    pub fn len(&self) -> usize {
        self.flights
    }

    pub fn is_empty(&self) -> bool {
        self.flights == 0
    }

    /// Append a folder holding the landing placemark and, unless `last_only`, the track.
    pub fn add_track(&mut self, track: &FlightTrack) {
        let out = &mut self.folders;
        out.push_str("    <Folder>\n");
        let _ = writeln!(out, "      <name>{}</name>", escape(&track.serial));

        if let Some(landing) = track.landing() {
            let landed_at = track.last_time.to_rfc3339_opts(SecondsFormat::AutoSi, true);
            push_landing_placemark(out, &track.serial, &landed_at, landing, self.options);
        }
        if !self.options.last_only {
            push_track_placemark(out, "Track", &track.path, self.options);
        }

        out.push_str("    </Folder>\n");
        self.flights += 1;
    }

    /// Render the complete document.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.folders.len() + 256);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(out, "<kml xmlns=\"{KML_NAMESPACE}\">");
        out.push_str("  <Document>\n");
        out.push_str(&self.folders);
        out.push_str("  </Document>\n");
        out.push_str("</kml>\n");
        out
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render())
    }
}

fn push_landing_placemark(
    out: &mut String,
    name: &str,
    description: &str,
    point: &TrackPoint,
    options: KmlOptions,
) {
    out.push_str("      <Placemark>\n");
    let _ = writeln!(out, "        <name>{}</name>", escape(name));
    let _ = writeln!(out, "        <description>{}</description>", escape(description));
    out.push_str("        <Style>\n          <IconStyle>\n");
    let _ = writeln!(out, "            <scale>{ICON_SCALE:.1}</scale>");
    let _ = writeln!(out, "            <Icon><href>{LANDING_ICON}</href></Icon>");
    out.push_str("          </IconStyle>\n        </Style>\n");
    out.push_str("        <Point>\n");
    if options.absolute {
        out.push_str("          <altitudeMode>absolute</altitudeMode>\n");
    }
    let _ = writeln!(out, "          <coordinates>{}</coordinates>", coordinate(point));
    out.push_str("        </Point>\n");
    out.push_str("      </Placemark>\n");
}

fn push_track_placemark(out: &mut String, name: &str, path: &[TrackPoint], options: KmlOptions) {
    out.push_str("      <Placemark>\n");
    let _ = writeln!(out, "        <name>{}</name>", escape(name));
    out.push_str("        <Style>\n          <LineStyle>\n");
    let _ = writeln!(out, "            <color>{TRACK_COLOR}</color>");
    let _ = writeln!(out, "            <width>{TRACK_WIDTH:.1}</width>");
    out.push_str("          </LineStyle>\n");
    if options.extrude {
        out.push_str("          <PolyStyle>\n");
        let _ = writeln!(out, "            <color>{POLY_COLOR}</color>");
        out.push_str("            <fill>1</fill>\n            <outline>1</outline>\n");
        out.push_str("          </PolyStyle>\n");
    }
    out.push_str("        </Style>\n");

    out.push_str("        <LineString>\n");
    if options.absolute {
        if options.extrude {
            out.push_str("          <extrude>1</extrude>\n");
        }
        out.push_str("          <altitudeMode>absolute</altitudeMode>\n");
    } else {
        out.push_str("          <tessellate>1</tessellate>\n");
    }
    let coordinates: Vec<String> = path.iter().map(coordinate).collect();
    let _ = writeln!(out, "          <coordinates>{}</coordinates>", coordinates.join(" "));
    out.push_str("        </LineString>\n");
    out.push_str("      </Placemark>\n");
}

/// KML wants lon,lat,alt.
fn coordinate(point: &TrackPoint) -> String {
    format!("{:.6},{:.6},{:.6}", point.lon, point.lat, point.altitude_m)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
