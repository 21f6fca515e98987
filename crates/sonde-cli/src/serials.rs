//! Plain-text serial lists passed between pipeline steps.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Write one serial per line, dropping repeats.
pub fn write_serial_list(path: &Path, serials: &[String]) -> Result<usize> {
    let unique = dedupe(serials.iter().map(String::as_str));
    let mut contents = String::new();
    for serial in &unique {
        contents.push_str(serial);
        contents.push('\n');
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write serial list {}", path.display()))?;
    Ok(unique.len())
}

/// Read a serial list. Blank lines and `#` comments are ignored.
pub fn read_serial_list(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read serial list {}", path.display()))?;
    Ok(dedupe(
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#')),
    ))
}

fn dedupe<'a>(serials: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    serials
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect()
}
