//! Ground-truth handoff file.
//!
//! The UAV producer overwrites a single-line text file each tick; radar
//! producers poll it. The file is deliberately unlocked — readers tolerate a
//! partially written line by returning `None` and retrying on their next
//! tick.

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

/// One ground-truth sample: `lat lon alt timestamp_ms heading`,
/// whitespace-separated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TruthSample {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub timestamp_ms: u64,
    pub heading: f64,
}

/// Overwrite the truth file with one sample. Parent directories are created
/// best-effort.
pub fn write_truth(path: &Path, sample: &TruthSample) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).ok();
        }
    }
    let mut file = fs::File::create(path)?;
    writeln!(
        file,
        "{:.9} {:.9} {:.9} {} {:.9}",
        sample.lat, sample.lon, sample.alt, sample.timestamp_ms, sample.heading
    )?;
    Ok(())
}

/// Read the current truth sample. Any read or parse failure — missing file,
/// torn write, short line — yields `None`; the caller retries next tick.
pub fn read_truth(path: &Path) -> Option<TruthSample> {
    let contents = fs::read_to_string(path).ok()?;
    let mut fields = contents.split_whitespace();
    let lat = fields.next()?.parse().ok()?;
    let lon = fields.next()?.parse().ok()?;
    let alt = fields.next()?.parse().ok()?;
    let timestamp_ms = fields.next()?.parse().ok()?;
    let heading = fields.next()?.parse().ok()?;
    Some(TruthSample {
        lat,
        lon,
        alt,
        timestamp_ms,
        heading,
    })
}
