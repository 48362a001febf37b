//! Fundamental types used across the entire workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identifier types — newtype wrapper so track keys are never confused with
// raw integers at call sites.
// ---------------------------------------------------------------------------

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Sensor classes
// ---------------------------------------------------------------------------

/// Which kind of sensor produced a measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorClass {
    /// Cooperative telemetry from the target itself — treated as ground truth
    Uav,
    /// Radar detection, already projected to target geodetic coordinates
    Radar,
    /// Signals-intelligence hit: bearing and spectrum, no position
    Sigint,
}

// ---------------------------------------------------------------------------
// Geodetic point
// ---------------------------------------------------------------------------

/// A geodetic position: degrees latitude/longitude, meters altitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// A normalized sensor measurement as it enters the ingest queue.
///
/// For [`SensorClass::Radar`] the position fields hold the *estimated target*
/// geodetic coordinates (the producer has already projected range/bearing from
/// its own origin), never the sensor position. Classes that carry no position
/// store zeros; the fusion loop treats `|lat| < 1.0` as the no-position
/// sentinel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Measurement {
    /// Producer wall clock, milliseconds
    pub timestamp_ms: u64,
    pub class: SensorClass,
    /// Opaque sensor identifier, keys the measurement-noise registry
    pub sensor_id: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    /// Free-form payload carried through (e.g. the producer's declared track key)
    pub extras: String,
}

impl Measurement {
    /// True when the producer flagged "no position available".
    pub fn has_position(&self) -> bool {
        self.lat.abs() >= 1.0
    }
}

// ---------------------------------------------------------------------------
// FusedTrack — the published representation
// ---------------------------------------------------------------------------

/// The system's best estimate of one target, as published to subscribers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FusedTrack {
    pub track_id: u32,
    pub position: GeoPoint,
    /// Estimate confidence in [0, 1]
    pub confidence: f64,
    /// Contributing sensor identifiers, deduplicated, first-seen order
    pub source_sensors: Vec<String>,
    /// Last position the target itself reported, when a UAV feed is present
    pub uav_reported: Option<GeoPoint>,
    /// Great-circle distance between fused and reported position, meters
    pub uav_error_m: Option<f64>,
}
