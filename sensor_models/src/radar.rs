//! Radar sensor parameters.

use serde::{Deserialize, Serialize};

/// Physical configuration of one radar station.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RadarParams {
    /// Sensor identifier reported in every detection header
    pub id: String,
    /// Site latitude (degrees)
    pub lat: f64,
    /// Site longitude (degrees)
    pub lon: f64,
    /// Site altitude (meters)
    pub alt: f64,
    /// Measurement noise: range standard deviation (meters)
    pub range_sigma: f64,
    /// Measurement noise: bearing standard deviation (degrees)
    pub bearing_sigma: f64,
    /// Fixed range bias added to every measurement (meters)
    pub range_bias: f64,
    /// Fixed bearing bias added to every measurement (degrees)
    pub bearing_bias: f64,
    /// Detection threshold on `signal_strength` — below it, no detection
    pub sensitivity: f64,
    /// Aspect-dependent RCS when true; constant 2.0 m² otherwise
    pub dynamic_rcs: bool,
    /// Scan period (milliseconds)
    pub scan_period_ms: u64,
    /// Radial velocity reported in detections (m/s)
    pub reported_velocity: f64,
}

impl Default for RadarParams {
    fn default() -> Self {
        Self {
            id: "RADAR-X".to_string(),
            lat: 39.9,
            lon: 32.8,
            alt: 150.0,
            range_sigma: 30.0,
            bearing_sigma: 1.0, // ~1° azimuth accuracy
            range_bias: 0.0,
            bearing_bias: 0.0,
            sensitivity: 0.0, // detect everything unless configured
            dynamic_rcs: false,
            scan_period_ms: 100,
            reported_velocity: 250.0,
        }
    }
}
