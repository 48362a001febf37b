//! UAV seed state.

use serde::{Deserialize, Serialize};

/// Initial state of the simulated UAV.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UavParams {
    /// UAV identifier carried in telemetry and used as the track key
    pub id: String,
    pub start_lat: f64,
    pub start_lon: f64,
    /// Start altitude (meters)
    pub start_alt: f64,
    /// Start heading (degrees clockwise from north)
    pub start_heading: f64,
    /// Cruise speed (m/s)
    pub speed: f64,
}

impl Default for UavParams {
    fn default() -> Self {
        Self {
            id: "UAV-ALFA".to_string(),
            start_lat: 39.920,
            start_lon: 32.850,
            start_alt: 1200.0,
            start_heading: 45.0,
            speed: 80.0,
        }
    }
}
