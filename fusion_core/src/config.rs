//! Engine configuration.
//!
//! One immutable record built at startup and passed by shared reference to
//! every component; all defaults live here. Replaces any notion of
//! process-global settings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Per-sensor measurement-noise registry: maps a sensor identifier to its
/// 1σ position accuracy in meters. Unknown sensors fall back to
/// `default_sigma_m`. In a larger system this table would come from a sensor
/// registry service; here it is plain configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SensorNoiseRegistry {
    pub sigma_m: HashMap<String, f64>,
    pub default_sigma_m: f64,
}

impl Default for SensorNoiseRegistry {
    fn default() -> Self {
        let mut sigma_m = HashMap::new();
        // Long-range search radar: coarse
        sigma_m.insert("TPS-77-LONG-RANGE".to_string(), 50.0);
        // Engagement radar: fine
        sigma_m.insert("AN-MPQ-53-PATRIOT".to_string(), 5.0);
        Self {
            sigma_m,
            default_sigma_m: 30.0,
        }
    }
}

impl SensorNoiseRegistry {
    /// 1σ accuracy for the given sensor, meters.
    pub fn sigma_for(&self, sensor_id: &str) -> f64 {
        self.sigma_m
            .get(sensor_id)
            .copied()
            .unwrap_or(self.default_sigma_m)
    }

    /// Base measurement variance R = σ² for the given sensor.
    pub fn variance_for(&self, sensor_id: &str) -> f64 {
        let sigma = self.sigma_for(sensor_id);
        sigma * sigma
    }
}

/// Immutable fusion-engine configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// host:port the ingest endpoints listen on
    pub fusion_addr: String,
    /// host:port the monitor endpoint listens on
    pub monitor_addr: String,
    /// CSV audit log destination
    pub csv_path: PathBuf,
    /// The single logical track all measurements currently fuse into.
    /// Keying the estimator map by producer-declared identifiers is the
    /// upgrade path once association exists.
    pub track_id: u32,
    /// Fusion loop tick period, milliseconds
    pub tick_ms: u64,
    /// Innovation distance beyond which measurement noise is inflated, meters
    pub gate_distance_m: f64,
    /// Divisor in the quadratic inflation factor `(innovation / gate_scale)²`
    pub gate_scale_m: f64,
    /// Altitude published when no UAV altitude has been seen, meters
    pub fallback_alt_m: f64,
    /// Confidence attached to every published track
    pub confidence: f64,
    /// Optional wall-clock auto-shutdown, seconds
    pub duration_secs: Option<u64>,
    pub noise: SensorNoiseRegistry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fusion_addr: "0.0.0.0:6000".to_string(),
            monitor_addr: "0.0.0.0:6005".to_string(),
            csv_path: PathBuf::from("results.csv"),
            track_id: 1,
            tick_ms: 100,
            gate_distance_m: 1000.0,
            gate_scale_m: 500.0,
            fallback_alt_m: 1250.0,
            confidence: 0.95,
            duration_secs: None,
            noise: SensorNoiseRegistry::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sensors_have_registered_sigma() {
        let reg = SensorNoiseRegistry::default();
        assert_eq!(reg.sigma_for("TPS-77-LONG-RANGE"), 50.0);
        assert_eq!(reg.sigma_for("AN-MPQ-53-PATRIOT"), 5.0);
    }

    #[test]
    fn unknown_sensor_falls_back() {
        let reg = SensorNoiseRegistry::default();
        assert_eq!(reg.sigma_for("SOMETHING-NEW"), 30.0);
        assert_eq!(reg.variance_for("SOMETHING-NEW"), 900.0);
    }
}
