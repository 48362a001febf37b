//! SIGINT emitter band model.

use serde::{Deserialize, Serialize};

/// What the SIGINT receiver expects to hear.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SigintParams {
    /// Sensor identifier reported in every hit header
    pub id: String,
    /// Centre of the emitter band (MHz)
    pub center_freq_mhz: f64,
    /// 1σ spread around the centre (MHz)
    pub freq_spread_mhz: f64,
    /// Initial received power (dBm); drifts upward as the target closes
    pub start_power_dbm: f64,
    /// Confidence attached to every hit
    pub confidence: f64,
}

impl Default for SigintParams {
    fn default() -> Self {
        Self {
            id: "SIGINT-01".to_string(),
            center_freq_mhz: 1450.0,
            freq_spread_mhz: 5.0,
            start_power_dbm: -40.0,
            confidence: 0.95,
        }
    }
}
