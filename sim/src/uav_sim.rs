//! UAV trajectory generator and telemetry source.
//!
//! Propagates a slow northbound drift with sinusoidal longitude, altitude
//! and heading wander — enough structure to exercise the estimator without a
//! full flight model. Stepped at 1 Hz by the producer binary.

use crate::ground_truth::TruthSample;
use fusion_core::types::GeoPoint;
use fusion_core::wire::{Header, UavTelemetry};
use sensor_models::UavParams;

/// The simulated UAV's true state.
pub struct UavSimulator {
    params: UavParams,
    lat: f64,
    lon: f64,
    alt: f64,
    heading: f64,
    /// Elapsed simulation time, seconds
    time_s: f64,
}

impl UavSimulator {
    pub fn new(params: UavParams) -> Self {
        Self {
            lat: params.start_lat,
            lon: params.start_lon,
            alt: params.start_alt,
            heading: params.start_heading,
            time_s: 0.0,
            params,
        }
    }

    /// Advance the true state by one 1 Hz tick.
    pub fn step(&mut self) {
        self.lat += 0.0005;
        self.lon += (self.time_s / 50.0).sin() * 0.0002;
        self.alt += (self.time_s / 10.0).cos() * 5.0;
        self.heading += (self.time_s / 10.0).sin() * 2.0;
        self.time_s += 1.0;
    }

    pub fn elapsed_s(&self) -> f64 {
        self.time_s
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon, self.alt)
    }

    /// Current state as a telemetry frame.
    pub fn telemetry(&self, timestamp_ms: u64) -> UavTelemetry {
        UavTelemetry {
            header: Header {
                timestamp_ms,
                sensor_id: self.params.id.clone(),
            },
            uav_id: self.params.id.clone(),
            position: self.position(),
            heading: self.heading,
            speed: self.params.speed,
            status: "Flying".to_string(),
        }
    }

    /// Current state as a ground-truth sample for the handoff file.
    pub fn truth_sample(&self, timestamp_ms: u64) -> TruthSample {
        TruthSample {
            lat: self.lat,
            lon: self.lon,
            alt: self.alt,
            timestamp_ms,
            heading: self.heading,
        }
    }
}
