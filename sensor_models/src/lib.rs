//! `sensor_models` — Sensor parameterisation for producers.
//!
//! # Module layout
//! - [`radar`]  — Radar siting, noise, bias, sensitivity
//! - [`uav`]    — UAV seed state
//! - [`sigint`] — SIGINT emitter band model

pub mod radar;
pub mod sigint;
pub mod uav;

pub use radar::RadarParams;
pub use sigint::SigintParams;
pub use uav::UavParams;
