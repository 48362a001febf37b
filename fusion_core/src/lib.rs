//! `fusion_core` — Multi-sensor geodetic track fusion engine.
//!
//! # Module layout
//! - [`types`]    — Fundamental types (IDs, measurements, fused tracks)
//! - [`geo`]      — Geodesy kernel (haversine, bearing, polar destination)
//! - [`physics`]  — Radar detection physics (RCS, signal strength, rain, Doppler)
//! - [`kf`]       — Geodetic constant-velocity Kalman filter
//! - [`queue`]    — Mutex-protected ingest queue (push / drain-swap)
//! - [`registry`] — Published track table (publish / snapshot)
//! - [`audit`]    — CSV audit log
//! - [`config`]   — Engine configuration and sensor-noise registry
//! - [`fusion`]   — Fusion engine: batch processing + worker loop
//! - [`wire`]     — Wire frames and newline-delimited JSON framing
//! - [`server`]   — Ingest + monitor TCP endpoints
//! - [`client`]   — Producer-side stream writer, monitor subscriber
//! - [`error`]    — Library error types

pub mod audit;
pub mod client;
pub mod config;
pub mod error;
pub mod fusion;
pub mod geo;
pub mod kf;
pub mod physics;
pub mod queue;
pub mod registry;
pub mod server;
pub mod types;
pub mod wire;

pub use config::{EngineConfig, SensorNoiseRegistry};
pub use fusion::FusionEngine;
pub use queue::MeasurementQueue;
pub use registry::TrackRegistry;
pub use types::{FusedTrack, GeoPoint, Measurement, SensorClass, TrackId};
