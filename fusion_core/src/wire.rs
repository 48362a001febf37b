//! Wire protocol: newline-delimited JSON frames over TCP.
//!
//! A producer connection opens with [`StreamOpen`] naming its channel, then
//! streams payload frames and half-closes; the server answers with a single
//! [`Ack`] line. The monitor connection sends one [`MonitorRequest`] line
//! and receives one [`MonitorResponse`] line back.

use crate::error::WireError;
use crate::types::{FusedTrack, GeoPoint, Measurement, SensorClass};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

/// Common frame header carried by every sensor payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Header {
    pub timestamp_ms: u64,
    pub sensor_id: String,
}

/// First frame on a producer connection: which ingest endpoint the stream
/// is addressed to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreamOpen {
    pub channel: SensorClass,
}

/// UAV telemetry payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UavTelemetry {
    pub header: Header,
    pub uav_id: String,
    pub position: GeoPoint,
    pub heading: f64,
    pub speed: f64,
    pub status: String,
}

/// Radar detection payload. `target` carries the geodetic coordinates the
/// producer already projected from its own origin — never the radar site.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RadarDetection {
    pub header: Header,
    pub track_id: String,
    pub range: f64,
    pub bearing: f64,
    pub target: GeoPoint,
    pub rcs: f64,
    pub velocity: f64,
}

/// SIGINT hit payload: spectrum and bearing, no position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SigintHit {
    pub header: Header,
    pub frequency: f64,
    pub power: f64,
    pub confidence: f64,
    pub bearing: f64,
}

/// Stream-close acknowledgment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    pub message: String,
}

/// Monitor subscription request. Empty by design.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MonitorRequest {}

/// One snapshot of the published track table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorResponse {
    pub tracks: Vec<FusedTrack>,
}

impl UavTelemetry {
    /// Normalize to a queue measurement: position from the telemetry, the
    /// UAV's own identifier as sensor id.
    pub fn to_measurement(&self) -> Measurement {
        Measurement {
            timestamp_ms: self.header.timestamp_ms,
            class: SensorClass::Uav,
            sensor_id: self.uav_id.clone(),
            lat: self.position.lat,
            lon: self.position.lon,
            alt: self.position.alt,
            extras: self.uav_id.clone(),
        }
    }
}

impl RadarDetection {
    /// Normalize to a queue measurement: the projected target coordinates
    /// as produced, the radar's identifier as sensor id.
    pub fn to_measurement(&self) -> Measurement {
        Measurement {
            timestamp_ms: self.header.timestamp_ms,
            class: SensorClass::Radar,
            sensor_id: self.header.sensor_id.clone(),
            lat: self.target.lat,
            lon: self.target.lon,
            alt: self.target.alt,
            extras: self.track_id.clone(),
        }
    }
}

impl SigintHit {
    /// Normalize to a queue measurement. Position is unavailable in this
    /// design — zeros mark the no-position sentinel.
    pub fn to_measurement(&self) -> Measurement {
        Measurement {
            timestamp_ms: self.header.timestamp_ms,
            class: SensorClass::Sigint,
            sensor_id: self.header.sensor_id.clone(),
            lat: 0.0,
            lon: 0.0,
            alt: 0.0,
            extras: format!("freq={:.1};bearing={:.1}", self.frequency, self.bearing),
        }
    }
}

/// Write one frame as a JSON line.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, frame: &T) -> Result<(), WireError> {
    let json = serde_json::to_string(frame)?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    Ok(())
}

/// Read one frame from a JSON line. `Ok(None)` means the peer half-closed.
pub fn read_frame<R: BufRead, T: for<'de> Deserialize<'de>>(
    reader: &mut R,
) -> Result<Option<T>, WireError> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.trim().is_empty() {
            continue;
        }
        return Ok(Some(serde_json::from_str(line.trim())?));
    }
}
