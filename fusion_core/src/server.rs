//! TCP endpoints: client-streaming ingest and server-streaming monitor.
//!
//! Both listeners run a non-blocking accept loop that polls the shared
//! `running` flag, handing each connection to its own OS thread. An ingest
//! handler reads frames until the producer half-closes, normalizes each into
//! the queue, and answers with one [`Ack`]. The monitor handler snapshots
//! the registry, writes one response, and closes.
//!
//! A failed stream terminates only its own connection; the fusion loop is
//! never affected.

use crate::error::WireError;
use crate::queue::MeasurementQueue;
use crate::registry::TrackRegistry;
use crate::types::SensorClass;
use crate::wire::{
    self, Ack, MonitorRequest, MonitorResponse, RadarDetection, SigintHit, StreamOpen,
    UavTelemetry,
};
use std::io::BufReader;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Accept-loop poll interval while idle.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Bind a listen endpoint. Failure here is fatal to startup — the caller
/// surfaces it as a non-zero process exit.
pub fn bind(addr: &str) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

/// Run the ingest accept loop until `running` goes false. Each producer
/// connection gets its own handler thread.
pub fn run_ingest(
    listener: TcpListener,
    queue: Arc<MeasurementQueue>,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, addr)) => {
                tracing::info!(%addr, "sensor stream connected");
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    if let Err(err) = handle_sensor_stream(stream, &queue) {
                        tracing::warn!(%addr, %err, "sensor stream terminated");
                    }
                });
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(err) => {
                tracing::warn!(%err, "ingest accept error");
            }
        }
    }
}

/// Run the monitor accept loop until `running` goes false.
pub fn run_monitor(
    listener: TcpListener,
    registry: Arc<TrackRegistry>,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, addr)) => {
                tracing::info!(%addr, "monitor subscribed");
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    if let Err(err) = handle_monitor(stream, &registry) {
                        tracing::warn!(%addr, %err, "monitor stream terminated");
                    }
                });
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(err) => {
                tracing::warn!(%err, "monitor accept error");
            }
        }
    }
}

/// One producer connection: open frame, payload frames until half-close,
/// one ack back.
fn handle_sensor_stream(stream: TcpStream, queue: &MeasurementQueue) -> Result<(), WireError> {
    stream.set_nonblocking(false)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    let open: StreamOpen = match wire::read_frame(&mut reader) {
        Ok(Some(open)) => open,
        Ok(None) => return Ok(()), // connected and left without a word
        Err(err) => {
            let ack = Ack {
                ok: false,
                message: format!("bad open frame: {err}"),
            };
            wire::write_frame(&mut writer, &ack).ok();
            return Err(err);
        }
    };

    let result = match open.channel {
        SensorClass::Uav => drain_stream::<UavTelemetry>(&mut reader, queue),
        SensorClass::Radar => drain_stream::<RadarDetection>(&mut reader, queue),
        SensorClass::Sigint => drain_stream::<SigintHit>(&mut reader, queue),
    };

    match result {
        Ok(accepted) => {
            let ack = Ack {
                ok: true,
                message: format!("accepted {accepted} measurements"),
            };
            wire::write_frame(&mut writer, &ack)
        }
        Err(err) => {
            let ack = Ack {
                ok: false,
                message: err.to_string(),
            };
            wire::write_frame(&mut writer, &ack).ok();
            Err(err)
        }
    }
}

/// Read payload frames of one class until EOF, pushing each normalized
/// measurement. Returns the accepted count.
fn drain_stream<T>(
    reader: &mut BufReader<TcpStream>,
    queue: &MeasurementQueue,
) -> Result<u64, WireError>
where
    T: for<'de> serde::Deserialize<'de> + IntoMeasurement,
{
    let mut accepted = 0u64;
    while let Some(frame) = wire::read_frame::<_, T>(reader)? {
        queue.push(frame.into_measurement());
        accepted += 1;
    }
    Ok(accepted)
}

/// Payloads that normalize into a queue measurement.
trait IntoMeasurement {
    fn into_measurement(self) -> crate::types::Measurement;
}

impl IntoMeasurement for UavTelemetry {
    fn into_measurement(self) -> crate::types::Measurement {
        self.to_measurement()
    }
}

impl IntoMeasurement for RadarDetection {
    fn into_measurement(self) -> crate::types::Measurement {
        self.to_measurement()
    }
}

impl IntoMeasurement for SigintHit {
    fn into_measurement(self) -> crate::types::Measurement {
        self.to_measurement()
    }
}

/// One monitor subscription: read the (empty) request, write one snapshot,
/// close.
fn handle_monitor(stream: TcpStream, registry: &TrackRegistry) -> Result<(), WireError> {
    stream.set_nonblocking(false)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    let _request: MonitorRequest = match wire::read_frame(&mut reader)? {
        Some(req) => req,
        None => return Ok(()),
    };

    let response = MonitorResponse {
        tracks: registry.snapshot(),
    };
    wire::write_frame(&mut writer, &response)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
