//! Producer-side transport: stream writer for sensors, one-shot monitor
//! subscriber.

use crate::error::WireError;
use crate::types::{FusedTrack, SensorClass};
use crate::wire::{self, Ack, MonitorRequest, MonitorResponse, StreamOpen};
use serde::Serialize;
use std::io::BufReader;
use std::net::{Shutdown, TcpStream};

/// A client-streaming sensor connection. Send frames, then [`finish`] to
/// half-close and collect the server's acknowledgment.
///
/// [`finish`]: SensorStream::finish
pub struct SensorStream {
    stream: TcpStream,
}

impl SensorStream {
    /// Connect and announce the channel this stream feeds.
    pub fn connect(addr: &str, channel: SensorClass) -> Result<Self, WireError> {
        let mut stream = TcpStream::connect(addr)?;
        wire::write_frame(&mut stream, &StreamOpen { channel })?;
        Ok(Self { stream })
    }

    /// Send one payload frame.
    pub fn send<T: Serialize>(&mut self, frame: &T) -> Result<(), WireError> {
        wire::write_frame(&mut self.stream, frame)
    }

    /// Half-close the write side and read the server's ack.
    pub fn finish(self) -> Result<Ack, WireError> {
        self.stream.shutdown(Shutdown::Write)?;
        let mut reader = BufReader::new(self.stream);
        wire::read_frame(&mut reader)?
            .ok_or_else(|| WireError::Protocol("server closed without ack".into()))
    }
}

/// Monitor subscriber: one snapshot per subscribe, as the endpoint serves.
pub struct MonitorClient;

impl MonitorClient {
    pub fn subscribe(addr: &str) -> Result<Vec<FusedTrack>, WireError> {
        let mut stream = TcpStream::connect(addr)?;
        wire::write_frame(&mut stream, &MonitorRequest::default())?;
        stream.shutdown(Shutdown::Write)?;
        let mut reader = BufReader::new(stream);
        let response: MonitorResponse = wire::read_frame(&mut reader)?
            .ok_or_else(|| WireError::Protocol("server closed without snapshot".into()))?;
        Ok(response.tracks)
    }
}
