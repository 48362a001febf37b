//! Ingest queue: the fan-in point between sensor streams and the fusion loop.
//!
//! One mutex, two short critical sections: producers `push` one record,
//! the fusion loop `drain_batch`es everything in a single buffer swap.
//! Insertion order is preserved; no cap is imposed — the loop drains every
//! tick, so steady-state depth is bounded by tick period × input rate.

use crate::types::Measurement;
use std::sync::Mutex;

/// Mutex-protected measurement queue shared by all ingest endpoints.
#[derive(Debug, Default)]
pub struct MeasurementQueue {
    inner: Mutex<Vec<Measurement>>,
}

impl MeasurementQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one measurement. Blocks only for the other push/drain holders.
    pub fn push(&self, measurement: Measurement) {
        self.inner
            .lock()
            .expect("ingest queue mutex poisoned")
            .push(measurement);
    }

    /// Swap the buffer out and return everything queued so far, in insertion
    /// order. The queue is empty afterwards.
    pub fn drain_batch(&self) -> Vec<Measurement> {
        std::mem::take(&mut *self.inner.lock().expect("ingest queue mutex poisoned"))
    }

    /// Current depth (diagnostics only).
    pub fn len(&self) -> usize {
        self.inner.lock().expect("ingest queue mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
