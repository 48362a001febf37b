//! Fusion engine: the single worker that turns queued measurements into
//! published tracks.
//!
//! # Processing steps per batch
//! 1. Timestamp the batch from its last entry and derive a clamped dt
//! 2. Predict the track's estimator forward by dt
//! 3. Per measurement, in insertion order:
//!    - UAV telemetry is recorded as ground truth (scoring only)
//!    - sentinel positions are dropped
//!    - base variance comes from the sensor-noise registry
//!    - adaptive gating inflates the variance quadratically for
//!      innovations beyond the gate distance
//!    - the estimator folds the measurement in
//! 4. Publish the fused track under the registry mutex
//! 5. Append one CSV audit row
//!
//! The loop itself is single-threaded; all cross-thread contention is the
//! ingest-queue mutex and the registry mutex.

use crate::audit::{AuditRow, CsvAudit};
use crate::config::EngineConfig;
use crate::geo;
use crate::kf::GeoKalmanFilter;
use crate::queue::MeasurementQueue;
use crate::registry::TrackRegistry;
use crate::types::{FusedTrack, GeoPoint, Measurement, SensorClass, TrackId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// dt substituted whenever the batch spacing is degenerate, seconds.
const FALLBACK_DT: f64 = 0.1;
/// Upper bound on an accepted batch spacing, seconds.
const MAX_DT: f64 = 1.0;

/// Record a contributing sensor, keeping the list deduplicated in
/// first-seen order.
fn note_source(sources: &mut Vec<String>, id: &str) {
    if !sources.iter().any(|s| s == id) {
        sources.push(id.to_string());
    }
}

pub struct FusionEngine {
    config: Arc<EngineConfig>,
    queue: Arc<MeasurementQueue>,
    registry: Arc<TrackRegistry>,
    audit: Arc<CsvAudit>,
    /// Per-track estimators, owned exclusively by the fusion worker.
    estimators: HashMap<TrackId, GeoKalmanFilter>,
    last_fusion_ts: u64,
    /// Latest UAV-reported position, kept across batches for scoring.
    truth: Option<GeoPoint>,
}

impl FusionEngine {
    pub fn new(
        config: Arc<EngineConfig>,
        queue: Arc<MeasurementQueue>,
        registry: Arc<TrackRegistry>,
        audit: Arc<CsvAudit>,
    ) -> Self {
        Self {
            config,
            queue,
            registry,
            audit,
            estimators: HashMap::new(),
            last_fusion_ts: 0,
            truth: None,
        }
    }

    /// Spawn the worker thread. It drains the queue every tick until
    /// `running` goes false.
    pub fn spawn(mut self, running: Arc<AtomicBool>) -> JoinHandle<()> {
        thread::Builder::new()
            .name("fusion-loop".into())
            .spawn(move || {
                tracing::info!("fusion loop started");
                let tick = Duration::from_millis(self.config.tick_ms);
                while running.load(Ordering::SeqCst) {
                    thread::sleep(tick);
                    let batch = self.queue.drain_batch();
                    if batch.is_empty() {
                        continue;
                    }
                    self.process_batch(&batch);
                }
                tracing::info!("fusion loop stopped");
            })
            .expect("failed to spawn fusion worker")
    }

    /// Seconds between the previous batch and `batch_ts`, substituting the
    /// fallback when there is no previous batch or the spacing is degenerate.
    fn clamped_dt(last_ts: u64, batch_ts: u64) -> f64 {
        if last_ts == 0 {
            return FALLBACK_DT;
        }
        let dt = (batch_ts as i64 - last_ts as i64) as f64 / 1000.0;
        if dt <= 0.0 || dt > MAX_DT {
            FALLBACK_DT
        } else {
            dt
        }
    }

    /// Run one fusion iteration over a drained batch. Returns the published
    /// track, or `None` when the batch produced nothing publishable.
    pub fn process_batch(&mut self, batch: &[Measurement]) -> Option<FusedTrack> {
        let last = batch.last()?;
        let batch_ts = last.timestamp_ms;
        let dt = Self::clamped_dt(self.last_fusion_ts, batch_ts);

        let track_id = TrackId(self.config.track_id);
        let estimator = self.estimators.entry(track_id).or_default();
        estimator.predict(dt);
        self.last_fusion_ts = batch_ts;

        let mut active_sources: Vec<String> = Vec::new();

        for m in batch {
            if m.class == SensorClass::Uav {
                self.truth = Some(GeoPoint::new(m.lat, m.lon, m.alt));
                note_source(&mut active_sources, &m.sensor_id);
                continue;
            }
            if !m.has_position() {
                continue;
            }

            let base_variance = self.config.noise.variance_for(&m.sensor_id);

            let (pred_lat, pred_lon, _, _) = estimator.state();
            let innovation_m = geo::haversine(m.lat, m.lon, pred_lat, pred_lon);

            // Outliers are desensitized, never discarded: beyond the gate the
            // variance grows with the square of the miss distance.
            let adaptive_variance = if innovation_m > self.config.gate_distance_m {
                base_variance * (innovation_m / self.config.gate_scale_m).powi(2)
            } else {
                base_variance
            };

            let noise_scale = adaptive_variance / estimator.baseline_r_cell();
            match estimator.update(m.lat, m.lon, noise_scale) {
                Ok(()) => note_source(&mut active_sources, &m.sensor_id),
                Err(err) => {
                    tracing::warn!(sensor = %m.sensor_id, %err, "estimator update skipped");
                }
            }
        }

        if active_sources.is_empty() {
            return None;
        }

        // The fused state once the filter is live; before that, a UAV-only
        // feed passes the target's own report through as the best estimate.
        let (lat, lon) = if estimator.is_initialized() {
            let (f_lat, f_lon, _, _) = estimator.state();
            (f_lat, f_lon)
        } else {
            let truth = self.truth?;
            (truth.lat, truth.lon)
        };

        let error_m = self
            .truth
            .map(|t| geo::haversine(lat, lon, t.lat, t.lon));

        let alt = match self.truth {
            Some(t) if t.alt != 0.0 => t.alt,
            _ => self.config.fallback_alt_m,
        };

        let fused = FusedTrack {
            track_id: track_id.0,
            position: GeoPoint::new(lat, lon, alt),
            confidence: self.config.confidence,
            source_sensors: active_sources,
            uav_reported: self.truth,
            uav_error_m: error_m,
        };

        self.registry.publish(fused.clone());

        self.audit.append(&AuditRow {
            ts: batch_ts,
            fused_lat: lat,
            fused_lon: lon,
            uav_lat: self.truth.map_or(0.0, |t| t.lat),
            uav_lon: self.truth.map_or(0.0, |t| t.lon),
            error_m: error_m.unwrap_or(0.0),
            sources: fused.source_sensors.clone(),
        });

        Some(fused)
    }

    /// Covariance trace of the configured track's estimator (health metric).
    pub fn covariance_trace(&self) -> Option<f64> {
        self.estimators
            .get(&TrackId(self.config.track_id))
            .map(GeoKalmanFilter::covariance_trace)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(name: &str) -> FusionEngine {
        let config = Arc::new(EngineConfig::default());
        let queue = Arc::new(MeasurementQueue::new());
        let registry = Arc::new(TrackRegistry::new());
        let path = std::env::temp_dir().join(format!("skyfuse-fusion-{name}.csv"));
        let audit = Arc::new(CsvAudit::create(&path));
        FusionEngine::new(config, queue, registry, audit)
    }

    fn uav(ts: u64, lat: f64, lon: f64, alt: f64) -> Measurement {
        Measurement {
            timestamp_ms: ts,
            class: SensorClass::Uav,
            sensor_id: "UAV-ALFA".into(),
            lat,
            lon,
            alt,
            extras: "UAV-ALFA".into(),
        }
    }

    fn radar(ts: u64, id: &str, lat: f64, lon: f64) -> Measurement {
        Measurement {
            timestamp_ms: ts,
            class: SensorClass::Radar,
            sensor_id: id.into(),
            lat,
            lon,
            alt: 1200.0,
            extras: String::new(),
        }
    }

    fn sigint(ts: u64) -> Measurement {
        Measurement {
            timestamp_ms: ts,
            class: SensorClass::Sigint,
            sensor_id: "SIGINT-01".into(),
            lat: 0.0,
            lon: 0.0,
            alt: 0.0,
            extras: String::new(),
        }
    }

    #[test]
    fn empty_batch_publishes_nothing() {
        let mut eng = engine("empty");
        assert!(eng.process_batch(&[]).is_none());
    }

    #[test]
    fn uav_only_passes_report_through() {
        let mut eng = engine("uav-only");
        let mut published = None;
        for i in 0..10u64 {
            let lat = 39.920 + 0.0005 * i as f64;
            published = eng.process_batch(&[uav(1000 * (i + 1), lat, 32.85, 1200.0)]);
        }
        let track = published.expect("UAV feed must publish");
        assert_eq!(track.source_sensors, vec!["UAV-ALFA".to_string()]);
        assert_eq!(track.confidence, 0.95);
        assert!((track.position.lat - (39.920 + 0.0045)).abs() < 1e-12);
        assert!(track.uav_error_m.unwrap() < 1e-6);
    }

    #[test]
    fn sigint_only_publishes_nothing() {
        let mut eng = engine("sigint-only");
        assert!(eng.process_batch(&[sigint(1000), sigint(1001)]).is_none());
    }

    #[test]
    fn clean_radar_feed_converges() {
        let mut eng = engine("convergence");
        let (t_lat, t_lon) = (40.00, 32.90);
        let initial_trace = {
            // first batch initializes the estimator
            eng.process_batch(&[radar(1000, "AN-MPQ-53-PATRIOT", t_lat, t_lon)]);
            eng.covariance_trace().unwrap()
        };

        let mut published = None;
        for i in 1..50u64 {
            let ts = 1000 + i * 100;
            published = eng.process_batch(&[radar(ts, "AN-MPQ-53-PATRIOT", t_lat, t_lon)]);
        }
        let track = published.unwrap();
        let miss = geo::haversine(track.position.lat, track.position.lon, t_lat, t_lon);
        assert!(miss < 1.0, "fused position {miss} m from truth");
        assert!(
            eng.covariance_trace().unwrap() < initial_trace / 50.0,
            "trace should collapse with clean measurements"
        );

        // The filter keeps tightening toward steady state
        for i in 50..100u64 {
            let ts = 1000 + i * 100;
            eng.process_batch(&[radar(ts, "AN-MPQ-53-PATRIOT", t_lat, t_lon)]);
        }
        assert!(eng.covariance_trace().unwrap() < initial_trace / 100.0);
    }

    #[test]
    fn outlier_is_gated_then_recovered() {
        let mut eng = engine("outlier");
        let (t_lat, t_lon) = (40.00, 32.90);
        for i in 0..50u64 {
            let ts = 1000 + i * 100;
            eng.process_batch(&[radar(ts, "AN-MPQ-53-PATRIOT", t_lat, t_lon)]);
        }

        // One blunder displaced ~10 km north
        let out_lat = t_lat + 10_000.0 / 111_195.0;
        let track = eng
            .process_batch(&[radar(6100, "AN-MPQ-53-PATRIOT", out_lat, t_lon)])
            .unwrap();
        let pulled = geo::haversine(track.position.lat, track.position.lon, t_lat, t_lon);
        assert!(pulled < 50.0, "gating failed: estimate moved {pulled} m");

        // Next in-family measurement pulls the estimate back
        let track = eng
            .process_batch(&[radar(6200, "AN-MPQ-53-PATRIOT", t_lat, t_lon)])
            .unwrap();
        let miss = geo::haversine(track.position.lat, track.position.lon, t_lat, t_lon);
        assert!(miss < 5.0, "recovery failed: {miss} m from truth");
    }

    #[test]
    fn degenerate_batch_spacing_is_clamped() {
        assert_eq!(FusionEngine::clamped_dt(0, 5000), 0.1);
        assert_eq!(FusionEngine::clamped_dt(1000, 6000), 0.1); // 5 s gap
        assert_eq!(FusionEngine::clamped_dt(6000, 1000), 0.1); // out of order
        assert_eq!(FusionEngine::clamped_dt(1000, 1000), 0.1); // zero
        assert_eq!(FusionEngine::clamped_dt(1000, 1500), 0.5);
    }

    #[test]
    fn five_second_gap_does_not_blow_up_velocity() {
        let mut eng = engine("dt-clamp");
        eng.process_batch(&[radar(1000, "AN-MPQ-53-PATRIOT", 40.0, 32.9)]);
        eng.process_batch(&[radar(6000, "AN-MPQ-53-PATRIOT", 40.0005, 32.9)]);
        let est = eng.estimators.get(&TrackId(1)).unwrap();
        let (_, _, v_lat, v_lon) = est.state();
        assert!(v_lat.abs() < 0.01, "v_lat {v_lat} deg/s after clamped gap");
        assert!(v_lon.abs() < 0.01);
    }

    #[test]
    fn source_list_deduplicated_in_first_seen_order() {
        let mut eng = engine("dedup");
        let batch = vec![
            uav(1000, 39.92, 32.85, 1200.0),
            radar(1001, "TPS-77-LONG-RANGE", 39.9201, 32.8501),
            radar(1002, "AN-MPQ-53-PATRIOT", 39.9202, 32.8502),
            radar(1003, "TPS-77-LONG-RANGE", 39.9203, 32.8503),
        ];
        let track = eng.process_batch(&batch).unwrap();
        assert_eq!(
            track.source_sensors,
            vec![
                "UAV-ALFA".to_string(),
                "TPS-77-LONG-RANGE".to_string(),
                "AN-MPQ-53-PATRIOT".to_string(),
            ]
        );
        assert!(!track.source_sensors.is_empty());
    }

    #[test]
    fn altitude_falls_back_without_uav_feed() {
        let mut eng = engine("alt-fallback");
        let track = eng
            .process_batch(&[radar(1000, "AN-MPQ-53-PATRIOT", 40.0, 32.9)])
            .unwrap();
        assert_eq!(track.position.alt, 1250.0);
        assert!(track.uav_reported.is_none());
        assert!(track.uav_error_m.is_none());

        let track = eng
            .process_batch(&[
                uav(1100, 40.0001, 32.9001, 1200.0),
                radar(1101, "AN-MPQ-53-PATRIOT", 40.0, 32.9),
            ])
            .unwrap();
        assert_eq!(track.position.alt, 1200.0);
        assert!(track.uav_error_m.is_some());
    }
}
