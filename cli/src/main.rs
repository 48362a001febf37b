//! `skyfuse` CLI: fusion service, sensor producers, monitor client.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fusion_core::audit::CsvAudit;
use fusion_core::client::{MonitorClient, SensorStream};
use fusion_core::{
    server, EngineConfig, FusionEngine, MeasurementQueue, SensorClass, TrackRegistry,
};
use sensor_models::{RadarParams, SigintParams, UavParams};
use sim::{ground_truth, RadarProducer, SigintSimulator, UavSimulator};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "skyfuse", about = "Multi-sensor track fusion service and simulators")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fusion engine: ingest endpoints, monitor endpoint, fusion loop.
    Serve {
        /// host:port for the sensor ingest endpoints
        #[arg(long, default_value = "0.0.0.0:6000")]
        fusion_addr: String,
        /// host:port for the monitor endpoint
        #[arg(long, default_value = "0.0.0.0:6005")]
        monitor_addr: String,
        /// CSV audit log path
        #[arg(long, default_value = "results.csv")]
        csv: PathBuf,
        /// Track identifier all measurements fuse into
        #[arg(long, default_value_t = 1)]
        track_id: u32,
        /// Auto-shutdown after this many seconds
        #[arg(long)]
        duration: Option<u64>,
        /// Extra sensor-noise registry entries, ID=SIGMA_METERS (repeatable)
        #[arg(long = "sensor-sigma")]
        sensor_sigma: Vec<String>,
    },
    /// Run the UAV telemetry producer.
    Uav {
        #[arg(long, default_value = "127.0.0.1:6000")]
        addr: String,
        /// Ground-truth handoff file
        #[arg(long, default_value = "ground_truth.txt")]
        truth: PathBuf,
        #[arg(long, default_value_t = 39.920)]
        lat: f64,
        #[arg(long, default_value_t = 32.850)]
        lon: f64,
        #[arg(long, default_value_t = 1200.0)]
        alt: f64,
        #[arg(long, default_value_t = 45.0)]
        heading: f64,
        #[arg(long, default_value_t = 80.0)]
        speed: f64,
        /// Stop after this many seconds of flight
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Run a radar detection producer.
    Radar {
        #[arg(long, default_value = "127.0.0.1:6000")]
        addr: String,
        #[arg(long, default_value = "ground_truth.txt")]
        truth: PathBuf,
        /// Sensor identifier (keys the engine's noise registry)
        #[arg(long, default_value = "RADAR-X")]
        id: String,
        #[arg(long, default_value_t = 39.9)]
        lat: f64,
        #[arg(long, default_value_t = 32.8)]
        lon: f64,
        #[arg(long, default_value_t = 150.0)]
        alt: f64,
        /// Range noise 1σ, meters
        #[arg(long, default_value_t = 30.0)]
        range_sigma: f64,
        /// Bearing noise 1σ, degrees
        #[arg(long, default_value_t = 1.0)]
        bearing_sigma: f64,
        /// Fixed range bias, meters
        #[arg(long, default_value_t = 0.0)]
        range_bias: f64,
        /// Fixed bearing bias, degrees
        #[arg(long, default_value_t = 0.0)]
        bearing_bias: f64,
        /// Detection threshold on signal strength
        #[arg(long, default_value_t = 0.0)]
        sensitivity: f64,
        /// Aspect-dependent RCS instead of constant 2.0 m²
        #[arg(long)]
        dynamic_rcs: bool,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Run the SIGINT hit producer.
    Sigint {
        #[arg(long, default_value = "127.0.0.1:6000")]
        addr: String,
        #[arg(long, default_value = "SIGINT-01")]
        id: String,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Subscribe to the monitor endpoint once and print the snapshot.
    Monitor {
        #[arg(long, default_value = "127.0.0.1:6005")]
        addr: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            fusion_addr,
            monitor_addr,
            csv,
            track_id,
            duration,
            sensor_sigma,
        } => serve(fusion_addr, monitor_addr, csv, track_id, duration, &sensor_sigma),
        Commands::Uav {
            addr,
            truth,
            lat,
            lon,
            alt,
            heading,
            speed,
            duration,
        } => run_uav(&addr, &truth, lat, lon, alt, heading, speed, duration),
        Commands::Radar {
            addr,
            truth,
            id,
            lat,
            lon,
            alt,
            range_sigma,
            bearing_sigma,
            range_bias,
            bearing_bias,
            sensitivity,
            dynamic_rcs,
            seed,
            duration,
        } => {
            let params = RadarParams {
                id,
                lat,
                lon,
                alt,
                range_sigma,
                bearing_sigma,
                range_bias,
                bearing_bias,
                sensitivity,
                dynamic_rcs,
                ..RadarParams::default()
            };
            run_radar(&addr, &truth, params, seed, duration)
        }
        Commands::Sigint {
            addr,
            id,
            seed,
            duration,
        } => run_sigint(&addr, id, seed, duration),
        Commands::Monitor { addr } => run_monitor(&addr),
    }
}

/// Producer wall clock, milliseconds since the epoch.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn serve(
    fusion_addr: String,
    monitor_addr: String,
    csv: PathBuf,
    track_id: u32,
    duration: Option<u64>,
    sensor_sigma: &[String],
) -> Result<()> {
    let mut config = EngineConfig {
        fusion_addr,
        monitor_addr,
        csv_path: csv,
        track_id,
        duration_secs: duration,
        ..EngineConfig::default()
    };
    for entry in sensor_sigma {
        match entry.split_once('=').map(|(id, s)| (id, s.parse::<f64>())) {
            Some((id, Ok(sigma))) if sigma > 0.0 => {
                config.noise.sigma_m.insert(id.to_string(), sigma);
            }
            _ => tracing::warn!(%entry, "ignoring malformed sensor-sigma entry"),
        }
    }
    let config = Arc::new(config);

    // Bind both endpoints before anything starts; failure here is the one
    // fatal startup error.
    let ingest_listener = server::bind(&config.fusion_addr)
        .with_context(|| format!("failed to bind ingest endpoint {}", config.fusion_addr))?;
    let monitor_listener = server::bind(&config.monitor_addr)
        .with_context(|| format!("failed to bind monitor endpoint {}", config.monitor_addr))?;
    tracing::info!(ingest = %config.fusion_addr, monitor = %config.monitor_addr, "listening");

    let queue = Arc::new(MeasurementQueue::new());
    let registry = Arc::new(TrackRegistry::new());
    let audit = Arc::new(CsvAudit::create(&config.csv_path));
    let running = Arc::new(AtomicBool::new(true));

    {
        let queue = Arc::clone(&queue);
        let running = Arc::clone(&running);
        thread::spawn(move || server::run_ingest(ingest_listener, queue, running));
    }
    {
        let registry = Arc::clone(&registry);
        let running = Arc::clone(&running);
        thread::spawn(move || server::run_monitor(monitor_listener, registry, running));
    }

    let engine = FusionEngine::new(
        Arc::clone(&config),
        Arc::clone(&queue),
        Arc::clone(&registry),
        audit,
    );
    let fusion_handle = engine.spawn(Arc::clone(&running));

    if let Some(secs) = config.duration_secs {
        let running = Arc::clone(&running);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            tracing::info!("simulation duration reached, shutting down");
            running.store(false, Ordering::SeqCst);
            // Grace period so the last CSV line flushes
            thread::sleep(Duration::from_secs(1));
            std::process::exit(0);
        });
    }

    fusion_handle.join().ok();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_uav(
    addr: &str,
    truth_path: &std::path::Path,
    lat: f64,
    lon: f64,
    alt: f64,
    heading: f64,
    speed: f64,
    duration: Option<u64>,
) -> Result<()> {
    let params = UavParams {
        start_lat: lat,
        start_lon: lon,
        start_alt: alt,
        start_heading: heading,
        speed,
        ..UavParams::default()
    };
    let mut uav = UavSimulator::new(params);
    let mut stream = SensorStream::connect(addr, SensorClass::Uav)
        .with_context(|| format!("failed to reach fusion service at {addr}"))?;
    tracing::info!(%addr, "UAV producer started");

    loop {
        if let Some(max_s) = duration {
            if uav.elapsed_s() >= max_s as f64 {
                tracing::info!("flight time finished");
                break;
            }
        }
        uav.step();
        let ts = now_ms();
        if let Err(err) = ground_truth::write_truth(truth_path, &uav.truth_sample(ts)) {
            tracing::warn!(%err, "could not write ground truth");
        }
        if let Err(err) = stream.send(&uav.telemetry(ts)) {
            tracing::error!(%err, "telemetry stream lost");
            break;
        }
        thread::sleep(Duration::from_secs(1));
    }

    let ack = stream.finish()?;
    tracing::info!(ok = ack.ok, message = %ack.message, "stream closed");
    Ok(())
}

fn run_radar(
    addr: &str,
    truth_path: &std::path::Path,
    params: RadarParams,
    seed: u64,
    duration: Option<u64>,
) -> Result<()> {
    let scan_period = Duration::from_millis(params.scan_period_ms);
    let mut radar = RadarProducer::new(params, seed);
    let mut stream = SensorStream::connect(addr, SensorClass::Radar)
        .with_context(|| format!("failed to reach fusion service at {addr}"))?;
    tracing::info!(
        %addr,
        id = %radar.params.id,
        lat = radar.params.lat,
        lon = radar.params.lon,
        "radar producer started"
    );

    let started = std::time::Instant::now();
    loop {
        if let Some(max_s) = duration {
            if started.elapsed().as_secs() >= max_s {
                break;
            }
        }
        // A torn or missing truth file just means no scan this tick.
        if let Some(truth) = ground_truth::read_truth(truth_path) {
            if let Some(detection) = radar.observe(&truth, now_ms()) {
                if let Err(err) = stream.send(&detection) {
                    tracing::error!(%err, "detection stream lost");
                    break;
                }
                tracing::debug!(
                    lat = detection.target.lat,
                    lon = detection.target.lon,
                    "target detected"
                );
            }
        }
        thread::sleep(scan_period);
    }

    let ack = stream.finish()?;
    tracing::info!(ok = ack.ok, message = %ack.message, "stream closed");
    Ok(())
}

fn run_sigint(addr: &str, id: String, seed: u64, duration: Option<u64>) -> Result<()> {
    let params = SigintParams {
        id,
        ..SigintParams::default()
    };
    let mut sigint = SigintSimulator::new(params, seed);
    let mut stream = SensorStream::connect(addr, SensorClass::Sigint)
        .with_context(|| format!("failed to reach fusion service at {addr}"))?;
    tracing::info!(%addr, "SIGINT producer started");

    let started = std::time::Instant::now();
    loop {
        if let Some(max_s) = duration {
            if started.elapsed().as_secs() >= max_s {
                break;
            }
        }
        if let Err(err) = stream.send(&sigint.next_hit(now_ms())) {
            tracing::error!(%err, "hit stream lost");
            break;
        }
        thread::sleep(Duration::from_secs(1));
    }

    let ack = stream.finish()?;
    tracing::info!(ok = ack.ok, message = %ack.message, "stream closed");
    Ok(())
}

fn run_monitor(addr: &str) -> Result<()> {
    let tracks = MonitorClient::subscribe(addr)
        .with_context(|| format!("fusion engine unreachable at {addr}"))?;

    println!("==================== FUSED TRACK MONITOR ====================");
    println!(
        "{:<20}{:>11}{:>11}{:>9}{:>7}{:>9}  {}",
        "TRACK", "LAT", "LON", "ALT(m)", "CONF", "ERR(m)", "SOURCES"
    );
    println!("-------------------------------------------------------------");
    for t in &tracks {
        // UAV-sourced tracks get the external id as their label
        let label = t
            .source_sensors
            .iter()
            .find(|s| s.starts_with("UAV"))
            .map(|s| format!("{s} (Estimated)"))
            .unwrap_or_else(|| t.track_id.to_string());
        println!(
            "{:<20}{:>11.5}{:>11.5}{:>9.1}{:>7.3}{:>9.1}  {}",
            label,
            t.position.lat,
            t.position.lon,
            t.position.alt,
            t.confidence,
            t.uav_error_m.unwrap_or(0.0),
            t.source_sensors.join(",")
        );
        if let Some(reported) = t.uav_reported {
            println!(
                "{:<20}{:>11.5}{:>11.5}{:>9.1}",
                "  (reported)", reported.lat, reported.lon, reported.alt
            );
        }
    }
    if tracks.is_empty() {
        println!("(no measurements accepted yet)");
    }
    Ok(())
}
