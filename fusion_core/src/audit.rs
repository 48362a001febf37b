//! CSV audit log: one row per fusion iteration that publishes a track.
//!
//! The file is truncated and seeded with its header at startup. Appends go
//! through a mutex-wrapped handle. Audit failures never stop the fusion
//! loop: an unopenable file is reported once on standard error and the
//! audit stream simply stays empty for the rest of the run.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const HEADER: &str = "ts,f_lat,f_lon,uav_lat,uav_lon,error_m,sources";

/// One audit row, formatted per the log schema: coordinates at 6 decimal
/// places, error at 2, sources semicolon-joined.
#[derive(Clone, Debug)]
pub struct AuditRow {
    pub ts: u64,
    pub fused_lat: f64,
    pub fused_lon: f64,
    pub uav_lat: f64,
    pub uav_lon: f64,
    pub error_m: f64,
    pub sources: Vec<String>,
}

impl AuditRow {
    fn to_csv(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.2},{}",
            self.ts,
            self.fused_lat,
            self.fused_lon,
            self.uav_lat,
            self.uav_lon,
            self.error_m,
            self.sources.join(";")
        )
    }
}

/// Append-only CSV audit log guarded by one mutex.
#[derive(Debug)]
pub struct CsvAudit {
    path: PathBuf,
    handle: Mutex<Option<File>>,
}

impl CsvAudit {
    /// Truncate the file at `path` and write the header. On failure the
    /// audit is disabled for the whole run (diagnostic to stderr).
    pub fn create(path: &Path) -> Self {
        let handle = match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .and_then(|mut f| writeln!(f, "{HEADER}").map(|()| f))
        {
            Ok(file) => {
                tracing::info!(path = %path.display(), "audit log initialized");
                Some(file)
            }
            Err(err) => {
                eprintln!("could not initialize audit log {}: {err}", path.display());
                None
            }
        };
        Self {
            path: path.to_path_buf(),
            handle: Mutex::new(handle),
        }
    }

    /// Append one row. Failures are reported and swallowed.
    pub fn append(&self, row: &AuditRow) {
        let mut guard = self.handle.lock().expect("audit log mutex poisoned");
        if let Some(file) = guard.as_mut() {
            if let Err(err) = writeln!(file, "{}", row.to_csv()).and_then(|()| file.flush()) {
                eprintln!("could not write audit log {}: {err}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_formatting_matches_schema() {
        let row = AuditRow {
            ts: 1700000000123,
            fused_lat: 39.920501,
            fused_lon: 32.850299,
            uav_lat: 39.9205,
            uav_lon: 32.8503,
            error_m: 12.3456,
            sources: vec!["TPS-77-LONG-RANGE".into(), "AN-MPQ-53-PATRIOT".into()],
        };
        assert_eq!(
            row.to_csv(),
            "1700000000123,39.920501,32.850299,39.920500,32.850300,12.35,TPS-77-LONG-RANGE;AN-MPQ-53-PATRIOT"
        );
    }

    #[test]
    fn header_written_and_rows_appended() {
        let dir = std::env::temp_dir().join("skyfuse-audit-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("results.csv");
        let audit = CsvAudit::create(&path);
        audit.append(&AuditRow {
            ts: 1,
            fused_lat: 1.0,
            fused_lon: 2.0,
            uav_lat: 0.0,
            uav_lon: 0.0,
            error_m: 0.0,
            sources: vec!["R1".into()],
        });
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(lines.next(), Some("1,1.000000,2.000000,0.000000,0.000000,0.00,R1"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
