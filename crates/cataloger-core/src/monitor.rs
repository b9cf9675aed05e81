//! Scan progress monitoring — consumes the progress file the external
//! scanner writes while it populates the catalog.
//!
//! The scanner (a separate process) rewrites `scan_status.json` as it runs:
//! `{scanned, total, current_file, status}` with status `"running"` or
//! `"completed"`. This engine only reads the file. Liveness is inferred
//! from the file's age: a "running" file that has not been rewritten
//! within [`PROGRESS_STALE_AFTER`] means the producer died mid-scan, and
//! the reported state degrades to `idle`.

use std::path::Path;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A "running" progress file older than this is considered abandoned.
pub const PROGRESS_STALE_AFTER: Duration = Duration::from_secs(30);

/// The raw progress record as written by the scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    pub scanned: u64,
    /// Total estimate; the scanner only knows it once the walk finishes.
    pub total: Option<u64>,
    pub current_file: String,
    pub status: String,
}

/// Derived liveness state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Running,
    Completed,
    /// No scan in progress: file missing, unparseable, or stale.
    Idle,
}

/// What callers render: the derived state plus the last known counters.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub state: ScanState,
    pub scanned: u64,
    pub total: Option<u64>,
    pub current_file: String,
}

impl ProgressReport {
    fn idle() -> Self {
        Self {
            state: ScanState::Idle,
            scanned: 0,
            total: None,
            current_file: String::new(),
        }
    }
}

/// Read and classify the progress file at `path`.
///
/// Never fails: a missing or malformed file is simply an idle report,
/// because "no scanner activity" is the ordinary steady state.
pub fn read_progress(path: &Path) -> ProgressReport {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!("No progress file at {}: {err}", path.display());
            return ProgressReport::idle();
        }
    };
    let progress: ScanProgress = match serde_json::from_str(&contents) {
        Ok(progress) => progress,
        Err(err) => {
            debug!("Unparseable progress file at {}: {err}", path.display());
            return ProgressReport::idle();
        }
    };

    let age = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok());

    ProgressReport {
        state: classify(&progress, age),
        scanned: progress.scanned,
        total: progress.total,
        current_file: progress.current_file,
    }
}

/// Pure classification: completed files stay completed forever; running
/// files are only running while fresh. Unknown statuses and unknowable
/// ages degrade to idle.
fn classify(progress: &ScanProgress, age: Option<Duration>) -> ScanState {
    match progress.status.as_str() {
        "completed" => ScanState::Completed,
        "running" => match age {
            Some(age) if age <= PROGRESS_STALE_AFTER => ScanState::Running,
            _ => ScanState::Idle,
        },
        _ => ScanState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn progress(status: &str) -> ScanProgress {
        ScanProgress {
            scanned: 42,
            total: None,
            current_file: "/x/y.txt".to_string(),
            status: status.to_string(),
        }
    }

    fn write_progress(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("scan_status.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn fresh_running_file_reports_running() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_progress(
            &dir,
            r#"{"scanned": 7, "total": null, "current_file": "/a/b.txt", "status": "running"}"#,
        );
        let report = read_progress(&path);
        assert_eq!(report.state, ScanState::Running);
        assert_eq!(report.scanned, 7);
        assert_eq!(report.current_file, "/a/b.txt");
    }

    #[test]
    fn completed_file_reports_completed_regardless_of_age() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_progress(
            &dir,
            r#"{"scanned": 100, "total": 100, "current_file": "", "status": "completed"}"#,
        );
        let report = read_progress(&path);
        assert_eq!(report.state, ScanState::Completed);
        assert_eq!(report.total, Some(100));
    }

    #[test]
    fn missing_file_is_idle() {
        let dir = tempfile::tempdir().unwrap();
        let report = read_progress(&dir.path().join("nothing_here.json"));
        assert_eq!(report.state, ScanState::Idle);
        assert_eq!(report.scanned, 0);
    }

    #[test]
    fn malformed_file_is_idle() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_progress(&dir, "not json at all {{{");
        assert_eq!(read_progress(&path).state, ScanState::Idle);
    }

    #[test]
    fn stale_running_producer_is_classified_idle() {
        // classify is pure so staleness is testable without mtime games.
        let stale = PROGRESS_STALE_AFTER + Duration::from_secs(1);
        assert_eq!(classify(&progress("running"), Some(stale)), ScanState::Idle);
        assert_eq!(
            classify(&progress("running"), Some(Duration::from_secs(2))),
            ScanState::Running
        );
        assert_eq!(classify(&progress("running"), None), ScanState::Idle);
    }

    #[test]
    fn unknown_status_is_idle() {
        assert_eq!(
            classify(&progress("exploded"), Some(Duration::from_secs(1))),
            ScanState::Idle
        );
    }
}
