//! Audit logger with per-day files and bounded retention.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ConfigStore;

use super::{Level, LogEntry};

/// Store key holding the persisted enabled-flag.
const ENABLED_KEY: &str = "logging_enabled";

/// Age beyond which per-day files are deleted by the retention sweep.
const RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const FILE_PREFIX: &str = "audit-";
const FILE_SUFFIX: &str = ".log";

/// Latch bounding the retention sweep to one run per process lifetime.
static SWEPT_THIS_RUN: AtomicBool = AtomicBool::new(false);

/// Leveled audit logger writing one file per UTC calendar day.
///
/// DEBUG/INFO/WARNING entries honor the enabled-flag; ERROR entries are
/// always recorded. Each entry is appended as one complete line using the
/// OS append mode, so concurrent writers never interleave partial lines.
/// All storage failures are swallowed.
pub struct AuditLog {
    dir: PathBuf,
    enabled: AtomicBool,
    store: Arc<dyn ConfigStore>,
}

impl AuditLog {
    /// Create a logger writing per-day files under `dir`.
    ///
    /// The initial enabled state comes from the store; an absent key means
    /// disabled. The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>, store: Arc<dyn ConfigStore>) -> Self {
        let enabled = store
            .get(ENABLED_KEY)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Self {
            dir: dir.into(),
            enabled: AtomicBool::new(enabled),
            store,
        }
    }

    /// Whether DEBUG/INFO/WARNING entries are currently recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Flip the enabled-flag and persist it.
    ///
    /// Takes effect immediately for subsequent log calls in this process
    /// and, through the store, for future processes. This is the only
    /// writer of the flag; persistence failures are swallowed and the
    /// in-memory flag still flips.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        if let Err(e) = self.store.set(ENABLED_KEY, if enabled { "1" } else { "0" }) {
            warn!(error = %e, "Failed to persist logging enabled-flag");
        }
    }

    /// Record an entry.
    ///
    /// Non-ERROR levels are dropped (not even buffered) while the flag is
    /// off. Storage failures never propagate to the caller.
    pub fn log(&self, level: Level, message: &str, context: Option<Value>) {
        if level != Level::Error && !self.is_enabled() {
            return;
        }
        let entry = LogEntry::new(level, message, context);
        if let Err(e) = self.append(&entry) {
            debug!(error = %e, "Audit append failed");
        }
    }

    /// Record a DEBUG entry.
    pub fn debug(&self, message: &str, context: Option<Value>) {
        self.log(Level::Debug, message, context);
    }

    /// Record an INFO entry.
    pub fn info(&self, message: &str, context: Option<Value>) {
        self.log(Level::Info, message, context);
    }

    /// Record a WARNING entry.
    pub fn warning(&self, message: &str, context: Option<Value>) {
        self.log(Level::Warning, message, context);
    }

    /// Record an ERROR entry. Recorded regardless of the enabled-flag.
    pub fn error(&self, message: &str, context: Option<Value>) {
        self.log(Level::Error, message, context);
    }

    /// Last `n` lines of today's file only.
    ///
    /// Does not aggregate across days; returns an empty vector if today's
    /// file does not exist.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let path = self.dir.join(today_file_name());
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        let lines: Vec<&str> = content.lines().collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].iter().map(|s| s.to_string()).collect()
    }

    fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
        self.ensure_dir()?;
        self.sweep_once();

        let path = self.dir.join(today_file_name());
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        // One write_all call per entry: append mode serializes concurrent
        // writers at the OS layer, so complete lines never interleave.
        let mut line = entry.render();
        line.push('\n');
        file.write_all(line.as_bytes())
    }

    /// Create the log directory on first use, with artifacts that keep it
    /// from being served or indexed if it lands under a web root.
    fn ensure_dir(&self) -> std::io::Result<()> {
        if self.dir.exists() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(".htaccess"), "Require all denied\n")?;
        std::fs::write(self.dir.join("index.html"), "")?;
        Ok(())
    }

    /// Run the retention sweep, at most once per process lifetime.
    fn sweep_once(&self) {
        if SWEPT_THIS_RUN.swap(true, Ordering::SeqCst) {
            return;
        }
        match sweep_stale(&self.dir, SystemTime::now()) {
            Ok(removed) if removed > 0 => debug!(removed, "Swept stale audit logs"),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Retention sweep failed"),
        }
    }
}

/// Delete per-day log files whose last modification is older than the
/// retention window, measured against `now`.
///
/// Deletes whole files only and never edits live ones, so racing sweeps
/// across processes are harmless: deleting an already-deleted file is
/// skipped, not an error.
fn sweep_stale(dir: &Path, now: SystemTime) -> std::io::Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(FILE_PREFIX) || !name.ends_with(FILE_SUFFIX) {
            continue;
        }
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        let stale = now
            .duration_since(modified)
            .map(|age| age > RETENTION)
            .unwrap_or(false);
        if stale && std::fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}

fn today_file_name() -> String {
    format!("{}{}{}", FILE_PREFIX, Utc::now().format("%Y-%m-%d"), FILE_SUFFIX)
}
