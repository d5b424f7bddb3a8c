//! Append-only attendance log in UTF-8 CSV form
//!
//! The file begins with a UTF-8 BOM (so spreadsheet tools detect the
//! encoding) followed by the header `timestamp,uid,name,method`, then one
//! quoted row per scan. Rows are never rewritten; an interrupted append can
//! leave a truncated trailing row, which is accepted.

use gatelog_common::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const HEADER: &str = "timestamp,uid,name,method";

/// Timestamped record sink for scans.
pub struct AttendanceLog {
    path: PathBuf,
    // Serializes appends so two rows never interleave
    write_lock: Mutex<()>,
}

impl AttendanceLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Create the log with BOM and header iff it does not already exist.
    /// Idempotent.
    pub fn ensure_initialized(&self) -> Result<()> {
        let _guard = self.write_lock.lock().expect("attendance lock poisoned");
        self.init_unlocked()
    }

    /// Append one attendance row.
    ///
    /// No retry on failure; the caller logs and moves on.
    pub fn append(&self, timestamp: u64, uid: &str, name: &str, method: &str) -> Result<()> {
        let line = format!(
            "{},{},{},{}",
            timestamp,
            csv_escape(uid),
            csv_escape(name),
            csv_escape(method)
        );
        let _guard = self.write_lock.lock().expect("attendance lock poisoned");
        self.init_unlocked()?;
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    // Caller must hold write_lock
    fn init_unlocked(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&self.path)?;
        file.write_all(UTF8_BOM)?;
        writeln!(file, "{}", HEADER)?;
        info!("Created attendance log at {}", self.path.display());
        Ok(())
    }
}

/// Wrap a field in double quotes, doubling any internal double quote.
/// All other bytes pass through untouched, so multi-byte UTF-8 sequences
/// are preserved exactly.
pub fn csv_escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}
