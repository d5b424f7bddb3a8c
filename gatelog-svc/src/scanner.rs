//! Scan pipeline: poll the token reader, resolve, log, broadcast
//!
//! A cooperative tokio loop drives the reader capability. Each presented
//! token is handled to completion (lookup, feedback, log append, event
//! emit, reader reset) before the loop returns to polling, with a debounce
//! delay so one physical presentation yields one scan.

use crate::AppState;
use gatelog_common::events::{GatelogEvent, ScanResult};
use gatelog_common::Result;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Display name used for unrecognized identifiers
pub const UNKNOWN_NAME: &str = "(unknown)";

/// Origin tag recorded for reader scans
pub const METHOD_TOKEN_READ: &str = "token-read";

/// Abstract token reader capability.
///
/// `poll` reports a presented token's normalized identifier, or None when
/// nothing is present. `reset` clears any latched token so the same
/// physical presentation is not read twice.
pub trait TokenReader: Send {
    fn poll(&mut self) -> Result<Option<String>>;
    fn reset(&mut self);
}

/// Physical feedback seam (LED/buzzer on real hardware).
pub trait FeedbackSink: Send + Sync {
    fn accepted(&self);
    fn denied(&self);
}

/// Default feedback sink: structured log lines only.
pub struct ConsoleFeedback;

impl FeedbackSink for ConsoleFeedback {
    fn accepted(&self) {
        info!("Feedback: accepted");
    }

    fn denied(&self) {
        info!("Feedback: denied");
    }
}

/// Reads newline-terminated UIDs from a device or FIFO path.
///
/// USB HID badge readers present as keyboards that type the UID followed
/// by Enter; pointing this at the reader's device (or a FIFO bridged to
/// it) gives one identifier per line.
pub struct LineReader<R: Read + Send> {
    reader: BufReader<R>,
    pending: String,
}

impl LineReader<std::fs::File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read + Send> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: String::new(),
        }
    }

    fn take_pending(&mut self) -> Option<String> {
        let uid = normalize_uid(&self.pending);
        self.pending.clear();
        if uid.is_empty() {
            None
        } else {
            Some(uid)
        }
    }
}

impl<R: Read + Send> TokenReader for LineReader<R> {
    fn poll(&mut self) -> Result<Option<String>> {
        match self.reader.read_line(&mut self.pending) {
            // Ok(0) means the stream ended: a partial line carried over
            // from an earlier WouldBlock is complete now
            Ok(_) => Ok(self.take_pending()),
            // Keep the partial line; the rest arrives on a later poll
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
    }
}

/// Trim whitespace and uppercase, so scanned and managed identifiers
/// always collide correctly.
pub fn normalize_uid(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Handle one presented token to completion.
///
/// A lookup miss is not an error: it is the denied outcome, logged and
/// broadcast like any other scan. An append failure is logged and
/// swallowed; the scan is never retried.
pub fn process_scan(state: &AppState, feedback: &dyn FeedbackSink, uid: &str) -> GatelogEvent {
    let timestamp = state.clock.now_secs();
    let (name, result) = match state.store.lookup(uid) {
        Some(name) => (name, ScanResult::Accepted),
        None => (UNKNOWN_NAME.to_string(), ScanResult::Denied),
    };

    match result {
        ScanResult::Accepted => feedback.accepted(),
        ScanResult::Denied => feedback.denied(),
    }

    if let Err(e) = state
        .log
        .append(timestamp, uid, &name, METHOD_TOKEN_READ)
    {
        error!("Failed to append attendance row: {}", e);
    }

    let event = GatelogEvent::ScanRecorded {
        timestamp,
        uid: uid.to_string(),
        name: name.clone(),
        result,
    };
    state.events.emit_lossy(event.clone());

    info!("Scan: {} -> {} ({:?})", uid, name, result);
    event
}

/// Drive the reader until `shutdown` is raised.
///
/// Runs on a blocking tokio task: the reader poll is synchronous I/O and
/// a stuck read stalls only this loop, not the HTTP server. The shutdown
/// flag is checked once per tick, so a scan in flight always runs to
/// completion.
pub fn run_scan_loop(
    state: AppState,
    mut reader: Box<dyn TokenReader>,
    feedback: Box<dyn FeedbackSink>,
    poll_interval: Duration,
    debounce: Duration,
    shutdown: Arc<AtomicBool>,
) {
    info!("Scan loop started");
    while !shutdown.load(Ordering::Relaxed) {
        match reader.poll() {
            Ok(Some(uid)) => {
                process_scan(&state, feedback.as_ref(), &uid);
                reader.reset();
                std::thread::sleep(debounce);
            }
            Ok(None) => {
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                warn!("Reader poll failed: {}", e);
                std::thread::sleep(poll_interval);
            }
        }
    }
    info!("Scan loop stopped");
}
