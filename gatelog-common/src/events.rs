//! Event types for the gatelog event system
//!
//! Provides the shared event definitions and EventBus used by the scan
//! pipeline, the management API, and the SSE endpoint.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Outcome of a token scan.
///
/// Serialized lowercase so the wire field matches the `result` values the
/// web UI expects (`"accepted"` / `"denied"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanResult {
    /// Token identifier was found in the identity store
    Accepted,
    /// Token identifier was not recognized
    Denied,
}

/// gatelog event types
///
/// Events are broadcast via EventBus and serialized as-is for SSE
/// transmission to connected web clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GatelogEvent {
    /// A token was presented to the reader and processed
    ///
    /// Emitted once per physical presentation, after the attendance log
    /// append has been attempted (successfully or not).
    ScanRecorded {
        /// Seconds from the configured clock (uptime by default)
        timestamp: u64,
        /// Normalized token identifier (uppercase hex)
        uid: String,
        /// Resolved display name, or "(unknown)" for a denied scan
        name: String,
        /// Whether the identifier was recognized
        result: ScanResult,
    },

    /// An identity record was created or updated via the management API
    ///
    /// Lets open UIs refresh their roster without polling.
    IdentityUpserted {
        /// Token identifier (uppercase hex)
        uid: String,
        /// Display name as stored (UTF-8, byte-exact)
        name: String,
    },
}

impl GatelogEvent {
    /// Event type string used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            GatelogEvent::ScanRecorded { .. } => "ScanRecorded",
            GatelogEvent::IdentityUpserted { .. } => "IdentityUpserted",
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the scan loop)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
///
/// Observers that are not subscribed at publish time never receive the
/// event; there is no buffering or replay.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GatelogEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<GatelogEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Every gatelog event is best-effort: a scan with no connected web
    /// client is still a valid scan.
    pub fn emit_lossy(&self, event: GatelogEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
