//! # gatelog Common Library
//!
//! Shared code for the gatelog attendance service:
//! - Event types (GatelogEvent enum) and the EventBus
//! - Error types
//! - Configuration loading and data folder resolution
//! - Clock capability for timestamping scans

pub mod clock;
pub mod config;
pub mod error;
pub mod events;

pub use clock::{Clock, ManualClock, UptimeClock, WallClock};
pub use error::{Error, Result};
