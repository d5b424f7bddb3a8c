//! HTTP API handlers for gatelog-svc

pub mod health;
pub mod identity;
pub mod sse;
pub mod ui;

pub use health::health_check;
pub use identity::{add_identity, list_identities};
pub use sse::event_stream;
pub use ui::{serve_app_js, serve_index};
