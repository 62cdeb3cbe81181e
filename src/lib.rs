//! PushRelay Library
//!
//! Core library modules for the PushRelay notification forwarding service.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod forms;
pub mod forwarder;
pub mod logger;
pub mod routers;
pub mod server;
pub mod state;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
