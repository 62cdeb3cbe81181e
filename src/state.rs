//! Shared application state for the HTTP API.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::events::EventBus;
use crate::routers::Routers;

/// State handed to every axum handler.
///
/// Cheap to clone; every member is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Event bus the forwarder listens on
    pub bus: Arc<EventBus>,
    /// Both notification routers
    pub routers: Arc<Routers>,
    /// Loader used to re-read settings for the reload endpoint
    pub loader: Arc<ConfigLoader>,
}

impl AppState {
    pub fn new(bus: Arc<EventBus>, routers: Arc<Routers>, loader: Arc<ConfigLoader>) -> Self {
        Self {
            bus,
            routers,
            loader,
        }
    }
}
