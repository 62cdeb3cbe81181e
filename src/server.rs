//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::{ConfigLoader, Environment, Settings};
use crate::events::{EventBus, NoticeMessage};
use crate::forwarder;
use crate::routers::{ReqwestTransport, Routers};
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
    loader: ConfigLoader,
}

impl Server {
    /// Create a new server with the given settings and the loader they
    /// came from; the loader serves the reload endpoint.
    pub fn new(settings: Settings, loader: ConfigLoader) -> Self {
        Self { settings, loader }
    }

    /// Start the server and run until shutdown signal
    ///
    /// This method:
    /// 1. Logs startup information
    /// 2. Builds the event bus and notification routers
    /// 3. Spawns the forwarder task
    /// 4. Binds to the configured address
    /// 5. Starts the HTTP server with graceful shutdown
    ///
    /// # Errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );

        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            request_timeout = %self.settings.server.request_timeout,
            keep_alive_timeout = %self.settings.server.keep_alive_timeout,
            "Server configuration loaded"
        );

        tracing::info!(
            bark_enabled = %self.settings.bark.enabled,
            wxpusher_enabled = %self.settings.wxpusher.enabled,
            "Router configuration loaded"
        );

        let bus = Arc::new(EventBus::default());
        let routers = Arc::new(Routers::new(&self.settings, Arc::new(ReqwestTransport)));
        forwarder::spawn(bus.clone(), routers.clone());
        tracing::info!("Notification routers ready");

        // Fire the startup test message through the bus, same path as real events.
        if self.settings.wxpusher.run_on_start {
            tracing::info!("Publishing startup test message");
            bus.publish(NoticeMessage::test_message());
        }

        let state = AppState::new(bus, routers, Arc::new(self.loader));
        let router = create_router(state);
        tracing::info!("Router configured");

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// This function returns when either signal is received, allowing
/// the server to perform graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
