//! Configuration reload endpoint.

use axum::{Router, extract::State, response::Json, routing::post};

use crate::api::doc::CONFIG_TAG;
use crate::api::dto::ReloadResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Creates the configuration routes.
///
/// # Routes
/// - `POST /config/reload` - Re-read settings and swap router snapshots
pub fn config_routes() -> Router<AppState> {
    Router::new().route("/config/reload", post(reload_config))
}

/// Re-read settings from disk and swap both router snapshots.
///
/// A load or validation failure leaves the running snapshots untouched and
/// returns an error response.
#[utoipa::path(
    post,
    path = "/api/config/reload",
    responses(
        (status = 200, description = "Configuration reloaded", body = ReloadResponse),
        (status = 500, description = "Reload failed, previous configuration kept",
            body = crate::api::dto::ErrorResponse)
    ),
    tag = CONFIG_TAG
)]
pub async fn reload_config(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let settings = state.loader.load()?;
    state.routers.reload(&settings);

    tracing::info!("Configuration reloaded");
    Ok(Json(ReloadResponse {
        success: true,
        message: "Configuration reloaded".to_string(),
        bark_enabled: state.routers.bark.state(),
        wxpusher_enabled: state.routers.wxpusher.state(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLoader, Settings};
    use crate::events::EventBus;
    use crate::routers::Routers;
    use crate::routers::transport::testing::RecordingTransport;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn state_for(dir: &TempDir) -> AppState {
        let transport = Arc::new(RecordingTransport::replying(200, "{}"));
        let loader = ConfigLoader::from_file(dir.path().join("app.toml"));
        AppState::new(
            Arc::new(EventBus::default()),
            Arc::new(Routers::new(&Settings::default(), transport)),
            Arc::new(loader),
        )
    }

    fn write_config(dir: &TempDir, contents: &str) {
        let mut file = std::fs::File::create(dir.path().join("app.toml")).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn test_reload_swaps_router_snapshots() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "[bark]\nenabled = true\napikey = \"alice:KEYA\"\n",
        );
        let state = state_for(&dir);
        assert!(!state.routers.bark.state());

        let result = reload_config(State(state.clone())).await;

        assert!(result.is_ok());
        assert!(state.routers.bark.state());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshots() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[wxpusher]\ncontent_type = 9\n");
        let state = state_for(&dir);
        let before = state.routers.wxpusher.snapshot();

        let result = reload_config(State(state.clone())).await;

        assert!(result.is_err());
        let after = state.routers.wxpusher.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
    }
}
