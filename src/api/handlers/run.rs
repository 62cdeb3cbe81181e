//! On-demand test-message trigger.
//!
//! Lets an operator verify the WxPusher path end to end without waiting for
//! a real event: a forced test message is driven through the full pipeline
//! synchronously and the outcome is reported in the response body.

use axum::{Router, extract::State, response::Json, routing::get};

use crate::api::doc::TRIGGER_TAG;
use crate::api::dto::RunResponse;
use crate::events::NoticeMessage;
use crate::state::AppState;

/// Creates the trigger route.
///
/// # Routes
/// - `GET /run` - Send a test message through the WxPusher router
pub fn run_routes() -> Router<AppState> {
    Router::new().route("/run", get(run_test_message))
}

/// Send a forced test message through the WxPusher router.
///
/// The HTTP status is always 200; the body `code` carries the result:
/// 0 on success (including "nothing to send"), 500 on any dispatch failure
/// or when the router is disabled.
#[utoipa::path(
    get,
    path = "/api/run",
    responses(
        (status = 200, description = "Trigger result", body = RunResponse)
    ),
    tag = TRIGGER_TAG
)]
pub async fn run_test_message(State(state): State<AppState>) -> Json<RunResponse> {
    let router = &state.routers.wxpusher;

    if !router.state() {
        return Json(RunResponse::error(
            "WxPusher router is disabled or not configured",
        ));
    }

    let outcomes = router.handle(&NoticeMessage::test_message()).await;

    if outcomes.is_empty() {
        return Json(RunResponse::ok("No recipients resolved, nothing sent"));
    }

    match outcomes.iter().find(|o| !o.success) {
        Some(failed) => Json(RunResponse::error(format!(
            "Test message failed for {}: {}",
            failed.target,
            failed.message.as_deref().unwrap_or("unknown error")
        ))),
        None => Json(RunResponse::ok("Test message sent")),
    }
}
