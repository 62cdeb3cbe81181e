//! Per-target result of a dispatch attempt.

use serde::{Deserialize, Serialize};

/// Result of sending one message to one recipient identifier (or, for
/// providers with batched APIs, one batched request).
///
/// Ephemeral: produced by the dispatcher, consumed by logging and the
/// on-demand trigger endpoint. Never fed back to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Recipient identifier (or joined identifier list) this outcome covers
    pub target: String,
    /// Whether the provider accepted the message
    pub success: bool,
    /// HTTP status code, when a response was obtained
    pub http_status: Option<u16>,
    /// Provider-level response code, when the body parsed
    pub provider_code: Option<i64>,
    /// Provider message or failure description
    pub message: Option<String>,
}

impl DispatchOutcome {
    /// A successful outcome with provider confirmation.
    pub fn success(target: impl Into<String>, provider_code: i64, message: Option<String>) -> Self {
        Self {
            target: target.into(),
            success: true,
            http_status: Some(200),
            provider_code: Some(provider_code),
            message,
        }
    }

    /// A failed outcome; status and code are filled in as far as known.
    pub fn failure(
        target: impl Into<String>,
        http_status: Option<u16>,
        provider_code: Option<i64>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            success: false,
            http_status,
            provider_code,
            message: Some(message.into()),
        }
    }
}
