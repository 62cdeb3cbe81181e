//! Trigger and reload response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body of the on-demand test-message trigger.
///
/// `code` is 0 on success and 500 on failure, mirroring the convention of
/// the host application that polls this endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RunResponse {
    pub code: i32,
    pub msg: String,
}

impl RunResponse {
    /// A successful trigger result.
    pub fn ok(msg: impl Into<String>) -> Self {
        Self {
            code: 0,
            msg: msg.into(),
        }
    }

    /// A failed trigger result.
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            code: 500,
            msg: msg.into(),
        }
    }
}

/// Response body of the configuration reload endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReloadResponse {
    pub success: bool,
    pub message: String,
    /// Operational state of each router after the reload
    pub bark_enabled: bool,
    pub wxpusher_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_response_codes() {
        assert_eq!(RunResponse::ok("sent").code, 0);
        assert_eq!(RunResponse::error("boom").code, 500);
    }
}
