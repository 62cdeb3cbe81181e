//! Data transfer objects for the HTTP API.

pub mod error;
pub mod run;

pub use error::ErrorResponse;
pub use run::{ReloadResponse, RunResponse};
