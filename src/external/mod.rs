//! External collaborators: the shared HTTP client used for push API calls.

pub mod client;
