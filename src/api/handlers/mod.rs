//! HTTP request handlers.

pub mod config;
pub mod forms;
pub mod health;
pub mod run;
