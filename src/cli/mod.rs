//! Command-line interface.

pub mod parser;

pub use parser::{Cli, Commands, load_settings};
