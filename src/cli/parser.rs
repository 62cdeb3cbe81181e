//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ConfigLoader, Settings};
use crate::error::AppResult;

/// A notification forwarding service for Bark and WxPusher
#[derive(Parser, Debug)]
#[command(name = "pushrelay")]
#[command(about = "A notification forwarding service for Bark and WxPusher")]
#[command(long_about = "
Pushrelay forwards notice messages to Bark and WxPusher push providers,
resolving configured usernames to device keys or UIDs and exposing a small
HTTP API for health checks, configuration reload and test triggers.

EXAMPLES:
    # Start the server with layered configuration from ./config
    pushrelay serve

    # Start server on custom host and port
    pushrelay serve --host 0.0.0.0 --port 8080

    # Use a single configuration file
    pushrelay --config /etc/pushrelay/production.toml serve

    # Check configuration without starting the server
    pushrelay serve --dry-run
")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Specify a single TOML configuration file to use instead of layered
    /// loading from the configuration directory.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    ///
    /// Raises log output to debug level. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only. Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    Serve {
        /// Host address to bind to
        ///
        /// Default: taken from configuration (127.0.0.1)
        #[arg(long, value_name = "ADDRESS")]
        host: Option<String>,

        /// Port number to listen on
        ///
        /// Default: taken from configuration (3000)
        #[arg(short, long, value_name = "PORT")]
        port: Option<u16>,

        /// Validate configuration and exit
        ///
        /// Performs a complete configuration load and validation without
        /// starting the server. Returns exit code 0 if valid.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Load settings honoring the `--config` flag and global log flags.
///
/// A `--config` path pins the loader to that single file; otherwise layered
/// loading from the configuration directory applies. The `--verbose` and
/// `--quiet` flags override the configured log level.
pub fn load_settings(cli: &Cli) -> AppResult<Settings> {
    let loader = build_loader(cli)?;
    let mut settings = loader.load()?;

    if cli.verbose {
        settings.logger.level = "debug".to_string();
    } else if cli.quiet {
        settings.logger.level = "error".to_string();
    }

    if let Some(Commands::Serve { host, port, .. }) = &cli.command {
        if let Some(host) = host {
            settings.server.host = host.clone();
        }
        if let Some(port) = port {
            settings.server.port = *port;
        }
    }

    Ok(settings)
}

/// Build the loader matching the CLI flags.
pub fn build_loader(cli: &Cli) -> AppResult<ConfigLoader> {
    match &cli.config {
        Some(path) => Ok(ConfigLoader::from_file(path.clone())),
        None => Ok(ConfigLoader::new()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn cli_with_config(path: PathBuf) -> Cli {
        Cli {
            command: None,
            config: Some(path),
            verbose: false,
            quiet: false,
        }
    }

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("app.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_cli_parses_serve_command() {
        let cli = Cli::parse_from(["pushrelay", "serve", "--port", "8080", "--dry-run"]);
        match cli.command {
            Some(Commands::Serve { port, dry_run, .. }) => {
                assert_eq!(port, Some(8080));
                assert!(dry_run);
            }
            _ => panic!("expected the serve command"),
        }
    }

    #[test]
    fn test_verbose_overrides_configured_level() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[logger]\nlevel = \"warn\"\n");

        let mut cli = cli_with_config(path);
        cli.verbose = true;

        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.logger.level, "debug");
    }

    #[test]
    fn test_serve_flags_override_server_settings() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[server]\nport = 3000\n");

        let mut cli = cli_with_config(path);
        cli.command = Some(Commands::Serve {
            host: Some("0.0.0.0".to_string()),
            port: Some(9000),
            dry_run: false,
        });

        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9000);
    }
}
