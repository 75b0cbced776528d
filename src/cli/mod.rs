//! Command-line interface for cse-manifest.
//!
//! # Commands
//!
//! - `versions` - Resolve a template OVA name into its component versions
//! - `render` - Build and render a cluster manifest against a site fixture
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging
//! - `--quiet` / `-q`: errors only
//! - `--config` / `-c`: configuration file (default `~/.cse/config.toml`)
//!
//! Logs go to stderr so the rendered manifest on stdout can be piped.
//!
//! # Examples
//!
//! ```bash
//! cse-manifest versions ubuntu-2004-kube-v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8
//! cse-manifest render --settings cluster.toml --fixture site.toml --payload
//! ```

mod render;
mod versions;

pub use render::RenderCommand;
pub use versions::{OutputFormat, VersionsCommand};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::CseConfig;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter directive. `None` defers to `RUST_LOG`, then `info`.
    pub log_level: Option<String>,
    /// Configuration file to load instead of the default location.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the stderr tracing subscriber. Later calls are ignored.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init();
    }
}

/// Cluster manifest synthesis for VCD Container Service Extension.
#[derive(Parser, Debug)]
#[command(
    name = "cse-manifest",
    about = "Render CSE Kubernetes cluster manifests",
    version,
    long_about = "Resolves Kubernetes template versions and renders the Cluster API manifest CSE embeds in a cluster entity."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a Kubernetes template OVA name into component versions
    Versions(VersionsCommand),

    /// Render the cluster manifest for a settings file
    Render(RenderCommand),
}

impl Cli {
    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns the command's error; `main` reports it through
    /// [`crate::core::user_friendly_error`].
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run with an explicit [`CliConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the command fails.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let cse_config = CseConfig::load_with_optional(config.config_path.clone())?;
        cse_config.install_compatibility_table()?;

        match self.command {
            Commands::Versions(cmd) => cmd.execute(),
            Commands::Render(cmd) => cmd.execute(&cse_config),
        }
    }
}
