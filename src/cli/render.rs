//! `cse-manifest render`: build a context from a site fixture and render
//! the manifest or the full cluster entity.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::builder::ClusterDefinitionBuilder;
use crate::collaborators::{ApiTokenFile, Collaborators, Fixture};
use crate::config::CseConfig;
use crate::settings::ClusterSettings;
use crate::templating::{ManifestRenderer, render_entity};

#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Cluster settings file (TOML, YAML or JSON)
    #[arg(long)]
    pub settings: PathBuf,

    /// Site fixture answering directory, naming and backend lookups
    #[arg(long)]
    pub fixture: PathBuf,

    /// API token file; overrides the settings' `api_token_file` and the fixture's token
    #[arg(long)]
    pub token_file: Option<String>,

    /// Print the CAPVCD cluster entity instead of the encoded manifest
    #[arg(long, conflicts_with = "yaml")]
    pub payload: bool,

    /// Print the manifest as plain YAML instead of a JSON string body
    #[arg(long)]
    pub yaml: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    /// # Errors
    ///
    /// Returns an error if an input file cannot be loaded, the build fails,
    /// or rendering fails.
    pub fn execute(self, config: &CseConfig) -> Result<()> {
        let mut settings = ClusterSettings::load(&self.settings)?;
        settings.fill_defaults(&config.defaults);
        let fixture = Fixture::load(&self.fixture)?;

        if let (Some(flag), Some(configured)) = (&self.token_file, &settings.api_token_file) {
            tracing::warn!("--token-file {} overrides api_token_file {} from the settings", flag, configured);
        }
        let token_file = match self.token_file.as_deref().or(settings.api_token_file.as_deref()) {
            Some(path) => Some(ApiTokenFile::new(path)?),
            None => None,
        };

        let mut collaborators = Collaborators::from_backend(&fixture);
        if let Some(token_file) = &token_file {
            tracing::debug!("Using API token file {}", token_file.path().display());
            collaborators = collaborators.with_credentials(token_file);
        }

        let context = ClusterDefinitionBuilder::new(collaborators)
            .with_rde_type(config.rde.clone())
            .build(&settings)
            .with_context(|| format!("Failed to build cluster '{}'", settings.name))?;

        let renderer = ManifestRenderer::new();
        let output = if self.payload {
            render_entity(&renderer, &context, &settings)?
        } else if self.yaml {
            renderer.render_yaml(&context, &settings)?
        } else {
            renderer.render(&context, &settings)?
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, &output)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("{} {}", "Wrote".green(), path.display());
            }
            None => println!("{output}"),
        }
        Ok(())
    }
}
