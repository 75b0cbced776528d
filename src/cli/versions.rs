//! `cse-manifest versions`: show what a template OVA name resolves to.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;

use crate::version::{VersionBundle, VersionResolver};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Resolve a template name against the active compatibility table.
#[derive(Args, Debug)]
pub struct VersionsCommand {
    /// Kubernetes template OVA name
    pub template: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl VersionsCommand {
    /// # Errors
    ///
    /// Returns the resolver's error for unsupported or unknown templates.
    pub fn execute(self) -> Result<()> {
        let bundle = VersionResolver::default().resolve(&self.template)?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bundle)?),
            OutputFormat::Text => print_bundle(&bundle),
        }
        Ok(())
    }
}

fn print_bundle(bundle: &VersionBundle) {
    for (label, value) in [
        ("Kubernetes", &bundle.kubernetes_version),
        ("TKG", &bundle.tkg_version),
        ("TKr", &bundle.tkr_version),
        ("etcd", &bundle.etcd_version),
        ("CoreDNS", &bundle.core_dns_version),
    ] {
        println!("{} {}", format!("{label:<11}").bold(), value);
    }
}
