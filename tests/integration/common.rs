//! Shared helpers for running the binary against an isolated site.

use assert_cmd::Command;
use cse_manifest::test_utils::{CLUSTER_TOML, SITE_TOML};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding a site fixture, cluster settings and an
/// (initially absent) configuration file.
pub struct TestSite {
    temp: TempDir,
}

impl TestSite {
    /// A site populated with the sample fixture and cluster settings.
    pub fn new() -> Self {
        let site = Self {
            temp: TempDir::new().unwrap(),
        };
        site.write("site.toml", SITE_TOML);
        site.write("cluster.toml", CLUSTER_TOML);
        site
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Replace the cluster settings with `settings` appended to the sample.
    pub fn extend_cluster(&self, settings: &str) {
        // Top-level keys must precede the sample's tables
        self.write("cluster.toml", &format!("{settings}\n{CLUSTER_TOML}"));
    }

    /// The binary, isolated from the user's configuration and colours.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("cse-manifest").unwrap();
        cmd.current_dir(self.path())
            .env("CSE_CONFIG_PATH", self.file("config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `cse-manifest render` with the sample inputs and `extra` arguments.
    pub fn render(&self, extra: &[&str]) -> Command {
        let mut cmd = self.command();
        cmd.arg("render")
            .arg("--settings")
            .arg(self.file("cluster.toml"))
            .arg("--fixture")
            .arg(self.file("site.toml"))
            .args(extra);
        cmd
    }
}
