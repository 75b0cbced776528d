//! API token credential sources.
//!
//! CSE clusters authenticate back to VCD with an API token. The token is
//! normally stored in the JSON file VCD produces when a token is created:
//!
//! ```json
//! {
//!   "token_type": "API Token",
//!   "refresh_token": "Pkn0dP2C6bJGBD6t5vnYeaThoGk3W2Ua",
//!   "updated_by": "terraform-provider-vcd/...",
//!   "updated_on": "2023-11-27T14:39:59+01:00"
//! }
//! ```

use anyhow::{Result, bail};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::CredentialSource;
use crate::utils::{expand_path, read_json_file};

/// Token types VCD writes into token files.
const ACCEPTED_TOKEN_TYPES: &[&str] = &["API Token", "Service Account"];

#[derive(Debug, Deserialize)]
struct TokenFileContents {
    token_type: String,
    refresh_token: String,
}

/// Reads the API token from a VCD token file.
#[derive(Debug, Clone)]
pub struct ApiTokenFile {
    path: PathBuf,
}

impl ApiTokenFile {
    /// Create a source for `path`, expanding `~/` and environment variables.
    ///
    /// # Errors
    /// Returns an error if the path cannot be expanded
    pub fn new(path: &str) -> Result<Self> {
        Ok(Self {
            path: expand_path(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSource for ApiTokenFile {
    fn api_token(&self) -> Result<String> {
        let contents: TokenFileContents = read_json_file(&self.path)?;

        if !ACCEPTED_TOKEN_TYPES.contains(&contents.token_type.as_str()) {
            bail!(
                "token file {} has token_type '{}', expected one of {:?}",
                self.path.display(),
                contents.token_type,
                ACCEPTED_TOKEN_TYPES
            );
        }
        if contents.refresh_token.trim().is_empty() {
            bail!("token file {} has an empty refresh_token", self.path.display());
        }

        tracing::debug!("Read API token from {}", self.path.display());
        Ok(contents.refresh_token)
    }
}

/// An API token supplied directly by the caller.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

impl CredentialSource for StaticToken {
    fn api_token(&self) -> Result<String> {
        if self.0.is_empty() {
            bail!("the API token is empty");
        }
        Ok(self.0.clone())
    }
}
