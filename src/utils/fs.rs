//! File reading helpers for settings, fixtures, token files and tables.
//!
//! All readers attach the file path to their error so the CLI can report
//! which input was broken.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads a text file with proper error handling and context.
///
/// # Errors
/// Returns an error with context if the file cannot be read
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Reads and parses a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed
pub fn read_json_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from file: {}", path.display()))
}

/// Reads and parses a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed
pub fn read_toml_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Reads and parses a YAML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed
pub fn read_yaml_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML from file: {}", path.display()))
}

/// Reads a structured document, choosing the format from the file extension.
///
/// `.yaml`/`.yml` are parsed as YAML, `.json` as JSON, anything else as TOML.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed
pub fn read_structured_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => read_yaml_file(path),
        Some("json") => read_json_file(path),
        _ => read_toml_file(path),
    }
}

/// Expand `~/` and environment variables in a user-supplied path.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or a
/// referenced environment variable is not set
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).map_err(|e| anyhow!("Invalid path '{path}': {e}"))?;

    Ok(PathBuf::from(expanded.as_ref()))
}
