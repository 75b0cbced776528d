//! Error handling for cse-manifest
//!
//! This module provides the error taxonomy for manifest synthesis and the
//! user-friendly error reporting used by the CLI. The error system is designed
//! around two core principles:
//! 1. **Strongly-typed errors** so callers can match on the exact failure
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`CseError`] - Enumerated error types for every failure in a build or render
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! # Error Categories
//!
//! - **Template names**: [`CseError::UnsupportedBaseOs`], [`CseError::NotAKubernetesTemplate`],
//!   [`CseError::UnsupportedVersionCombination`]
//! - **Collaborators**: [`CseError::ExternalLookupFailure`], [`CseError::CollaboratorFailure`],
//!   [`CseError::CredentialFailure`], [`CseError::MalformedBackendConfig`]
//! - **Rendering**: [`CseError::TemplateExecutionFailure`], [`CseError::EncodingFailure`]
//! - **Inputs and configuration**: [`CseError::InvalidSettings`], [`CseError::CompatibilityTable`],
//!   [`CseError::ConfigError`], [`CseError::IoError`]
//!
//! Every variant carries enough context to identify the offending field or ID.
//! None of them is retried: a failed build never yields a partial manifest.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cse_manifest::core::{CseError, user_friendly_error};
//!
//! let error = CseError::NotAKubernetesTemplate {
//!     template: "randomOVA".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display(); // Shows coloured error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for manifest synthesis.
///
/// Variants are grouped by the stage that raises them: template name
/// resolution, collaborator lookups, rendering, and input/configuration
/// handling.
#[derive(Error, Debug)]
pub enum CseError {
    /// The template name indicates a base operating system that CSE cannot run.
    #[error("the Kubernetes template OVA '{template}' uses Photon, and it is not supported")]
    UnsupportedBaseOs {
        /// The offending template name
        template: String,
    },

    /// The template name does not carry the `kube-` marker.
    #[error("the OVA '{template}' is not a Kubernetes template OVA")]
    NotAKubernetesTemplate {
        /// The offending template name
        template: String,
    },

    /// The composite version key is not present in the compatibility table.
    #[error("the Kubernetes OVA '{template}' is not supported: version '{key}' has no known TKG combination")]
    UnsupportedVersionCombination {
        /// The full template name
        template: String,
        /// The composite key extracted from the template name
        key: String,
    },

    /// A resource-naming collaborator call failed.
    ///
    /// # Fields
    /// - `field`: Logical field that required the name (e.g. "control plane storage profile")
    /// - `id`: The opaque identifier that could not be resolved
    /// - `reason`: The collaborator's error message
    #[error("could not retrieve the {field} with ID '{id}': {reason}")]
    ExternalLookupFailure {
        /// Logical field that required the name
        field: String,
        /// The identifier being resolved
        id: String,
        /// The collaborator's error message
        reason: String,
    },

    /// A directory, session or RDE type lookup failed.
    #[error("could not retrieve the {what} with ID '{id}': {reason}")]
    CollaboratorFailure {
        /// What was being looked up (organization, VDC, network...)
        what: String,
        /// The identifier being resolved
        id: String,
        /// The collaborator's error message
        reason: String,
    },

    /// The API token or the session identity could not be resolved.
    #[error("could not resolve credentials: {reason}")]
    CredentialFailure {
        /// Why the credential source failed
        reason: String,
    },

    /// The backend's singleton configuration entity does not match the schema.
    #[error("the backend configuration entity is malformed: {reason}")]
    MalformedBackendConfig {
        /// Why decoding failed
        reason: String,
    },

    /// The substitution data did not satisfy the template.
    #[error("could not render template '{template}': {reason}")]
    TemplateExecutionFailure {
        /// Name the template was registered under
        template: String,
        /// Tera's error chain
        reason: String,
    },

    /// The rendered manifest could not be encoded as a JSON string.
    #[error("could not encode the rendered manifest: {reason}")]
    EncodingFailure {
        /// The encoder's error message
        reason: String,
    },

    /// The user-supplied cluster settings are invalid.
    #[error("invalid cluster settings for '{field}': {reason}")]
    InvalidSettings {
        /// The setting that failed validation
        field: String,
        /// Why it failed
        reason: String,
    },

    /// The compatibility table could not be loaded.
    #[error("invalid compatibility table {source_name}: {reason}")]
    CompatibilityTable {
        /// Where the table was loaded from
        source_name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Clone for CseError {
    fn clone(&self) -> Self {
        match self {
            Self::UnsupportedBaseOs {
                template,
            } => Self::UnsupportedBaseOs {
                template: template.clone(),
            },
            Self::NotAKubernetesTemplate {
                template,
            } => Self::NotAKubernetesTemplate {
                template: template.clone(),
            },
            Self::UnsupportedVersionCombination {
                template,
                key,
            } => Self::UnsupportedVersionCombination {
                template: template.clone(),
                key: key.clone(),
            },
            Self::ExternalLookupFailure {
                field,
                id,
                reason,
            } => Self::ExternalLookupFailure {
                field: field.clone(),
                id: id.clone(),
                reason: reason.clone(),
            },
            Self::CollaboratorFailure {
                what,
                id,
                reason,
            } => Self::CollaboratorFailure {
                what: what.clone(),
                id: id.clone(),
                reason: reason.clone(),
            },
            Self::CredentialFailure {
                reason,
            } => Self::CredentialFailure {
                reason: reason.clone(),
            },
            Self::MalformedBackendConfig {
                reason,
            } => Self::MalformedBackendConfig {
                reason: reason.clone(),
            },
            Self::TemplateExecutionFailure {
                template,
                reason,
            } => Self::TemplateExecutionFailure {
                template: template.clone(),
                reason: reason.clone(),
            },
            Self::EncodingFailure {
                reason,
            } => Self::EncodingFailure {
                reason: reason.clone(),
            },
            Self::InvalidSettings {
                field,
                reason,
            } => Self::InvalidSettings {
                field: field.clone(),
                reason: reason.clone(),
            },
            Self::CompatibilityTable {
                source_name,
                reason,
            } => Self::CompatibilityTable {
                source_name: source_name.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // io::Error is not Clone; keep kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`CseError`] and adds optional details and a
/// suggestion for resolution. When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context in yellow (optional)
/// 3. **Suggestion**: Actionable steps in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: CseError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: CseError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognises [`CseError`] anywhere in the chain (so `anyhow` context layers
/// added by the CLI do not hide it), [`std::io::Error`] and
/// [`toml::de::Error`]. Anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(cse_error) = error.chain().find_map(|e| e.downcast_ref::<CseError>()) {
        return create_error_context(cse_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(CseError::IoError(std::io::Error::new(
                io_error.kind(),
                error.to_string(),
            )))
            .with_suggestion("Check that the file exists and the path is correct");
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(CseError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax. Verify quotes, brackets, and indentation");
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(CseError::ConfigError {
        message,
    })
}

/// Map each [`CseError`] variant to a context with tailored suggestions.
fn create_error_context(error: CseError) -> ErrorContext {
    match &error {
        CseError::UnsupportedBaseOs { .. } => ErrorContext::new(error)
            .with_suggestion("Use an Ubuntu based Kubernetes template OVA")
            .with_details("CSE clusters can only be created from Ubuntu node images"),

        CseError::NotAKubernetesTemplate { .. } => ErrorContext::new(error)
            .with_suggestion("Select a vApp template whose name contains 'kube-<version>'")
            .with_details("Kubernetes template OVAs are named like 'ubuntu-2004-kube-v1.26.8+vmware.1-tkg.1-<hash>'"),

        CseError::UnsupportedVersionCombination { key, .. } => {
            let mut context = ErrorContext::new(error.clone()).with_details(
                "The Kubernetes, TKG, etcd and CoreDNS versions are looked up in the compatibility table",
            );
            if let Some(closest) = crate::version::closest_known_key(key) {
                context = context.with_suggestion(format!(
                    "Did you mean a template built from '{closest}'? A replacement table can be set with 'compatibility_table' in the configuration file"
                ));
            } else {
                context = context.with_suggestion(
                    "Add the combination to a replacement table and set 'compatibility_table' in the configuration file",
                );
            }
            context
        }

        CseError::ExternalLookupFailure { field, .. } => {
            let suggestion = format!("Check that the {field} exists and is visible to the current user");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        CseError::MalformedBackendConfig { .. } => ErrorContext::new(error)
            .with_suggestion("Verify the CSE server configuration entity was created by a supported CSE installation")
            .with_details("The configuration entity must contain exactly one profile"),

        CseError::CredentialFailure { .. } => ErrorContext::new(error)
            .with_suggestion("Check the API token file path and its contents"),

        CseError::TemplateExecutionFailure { .. } => ErrorContext::new(error)
            .with_details("Template errors occur when the substitution data is missing a value the cluster template needs"),

        CseError::InvalidSettings { field, .. } => {
            let suggestion = format!("Fix '{field}' in the cluster settings file");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        CseError::ConfigError { .. } | CseError::CompatibilityTable { .. } => {
            ErrorContext::new(error).with_suggestion(
                "Check the configuration file (default ~/.cse/config.toml, or CSE_CONFIG_PATH)",
            )
        }

        _ => ErrorContext::new(error),
    }
}
