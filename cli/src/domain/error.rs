//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::fmt;

use thiserror::Error;

/// Classification of a fatal bootstrap failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A network service stayed unreachable for the whole retry budget.
    TransientNetwork,
    /// 404-class: configuration or identity error, never retried.
    NotFound,
    /// Credential error, never retried.
    Auth,
    /// A local command exhausted its retry budget.
    Command,
    /// The remote service returned a structured application error.
    Application,
    /// The provisioning file or local release metadata could not be interpreted.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TransientNetwork => "transient-network",
            Self::NotFound => "not-found",
            Self::Auth => "auth",
            Self::Command => "command",
            Self::Application => "application",
            Self::Config => "config",
        })
    }
}

// ── Bootstrap errors ──────────────────────────────────────────────────────────

/// Fatal conditions that abort the bootstrap.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("metadata path {path} not found")]
    MetadataNotFound { path: String },

    #[error("unable to communicate with metadata service at {url}: {reason}")]
    MetadataUnreachable { url: String, reason: String },

    #[error("unable to read metadata path {path} (HTTP {status})")]
    MetadataUnreadable { path: String, status: u16 },

    #[error("invalid webservice credentials")]
    InvalidCredentials,

    #[error("invalid webservice configuration: {url} not found")]
    InvalidWebserviceConfig { url: String },

    #[error("unable to communicate with webservice at {url}: {reason}")]
    WebserviceUnreachable { url: String, reason: String },

    #[error("webservice error: msg=[{0}]")]
    Webservice(String),

    #[error("webservice internal error (HTTP {0})")]
    WebserviceInternal(u16),

    #[error("package install failed: {0}")]
    PackageInstall(String),

    #[error("`{command}` failed with exit code {exit_code} after {retries} retries")]
    CommandExhausted {
        command: String,
        exit_code: i32,
        retries: u32,
    },

    #[error("cannot determine OS version: {0}")]
    UnknownDistro(String),
}

impl BootstrapError {
    /// Map the error onto the failure taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MetadataUnreachable { .. } | Self::WebserviceUnreachable { .. } => {
                ErrorKind::TransientNetwork
            }
            Self::MetadataNotFound { .. } | Self::InvalidWebserviceConfig { .. } => {
                ErrorKind::NotFound
            }
            Self::InvalidCredentials => ErrorKind::Auth,
            Self::PackageInstall(_) | Self::CommandExhausted { .. } => ErrorKind::Command,
            Self::MetadataUnreadable { .. }
            | Self::Webservice(_)
            | Self::WebserviceInternal(_) => ErrorKind::Application,
            Self::UnknownDistro(_) => ErrorKind::Config,
        }
    }
}
