//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the global flags, so a new cross-cutting
//! concern means one field here rather than new parameters on every command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use nodeboot_common::ProvisioningContext;

use crate::domain::HostPaths;
use crate::infra::config::{config_path, load_context};
use crate::output::OutputContext;

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    /// Explicit provisioning file, overriding `NODEBOOT_CONFIG`.
    pub config: Option<PathBuf>,
    /// Relocate every host path under this directory.
    pub root: Option<PathBuf>,
}

pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Resolved provisioning file location.
    pub config_path: PathBuf,
    /// Host files the bootstrap reads and mutates.
    pub paths: HostPaths,
}

impl AppContext {
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let paths = flags
            .root
            .as_deref()
            .map_or_else(HostPaths::system, HostPaths::rooted);
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config_path: config_path(flags.config.as_deref()),
            paths,
        }
    }

    /// Load and validate the provisioning context.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, malformed, or invalid.
    pub fn load_context(&self) -> Result<ProvisioningContext> {
        load_context(&self.config_path)
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
