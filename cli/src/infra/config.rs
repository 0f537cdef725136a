//! Loads the provisioning context from its YAML file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nodeboot_common::ProvisioningContext;

/// Environment variable overriding the provisioning file location.
pub const CONFIG_ENV: &str = "NODEBOOT_CONFIG";

/// Where the image build drops the templated provisioning file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/nodeboot/bootstrap.yaml";

/// Resolve the provisioning file: explicit path, then `NODEBOOT_CONFIG`,
/// then the default location.
#[must_use]
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(CONFIG_ENV) {
        Ok(val) if !val.is_empty() => PathBuf::from(val),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

/// Parse and validate a provisioning file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML for the
/// schema (unknown keys included), or fails validation.
pub fn load_context(path: &Path) -> Result<ProvisioningContext> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    parse_context(&content).with_context(|| format!("invalid provisioning file {}", path.display()))
}

/// Parse and validate provisioning YAML.
///
/// # Errors
///
/// Returns an error if the YAML does not match the schema or fails validation.
pub fn parse_context(content: &str) -> Result<ProvisioningContext> {
    let context: ProvisioningContext = serde_yaml::from_str(content).context("cannot parse YAML")?;
    context.validate()?;
    Ok(context)
}
