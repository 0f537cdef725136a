//! Distribution version detection from the host's release files.

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::HostFs;
use crate::domain::distro::amazon_version;
use crate::domain::{HostPaths, OsRelease, VersionToken};

/// Version token used to pick the agent repository package.
///
/// # Errors
///
/// Returns an error naming the file when a release file is missing or its
/// version cannot be parsed.
pub fn detect_version(fs: &impl HostFs, paths: &HostPaths) -> Result<VersionToken> {
    let os_release = fs
        .read_to_string(&paths.os_release)
        .with_context(|| format!("failed to read {}", paths.os_release.display()))?;
    let release = OsRelease::parse(&os_release);
    debug!(vendor = %release.vendor(), "detected vendor");

    let version = if release.is_amazon() {
        let cpe = fs
            .read_to_string(&paths.system_release_cpe)
            .with_context(|| format!("failed to read {}", paths.system_release_cpe.display()))?;
        amazon_version(&cpe)
    } else {
        release
            .major_version()
            .with_context(|| format!("in {}", paths.os_release.display()))?
    };
    debug!(%version, "distribution version token");
    Ok(version)
}
