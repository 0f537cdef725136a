//! Detect-distro command.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::distro::detect_version;
use crate::infra::fs::StdFs;

/// Print the package repository version token, e.g. `7`.
///
/// # Errors
///
/// Returns an error if the release files are missing or unparseable.
pub fn run(app: &AppContext) -> Result<()> {
    let version = detect_version(&StdFs, &app.paths)?;
    println!("{version}");
    Ok(())
}
