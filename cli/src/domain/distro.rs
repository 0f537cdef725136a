//! Package-repository version selection from OS release metadata.
//!
//! Pure parsing only; the application layer reads the files.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::BootstrapError;

/// Leading integer of an os-release `VERSION_ID`, e.g. `8` in `"8.9"`.
static MAJOR_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^\s*(\d+)").expect("valid regex")
});

/// Repository major version, e.g. `7` selects `el-7` packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionToken(pub u32);

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amazon Linux 2 is EL7-compatible.
pub const AMAZON_LINUX_2: VersionToken = VersionToken(7);
/// The original Amazon Linux AMI is EL6-compatible.
pub const AMAZON_LINUX_1: VersionToken = VersionToken(6);

/// The fields of `/etc/os-release` the detector looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: String,
    pub name: String,
    pub version_id: Option<String>,
}

impl OsRelease {
    /// Parse `KEY=value` lines, ignoring comments and unknown keys.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut release = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim());
            match key.trim() {
                "ID" => release.id = value.to_string(),
                "NAME" => release.name = value.to_string(),
                "VERSION_ID" => release.version_id = Some(value.to_string()),
                _ => {}
            }
        }
        release
    }

    /// Vendor string used for classification, lowercased.
    #[must_use]
    pub fn vendor(&self) -> String {
        format!("{} {}", self.id, self.name).to_lowercase()
    }

    /// Amazon Linux needs the release CPE to tell its generations apart.
    #[must_use]
    pub fn is_amazon(&self) -> bool {
        let vendor = self.vendor();
        vendor.contains("amzn") || vendor.contains("amazon")
    }

    /// Major component of `VERSION_ID`.
    ///
    /// # Errors
    ///
    /// Returns an error if `VERSION_ID` is missing or does not start with a number.
    pub fn major_version(&self) -> Result<VersionToken, BootstrapError> {
        let version = self
            .version_id
            .as_deref()
            .ok_or_else(|| BootstrapError::UnknownDistro("VERSION_ID missing".to_string()))?;
        MAJOR_VERSION_RE
            .captures(version)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .map(VersionToken)
            .ok_or_else(|| {
                BootstrapError::UnknownDistro(format!("unparseable VERSION_ID {version:?}"))
            })
    }
}

/// Amazon Linux generation from `/etc/system-release-cpe`.
#[must_use]
pub fn amazon_version(cpe: &str) -> VersionToken {
    if cpe.trim().ends_with(":2") {
        AMAZON_LINUX_2
    } else {
        AMAZON_LINUX_1
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}
