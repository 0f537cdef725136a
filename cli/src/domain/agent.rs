//! Puppet agent package names, repository URL, and invocation.

use std::path::Path;

use nodeboot_common::AgentSettings;

use crate::domain::VersionToken;

/// Vendor repository definition package.
pub const REPO_PACKAGE: &str = "puppet5-release";

/// The agent itself.
pub const AGENT_PACKAGE: &str = "puppet-agent";

/// Needed by the agent's own install path.
pub const VCS_PACKAGE: &str = "git";

pub const PUPPET_BIN: &str = "/opt/puppetlabs/bin/puppet";

/// With `--detailed-exitcodes`: 0 = no changes needed, 2 = changes applied.
pub const ACCEPTED_EXIT_CODES: &[i32] = &[0, 2];

/// Repository package URL for an EL major version.
#[must_use]
pub fn repo_url(version: VersionToken) -> String {
    format!("http://yum.puppetlabs.com/puppet5/{REPO_PACKAGE}-el-{version}.noarch.rpm")
}

/// Arguments for a single foreground agent run against `server`.
#[must_use]
pub fn agent_args(server: &str, settings: &AgentSettings, logdest: &Path) -> Vec<String> {
    vec![
        "agent".to_string(),
        "--onetime".to_string(),
        "--no-daemonize".to_string(),
        "--detailed-exitcodes".to_string(),
        "--splay".to_string(),
        "--splaylimit".to_string(),
        settings.splay_limit.to_string(),
        "--waitforcert".to_string(),
        settings.wait_for_cert.to_string(),
        "--server".to_string(),
        server.to_string(),
        "--logdest".to_string(),
        logdest.display().to_string(),
    ]
}
