use serde::Deserialize;
use std::net::IpAddr;
use thiserror::Error;

/// Port the installer serves its CA certificate on. Not configurable.
pub const CA_PORT: u16 = 8008;

/// Errors raised while validating a loaded [`ProvisioningContext`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("installer hostname must not be empty")]
    EmptyInstallerHostname,

    #[error("installer port must be non-zero")]
    ZeroInstallerPort,

    #[error("DNS override is enabled but no nameservers are configured")]
    NoNameservers,

    #[error("DNS override is enabled but no domain is configured")]
    NoDomain,

    #[error("registration token must not be empty when present")]
    EmptyRegistrationToken,

    #[error("registration token contains characters outside [A-Za-z0-9._-]")]
    InvalidRegistrationToken,
}

/// Everything the bootstrap needs to know about the cluster it is joining.
///
/// Produced once from the templated provisioning file and read-only
/// afterwards; every service borrows it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProvisioningContext {
    /// Installer (control-plane) host.
    pub installer: InstallerEndpoint,

    /// One-time token authorizing node self-registration.
    #[serde(default)]
    pub registration_token: Option<String>,

    /// Name resolution overrides.
    #[serde(default)]
    pub dns: DnsSettings,

    /// Configuration-management agent tuning.
    #[serde(default)]
    pub agent: AgentSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InstallerEndpoint {
    pub hostname: String,
    pub ip_address: IpAddr,
    /// Webservice API port.
    #[serde(default = "default_installer_port")]
    pub port: u16,
}

/// DNS settings applied when `override_dns` is set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DnsSettings {
    #[serde(default, rename = "override")]
    pub override_dns: bool,
    /// Value of the resolver `search` directive.
    #[serde(default)]
    pub search: Option<String>,
    /// Resolver `options` directives, e.g. `timeout:2`.
    #[serde(default)]
    pub options: Vec<String>,
    /// Nameservers in resolution order.
    #[serde(default)]
    pub nameservers: Vec<IpAddr>,
    /// Domain appended to the short hostname to form the FQDN.
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AgentSettings {
    /// Upper bound of the randomized delay before the agent run, in seconds.
    #[serde(default = "default_splay_limit")]
    pub splay_limit: u32,
    /// How long the agent waits for its certificate to be signed, in seconds.
    #[serde(default = "default_wait_for_cert")]
    pub wait_for_cert: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            splay_limit: default_splay_limit(),
            wait_for_cert: default_wait_for_cert(),
        }
    }
}

fn default_installer_port() -> u16 {
    8443
}

fn default_splay_limit() -> u32 {
    10
}

fn default_wait_for_cert() -> u32 {
    120
}

impl ProvisioningContext {
    /// Check the invariants the bootstrap relies on.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.installer.hostname.trim().is_empty() {
            return Err(ContextError::EmptyInstallerHostname);
        }
        if self.installer.port == 0 {
            return Err(ContextError::ZeroInstallerPort);
        }
        if let Some(token) = &self.registration_token {
            if token.is_empty() {
                return Err(ContextError::EmptyRegistrationToken);
            }
            if !token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            {
                return Err(ContextError::InvalidRegistrationToken);
            }
        }
        if self.dns.override_dns {
            if self.dns.nameservers.is_empty() {
                return Err(ContextError::NoNameservers);
            }
            if self.dns.domain.as_deref().is_none_or(|d| d.trim().is_empty()) {
                return Err(ContextError::NoDomain);
            }
        }
        Ok(())
    }

    /// Base URL of the installer webservice, e.g. `https://installer:8443`.
    #[must_use]
    pub fn webservice_base_url(&self) -> String {
        format!("https://{}:{}", self.installer.hostname, self.installer.port)
    }

    /// URL the installer CA certificate is served from.
    #[must_use]
    pub fn ca_url(&self) -> String {
        format!("https://{}:{CA_PORT}/ca.pem", self.installer.hostname)
    }

    /// Node-token registration endpoint, if a token was provisioned.
    #[must_use]
    pub fn registration_url(&self) -> Option<String> {
        self.registration_token
            .as_ref()
            .map(|token| format!("{}/v1/node-token/{token}", self.webservice_base_url()))
    }
}
