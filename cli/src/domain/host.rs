//! Host file locations and the pure renderers for their contents.

use std::fmt::Write as _;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use nodeboot_common::DnsSettings;

/// NetworkManager drop-in that stops it from managing `/etc/resolv.conf`.
pub const NM_DNS_CONF: &str = "[main]\ndns=none\n";

/// Every host path the bootstrap reads or mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    pub resolv_conf: PathBuf,
    pub hosts: PathBuf,
    pub nm_conf_dir: PathBuf,
    pub nm_dns_conf: PathBuf,
    pub ca_anchor_dir: PathBuf,
    pub ca_anchor: PathBuf,
    pub os_release: PathBuf,
    pub system_release_cpe: PathBuf,
    pub agent_log: PathBuf,
}

impl HostPaths {
    /// Paths on the running system.
    #[must_use]
    pub fn system() -> Self {
        Self::rooted(Path::new("/"))
    }

    /// The same layout relocated under `root`.
    #[must_use]
    pub fn rooted(root: &Path) -> Self {
        let at = |p: &str| root.join(p.trim_start_matches('/'));
        let nm_conf_dir = at("/etc/NetworkManager/conf.d");
        let ca_anchor_dir = at("/etc/pki/ca-trust/source/anchors");
        Self {
            resolv_conf: at("/etc/resolv.conf"),
            hosts: at("/etc/hosts"),
            nm_dns_conf: nm_conf_dir.join("dns.conf"),
            nm_conf_dir,
            ca_anchor: ca_anchor_dir.join("nodeboot-installer-ca.pem"),
            ca_anchor_dir,
            os_release: at("/etc/os-release"),
            system_release_cpe: at("/etc/system-release-cpe"),
            agent_log: at("/tmp/puppet_bootstrap.log"),
        }
    }
}

impl Default for HostPaths {
    fn default() -> Self {
        Self::system()
    }
}

/// Render `/etc/resolv.conf` from the DNS override settings.
#[must_use]
pub fn render_resolv_conf(dns: &DnsSettings) -> String {
    let mut out = String::from("# Generated by nodeboot\n");
    if let Some(search) = dns.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "search {}", search.trim());
    }
    if !dns.options.is_empty() {
        let _ = writeln!(out, "options {}", dns.options.join(" "));
    }
    for nameserver in &dns.nameservers {
        let _ = writeln!(out, "nameserver {nameserver}");
    }
    out
}

/// First label of a hostname: `ip-10-0-0-5` for `ip-10-0-0-5.ec2.internal`.
#[must_use]
pub fn short_hostname(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or(hostname)
}

/// Fully-qualified name from the short hostname and the configured domain.
#[must_use]
pub fn fqdn(hostname: &str, domain: &str) -> String {
    format!("{}.{}", short_hostname(hostname), domain.trim_matches('.'))
}

/// Host table line mapping `hostname` to `ip`.
#[must_use]
pub fn hosts_entry(ip: IpAddr, hostname: &str) -> String {
    format!("{ip}\t{hostname}")
}

/// `existing` with `entry` appended, or `None` if the mapping is already present.
#[must_use]
pub fn append_hosts_entry(existing: &str, entry: &str) -> Option<String> {
    let wanted: Vec<&str> = entry.split_whitespace().collect();
    let present = existing
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .any(|line| line.split_whitespace().collect::<Vec<_>>() == wanted);
    if present {
        return None;
    }
    let mut out = existing.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(entry);
    out.push('\n');
    Some(out)
}

/// Lowercase hex encoding.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
