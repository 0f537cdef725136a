//! Application service: the first-boot bootstrap use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Steps run strictly in order; any non-optional failure aborts the run and
//! rerunning from scratch is the recovery path.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use nodeboot_common::{NodeIdentity, ProvisioningContext};
use tracing::{info, warn};

use crate::application::ports::{CommandRunner, HostFs, HttpTransport, ProgressReporter};
use crate::application::services::distro::detect_version;
use crate::application::services::executor::{RetryingExecutor, display_command};
use crate::application::services::metadata::MetadataClient;
use crate::application::services::packages::PackageInstaller;
use crate::application::services::registration::RegistrationClient;
use crate::domain::agent::{
    ACCEPTED_EXIT_CODES, AGENT_PACKAGE, PUPPET_BIN, REPO_PACKAGE, VCS_PACKAGE, agent_args,
    repo_url,
};
use crate::domain::host::{
    NM_DNS_CONF, append_hosts_entry, fqdn, hosts_entry, render_resolv_conf,
};
use crate::domain::{Backoff, HostPaths, RegistrationResult, RetryPolicy, VersionToken};

/// Retries for the CA certificate download.
pub const CA_FETCH_RETRIES: u32 = 10;

/// Retries for host service and hostname changes.
pub const HOST_COMMAND_RETRIES: u32 = 3;

/// Bootstrap steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Identity,
    Dns,
    CaTrust,
    Registration,
    Selinux,
    HostsEntry,
    Distro,
    VcsPackage,
    AgentPackages,
    AgentRun,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Dns => "dns",
            Self::CaTrust => "ca-trust",
            Self::Registration => "registration",
            Self::Selinux => "selinux",
            Self::HostsEntry => "hosts-entry",
            Self::Distro => "distro",
            Self::VcsPackage => "vcs-package",
            Self::AgentPackages => "agent-packages",
            Self::AgentRun => "agent-run",
        };
        f.write_str(name)
    }
}

/// What a completed bootstrap did.
#[derive(Debug, Default)]
pub struct BootstrapSummary {
    /// Steps that ran, in order.
    pub completed: Vec<Step>,
    /// Conditional steps that did not apply.
    pub skipped: Vec<Step>,
    /// Hostname reported by the metadata service.
    pub hostname: String,
    /// Set when the DNS override renamed the host.
    pub fqdn: Option<String>,
    /// SHA-256 of the installed installer CA certificate.
    pub ca_fingerprint: Option<String>,
    pub registration: Option<RegistrationResult>,
    pub version: Option<VersionToken>,
    /// Exit code of the accepted agent run.
    pub agent_exit_code: Option<i32>,
}

impl BootstrapSummary {
    fn done(&mut self, step: Step) {
        info!(%step, "step complete");
        self.completed.push(step);
    }

    fn skip(&mut self, step: Step) {
        info!(%step, "step skipped");
        self.skipped.push(step);
    }
}

pub struct BootstrapOptions<'a, P: ProgressReporter> {
    pub context: &'a ProvisioningContext,
    pub paths: &'a HostPaths,
    pub reporter: &'a P,
    pub backoff: &'a Backoff,
}

/// Run the whole bootstrap.
///
/// `metadata_http` talks to the link-local metadata service.
/// `webservice_http` is called once, after step 3 has installed the CA
/// anchor, to build a transport that trusts it; it is not called when no
/// registration token is configured.
///
/// # Errors
///
/// Returns the first fatal step error, with the step named in its context.
pub async fn run_bootstrap<W: HttpTransport>(
    runner: &impl CommandRunner,
    metadata_http: &impl HttpTransport,
    webservice_http: impl FnOnce(&Path) -> Result<W>,
    fs: &impl HostFs,
    opts: BootstrapOptions<'_, impl ProgressReporter>,
) -> Result<BootstrapSummary> {
    let BootstrapOptions {
        context,
        paths,
        reporter,
        backoff,
    } = opts;
    let exec = RetryingExecutor::new(runner, backoff);
    let metadata = MetadataClient::new(metadata_http);
    let mut summary = BootstrapSummary::default();

    reporter.step("fetching instance identity...");
    summary.hostname = metadata
        .fetch("/local-hostname")
        .await
        .context("failed to fetch local hostname")?;
    reporter.success(&format!("hostname {}", summary.hostname));
    summary.done(Step::Identity);

    if context.dns.override_dns {
        reporter.step("configuring name resolution...");
        let name = configure_dns(&exec, fs, context, paths, &summary.hostname)
            .await
            .context("DNS configuration failed")?;
        reporter.success(&format!("hostname set to {name}"));
        summary.fqdn = Some(name);
        summary.done(Step::Dns);
    } else {
        summary.skip(Step::Dns);
    }

    reporter.step("installing installer CA certificate...");
    summary.ca_fingerprint = install_ca(&exec, fs, context, paths, reporter)
        .await
        .context("CA trust setup failed")?;
    reporter.success("installer CA trusted");
    summary.done(Step::CaTrust);

    if let Some(url) = context.registration_url() {
        reporter.step("registering node...");
        let webservice = webservice_http(&paths.ca_anchor)
            .context("cannot set up webservice client")?;
        let identity = NodeIdentity {
            name: summary
                .fqdn
                .clone()
                .unwrap_or_else(|| summary.hostname.clone()),
            instance_id: metadata
                .fetch("/instance-id")
                .await
                .context("failed to fetch instance id")?,
            private_ip: metadata
                .fetch("/local-ipv4")
                .await
                .context("failed to fetch private IP")?,
        };
        let result = RegistrationClient::new(&webservice)
            .register(&identity, &url)
            .await
            .context("node registration failed")?;
        reporter.success(&format!("registered as {}", identity.name));
        summary.registration = Some(result);
        summary.done(Step::Registration);
    } else {
        summary.skip(Step::Registration);
    }

    let selinux = exec
        .run("setenforce", &["permissive"], &[0], &RetryPolicy::once())
        .await;
    if selinux.is_accepted() {
        summary.done(Step::Selinux);
    } else {
        warn!(exit_code = selinux.exit_code, "setenforce permissive failed");
        reporter.warn("could not switch SELinux to permissive mode");
        summary.skip(Step::Selinux);
    }

    add_installer_host(fs, context, paths).context("failed to update hosts file")?;
    summary.done(Step::HostsEntry);

    let version = detect_version(fs, paths).context("distribution detection failed")?;
    summary.version = Some(version);
    summary.done(Step::Distro);

    let packages = PackageInstaller::new(&exec);
    reporter.step(&format!("installing {VCS_PACKAGE}..."));
    packages.ensure_installed(VCS_PACKAGE).await?;
    summary.done(Step::VcsPackage);

    reporter.step(&format!("installing {AGENT_PACKAGE}..."));
    packages
        .install_repo_package(REPO_PACKAGE, &repo_url(version))
        .await?;
    packages.ensure_installed(AGENT_PACKAGE).await?;
    reporter.success(&format!("{AGENT_PACKAGE} installed"));
    summary.done(Step::AgentPackages);

    reporter.step("running configuration agent...");
    let args = agent_args(&context.installer.hostname, &context.agent, &paths.agent_log);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let outcome = exec
        .run(
            PUPPET_BIN,
            &args,
            ACCEPTED_EXIT_CODES,
            &RetryPolicy::unbounded(),
        )
        .await
        .require_accepted(&display_command(PUPPET_BIN, &args))?;
    reporter.success(&format!(
        "agent run finished (exit code {})",
        outcome.exit_code
    ));
    summary.agent_exit_code = Some(outcome.exit_code);
    summary.done(Step::AgentRun);

    Ok(summary)
}

/// Take resolver control away from NetworkManager, write the resolver file,
/// and set the static hostname. Returns the new FQDN.
async fn configure_dns(
    exec: &RetryingExecutor<'_, impl CommandRunner>,
    fs: &impl HostFs,
    context: &ProvisioningContext,
    paths: &HostPaths,
    hostname: &str,
) -> Result<String> {
    if fs.exists(&paths.nm_conf_dir) {
        fs.write_atomic(&paths.nm_dns_conf, NM_DNS_CONF)?;
        if exec
            .succeeds("systemctl", &["is-active", "--quiet", "NetworkManager"])
            .await
        {
            let args = ["restart", "NetworkManager"];
            exec.run(
                "systemctl",
                &args,
                &[0],
                &RetryPolicy::with_retries(HOST_COMMAND_RETRIES),
            )
            .await
            .require_accepted(&display_command("systemctl", &args))?;
        }
    }

    fs.write_atomic(&paths.resolv_conf, &render_resolv_conf(&context.dns))?;

    let domain = context.dns.domain.as_deref().unwrap_or_default();
    let name = fqdn(hostname, domain);
    let args = ["set-hostname", "--static", name.as_str()];
    exec.run(
        "hostnamectl",
        &args,
        &[0],
        &RetryPolicy::with_retries(HOST_COMMAND_RETRIES),
    )
    .await
    .require_accepted(&display_command("hostnamectl", &args))?;
    info!(fqdn = %name, "hostname updated");
    Ok(name)
}

/// Download the installer CA into the trust anchors and rebuild the bundle.
///
/// Returns the certificate fingerprint when the installed file can be read.
async fn install_ca(
    exec: &RetryingExecutor<'_, impl CommandRunner>,
    fs: &impl HostFs,
    context: &ProvisioningContext,
    paths: &HostPaths,
    reporter: &impl ProgressReporter,
) -> Result<Option<String>> {
    fs.create_dir_all(&paths.ca_anchor_dir)?;

    let anchor = paths.ca_anchor.display().to_string();
    let ca_url = context.ca_url();
    let args = [
        "--fail",
        "--silent",
        "--show-error",
        "--insecure",
        "--output",
        anchor.as_str(),
        ca_url.as_str(),
    ];
    exec.run(
        "curl",
        &args,
        &[0],
        &RetryPolicy::with_retries(CA_FETCH_RETRIES),
    )
    .await
    .require_accepted(&display_command("curl", &args))?;

    let args = ["extract"];
    exec.run("update-ca-trust", &args, &[0], &RetryPolicy::once())
        .await
        .require_accepted(&display_command("update-ca-trust", &args))?;

    match fs.sha256_file(&paths.ca_anchor) {
        Ok(fingerprint) => {
            info!(sha256 = %fingerprint, ca = %anchor, "installer CA installed");
            Ok(Some(fingerprint))
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "cannot fingerprint installer CA");
            reporter.warn("installer CA fingerprint unavailable");
            Ok(None)
        }
    }
}

/// Map the installer hostname to its IP in the hosts file, once.
fn add_installer_host(
    fs: &impl HostFs,
    context: &ProvisioningContext,
    paths: &HostPaths,
) -> Result<()> {
    let existing = if fs.exists(&paths.hosts) {
        fs.read_to_string(&paths.hosts)?
    } else {
        String::new()
    };
    let entry = hosts_entry(context.installer.ip_address, &context.installer.hostname);
    match append_hosts_entry(&existing, &entry) {
        Some(updated) => {
            fs.write_atomic(&paths.hosts, &updated)?;
            info!(entry = %entry, "hosts entry added");
        }
        None => info!(entry = %entry, "hosts entry already present"),
    }
    Ok(())
}
