//! End-to-end bootstrap runs against a scratch root directory.
//!
//! Host commands and HTTP are faked; files are real, written by `StdFs`
//! under a `HostPaths::rooted` layout.

use std::path::Path;

use nodeboot_cli::application::services::bootstrap::{
    BootstrapOptions, BootstrapSummary, Step, run_bootstrap,
};
use nodeboot_cli::domain::{Backoff, HostPaths, VersionToken};
use nodeboot_cli::infra::config::parse_context;
use nodeboot_cli::infra::fs::StdFs;
use nodeboot_cli::infra::http::ReqwestTransport;
use nodeboot_common::ProvisioningContext;
use tempfile::TempDir;

use crate::mocks::{CollectingReporter, RecordingRunner, RoutedHttp};

const CA_PEM: &str = "installer-ca\n";
const CA_SHA256: &str = "87098fe38002457fec34b5211061e3547e3a0fc217cb5a517c462a505099db64";

const OVERRIDE_YAML: &str = "\
installer:
  hostname: installer.example.com
  ip_address: 10.0.0.1
registration_token: tok123
dns:
  override: true
  search: example.com
  options: [\"timeout:2\"]
  nameservers: [10.0.0.2, 10.0.0.3]
  domain: example.com
agent:
  splay_limit: 5
";

const PLAIN_YAML: &str = "\
installer:
  hostname: installer.example.com
  ip_address: 10.0.0.1
";

fn metadata() -> RoutedHttp {
    RoutedHttp::new()
        .route("/local-hostname", 200, "ip-10-0-0-5.ec2.internal\n")
        .route("/instance-id", 200, "i-abc123")
        .route("/local-ipv4", 200, "10.0.0.5")
}

fn webservice() -> RoutedHttp {
    RoutedHttp::new().route("/v1/node-token/tok123", 200, r#"{"status": "ok"}"#)
}

/// Scratch root with the files a fresh EL7 image would have.
fn host_root() -> (TempDir, HostPaths) {
    let root = TempDir::new().unwrap();
    let paths = HostPaths::rooted(root.path());
    write(&paths.os_release, "NAME=\"CentOS Linux\"\nID=\"centos\"\nVERSION_ID=\"7\"\n");
    write(&paths.hosts, "127.0.0.1\tlocalhost\n");
    // curl is faked, so the certificate it would have fetched is staged here.
    write(&paths.ca_anchor, CA_PEM);
    std::fs::create_dir_all(&paths.nm_conf_dir).unwrap();
    (root, paths)
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

async fn bootstrap(
    context: &ProvisioningContext,
    paths: &HostPaths,
    runner: &RecordingRunner,
    webservice: &RoutedHttp,
    reporter: &CollectingReporter,
) -> anyhow::Result<BootstrapSummary> {
    let backoff = Backoff::seeded(7);
    run_bootstrap(
        runner,
        &metadata(),
        |_: &Path| Ok(webservice),
        &StdFs,
        BootstrapOptions {
            context,
            paths,
            reporter,
            backoff: &backoff,
        },
    )
    .await
}

/// Packages are reported missing so every install path runs.
fn fresh_image_runner() -> RecordingRunner {
    RecordingRunner::new()
        .exits("rpm -q --quiet", 1)
        .exits("/opt/puppetlabs/bin/puppet agent", 2)
}

#[tokio::test(start_paused = true)]
async fn override_run_writes_host_files_under_root() {
    let (_root, paths) = host_root();
    let context = parse_context(OVERRIDE_YAML).unwrap();
    let runner = fresh_image_runner();
    let reporter = CollectingReporter::default();

    let summary = bootstrap(&context, &paths, &runner, &webservice(), &reporter)
        .await
        .unwrap();

    assert_eq!(
        read(&paths.resolv_conf),
        "# Generated by nodeboot\nsearch example.com\noptions timeout:2\n\
         nameserver 10.0.0.2\nnameserver 10.0.0.3\n"
    );
    assert_eq!(read(&paths.nm_dns_conf), "[main]\ndns=none\n");
    assert_eq!(
        read(&paths.hosts),
        "127.0.0.1\tlocalhost\n10.0.0.1\tinstaller.example.com\n"
    );
    assert_eq!(summary.fqdn.as_deref(), Some("ip-10-0-0-5.example.com"));
    assert_eq!(summary.ca_fingerprint.as_deref(), Some(CA_SHA256));
    assert_eq!(summary.version, Some(VersionToken(7)));
    assert_eq!(summary.agent_exit_code, Some(2));
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.completed.first(), Some(&Step::Identity));
    assert_eq!(summary.completed.last(), Some(&Step::AgentRun));
    assert!(reporter.warnings().is_empty());
}

#[tokio::test(start_paused = true)]
async fn override_run_issues_host_commands_in_order() {
    let (_root, paths) = host_root();
    let context = parse_context(OVERRIDE_YAML).unwrap();
    let runner = fresh_image_runner();

    bootstrap(
        &context,
        &paths,
        &runner,
        &webservice(),
        &CollectingReporter::default(),
    )
    .await
    .unwrap();

    let programs: Vec<String> = runner
        .calls()
        .iter()
        .map(|c| c.split(' ').take(2).collect::<Vec<_>>().join(" "))
        .collect();
    assert_eq!(
        programs,
        [
            "systemctl is-active",
            "systemctl restart",
            "hostnamectl set-hostname",
            "curl --fail",
            "update-ca-trust extract",
            "setenforce permissive",
            "rpm -q",
            "yum -y",
            "rpm -q",
            "rpm -ivh",
            "rpm -q",
            "yum -y",
            "/opt/puppetlabs/bin/puppet agent",
        ]
    );
    let agent = runner.calls().pop().unwrap();
    assert!(agent.contains("--splaylimit 5"));
    assert!(agent.contains("--server installer.example.com"));
    assert!(agent.contains(&paths.agent_log.display().to_string()));
}

#[tokio::test(start_paused = true)]
async fn registration_posts_to_token_endpoint() {
    let (_root, paths) = host_root();
    let context = parse_context(OVERRIDE_YAML).unwrap();
    let webservice = webservice();

    let summary = bootstrap(
        &context,
        &paths,
        &fresh_image_runner(),
        &webservice,
        &CollectingReporter::default(),
    )
    .await
    .unwrap();

    assert_eq!(
        webservice.requests(),
        ["POST https://installer.example.com:8443/v1/node-token/tok123"]
    );
    let registration = summary.registration.unwrap();
    assert_eq!(registration.status, 200);
    assert_eq!(registration.body["status"], "ok");
}

#[tokio::test(start_paused = true)]
async fn plain_run_leaves_resolver_alone() {
    let (_root, paths) = host_root();
    let context = parse_context(PLAIN_YAML).unwrap();
    let webservice = RoutedHttp::new();

    let summary = bootstrap(
        &context,
        &paths,
        &fresh_image_runner(),
        &webservice,
        &CollectingReporter::default(),
    )
    .await
    .unwrap();

    assert!(!paths.resolv_conf.exists());
    assert!(!paths.nm_dns_conf.exists());
    assert!(webservice.requests().is_empty());
    assert_eq!(summary.skipped, [Step::Dns, Step::Registration]);
    assert_eq!(summary.hostname, "ip-10-0-0-5.ec2.internal");
}

#[tokio::test(start_paused = true)]
async fn rerun_does_not_duplicate_hosts_entry() {
    let (_root, paths) = host_root();
    let context = parse_context(PLAIN_YAML).unwrap();

    for _ in 0..2 {
        bootstrap(
            &context,
            &paths,
            &fresh_image_runner(),
            &RoutedHttp::new(),
            &CollectingReporter::default(),
        )
        .await
        .unwrap();
    }

    assert_eq!(read(&paths.hosts).matches("installer.example.com").count(), 1);
}

#[tokio::test(start_paused = true)]
async fn installed_packages_are_not_reinstalled() {
    let (_root, paths) = host_root();
    let context = parse_context(PLAIN_YAML).unwrap();
    let runner = RecordingRunner::new();

    bootstrap(
        &context,
        &paths,
        &runner,
        &RoutedHttp::new(),
        &CollectingReporter::default(),
    )
    .await
    .unwrap();

    assert!(
        !runner
            .calls()
            .iter()
            .any(|c| c.starts_with("yum") || c.starts_with("rpm -ivh"))
    );
}

#[tokio::test(start_paused = true)]
async fn missing_release_file_stops_before_packages() {
    let (_root, paths) = host_root();
    std::fs::remove_file(&paths.os_release).unwrap();
    let context = parse_context(PLAIN_YAML).unwrap();
    let runner = fresh_image_runner();

    let err = bootstrap(
        &context,
        &paths,
        &runner,
        &RoutedHttp::new(),
        &CollectingReporter::default(),
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("os-release"));
    assert!(!runner.calls().iter().any(|c| c.starts_with("rpm") || c.starts_with("yum")));
}

#[tokio::test(start_paused = true)]
async fn missing_ca_file_only_warns() {
    let (_root, paths) = host_root();
    std::fs::remove_file(&paths.ca_anchor).unwrap();
    let context = parse_context(PLAIN_YAML).unwrap();
    let reporter = CollectingReporter::default();

    let summary = bootstrap(
        &context,
        &paths,
        &fresh_image_runner(),
        &RoutedHttp::new(),
        &reporter,
    )
    .await
    .unwrap();

    assert!(summary.ca_fingerprint.is_none());
    assert_eq!(reporter.warnings(), ["installer CA fingerprint unavailable"]);
    assert!(paths.ca_anchor_dir.is_dir());
}

#[tokio::test(start_paused = true)]
async fn garbage_ca_anchor_is_fatal_and_named() {
    let (_root, paths) = host_root();
    write(&paths.ca_anchor, "<html>not a cert</html>\n");
    let context = parse_context(OVERRIDE_YAML).unwrap();
    let runner = fresh_image_runner();
    let backoff = Backoff::seeded(7);
    let started = tokio::time::Instant::now();

    let err = run_bootstrap(
        &runner,
        &metadata(),
        ReqwestTransport::trusting,
        &StdFs,
        BootstrapOptions {
            context: &context,
            paths: &paths,
            reporter: &CollectingReporter::default(),
            backoff: &backoff,
        },
    )
    .await
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains(&paths.ca_anchor.display().to_string()), "{message}");
    assert!(!message.contains("unable to communicate"), "{message}");
    assert_eq!(started.elapsed(), std::time::Duration::ZERO);
    assert!(!runner.calls().iter().any(|c| c.starts_with("setenforce")));
}
