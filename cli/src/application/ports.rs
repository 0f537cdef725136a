//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::{ExitStatus, Output};

use anyhow::Result;

use crate::domain::HttpResponse;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Used for short queries (`rpm -q`, `systemctl is-active`); implementations
    /// apply their configured timeout and kill the child when it fires.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program and return only its exit status.
    ///
    /// The program's output is shown to the operator on stderr, never on
    /// stdout.
    ///
    /// No timeout: the configuration agent run may block for a long time.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or waited on.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── HTTP Port ─────────────────────────────────────────────────────────────────

/// A single HTTP exchange, no retries.
///
/// `Err` means the request never produced a response (connect failure, TLS
/// failure, timeout). Any response, whatever its status, is `Ok`.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    /// `GET url`.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
    /// `POST url` with a JSON body and `Content-Type: application/json`.
    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse>;
}

impl<T: HttpTransport> HttpTransport for &T {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        (**self).get(url).await
    }

    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse> {
        (**self).post_json(url, body).await
    }
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Host file access used by the bootstrap steps.
pub trait HostFs {
    fn exists(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace `path` with `content` so that readers only ever see the old or
    /// the new file, never a truncated one.
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()>;

    /// SHA-256 hex digest of a file.
    fn sha256_file(&self, path: &Path) -> Result<String>;
}
