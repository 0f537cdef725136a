//! RPM package installation through the retrying executor.

use anyhow::Result;
use tracing::info;

use crate::application::ports::CommandRunner;
use crate::application::services::executor::RetryingExecutor;
use crate::domain::{BootstrapError, RetryPolicy};

/// Retries for `yum -y install`.
pub const INSTALL_RETRIES: u32 = 10;

/// Retries for `rpm -ivh <url>`.
pub const REPO_INSTALL_RETRIES: u32 = 5;

pub struct PackageInstaller<'e, 'a, R> {
    executor: &'e RetryingExecutor<'a, R>,
}

impl<'e, 'a, R: CommandRunner> PackageInstaller<'e, 'a, R> {
    #[must_use]
    pub fn new(executor: &'e RetryingExecutor<'a, R>) -> Self {
        Self { executor }
    }

    /// Single `rpm -q --quiet` query.
    pub async fn is_installed(&self, name: &str) -> bool {
        self.executor.succeeds("rpm", &["-q", "--quiet", name]).await
    }

    /// Install `name` with yum unless it is already present.
    ///
    /// # Errors
    ///
    /// Returns `PackageInstall` once the retry budget is spent.
    pub async fn ensure_installed(&self, name: &str) -> Result<()> {
        if self.is_installed(name).await {
            info!(package = name, "already installed");
            return Ok(());
        }
        let outcome = self
            .executor
            .run(
                "yum",
                &["-y", "install", name],
                &[0],
                &RetryPolicy::with_retries(INSTALL_RETRIES),
            )
            .await;
        if !outcome.is_accepted() {
            return Err(BootstrapError::PackageInstall(format!(
                "{name} (exit code {} after {} retries)",
                outcome.exit_code, outcome.retries
            ))
            .into());
        }
        info!(package = name, "installed");
        Ok(())
    }

    /// Install a repository definition package straight from `url`.
    ///
    /// # Errors
    ///
    /// Returns `PackageInstall` once the retry budget is spent.
    pub async fn install_repo_package(&self, name: &str, url: &str) -> Result<()> {
        if self.is_installed(name).await {
            info!(package = name, "repository package already installed");
            return Ok(());
        }
        let outcome = self
            .executor
            .run(
                "rpm",
                &["-ivh", url],
                &[0],
                &RetryPolicy::with_retries(REPO_INSTALL_RETRIES),
            )
            .await;
        if !outcome.is_accepted() {
            return Err(BootstrapError::PackageInstall(format!(
                "{name} from {url} (exit code {})",
                outcome.exit_code
            ))
            .into());
        }
        info!(package = name, url, "repository package installed");
        Ok(())
    }
}
