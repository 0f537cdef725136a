//! Retrying command executor.
//!
//! Runs a local command until it exits with an accepted code or its
//! [`RetryPolicy`] budget runs out, sleeping a jittered exponential delay
//! between attempts. Imports only from `crate::domain` and
//! `crate::application::ports`.

use std::process::ExitStatus;
use std::time::Duration;

use tracing::{debug, warn};

use crate::application::ports::CommandRunner;
use crate::domain::{Backoff, CommandOutcome, Completion, RetryPolicy};

/// Exit code reported when a command cannot be spawned at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Retrying wrapper around a [`CommandRunner`].
pub struct RetryingExecutor<'a, R> {
    runner: &'a R,
    backoff: &'a Backoff,
}

impl<'a, R: CommandRunner> RetryingExecutor<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, backoff: &'a Backoff) -> Self {
        Self { runner, backoff }
    }

    /// Run `program args` under `policy`, accepting any code in `accept`.
    ///
    /// Never returns an error: an unspawnable command counts as exit code
    /// 127 and is retried like any other failure. With
    /// [`RetryPolicy::unbounded`] a command that never succeeds keeps this
    /// future pending forever.
    pub async fn run(
        &self,
        program: &str,
        args: &[&str],
        accept: &[i32],
        policy: &RetryPolicy,
    ) -> CommandOutcome {
        let command = display_command(program, args);
        let mut retries = 0u32;
        let mut waited = Duration::ZERO;

        loop {
            let exit_code = self.attempt(program, args, &command).await;
            if accept.contains(&exit_code) {
                debug!(command = %command, retries, "command succeeded");
                return CommandOutcome {
                    exit_code,
                    retries,
                    waited,
                    completion: Completion::Accepted,
                };
            }

            if let Some(exhaustion) = policy.exhausted(retries, waited) {
                debug!(
                    command = %command,
                    exit_code,
                    retries,
                    waited_ms = waited.as_millis(),
                    ?exhaustion,
                    "command retry budget exhausted"
                );
                return CommandOutcome {
                    exit_code,
                    retries,
                    waited,
                    completion: Completion::Exhausted(exhaustion),
                };
            }

            let delay = self
                .backoff
                .delay(retries, policy.base_interval(), policy.max_delay());
            warn!(
                command = %command,
                attempt = retries + 1,
                exit_code,
                delay_ms = delay.as_millis(),
                "command failed, retrying"
            );
            tokio::time::sleep(delay).await;
            waited = waited.saturating_add(delay);
            retries = retries.saturating_add(1);
        }
    }

    /// Single captured run interpreted as a boolean (exit code 0).
    pub async fn succeeds(&self, program: &str, args: &[&str]) -> bool {
        match self.runner.run(program, args).await {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!(command = %display_command(program, args), error = %e, "check command failed to run");
                false
            }
        }
    }

    async fn attempt(&self, program: &str, args: &[&str], command: &str) -> i32 {
        match self.runner.run_status(program, args).await {
            Ok(status) => exit_code(status),
            Err(e) => {
                warn!(command = %command, error = %format!("{e:#}"), "command could not be started");
                SPAWN_FAILURE_EXIT_CODE
            }
        }
    }
}

/// Logical exit code; signals map to `128 + signal` like a shell reports them.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Command line for logs and error messages.
#[must_use]
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
