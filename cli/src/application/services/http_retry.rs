//! Bounded retry loop shared by the metadata and webservice clients.
//!
//! Each caller classifies responses; transport failures are always retried.
//! After a failed attempt the loop sleeps `2^(attempt+1)` seconds, except
//! after the last one.

use std::future::Future;

use anyhow::Result;
use tracing::warn;

use crate::domain::http::{HTTP_ATTEMPTS, http_backoff};
use crate::domain::{BootstrapError, HttpResponse};

/// What to do with a response.
#[derive(Debug)]
pub enum Verdict {
    /// Hand the response to the caller.
    Accept,
    /// Treat as transient and try again.
    Retry,
    /// Stop immediately with this error.
    Fatal(BootstrapError),
}

/// Result of the loop when no fatal verdict was reached.
#[derive(Debug, PartialEq, Eq)]
pub enum HttpOutcome {
    Response(HttpResponse),
    /// Every attempt failed transiently.
    Exhausted { attempts: u32, last_error: String },
}

/// Send up to [`HTTP_ATTEMPTS`] times.
///
/// `target` is only used for logging and must not contain secrets.
///
/// # Errors
///
/// Returns the error carried by a `Verdict::Fatal`.
pub async fn send_with_retry<S, Fut, C>(
    target: &str,
    mut send: S,
    classify: C,
) -> Result<HttpOutcome, BootstrapError>
where
    S: FnMut() -> Fut,
    Fut: Future<Output = Result<HttpResponse>>,
    C: Fn(&HttpResponse) -> Verdict,
{
    let mut last_error = String::new();
    for attempt in 0..HTTP_ATTEMPTS {
        match send().await {
            Ok(response) => match classify(&response) {
                Verdict::Accept => return Ok(HttpOutcome::Response(response)),
                Verdict::Fatal(err) => return Err(err),
                Verdict::Retry => last_error = format!("HTTP {}", response.status),
            },
            Err(e) => last_error = format!("{e:#}"),
        }

        if attempt + 1 < HTTP_ATTEMPTS {
            let delay = http_backoff(attempt);
            warn!(
                endpoint = %target,
                attempt = attempt + 1,
                error = %last_error,
                delay_secs = delay.as_secs(),
                "request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
    Ok(HttpOutcome::Exhausted {
        attempts: HTTP_ATTEMPTS,
        last_error,
    })
}
