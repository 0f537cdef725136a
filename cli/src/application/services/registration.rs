//! Node registration against the installer webservice.

use std::cell::RefCell;
use std::io::{Stdout, Write};

use anyhow::{Context, Result};
use nodeboot_common::NodeIdentity;
use tracing::info;

use crate::application::ports::HttpTransport;
use crate::application::services::http_retry::{HttpOutcome, Verdict, send_with_retry};
use crate::domain::http::is_retryable_status;
use crate::domain::registration::{instance_details_line, interpret_response, render_payload};
use crate::domain::{BootstrapError, HttpResponse, RegistrationResult};

/// Registers a node identity with the webservice.
///
/// The `Instance details:` line goes to `details`, stdout unless replaced.
pub struct RegistrationClient<'a, H, W = Stdout> {
    http: &'a H,
    details: RefCell<W>,
}

impl<'a, H: HttpTransport> RegistrationClient<'a, H> {
    #[must_use]
    pub fn new(http: &'a H) -> Self {
        Self::with_details_writer(http, std::io::stdout())
    }
}

impl<'a, H: HttpTransport, W: Write> RegistrationClient<'a, H, W> {
    #[must_use]
    pub fn with_details_writer(http: &'a H, details: W) -> Self {
        Self {
            http,
            details: RefCell::new(details),
        }
    }

    /// POST `identity` to `url`.
    ///
    /// Writes and flushes the `Instance details:` line before the first
    /// request.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` on 401 and `InvalidWebserviceConfig` on 404,
    ///   both without retrying
    /// - `WebserviceUnreachable` once every attempt failed transiently
    /// - `Webservice`/`WebserviceInternal` for other non-200 responses
    pub async fn register(&self, identity: &NodeIdentity, url: &str) -> Result<RegistrationResult> {
        let payload = render_payload(identity).context("failed to serialize node details")?;
        {
            let mut out = self.details.borrow_mut();
            writeln!(out, "{}", instance_details_line(&payload))
                .and_then(|()| out.flush())
                .context("failed to write instance details")?;
        }

        let redacted = redact_token(url);
        let classify = |response: &HttpResponse| match response.status {
            401 => Verdict::Fatal(BootstrapError::InvalidCredentials),
            404 => Verdict::Fatal(BootstrapError::InvalidWebserviceConfig {
                url: redacted.clone(),
            }),
            status if is_retryable_status(status) => Verdict::Retry,
            _ => Verdict::Accept,
        };

        let http = self.http;
        let body = payload.as_str();
        let outcome =
            send_with_retry(&redacted, move || http.post_json(url, body), classify).await?;
        match outcome {
            HttpOutcome::Response(response) => {
                let result = interpret_response(response.status, &response.body)?;
                info!(node = %identity.name, status = result.status, "node registered");
                Ok(result)
            }
            HttpOutcome::Exhausted { last_error, .. } => Err(BootstrapError::WebserviceUnreachable {
                url: redacted,
                reason: last_error,
            }
            .into()),
        }
    }
}

/// Replace the token (last path segment) so it never reaches logs.
#[must_use]
pub fn redact_token(url: &str) -> String {
    match url.rsplit_once('/') {
        Some((head, tail)) if !tail.is_empty() => format!("{head}/<token>"),
        _ => url.to_string(),
    }
}
