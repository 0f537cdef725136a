//! Cloud instance-metadata client.

use anyhow::Result;
use tracing::debug;

use crate::application::ports::HttpTransport;
use crate::application::services::http_retry::{HttpOutcome, Verdict, send_with_retry};
use crate::domain::http::is_retryable_status;
use crate::domain::{BootstrapError, HttpResponse};

/// Link-local metadata endpoint.
pub const METADATA_BASE_URL: &str = "http://169.254.169.254/latest/meta-data";

/// Fetches single metadata values, e.g. `/local-hostname`.
pub struct MetadataClient<'a, H> {
    http: &'a H,
    base_url: String,
}

impl<'a, H: HttpTransport> MetadataClient<'a, H> {
    #[must_use]
    pub fn new(http: &'a H) -> Self {
        Self::with_base_url(http, METADATA_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(http: &'a H, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch `path` (leading `/` included) and return the trimmed body.
    ///
    /// # Errors
    ///
    /// - `MetadataNotFound` on 404, without retrying
    /// - `MetadataUnreachable` once every attempt failed transiently
    /// - `MetadataUnreadable` for any other non-200 response
    pub async fn fetch(&self, path: &str) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        let classify = |response: &HttpResponse| match response.status {
            404 => Verdict::Fatal(BootstrapError::MetadataNotFound {
                path: path.to_string(),
            }),
            status if is_retryable_status(status) => Verdict::Retry,
            _ => Verdict::Accept,
        };

        let http = self.http;
        let target = url.as_str();
        let outcome = send_with_retry(target, move || http.get(target), classify).await?;
        match outcome {
            HttpOutcome::Response(response) if response.status == 200 => {
                let value = response.text().trim().to_string();
                debug!(path, value = %value, "metadata fetched");
                Ok(value)
            }
            HttpOutcome::Response(response) => Err(BootstrapError::MetadataUnreadable {
                path: path.to_string(),
                status: response.status,
            }
            .into()),
            HttpOutcome::Exhausted { last_error, .. } => Err(BootstrapError::MetadataUnreachable {
                url,
                reason: last_error,
            }
            .into()),
        }
    }
}
