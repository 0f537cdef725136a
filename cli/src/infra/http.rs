//! Infrastructure implementation of the `HttpTransport` port on `reqwest`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::application::ports::HttpTransport;
use crate::domain::HttpResponse;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `reqwest`-backed transport.
///
/// The client is built up front, so a bad CA file fails construction instead
/// of every request.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport using the bundled trust roots only.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: builder().build().context("failed to build HTTP client")?,
        })
    }

    /// Transport that additionally trusts the PEM certificates in `ca_file`.
    ///
    /// # Errors
    ///
    /// Returns an error naming `ca_file` if it cannot be read or holds no
    /// usable certificate.
    pub fn trusting(ca_file: &Path) -> Result<Self> {
        let mut builder = builder();
        for cert in load_certificates(ca_file)? {
            builder = builder.add_root_certificate(cert);
        }
        let client = builder
            .build()
            .with_context(|| format!("cannot trust installer CA {}", ca_file.display()))?;
        debug!(ca = %ca_file.display(), "HTTP client trusts installer CA");
        Ok(Self { client })
    }
}

fn builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("nodeboot/", env!("CARGO_PKG_VERSION")))
}

fn load_certificates(path: &Path) -> Result<Vec<reqwest::Certificate>> {
    let pem = std::fs::read(path)
        .with_context(|| format!("cannot read CA certificate {}", path.display()))?;
    let certs = reqwest::Certificate::from_pem_bundle(&pem)
        .with_context(|| format!("invalid CA certificate {}", path.display()))?;
    if certs.is_empty() {
        anyhow::bail!("no PEM certificate found in {}", path.display());
    }
    Ok(certs)
}

async fn into_response(response: reqwest::Response) -> Result<HttpResponse> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .await
        .context("failed to read response body")?;
    Ok(HttpResponse {
        status,
        body: body.to_vec(),
    })
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;
        into_response(response).await
    }

    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .context("request failed")?;
        into_response(response).await
    }
}
