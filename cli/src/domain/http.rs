//! HTTP response value and the retry rules shared by the metadata and
//! webservice clients.

use std::time::Duration;

/// Attempts made against the metadata service or webservice before giving up.
pub const HTTP_ATTEMPTS: u32 = 5;

/// A response as seen by the clients: status plus raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body decoded lossily as UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Statuses that indicate a transient server-side condition.
#[must_use]
pub fn is_retryable_status(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}

/// Sleep after failed HTTP attempt `attempt` (0-based): `2^(attempt+1)` seconds.
#[must_use]
pub fn http_backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64.checked_shl(attempt + 1).unwrap_or(u64::MAX))
}
