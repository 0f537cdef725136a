//! Registration payload rendering and webservice response interpretation.

use std::io;

use nodeboot_common::{NodeIdentity, RegistrationRequest};
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use crate::domain::error::BootstrapError;

/// Prefix of the stdout line external tooling scrapes for node identity.
pub const INSTANCE_DETAILS_PREFIX: &str = "Instance details: ";

/// Outcome of a successful registration call.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationResult {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Compact JSON with `", "` and `": "` separators, the layout log scrapers
/// already match against.
struct SpacedSeparators;

impl Formatter for SpacedSeparators {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// JSON body for `POST /v1/node-token/<token>`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_payload(identity: &NodeIdentity) -> serde_json::Result<String> {
    let request = RegistrationRequest::from(identity);
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, SpacedSeparators);
    request.serialize(&mut serializer)?;
    String::from_utf8(buf)
        .map_err(|e| serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// The exact line printed before the registration call.
#[must_use]
pub fn instance_details_line(payload: &str) -> String {
    format!("{INSTANCE_DETAILS_PREFIX}{payload}")
}

/// Error text from a webservice body: `{"error": "..."}` or
/// `{"error": {"message": "..."}}`.
#[must_use]
pub fn error_message(body: &serde_json::Value) -> Option<String> {
    match body.get("error")? {
        serde_json::Value::String(msg) => Some(msg.clone()),
        serde_json::Value::Object(obj) => Some(
            obj.get("message")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| serde_json::Value::Object(obj.clone()).to_string(), str::to_string),
        ),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Interpret a webservice response that was not retried or rejected outright.
///
/// # Errors
///
/// Returns `Webservice` with the remote message, or `WebserviceInternal` when
/// a non-200 response carries no `error` field.
pub fn interpret_response(
    status: u16,
    body: &[u8],
) -> Result<RegistrationResult, BootstrapError> {
    let decoded: serde_json::Value = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Null
    } else {
        match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(_) if status == 200 => {
                return Err(BootstrapError::Webservice(format!(
                    "invalid JSON in response: {}",
                    String::from_utf8_lossy(body)
                )));
            }
            Err(_) => serde_json::Value::Null,
        }
    };
    if status != 200 {
        return Err(error_message(&decoded)
            .map_or(BootstrapError::WebserviceInternal(status), BootstrapError::Webservice));
    }
    Ok(RegistrationResult {
        status,
        body: decoded,
    })
}
