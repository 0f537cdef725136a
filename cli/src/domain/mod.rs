//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`
//! sockets. All functions are synchronous and take data in, returning data out.

pub mod agent;
pub mod backoff;
pub mod distro;
pub mod error;
pub mod host;
pub mod http;
pub mod registration;
pub mod retry;

pub use backoff::Backoff;
pub use distro::{OsRelease, VersionToken};
pub use error::{BootstrapError, ErrorKind};
pub use host::HostPaths;
pub use http::HttpResponse;
pub use registration::RegistrationResult;
pub use retry::{CommandOutcome, Completion, Exhaustion, RetryPolicy};
