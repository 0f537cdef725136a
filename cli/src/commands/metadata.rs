//! Metadata command: fetch a single instance metadata value.

use anyhow::Result;
use clap::Args;

use crate::application::services::metadata::{METADATA_BASE_URL, MetadataClient};
use crate::infra::http::ReqwestTransport;

#[derive(Args)]
pub struct MetadataArgs {
    /// Metadata path, e.g. /local-hostname
    pub path: String,

    /// Metadata service base URL
    #[arg(long, hide = true, default_value = METADATA_BASE_URL)]
    pub base_url: String,
}

/// Print the value at `args.path` to stdout.
///
/// # Errors
///
/// Returns an error if the path does not exist or the service stays unreachable.
pub async fn run(args: &MetadataArgs) -> Result<()> {
    let http = ReqwestTransport::new()?;
    let path = normalize_path(&args.path);
    let value = MetadataClient::with_base_url(&http, &args.base_url)
        .fetch(&path)
        .await?;
    println!("{value}");
    Ok(())
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
