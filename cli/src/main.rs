//! nodeboot - first-boot bootstrap for cluster compute nodes

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use nodeboot_cli::cli::{Cli, failure_kind};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = cli.run().await {
        if let Some(kind) = failure_kind(&e) {
            tracing::error!(%kind, "aborted");
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
