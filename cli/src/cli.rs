//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nodeboot_common::ContextError;

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::domain::{BootstrapError, ErrorKind};

/// First-boot bootstrap for cluster compute nodes
#[derive(Parser)]
#[command(
    name = "nodeboot",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Provisioning file [default: /etc/nodeboot/bootstrap.yaml]
    #[arg(long, global = true, env = "NODEBOOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Treat DIR as the filesystem root for host files
    #[arg(long, global = true, hide = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full bootstrap
    Run,

    /// Fetch one value from the instance metadata service
    Metadata(commands::metadata::MetadataArgs),

    /// Print the package repository version token for this host
    DetectDistro,

    /// Validate the provisioning file and print a summary
    CheckConfig,

    /// Show version
    Version,
}

impl Cli {
    /// Default tracing filter for the chosen verbosity.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            config,
            quiet,
            no_color,
            root,
            command,
            ..
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            config,
            root,
        });
        match command {
            Command::Version => {
                commands::version::run();
                Ok(())
            }
            Command::Run => commands::run::run(&app).await,
            Command::Metadata(args) => commands::metadata::run(&args).await,
            Command::DetectDistro => commands::detect_distro::run(&app),
            Command::CheckConfig => commands::check_config::run(&app),
        }
    }
}

/// Failure class of an aborted command, when the cause is a typed error.
#[must_use]
pub fn failure_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    if let Some(e) = err.downcast_ref::<BootstrapError>() {
        return Some(e.kind());
    }
    err.downcast_ref::<ContextError>().map(|_| ErrorKind::Config)
}
