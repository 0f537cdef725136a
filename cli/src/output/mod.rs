//! Terminal presentation.
//!
//! Stdout carries command results and the `Instance details:` line, so the
//! human-facing status markers go to stderr.

pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::{OwoColorize as _, Style};
pub use reporter::TerminalReporter;
pub use styles::Palette;

use crate::application::services::bootstrap::BootstrapSummary;

pub struct OutputContext {
    pub palette: Palette,
    /// Whether stderr is a terminal.
    pub is_tty: bool,
    /// Suppress progress markers. Results on stdout are still printed.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only on a terminal, and never with `--no-color` or
    /// `NO_COLOR` set.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stderr().is_term();
        let colored = !no_color && is_tty && std::env::var_os("NO_COLOR").is_none();
        Self {
            palette: Palette::new(colored),
            is_tty,
            quiet,
        }
    }

    pub fn step(&self, msg: &str) {
        self.marker("→", self.palette.step, msg);
    }

    pub fn success(&self, msg: &str) {
        self.marker("✓", self.palette.ok, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.marker("⚠", self.palette.warn, msg);
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg.style(self.palette.banner));
        }
    }

    /// Result line on stdout: `  key  value`.
    pub fn kv(&self, key: &str, value: &str) {
        println!("  {}  {value}", key.style(self.palette.key));
    }

    /// Result lines for a finished bootstrap.
    pub fn summary(&self, summary: &BootstrapSummary) {
        for (key, value) in summary_lines(summary) {
            self.kv(&format!("{key:<10}"), &value);
        }
    }

    fn marker(&self, symbol: &str, style: Style, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", symbol.style(style));
        }
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

pub(crate) fn summary_lines(summary: &BootstrapSummary) -> Vec<(&'static str, String)> {
    let unknown = || "unknown".to_string();
    vec![
        (
            "node",
            summary.fqdn.clone().unwrap_or_else(|| summary.hostname.clone()),
        ),
        ("completed", join(&summary.completed)),
        ("skipped", join(&summary.skipped)),
        (
            "ca sha256",
            summary.ca_fingerprint.clone().unwrap_or_else(unknown),
        ),
        (
            "repo",
            summary
                .version
                .map_or_else(unknown, |v| format!("el-{v}")),
        ),
        (
            "agent",
            summary
                .agent_exit_code
                .map_or_else(unknown, |code| format!("exit code {code}")),
        ),
    ]
}
