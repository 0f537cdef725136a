//! `TerminalReporter`: presentation-layer implementation of `ProgressReporter`.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Forwards bootstrap progress to the terminal and appends how long each
/// step took to its completion line.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    step_started: Cell<Option<Instant>>,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            step_started: Cell::new(None),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.step_started.set(Some(Instant::now()));
        self.ctx.step(message);
    }

    fn success(&self, message: &str) {
        let elapsed = self.step_started.take().map(|t| t.elapsed());
        self.ctx.success(&with_elapsed(message, elapsed));
    }

    fn warn(&self, message: &str) {
        self.ctx.warn(message);
    }
}

/// `message (12.3s)`; sub-second steps are left bare.
pub(crate) fn with_elapsed(message: &str, elapsed: Option<Duration>) -> String {
    match elapsed {
        Some(d) if d >= Duration::from_secs(1) => format!("{message} ({:.1}s)", d.as_secs_f64()),
        _ => message.to_string(),
    }
}
