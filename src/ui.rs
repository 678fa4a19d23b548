//! Terminal output for the `leafscan` binary.
//!
//! Long steps (camera acquisition, the detection delay) show a spinner on a
//! TTY and a plain `==>` line otherwise.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

use crate::status::Status;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

impl UiMode {
    pub fn parse(flag: Option<&str>) -> Self {
        match flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self { mode, is_tty }
    }

    fn pretty(&self) -> bool {
        match self.mode {
            UiMode::Pretty | UiMode::Auto => self.is_tty,
            UiMode::Plain => false,
        }
    }

    /// Start a named step. Close it with `StageGuard::settle` to report the
    /// status the session ended the step with.
    pub fn stage(&self, name: &str) -> StageGuard {
        let spinner = self.pretty().then(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::stderr());
            spinner.enable_steady_tick(Duration::from_millis(120));
            let style = ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            spinner.set_style(style);
            spinner.set_message(format!("{name}…"));
            spinner
        });
        if spinner.is_none() {
            eprintln!("==> {}", name);
        }
        StageGuard {
            name: name.to_string(),
            start: Instant::now(),
            spinner,
            outcome: None,
        }
    }

    /// Print the session status line.
    pub fn status(&self, status: &Status) {
        eprintln!("{status}");
    }
}

/// An open stage. Dropping it without `settle` reports the bare step name.
pub struct StageGuard {
    name: String,
    start: Instant,
    spinner: Option<ProgressBar>,
    outcome: Option<Status>,
}

impl StageGuard {
    /// Close the stage with the status the step left behind.
    pub fn settle(mut self, status: &Status) {
        self.outcome = Some(status.clone());
    }

    fn summary(&self) -> String {
        let elapsed = self.start.elapsed().as_millis();
        match &self.outcome {
            Some(status) if status.active => {
                format!("✔ {}: {} [{}ms]", self.name, status.text, elapsed)
            }
            Some(status) => format!("✘ {}: {} [{}ms]", self.name, status.text, elapsed),
            None => format!("✔ {} [{}ms]", self.name, elapsed),
        }
    }
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        let message = self.summary();
        match &self.spinner {
            Some(spinner) => spinner.finish_with_message(message),
            None => eprintln!("{message}"),
        }
    }
}
