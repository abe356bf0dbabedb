//! Shell output for the CLI.
//!
//! Human mode prints right-aligned status lines to stderr and shows an
//! `indicatif` bar while a matrix builds. JSON mode prints one event per line
//! to stdout and nothing else. The two modes are mutually exclusive.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::builder::events::BuildEvent;

/// Shell output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellMode {
    Human { verbose: bool, color: bool },
    Json,
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Building,
    Generated,
    Finished,
    Removed,
    Failed,
    Warning,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Building => "Building",
            Status::Generated => "Generated",
            Status::Finished => "Finished",
            Status::Removed => "Removed",
            Status::Failed => "Failed",
            Status::Warning => "Warning",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Generated | Status::Finished | Status::Removed => "\x1b[1;32m",
            Status::Building => "\x1b[1;36m",
            Status::Warning => "\x1b[1;33m",
            Status::Failed => "\x1b[1;31m",
        }
    }
}

/// Width status words are right-aligned to.
const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    progress: Option<ProgressBar>,
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        Shell {
            mode,
            progress: None,
        }
    }

    /// Create a shell from CLI flags. JSON takes precedence over verbose.
    pub fn from_flags(verbose: bool, json: bool) -> Self {
        if json {
            Shell::new(ShellMode::Json)
        } else {
            Shell::new(ShellMode::Human {
                verbose,
                color: io::stderr().is_terminal(),
            })
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    fn is_verbose(&self) -> bool {
        matches!(self.mode, ShellMode::Human { verbose: true, .. })
    }

    /// Print a status line: `{status:>12} {message}`.
    ///
    /// Ignored in JSON mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        let ShellMode::Human { color, .. } = self.mode else {
            return;
        };

        let line = format!("{} {}", format_status(status, color), msg);
        match &self.progress {
            Some(pb) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }

    /// Print a value as one JSON line on stdout. Ignored in human mode.
    pub fn json<T: Serialize>(&self, value: &T) {
        if !self.is_json() {
            return;
        }
        if let Ok(line) = serde_json::to_string(value) {
            println!("{}", line);
            let _ = io::stdout().flush();
        }
    }

    /// Render one build event.
    pub fn build_event(&mut self, event: &BuildEvent) {
        if self.is_json() {
            self.json(event);
            return;
        }

        match event {
            BuildEvent::TargetStarted {
                target,
                index,
                total,
            } => {
                if self.is_verbose() {
                    self.status(Status::Building, format!("{} [{}/{}]", target, index, total));
                    return;
                }
                let pb = self.progress.get_or_insert_with(|| new_bar(*total as u64));
                pb.set_message(target.clone());
            }
            BuildEvent::TargetFinished {
                target,
                success: true,
                path,
                ..
            } => {
                self.status(Status::Finished, format!("{} -> {}", target, path.display()));
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
            }
            BuildEvent::TargetFinished {
                target, message, ..
            } => {
                let reason = message.as_deref().unwrap_or("unknown error");
                self.status(Status::Failed, format!("{}: {}", target, reason));
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
            }
            BuildEvent::BuildFinished {
                targets_built,
                targets_failed,
                duration_ms,
                ..
            } => {
                if let Some(pb) = self.progress.take() {
                    pb.finish_and_clear();
                }
                let secs = *duration_ms as f64 / 1000.0;
                if *targets_failed == 0 {
                    self.status(
                        Status::Finished,
                        format!("{} targets in {:.2}s", targets_built, secs),
                    );
                } else {
                    self.status(
                        Status::Warning,
                        format!(
                            "{} targets built, {} failed in {:.2}s",
                            targets_built, targets_failed, secs
                        ),
                    );
                }
            }
        }
    }
}

fn format_status(status: Status, color: bool) -> String {
    if color {
        format!(
            "{}{:>width$}\x1b[0m",
            status.color_code(),
            status.as_str(),
            width = STATUS_WIDTH
        )
    } else {
        format!("{:>width$}", status.as_str(), width = STATUS_WIDTH)
    }
}

fn new_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
