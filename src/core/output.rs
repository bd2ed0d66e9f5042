//! Colored, leveled output for bootstrap
//!
//! Uses owo-colors for terminal colors. Components never print directly:
//! they receive a [`Sink`] so verbosity is decided once, up front, and tests
//! can capture what would have been shown.

use owo_colors::OwoColorize;
use std::cell::RefCell;

/// Severity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Only shown when running verbose
    Detail,
    Info,
    Warn,
    Error,
}

/// Destination for leveled messages.
pub trait Sink {
    fn emit(&self, level: Level, message: &str);

    /// Re-enable terminal formatting after an external tool reset it.
    fn restore_terminal(&self) {}

    fn detail(&self, message: &str) {
        self.emit(Level::Detail, message);
    }

    fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }
}

/// Terminal sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    verbose: bool,
}

impl Console {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

impl Sink for Console {
    fn emit(&self, level: Level, message: &str) {
        match level {
            Level::Detail => {
                if self.verbose {
                    println!("     {}", message.dimmed());
                }
            }
            Level::Info => println!("{} {}", "==>".green().bold(), message),
            Level::Warn => eprintln!("{} {}", "warning:".yellow().bold(), message.yellow()),
            Level::Error => eprintln!("{} {}", "error:".red().bold(), message.red()),
        }
    }

    #[cfg(windows)]
    fn restore_terminal(&self) {
        // Spawning cmd turns VT processing back on for the shared console.
        let _ = std::process::Command::new("cmd").args(["/C", ""]).status();
    }
}

/// Sink that keeps every message in memory.
#[derive(Debug, Default)]
pub struct Recorder {
    messages: RefCell<Vec<(Level, String)>>,
    restores: RefCell<usize>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.borrow().clone()
    }

    /// Messages at exactly `level`.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.borrow().iter().any(|(_, m)| m.contains(needle))
    }

    pub fn terminal_restores(&self) -> usize {
        *self.restores.borrow()
    }
}

impl Sink for Recorder {
    fn emit(&self, level: Level, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }

    fn restore_terminal(&self) {
        *self.restores.borrow_mut() += 1;
    }
}
