//! Coloured status lines for the terminal.

use colored::{ColoredString, Colorize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Success,
    Error,
}

impl Level {
    fn glyph(self) -> ColoredString {
        match self {
            Level::Info => "ℹ".cyan(),
            Level::Warn => "⚠".yellow(),
            Level::Success => "✓".green().bold(),
            Level::Error => "⨯ [ERROR]".red().bold(),
        }
    }
}

fn line(level: Level, message: impl Display) -> String {
    format!("{} {}", level.glyph(), message)
}

pub fn info(message: impl Display) {
    println!("{}", line(Level::Info, message));
}

pub fn warn(message: impl Display) {
    eprintln!("{}", line(Level::Warn, message));
}

pub fn succeed(message: impl Display) {
    println!("{}", line(Level::Success, message));
}

pub fn error(message: impl Display) {
    eprintln!("{}", line(Level::Error, message));
}
