use colored::Colorize;
use std::fmt;

use crate::backup::{BackupStatus, StatusKind};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

fn build_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "SUCCESS",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
        MessageKind::Section => "",
    }
}

/// Formats `message` with its label and colour.
pub fn styled(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{}: {}", build_label(kind), text),
    };
    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info => base,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = styled(kind, message);
    match kind {
        MessageKind::Error => eprintln!("{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn status_kind(status: &BackupStatus) -> MessageKind {
    match status.kind {
        StatusKind::Success => MessageKind::Success,
        StatusKind::Error => MessageKind::Error,
        StatusKind::Info => MessageKind::Info,
    }
}

/// `$1234.50`, with the sign ahead of the symbol.
pub fn money(currency: &str, amount: f64) -> String {
    if amount < 0.0 {
        format!("-{}{:.2}", currency, amount.abs())
    } else {
        format!("{}{:.2}", currency, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_places_sign_first() {
        assert_eq!(money("$", 12.5), "$12.50");
        assert_eq!(money("$", -3.0), "-$3.00");
    }

    #[test]
    fn labels_prefix_messages() {
        colored::control::set_override(false);
        assert_eq!(styled(MessageKind::Error, "boom"), "ERROR: boom");
        assert_eq!(styled(MessageKind::Section, " Budgets "), "=== Budgets ===");
    }
}
