use std::sync::atomic::{AtomicBool, Ordering};

use console::{Style, Term, style};
use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_OFF_FLAGS: [&str; 2] = ["--json", "--ndjson"];

static SPINNERS_DISABLED: AtomicBool = AtomicBool::new(false);

pub fn heading(text: &str) {
    println!("{}", style(text).bold().cyan());
}

pub fn info(text: &str) {
    println!("{}", text);
}

pub fn success(text: &str) {
    println!("{} {}", style("✓").green(), text);
}

pub fn warn(text: &str) {
    eprintln!("{}", style(text).yellow());
}

pub fn error(text: &str) {
    eprintln!("{}", style(text).red());
}

pub fn list_item(text: &str) {
    println!("  {} {}", style("-").dim(), text);
}

pub fn dim(text: &str) -> String {
    style(text).dim().to_string()
}

pub fn bold(text: &str) -> String {
    style(text).bold().to_string()
}

/// Styles for the recurring parts of Twist output.
pub fn author() -> Style {
    Style::new().cyan()
}

pub fn channel() -> Style {
    Style::new().blue()
}

/// `id:N`, dimmed.
pub fn id_tag(id: u64) -> String {
    dim(&format!("id:{id}"))
}

/// A centered label inside a 60 column rule.
pub fn separator(label: &str) {
    let total = 60usize;
    let padded = format!(" {label} ");
    let remaining = total.saturating_sub(padded.chars().count());
    let left = remaining / 2;
    let right = remaining - left;
    println!();
    println!("{}", dim(&format!("{}{padded}{}", "─".repeat(left), "─".repeat(right))));
    println!();
}

pub fn pluralize(count: usize, singular: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        format!("{singular}s")
    }
}

/// Turns spinners off for the rest of the process (`--no-spinner`).
pub fn disable_spinners() {
    SPINNERS_DISABLED.store(true, Ordering::Relaxed);
}

/// Spinners stay off after `disable_spinners`, for machine-readable output,
/// in CI, when `TW_SPINNER=false`, and when stdout is not a terminal.
pub fn spinners_enabled() -> bool {
    if SPINNERS_DISABLED.load(Ordering::Relaxed) {
        return false;
    }
    if std::env::var("TW_SPINNER").is_ok_and(|v| v == "false") || std::env::var_os("CI").is_some()
    {
        return false;
    }
    let disabled_by_flag = std::env::args().any(|arg| {
        SPINNER_OFF_FLAGS
            .iter()
            .any(|flag| arg == *flag || arg.starts_with(&format!("{flag}=")))
    });
    !disabled_by_flag && Term::stdout().is_term()
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = if spinners_enabled() {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes_counts() {
        assert_eq!(pluralize(1, "comment"), "comment");
        assert_eq!(pluralize(0, "comment"), "comments");
        assert_eq!(pluralize(3, "comment"), "comments");
    }

    #[test]
    fn disabling_spinners_sticks() {
        disable_spinners();
        assert!(!spinners_enabled());
        assert!(spinner("Loading...").is_hidden());
    }
}
