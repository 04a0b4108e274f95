//! Output formatting helpers.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use securecloud_core::events::{Notification, Severity};
use securecloud_core::models::{AlertSeverity, Page};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print the pagination footer for a listing.
pub fn page_footer<T>(page: &Page<T>) {
    eprintln!();
    eprintln!(
        "{} {} of {} ({} total)",
        "Page".dimmed(),
        page.page,
        page.total_pages,
        page.total
    );
    if page.has_next() {
        eprintln!("{}: --page {}", "Next".dimmed(), page.page + 1);
    }
}

/// Severity label colored by urgency.
pub fn alert_severity(severity: AlertSeverity) -> ColoredString {
    let label = severity.as_str().to_uppercase();
    match severity {
        AlertSeverity::Critical => label.red().bold(),
        AlertSeverity::High => label.red(),
        AlertSeverity::Medium => label.yellow(),
        AlertSeverity::Low => label.cyan(),
        AlertSeverity::Info => label.dimmed(),
    }
}

/// Print a realtime notification as one line.
pub fn notification(n: &Notification) {
    let tag = match n.severity {
        Severity::Success => "OK".green(),
        Severity::Info => "INFO".blue(),
        Severity::Warning => "WARN".yellow(),
        Severity::Error => "ERROR".red(),
    };

    match &n.description {
        Some(description) => println!("{} {} {}", tag, n.title, description.dimmed()),
        None => println!("{} {}", tag, n.title),
    }
}
