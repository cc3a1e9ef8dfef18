//! Formatting functions for operator narration.
//!
//! Narration goes to stdout, problems to stderr. Diagnostics for developers
//! go through `tracing` instead.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::error::TaggerError;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a fatal error, with the failing command and its stderr when there is one.
pub fn display_failure(err: &TaggerError) {
    match err {
        TaggerError::CommandFailed {
            command, stderr, ..
        } => {
            display_error(&err.to_string());
            eprintln!("  {} {}", style("command:").dim(), style(command).cyan());
            for line in stderr.lines() {
                eprintln!("  {} {}", style("|").dim(), line);
            }
        }
        _ => display_error(&err.to_string()),
    }
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a step heading.
pub fn display_section(title: &str) {
    println!("\n{}", style(title).bold().underlined());
}

/// Print an informational note, e.g. an expected absence.
pub fn display_note(message: &str) {
    println!("{} {}", style("!").cyan(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Show where the release ended up.
pub fn display_release_summary(tag: &str, release_id: u64, archive: &str) {
    println!("\n{}", style(format!("Released {}", tag)).green().bold());
    println!("  release id: {}", release_id);
    println!("  archive:    {}", archive);
}
