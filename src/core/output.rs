//! Unified output formatting utilities for consistent CLI presentation.
//!
//! Every git-deck subcommand prints through these helpers so errors, confirmations and
//! listings share one color scheme: red for errors, green for success, yellow for
//! changed files and bright_black for secondary detail.

use crate::core::file_status::FileStatus;
use crate::core::log_parser::CommitRecord;
use colored::*;

/// `✕ Error: <message>` on stderr, padded with blank lines.
pub fn print_error(message: &str) {
    eprintln!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// `✓ <message>` with a blank line before it.
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Secondary text such as git's raw output under a success line.
pub fn print_detail(message: &str) {
    for line in message.lines() {
        println!("  {}", line.bright_black());
    }
}

/// `<header>:` between blank lines.
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// One line of the changed or staged list.
pub fn print_file_line(status: FileStatus, path: &str) {
    println!("  {} {}", status_label(status), path.white());
}

/// Fixed-width status tag colored by status.
pub fn status_label(status: FileStatus) -> ColoredString {
    let label = format!("{:<9}", status.as_str());
    match status {
        FileStatus::Changed => label.yellow(),
        FileStatus::Staged => label.green(),
        FileStatus::Unchanged => label.bright_black(),
    }
}

/// `hash  timestamp  author  message`, hash in yellow.
pub fn print_commit_line(commit: &CommitRecord) {
    println!(
        "  {} {} {} {}",
        commit.hash.yellow(),
        commit.timestamp.bright_black(),
        commit.author.blue(),
        commit.message.white()
    );
}
