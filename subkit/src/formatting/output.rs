//! General output formatting utilities.

use owo_colors::OwoColorize;

/// Prints a visual separator with spacing.
pub fn print_separator_with_spacing() {
    println!();
    println!("{}", "─".repeat(60).bright_black());
    println!();
}

/// Prints a summary box with statistics.
pub fn print_summary_box(title: &str, items: &[(&str, &str)]) {
    let title_colored = title.cyan().bold().to_string();
    let separator = "─".repeat(50);
    println!("┌─ {} {}", title_colored, separator.bright_black());
    for (key, value) in items {
        println!("│ {} {}", key.bright_black().bold(), value.bold().white());
    }
    println!("└{}", "─".repeat(60).bright_black());
}

/// Prints a key-value pair with consistent formatting.
pub fn print_key_value(key: &str, value: &str) {
    println!("  {} {}", key.bright_black().bold(), value.bold().white());
}
