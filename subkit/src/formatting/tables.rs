//! Table formatting utilities using comfy-table.

use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(*h).add_attribute(comfy_table::Attribute::Bold))
                .collect::<Vec<_>>(),
        )
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".bright_black().to_string()
    } else {
        items.join(", ")
    }
}

/// Prints dependency usage: one row per specifier, grouped by dependency.
pub fn print_census_table(rows: &[(String, Vec<(String, Vec<String>)>)]) {
    let mut table = styled_table(&["Dependency", "Version", "Projects"]);
    for (dependency, versions) in rows {
        for (i, (version, projects)) in versions.iter().enumerate() {
            let name = if i == 0 { dependency.as_str() } else { "" };
            table.add_row(vec![
                Cell::new(name).fg(Color::White),
                Cell::new(version).fg(Color::Cyan),
                Cell::new(projects.join(", ")),
            ]);
        }
    }
    println!("{}", table);
}

/// Prints allowed alternative versions before and after reduction.
pub fn print_alternatives_table(changes: &[(String, Vec<String>, Vec<String>)]) {
    let mut table = styled_table(&["Dependency", "Before", "After"]);
    for (dependency, before, after) in changes {
        table.add_row(vec![
            Cell::new(dependency).fg(Color::White),
            Cell::new(before.join(", ")).fg(Color::DarkGrey),
            Cell::new(list_or_none(after)).fg(Color::Green),
        ]);
    }
    println!("{}", table);
}

/// Prints each resolved dependency with its result and rewritten projects.
pub fn print_outcome_table(outcomes: &[(String, String, Vec<String>)]) {
    let mut table = styled_table(&["Dependency", "Result", "Updated"]);
    for (dependency, result, updated) in outcomes {
        table.add_row(vec![
            Cell::new(dependency).fg(Color::White),
            Cell::new(result).fg(Color::Cyan),
            Cell::new(list_or_none(updated)),
        ]);
    }
    println!("{}", table);
}

/// Prints the specifiers a project would bring into conflict.
pub fn print_conflict_table(conflicts: &[(String, Vec<String>)]) {
    let mut table = styled_table(&["Dependency", "Conflicting versions"]);
    for (dependency, versions) in conflicts {
        table.add_row(vec![
            Cell::new(dependency).fg(Color::White),
            Cell::new(versions.join(", ")).fg(Color::Yellow),
        ]);
    }
    println!("{}", table);
}
