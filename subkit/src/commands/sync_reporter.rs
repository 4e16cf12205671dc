//! Sync reporter implementation for CLI.

use owo_colors::OwoColorize;
use subkit_core::SyncReporter;

use crate::formatting::Status;

/// Prints each manifest rewrite as it happens.
pub struct CliSyncReporter;

impl SyncReporter for CliSyncReporter {
    fn report_update(&self, project: &str, dependency: &str, old: &str, new: &str) {
        println!(
            "  {} {} {} {} → {}",
            Status::Success.colored_symbol(),
            project.bold().white(),
            dependency,
            old.bright_black(),
            new.cyan()
        );
    }

    fn report_alternatives(&self, subspace: &str, dependency: &str, versions: &[String]) {
        println!(
            "  {} {} allows {} in {}",
            Status::Info.colored_symbol(),
            dependency.bold().white(),
            versions.join(", ").cyan(),
            subspace
        );
    }

    fn report_skipped(&self, project: &str, dependency: &str, reason: &str) {
        println!(
            "  {} {} {} left as is: {}",
            Status::Warning.colored_symbol(),
            project.bold().white(),
            dependency,
            reason.bright_black()
        );
    }
}
