//! Moving projects into a subspace.

use std::path::PathBuf;

use anyhow::{bail, Result};
use subkit_core::{CensusMismatchSource, MigrationOrchestrator, MigrationOutcome, RepoContext};

use crate::formatting::{
    print_error, print_key_value, print_section_header_with_subtitle, print_success,
    print_summary_box, print_warning, SectionStyle,
};
use crate::prompts::{confirm, select_project};

use super::sync_reporter::CliSyncReporter;
use super::{decision_provider, require_subspaces, resolve_subspace};
use super::versions::print_session_summary;

pub fn cmd_move(
    ctx: &RepoContext,
    source: Option<PathBuf>,
    subspace: Option<String>,
    projects: Vec<String>,
    yes: bool,
) -> Result<()> {
    require_subspaces(ctx)?;
    if yes && projects.is_empty() {
        bail!("--yes needs at least one --project");
    }
    let source = source.map(RepoContext::open).transpose()?;
    let subspace = resolve_subspace(ctx, subspace, true)?;

    let reporter = CliSyncReporter;
    let mut orchestrator = MigrationOrchestrator::new(ctx, &CensusMismatchSource, &reporter);
    if let Some(source) = &source {
        orchestrator = orchestrator.with_source(source);
    }
    let mut decisions = decision_provider(yes);

    let subtitle = match &source {
        Some(source) => format!("from {} into {}", source.root().display(), subspace),
        None => format!("into {}", subspace),
    };
    print_section_header_with_subtitle("Move projects", &subtitle, SectionStyle::Primary);

    let mut outcomes = Vec::new();
    if projects.is_empty() {
        loop {
            let candidates: Vec<String> = orchestrator
                .candidates(&subspace)?
                .into_iter()
                .map(|p| p.package_name)
                .collect();
            if candidates.is_empty() {
                print_warning("No projects left to move");
                break;
            }
            let project = select_project(candidates)?;
            let outcome = orchestrator.migrate(&project, &subspace, decisions.as_mut());
            print_outcome(&outcome);
            outcomes.push(outcome);
            if !confirm("Move another project?", false)? {
                break;
            }
        }
    } else {
        for project in &projects {
            let outcome = orchestrator.migrate(project, &subspace, decisions.as_mut());
            print_outcome(&outcome);
            outcomes.push(outcome);
        }
    }

    let moved = outcomes.iter().filter(|o| o.success).count();
    let failed = outcomes.len() - moved;
    let conflicts = outcomes.iter().filter(|o| o.merge_conflict).count();
    print_summary_box(
        "Migration",
        &[
            ("Moved", &moved.to_string()),
            ("Failed", &failed.to_string()),
            ("With merge conflicts", &conflicts.to_string()),
        ],
    );
    println!();

    if failed > 0 {
        bail!("{} of {} projects could not be moved", failed, outcomes.len());
    }
    Ok(())
}

fn print_outcome(outcome: &MigrationOutcome) {
    if !outcome.success {
        print_error(&format!(
            "{}: {}",
            outcome.project,
            outcome.error.as_deref().unwrap_or("migration failed")
        ));
        return;
    }

    print_success(&format!("Moved {} into {}", outcome.project, outcome.subspace));
    if let Some(folder) = &outcome.project_folder {
        print_key_value("Folder", folder);
    }
    for conflict in &outcome.conflicts {
        print_warning(&conflict.to_string());
    }
    for warning in &outcome.warnings {
        print_warning(warning);
    }
    if let Some(summary) = &outcome.resolution {
        print_session_summary(summary);
    }
    println!();
}
