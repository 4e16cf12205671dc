//! Keeping dependency versions consistent within a subspace.

use anyhow::Result;
use subkit_core::{
    sync_project, sync_subspace, AlternativeReducer, CensusMismatchSource, RepoContext,
    ResolutionState, RushRegistry, SessionSummary,
};

use crate::formatting::{
    print_alternatives_table, print_error, print_info, print_outcome_table, print_section_header,
    print_section_header_with_subtitle, print_success, print_warning, SectionStyle,
};

use super::sync_reporter::CliSyncReporter;
use super::{decision_provider, require_subspaces, resolve_subspace};

pub fn cmd_sync(
    ctx: &RepoContext,
    subspace: Option<String>,
    project: Option<String>,
    yes: bool,
) -> Result<()> {
    require_subspaces(ctx)?;
    let reporter = CliSyncReporter;
    let mut decisions = decision_provider(yes);

    let summary = match project {
        Some(project) => {
            let subspace = match subspace {
                Some(subspace) => subspace,
                None => RushRegistry::load(ctx)?
                    .require_project(&project)?
                    .subspace()
                    .to_string(),
            };
            print_section_header_with_subtitle(
                "Sync versions",
                &format!("{} in {}", project, subspace),
                SectionStyle::Primary,
            );
            sync_project(
                ctx,
                &project,
                &subspace,
                &CensusMismatchSource,
                decisions.as_mut(),
                &reporter,
            )?
        }
        None => {
            let subspace = resolve_subspace(ctx, subspace, false)?;
            print_section_header_with_subtitle(
                "Sync versions",
                &format!("subspace {}", subspace),
                SectionStyle::Primary,
            );
            sync_subspace(
                ctx,
                &subspace,
                &CensusMismatchSource,
                decisions.as_mut(),
                &reporter,
            )?
        }
    };

    print_session_summary(&summary);
    println!();
    Ok(())
}

pub(super) fn print_session_summary(summary: &SessionSummary) {
    if summary.outcomes.is_empty() && summary.failed.is_empty() && summary.unresolved.is_empty() {
        print_success("No mismatched dependencies");
        return;
    }

    if !summary.outcomes.is_empty() {
        let rows: Vec<(String, String, Vec<String>)> = summary
            .outcomes
            .iter()
            .map(|o| {
                let result = match (&o.state, o.alternatives_added.is_empty()) {
                    (ResolutionState::AlternativeAccepted, false) => {
                        format!("{} ({})", o.state, o.alternatives_added.join(", "))
                    }
                    _ => o.state.to_string(),
                };
                (o.dependency.clone(), result, o.updated.clone())
            })
            .collect();
        print_outcome_table(&rows);
    }
    for (dependency, message) in &summary.failed {
        print_error(&format!("{}: {}", dependency, message));
    }
    if !summary.unresolved.is_empty() {
        print_warning(&format!("Left unresolved: {}", summary.unresolved.join(", ")));
    }
    print_info(&format!("{} manifests updated", summary.updated_count()));
}

pub fn cmd_clean(ctx: &RepoContext, subspace: Option<String>, dry_run: bool) -> Result<()> {
    require_subspaces(ctx)?;
    let subspace = resolve_subspace(ctx, subspace, false)?;
    let reducer = AlternativeReducer::new(ctx);
    let plan = reducer.plan(&subspace)?;

    if dry_run {
        print_section_header("Allowed alternatives (Dry Run)", SectionStyle::Warning);
    } else {
        print_section_header("Allowed alternatives", SectionStyle::Primary);
    }

    if plan.is_empty() {
        print_success(&format!("Allowed alternatives of {} are already minimal", subspace));
        println!();
        return Ok(());
    }

    let rows: Vec<(String, Vec<String>, Vec<String>)> = plan
        .changes
        .iter()
        .map(|c| (c.dependency.clone(), c.before.clone(), c.after.clone()))
        .collect();
    print_alternatives_table(&rows);
    println!();

    if dry_run {
        print_info("Nothing written");
    } else if reducer.apply(&subspace, &plan)? {
        print_success(&format!("Updated common-versions.json of {}", subspace));
    }
    println!();

    Ok(())
}
