//! Read-only inspection commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;
use subkit_core::context::DEFAULT_SUBSPACE;
use subkit_core::{
    build_census, ConflictReport, ProjectGraph, RepoContext, RushRegistry, TreeDirection,
    TreeNode, VersionUsageMap,
};

use crate::formatting::{
    print_census_table, print_conflict_table, print_key_value, print_section_header,
    print_separator_with_spacing, print_success, print_warning, SectionStyle,
};

use super::resolve_subspace;

pub fn cmd_census(
    ctx: &RepoContext,
    subspace: Option<String>,
    all: bool,
    json: bool,
) -> Result<()> {
    let subspace = subspace.unwrap_or_else(|| DEFAULT_SUBSPACE.to_string());
    let census = build_census(ctx, &subspace)?;
    let shown: BTreeMap<&str, &VersionUsageMap> = if all {
        census
            .dependencies()
            .iter()
            .map(|(name, usage)| (name.as_str(), usage))
            .collect()
    } else {
        census.multi_version().collect()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    let title = if all { "Dependencies" } else { "Dependencies with several versions" };
    print_section_header(&format!("{} in {}", title, subspace), SectionStyle::Primary);
    if shown.is_empty() {
        print_success("Every dependency uses a single version");
    } else {
        let rows: Vec<(String, Vec<(String, Vec<String>)>)> = shown
            .iter()
            .map(|(name, usage)| {
                let versions = usage
                    .sorted_versions()
                    .into_iter()
                    .map(|version| {
                        let projects = usage
                            .projects(&version)
                            .into_iter()
                            .map(str::to_string)
                            .collect();
                        (version, projects)
                    })
                    .collect();
                (name.to_string(), versions)
            })
            .collect();
        print_census_table(&rows);
    }
    for issue in census.issues() {
        print_warning(&format!("{}: {}", issue.project, issue.message));
    }
    println!();

    Ok(())
}

pub fn cmd_analyze(
    ctx: &RepoContext,
    project: String,
    subspace: Option<String>,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let registry = RushRegistry::load(ctx)?;
    registry.require_project(&project)?;
    let subspace = resolve_subspace(ctx, subspace, false)?;
    let report = ConflictReport::build(ctx, &registry, &project, &subspace)?;
    let path = output.unwrap_or_else(|| ctx.report_path());
    report.save(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_section_header(
        &format!("Conflicts of {} with {}", project, subspace),
        SectionStyle::Primary,
    );
    if report.is_empty() {
        print_success("No conflicting versions");
    } else {
        let rows: Vec<(String, Vec<String>)> = report
            .conflicting_versions
            .iter()
            .map(|(dependency, versions)| (dependency.clone(), versions.clone()))
            .collect();
        print_conflict_table(&rows);
    }
    print_separator_with_spacing();
    print_key_value("Report", &path.display().to_string());
    println!();

    Ok(())
}

pub fn cmd_graph(
    ctx: &RepoContext,
    project: String,
    from: bool,
    filter: Option<String>,
) -> Result<()> {
    let registry = RushRegistry::load(ctx)?;
    let graph = ProjectGraph::load(ctx, &registry);
    let direction = if from { TreeDirection::From } else { TreeDirection::To };
    let tree = graph.tree(&project, direction, filter.as_deref())?;

    let label = |node: &TreeNode| {
        if node.circular {
            format!("{} {}", node.name, "(circular)".yellow())
        } else {
            node.name.clone()
        }
    };
    print!("{}", tree.render_with(&label));

    Ok(())
}
