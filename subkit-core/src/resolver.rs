//! Mismatch resolution: settle each conflicting dependency by adopting one
//! version, accepting the spread as allowed alternatives, or skipping it.

use std::collections::BTreeMap;
use std::fmt;

use crate::census::VersionUsageMap;
use crate::common_versions::CommonVersions;
use crate::context::RepoContext;
use crate::decision::{DecisionProvider, Question, ResolutionChoice, ResolutionPrompt};
use crate::error::{Error, Result};
use crate::manifest::PackageManifest;
use crate::mismatch::{project_mismatches, MismatchReport, MismatchSource};
use crate::registry::RushRegistry;
use crate::sync_reporter::SyncReporter;

/// Which projects a resolution may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionScope {
    /// Every project of the subspace.
    Subspace,
    /// Only the named project.
    Project(String),
}

impl ResolutionScope {
    pub fn project(&self) -> Option<&str> {
        match self {
            ResolutionScope::Subspace => None,
            ResolutionScope::Project(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionAction {
    /// Rewrite manifests to an offered version.
    Adopt(String),
    /// Rewrite manifests to a typed version.
    Manual(String),
    /// Record the versions in use as allowed alternatives.
    AcceptAlternative,
    Skip,
}

/// Per-dependency state within one session. Every state but `Pending` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Pending,
    Adopted,
    Skipped,
    AlternativeAccepted,
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionState::Pending => "pending",
            ResolutionState::Adopted => "adopted",
            ResolutionState::Skipped => "skipped",
            ResolutionState::AlternativeAccepted => "accepted as alternative",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOutcome {
    pub dependency: String,
    pub action: ResolutionAction,
    pub state: ResolutionState,
    /// Projects whose manifest was rewritten.
    pub updated: Vec<String>,
    /// Projects that should have been rewritten but could not be.
    pub skipped: Vec<String>,
    /// Versions newly recorded as allowed alternatives.
    pub alternatives_added: Vec<String>,
}

/// Result of an interactive session over a mismatch report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub outcomes: Vec<ResolutionOutcome>,
    /// Dependencies whose resolution failed, with the error message.
    pub failed: Vec<(String, String)>,
    /// Dependencies left pending when the session stopped.
    pub unresolved: Vec<String>,
}

impl SessionSummary {
    pub fn updated_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.updated.len()).sum()
    }
}

pub struct MismatchResolver<'a> {
    ctx: &'a RepoContext,
    subspace: String,
    scope: ResolutionScope,
    reporter: &'a dyn SyncReporter,
    states: BTreeMap<String, ResolutionState>,
}

impl<'a> MismatchResolver<'a> {
    pub fn new(
        ctx: &'a RepoContext,
        subspace: impl Into<String>,
        scope: ResolutionScope,
        reporter: &'a dyn SyncReporter,
    ) -> Self {
        Self {
            ctx,
            subspace: subspace.into(),
            scope,
            reporter,
            states: BTreeMap::new(),
        }
    }

    pub fn scope(&self) -> &ResolutionScope {
        &self.scope
    }

    pub fn state(&self, dependency: &str) -> ResolutionState {
        self.states.get(dependency).copied().unwrap_or_default()
    }

    /// Projects whose manifest adopting `version` would rewrite.
    pub fn plan_rewrites(&self, usage: &VersionUsageMap, version: &str) -> Vec<String> {
        usage
            .iter()
            .filter(|(used, _)| *used != version)
            .flat_map(|(_, projects)| projects.iter())
            .filter(|project| self.scope.project().map_or(true, |only| only == project.as_str()))
            .cloned()
            .collect()
    }

    /// Asks `decisions` how to settle `dependency`.
    pub fn decide(
        &self,
        dependency: &str,
        usage: &VersionUsageMap,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<ResolutionAction> {
        let path = self.ctx.common_versions_path(&self.subspace);
        let common = CommonVersions::load_or_default(&path)?;
        let prompt = ResolutionPrompt::build(
            dependency,
            usage,
            common.alternatives(dependency),
            self.scope.project(),
        );

        Ok(match decisions.choose_resolution(&prompt)? {
            ResolutionChoice::Adopt(version) => ResolutionAction::Adopt(version),
            ResolutionChoice::EnterManually => {
                let version = decisions.enter_version(&prompt)?;
                let version = version.trim();
                if version.is_empty() {
                    return Err(Error::EmptyVersion(dependency.to_string()));
                }
                ResolutionAction::Manual(version.to_string())
            }
            ResolutionChoice::AcceptAlternative => ResolutionAction::AcceptAlternative,
            ResolutionChoice::Skip => ResolutionAction::Skip,
        })
    }

    /// Carries out `action` for `dependency` and moves it out of `Pending`.
    pub fn apply(
        &mut self,
        dependency: &str,
        usage: &VersionUsageMap,
        action: ResolutionAction,
    ) -> Result<ResolutionOutcome> {
        let state = self.state(dependency);
        if state != ResolutionState::Pending {
            return Err(Error::AlreadyResolved {
                dependency: dependency.to_string(),
                state: state.to_string(),
            });
        }

        let mut outcome = ResolutionOutcome {
            dependency: dependency.to_string(),
            action: action.clone(),
            state: ResolutionState::Pending,
            updated: Vec::new(),
            skipped: Vec::new(),
            alternatives_added: Vec::new(),
        };

        match &action {
            ResolutionAction::Adopt(version) | ResolutionAction::Manual(version) => {
                let targets = self.plan_rewrites(usage, version);
                self.rewrite(dependency, usage, version, &targets, &mut outcome)?;
                if matches!(action, ResolutionAction::Manual(_)) && self.scope.project().is_some() {
                    self.record_alternatives(dependency, &[version.clone()], &mut outcome)?;
                }
                outcome.state = ResolutionState::Adopted;
            }
            ResolutionAction::AcceptAlternative => {
                let versions: Vec<String> = match self.scope.project() {
                    Some(project) => usage
                        .version_of(project)
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    None => usage.versions().map(str::to_string).collect(),
                };
                self.record_alternatives(dependency, &versions, &mut outcome)?;
                outcome.state = ResolutionState::AlternativeAccepted;
            }
            ResolutionAction::Skip => {
                tracing::info!("Skipped {}", dependency);
                outcome.state = ResolutionState::Skipped;
            }
        }

        self.states.insert(dependency.to_string(), outcome.state);
        Ok(outcome)
    }

    /// [`decide`](Self::decide) followed by [`apply`](Self::apply).
    pub fn resolve(
        &mut self,
        dependency: &str,
        usage: &VersionUsageMap,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<ResolutionOutcome> {
        let action = self.decide(dependency, usage, decisions)?;
        self.apply(dependency, usage, action)
    }

    /// Lets `decisions` walk through `report` one dependency at a time until
    /// nothing is pending or the user stops.
    pub fn run(
        &mut self,
        report: &MismatchReport,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        let mut pending: Vec<String> = report
            .keys()
            .filter(|dependency| self.state(dependency) == ResolutionState::Pending)
            .cloned()
            .collect();

        while !pending.is_empty() {
            let dependency = decisions.select_dependency(&pending)?;
            let Some(index) = pending.iter().position(|d| *d == dependency) else {
                return Err(Error::Decision(format!("{} is not a pending dependency", dependency)));
            };
            pending.remove(index);

            let Some(usage) = report.get(&dependency) else {
                continue;
            };
            match self.resolve(&dependency, usage, decisions) {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(e) if e.is_recoverable() => {
                    tracing::error!("Failed to resolve {}: {}", dependency, e);
                    summary.failed.push((dependency.clone(), e.to_string()));
                }
                Err(e) => return Err(e),
            }

            if pending.is_empty()
                || !decisions.confirm(&Question::NextDependency {
                    remaining: pending.len(),
                })?
            {
                break;
            }
        }

        summary.unresolved = pending;
        Ok(summary)
    }

    fn rewrite(
        &self,
        dependency: &str,
        usage: &VersionUsageMap,
        version: &str,
        targets: &[String],
        outcome: &mut ResolutionOutcome,
    ) -> Result<()> {
        if targets.is_empty() {
            return Ok(());
        }
        let registry = RushRegistry::load(self.ctx)?;

        for project in targets {
            let Some(entry) = registry.project(project) else {
                tracing::warn!("{} is no longer registered, skipping", project);
                self.reporter
                    .report_skipped(project, dependency, "project no longer registered");
                outcome.skipped.push(project.clone());
                continue;
            };

            let mut manifest = match PackageManifest::load_for(self.ctx, entry) {
                Ok(manifest) => manifest,
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Cannot update {}: {}", project, e);
                    self.reporter.report_skipped(project, dependency, &e.to_string());
                    outcome.skipped.push(project.clone());
                    continue;
                }
                Err(e) => return Err(e),
            };

            if manifest.set_version(dependency, version) {
                manifest.save()?;
                let old = usage.version_of(project).unwrap_or_default();
                tracing::debug!("{}: {} {} -> {}", project, dependency, old, version);
                self.reporter.report_update(project, dependency, old, version);
                outcome.updated.push(project.clone());
            }
        }
        Ok(())
    }

    fn record_alternatives(
        &self,
        dependency: &str,
        versions: &[String],
        outcome: &mut ResolutionOutcome,
    ) -> Result<()> {
        let path = self.ctx.common_versions_path(&self.subspace);
        let mut common = CommonVersions::load_or_default(&path)?;
        let before: Vec<String> = common.alternatives(dependency).to_vec();

        if common.add_alternatives(dependency, versions) {
            common.save(&path)?;
            let added: Vec<String> = versions
                .iter()
                .filter(|v| !before.contains(v))
                .cloned()
                .collect();
            self.reporter
                .report_alternatives(&self.subspace, dependency, &added);
            outcome.alternatives_added = added;
        }
        Ok(())
    }
}

/// Resolves every mismatch of `subspace`.
pub fn sync_subspace(
    ctx: &RepoContext,
    subspace: &str,
    source: &dyn MismatchSource,
    decisions: &mut dyn DecisionProvider,
    reporter: &dyn SyncReporter,
) -> Result<SessionSummary> {
    let report = source.mismatches(ctx, subspace)?;
    tracing::info!("{} mismatched dependencies in {}", report.len(), subspace);
    MismatchResolver::new(ctx, subspace, ResolutionScope::Subspace, reporter)
        .run(&report, decisions)
}

/// Resolves the mismatches `project` takes part in, touching only its
/// manifest.
pub fn sync_project(
    ctx: &RepoContext,
    project: &str,
    subspace: &str,
    source: &dyn MismatchSource,
    decisions: &mut dyn DecisionProvider,
    reporter: &dyn SyncReporter,
) -> Result<SessionSummary> {
    RushRegistry::load(ctx)?.require_project(project)?;
    let report = project_mismatches(&source.mismatches(ctx, subspace)?, project);
    tracing::info!(
        "{} mismatched dependencies for {} in {}",
        report.len(),
        project,
        subspace
    );
    MismatchResolver::new(
        ctx,
        subspace,
        ResolutionScope::Project(project.to_string()),
        reporter,
    )
    .run(&report, decisions)
}
