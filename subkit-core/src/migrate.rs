//! Subspace migration: move a project into a subspace, carry its
//! configuration along and settle its dependency versions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::context::{RepoContext, LEGACY_FRAGMENT_DIR};
use crate::decision::{DecisionProvider, Question};
use crate::error::{Error, Result};
use crate::fragment::{merge_fragment, FragmentConflict};
use crate::mismatch::MismatchSource;
use crate::registry::{ProjectEntry, RushRegistry};
use crate::resolver::{sync_project, SessionSummary};
use crate::subspace::ensure_subspace;
use crate::sync_reporter::SyncReporter;

/// What happened to one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub project: String,
    pub subspace: String,
    pub success: bool,
    /// Folder of the project after the migration, relative to the target root.
    pub project_folder: Option<String>,
    pub merge_conflict: bool,
    pub conflicts: Vec<FragmentConflict>,
    /// Non-fatal problems worth showing to the user.
    pub warnings: Vec<String>,
    pub resolution: Option<SessionSummary>,
    pub error: Option<String>,
}

impl MigrationOutcome {
    fn failed(project: &str, subspace: &str, error: &Error) -> Self {
        Self {
            project: project.to_string(),
            subspace: subspace.to_string(),
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

struct Relocation {
    from: PathBuf,
    to: PathBuf,
    folder: String,
}

pub struct MigrationOrchestrator<'a> {
    source: &'a RepoContext,
    target: &'a RepoContext,
    mismatches: &'a dyn MismatchSource,
    reporter: &'a dyn SyncReporter,
}

impl<'a> MigrationOrchestrator<'a> {
    /// Migrates within `target`.
    pub fn new(
        target: &'a RepoContext,
        mismatches: &'a dyn MismatchSource,
        reporter: &'a dyn SyncReporter,
    ) -> Self {
        Self {
            source: target,
            target,
            mismatches,
            reporter,
        }
    }

    /// Pulls projects from another repository.
    pub fn with_source(mut self, source: &'a RepoContext) -> Self {
        self.source = source;
        self
    }

    fn is_external(&self) -> bool {
        !self.source.same_repo(self.target)
    }

    /// Projects of the source repository not yet in `subspace`.
    pub fn candidates(&self, subspace: &str) -> Result<Vec<ProjectEntry>> {
        let registry = RushRegistry::load(self.source)?;
        let external = self.is_external();
        Ok(registry
            .projects
            .into_iter()
            .filter(|p| external || !p.in_subspace(subspace) || p.subspace_name.is_none())
            .collect())
    }

    /// Migrates `project` into `subspace`, reporting failures in the outcome
    /// instead of returning them.
    pub fn migrate(
        &self,
        project: &str,
        subspace: &str,
        decisions: &mut dyn DecisionProvider,
    ) -> MigrationOutcome {
        match self.try_migrate(project, subspace, decisions) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Failed to migrate {} into {}: {}", project, subspace, e);
                MigrationOutcome::failed(project, subspace, &e)
            }
        }
    }

    /// Migrates each project in turn; one failure does not stop the rest.
    pub fn migrate_all(
        &self,
        projects: &[String],
        subspace: &str,
        decisions: &mut dyn DecisionProvider,
    ) -> Vec<MigrationOutcome> {
        projects
            .iter()
            .map(|project| self.migrate(project, subspace, decisions))
            .collect()
    }

    pub fn try_migrate(
        &self,
        project: &str,
        subspace: &str,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<MigrationOutcome> {
        let entry = RushRegistry::load(self.source)?
            .require_project(project)?
            .clone();
        let source_dir = self.source.project_dir(&entry.project_folder);
        if !source_dir.is_dir() {
            return Err(Error::ProjectFolderMissing(source_dir));
        }
        tracing::info!("Migrating {} into subspace {}", project, subspace);

        let relocation = self.relocate(&entry, subspace, decisions)?;
        let folder = relocation
            .as_ref()
            .map(|r| r.folder.clone())
            .unwrap_or_else(|| entry.project_folder.clone());

        let mut outcome = MigrationOutcome {
            project: project.to_string(),
            subspace: subspace.to_string(),
            project_folder: Some(folder.clone()),
            ..MigrationOutcome::default()
        };

        if let Err(e) = self.commit(&entry, &folder, subspace, &mut outcome) {
            if let Some(relocation) = &relocation {
                match move_dir(&relocation.to, &relocation.from) {
                    Ok(()) => tracing::info!(
                        "Moved {} back to {}",
                        project,
                        relocation.from.display()
                    ),
                    Err(undo) => tracing::error!(
                        "Could not move {} back to {}: {}",
                        relocation.to.display(),
                        relocation.from.display(),
                        undo
                    ),
                }
            }
            return Err(e);
        }
        outcome.success = true;

        match sync_project(
            self.target,
            project,
            subspace,
            self.mismatches,
            decisions,
            self.reporter,
        ) {
            Ok(summary) => outcome.resolution = Some(summary),
            Err(e) => {
                tracing::warn!("Version sync for {} did not finish: {}", project, e);
                outcome
                    .warnings
                    .push(format!("version sync did not finish: {}", e));
            }
        }

        Ok(outcome)
    }

    /// Asks whether and where to move the project folder, then moves it.
    /// Projects arriving from another repository always move.
    fn relocate(
        &self,
        entry: &ProjectEntry,
        subspace: &str,
        decisions: &mut dyn DecisionProvider,
    ) -> Result<Option<Relocation>> {
        let external = self.is_external();
        if !external
            && !decisions.confirm(&Question::RelocateProject {
                project: entry.package_name.clone(),
                subspace: subspace.to_string(),
            })?
        {
            return Ok(None);
        }

        let suggested = self
            .target
            .relocation_folder(subspace, &entry.project_folder);
        let answer = decisions.enter_project_folder(&entry.package_name, &suggested)?;
        let folder = match answer.trim().trim_matches('/') {
            "" => suggested,
            folder => folder.to_string(),
        };
        if !external && folder == entry.project_folder {
            return Ok(None);
        }

        let from = self.source.project_dir(&entry.project_folder);
        let to = self.target.project_dir(&folder);
        if to.exists() {
            return Err(Error::DestinationExists(to));
        }
        move_dir(&from, &to)?;
        tracing::info!("Moved {} to {}", entry.package_name, to.display());
        Ok(Some(Relocation { from, to, folder }))
    }

    /// Drops the project from the source registry, then saves the target
    /// registry. A failed target save puts the source registry back, so the
    /// project stays registered in exactly one repository.
    fn transfer_registration(&self, project: &str, target: &RushRegistry) -> Result<()> {
        let original = RushRegistry::load(self.source)?;
        let mut source_registry = original.clone();
        if source_registry.remove(project).is_some() {
            source_registry.save(self.source)?;
        }

        if let Err(e) = target.save(self.target) {
            match original.save(self.source) {
                Ok(()) => tracing::info!("Restored {} in the source registry", project),
                Err(undo) => tracing::error!(
                    "Could not restore {} in the source registry: {}",
                    project,
                    undo
                ),
            }
            return Err(e);
        }
        Ok(())
    }

    /// Everything that must succeed for the move to stick: the target
    /// subspace exists, configuration is merged and the registry points at
    /// the new home.
    fn commit(
        &self,
        entry: &ProjectEntry,
        folder: &str,
        subspace: &str,
        outcome: &mut MigrationOutcome,
    ) -> Result<()> {
        let external = self.is_external();
        ensure_subspace(self.target, subspace)?;
        let target_dir = self.target.subspace_dir(subspace);
        let mut embedded = None;

        if let Some(previous) = &entry.subspace_name {
            let legacy = self.target.legacy_fragment_dir(folder, previous);
            let fragment = if legacy.is_dir() {
                Some(legacy)
            } else if external || previous != subspace {
                Some(self.source.subspace_dir(previous)).filter(|dir| dir.is_dir())
            } else {
                None
            };

            if let Some(fragment) = fragment {
                let merge = merge_fragment(&fragment, &target_dir, &entry.package_name)?;
                outcome.merge_conflict |= merge.has_conflicts();
                outcome.conflicts.extend(merge.conflicts);
                if fragment.starts_with(self.target.project_dir(folder)) {
                    embedded = Some(self.target.project_dir(folder).join(LEGACY_FRAGMENT_DIR));
                }
            }
        }

        let mut registry = RushRegistry::load(self.target)?;
        registry.assign(entry, folder, subspace);
        if external {
            self.transfer_registration(&entry.package_name, &registry)?;
        } else {
            registry.save(self.target)?;
        }

        // The legacy fragment has been folded in; drop it only once the
        // registry points at the new subspace.
        if let Some(embedded) = embedded {
            match fs::remove_dir_all(&embedded) {
                Ok(()) => tracing::debug!("Removed legacy fragment {}", embedded.display()),
                Err(e) => outcome.warnings.push(format!(
                    "could not remove legacy fragment {}: {}",
                    embedded.display(),
                    e
                )),
            }
        }

        if let Some(previous) = entry
            .subspace_name
            .as_deref()
            .filter(|p| !external && *p != subspace)
        {
            if registry.projects_in_subspace(previous).next().is_none() {
                tracing::warn!("Subspace {} no longer has any projects", previous);
                outcome
                    .warnings
                    .push(format!("subspace {} no longer has any projects", previous));
            }
        }

        Ok(())
    }
}

/// Renames `from` to `to`, falling back to copy-and-delete across devices.
fn move_dir(from: &Path, to: &Path) -> Result<()> {
    let file_err = |path: &Path, source: io::Error| Error::File {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| file_err(parent, e))?;
    }
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        let dest = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| file_err(&dest, e))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| file_err(&dest, e))?;
        }
    }
    fs::remove_dir_all(from).map_err(|e| file_err(from, e))
}
