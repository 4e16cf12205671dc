//! Repository context threaded through every operation.

use std::path::{Path, PathBuf};

use crate::config::SubkitConfig;
use crate::error::{Error, Result};

pub const RUSH_JSON: &str = "rush.json";
pub const PACKAGE_JSON: &str = "package.json";
pub const SUBSPACES_JSON: &str = "subspaces.json";
pub const COMMON_VERSIONS_JSON: &str = "common-versions.json";
pub const NPMRC: &str = ".npmrc";
pub const REPO_STATE_JSON: &str = "repo-state.json";
pub const PNPMFILE: &str = ".pnpmfile-subspace.cjs";
pub const DEFAULT_SUBSPACE: &str = "default";
/// Folder name of the per-project configuration fragments older tooling
/// embedded under each project.
pub const LEGACY_FRAGMENT_DIR: &str = "subspace";

/// A Rush repository: its root directory plus tool configuration.
///
/// Migration between repositories works with two contexts, one for the
/// source and one for the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    root: PathBuf,
    config: SubkitConfig,
}

impl RepoContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: SubkitConfig::default(),
        }
    }

    pub fn with_config(root: impl Into<PathBuf>, config: SubkitConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Opens the repository rooted at `root`, reading `subkit.toml` if present.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(RUSH_JSON).is_file() {
            return Err(Error::RootNotFound(root));
        }
        let config = SubkitConfig::load(&root)?;
        Ok(Self { root, config })
    }

    /// Finds the repository containing `start`.
    ///
    /// Walks up looking for `rush.json` and stops at the first `.git`
    /// boundary. When that fails, asks git for the enclosing work tree.
    pub fn discover(start: &Path) -> Result<Self> {
        let mut current = start;
        loop {
            if current.join(RUSH_JSON).is_file() {
                return Self::open(current);
            }
            if current.join(".git").exists() {
                break;
            }
            match current.parent() {
                Some(parent) if parent != current => current = parent,
                _ => break,
            }
        }

        let repo = git2::Repository::discover(start)?;
        match repo.workdir() {
            Some(workdir) if workdir.join(RUSH_JSON).is_file() => Self::open(workdir),
            _ => Err(Error::RootNotFound(start.to_path_buf())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SubkitConfig {
        &self.config
    }

    /// Whether `other` points at the same repository on disk.
    pub fn same_repo(&self, other: &RepoContext) -> bool {
        match (self.root.canonicalize(), other.root.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.root == other.root,
        }
    }

    pub fn rush_json_path(&self) -> PathBuf {
        self.root.join(RUSH_JSON)
    }

    pub fn subspaces_json_path(&self) -> PathBuf {
        self.root
            .join("common")
            .join("config")
            .join("rush")
            .join(SUBSPACES_JSON)
    }

    pub fn subspaces_dir(&self) -> PathBuf {
        self.root.join("common").join("config").join("subspaces")
    }

    pub fn subspace_dir(&self, subspace: &str) -> PathBuf {
        self.subspaces_dir().join(subspace)
    }

    pub fn common_versions_path(&self, subspace: &str) -> PathBuf {
        self.subspace_dir(subspace).join(COMMON_VERSIONS_JSON)
    }

    pub fn project_dir(&self, project_folder: &str) -> PathBuf {
        self.root.join(project_folder)
    }

    pub fn manifest_path(&self, project_folder: &str) -> PathBuf {
        self.project_dir(project_folder).join(PACKAGE_JSON)
    }

    pub fn legacy_fragment_dir(&self, project_folder: &str, subspace: &str) -> PathBuf {
        self.project_dir(project_folder)
            .join(LEGACY_FRAGMENT_DIR)
            .join(subspace)
    }

    /// Default relocation folder for a project moving into `subspace`,
    /// relative to the root and using forward slashes like `rush.json` does.
    pub fn relocation_folder(&self, subspace: &str, project_folder: &str) -> String {
        let name = Path::new(project_folder)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| project_folder.to_string());
        format!(
            "{}/{}/{}",
            self.config.migrate.projects_folder.trim_end_matches('/'),
            subspace,
            name
        )
    }

    /// Resolves the configured report file name against the root.
    pub fn report_path(&self) -> PathBuf {
        self.root.join(&self.config.report.file_name)
    }

    pub fn templates_dir(&self) -> Option<PathBuf> {
        self.config
            .migrate
            .templates_dir
            .as_ref()
            .map(|dir| self.root.join(dir))
    }
}
