//! Typed views of `rush.json` and `subspaces.json`.
//!
//! Fields this tool does not understand are carried through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::{RepoContext, DEFAULT_SUBSPACE};
use crate::error::{Error, Result};
use crate::json_io::{read_json, write_json};

/// One entry of the `projects` array in `rush.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub package_name: String,
    pub project_folder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subspace_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectEntry {
    pub fn new(
        package_name: impl Into<String>,
        project_folder: impl Into<String>,
        subspace_name: Option<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            project_folder: project_folder.into(),
            subspace_name,
            extra: Map::new(),
        }
    }

    /// Projects without an explicit subspace live in `default`.
    pub fn subspace(&self) -> &str {
        self.subspace_name.as_deref().unwrap_or(DEFAULT_SUBSPACE)
    }

    pub fn in_subspace(&self, subspace: &str) -> bool {
        self.subspace() == subspace
    }
}

/// The root project registry (`rush.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RushRegistry {
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RushRegistry {
    pub fn load(ctx: &RepoContext) -> Result<Self> {
        read_json(&ctx.rush_json_path())
    }

    pub fn save(&self, ctx: &RepoContext) -> Result<()> {
        write_json(&ctx.rush_json_path(), self)
    }

    pub fn project(&self, name: &str) -> Option<&ProjectEntry> {
        self.projects.iter().find(|p| p.package_name == name)
    }

    pub fn require_project(&self, name: &str) -> Result<&ProjectEntry> {
        self.project(name).ok_or_else(|| Error::ProjectNotFound {
            name: name.to_string(),
            available: self.project_names().join(", "),
        })
    }

    pub fn project_names(&self) -> Vec<String> {
        self.projects.iter().map(|p| p.package_name.clone()).collect()
    }

    pub fn projects_in_subspace<'a>(
        &'a self,
        subspace: &'a str,
    ) -> impl Iterator<Item = &'a ProjectEntry> + 'a {
        self.projects.iter().filter(move |p| p.in_subspace(subspace))
    }

    /// Projects without an explicit `subspaceName`.
    pub fn unassigned(&self) -> impl Iterator<Item = &ProjectEntry> {
        self.projects.iter().filter(|p| p.subspace_name.is_none())
    }

    /// Points `entry.package_name` at a new folder and subspace. Projects not
    /// yet registered (arriving from another repository) are appended.
    pub fn assign(&mut self, entry: &ProjectEntry, project_folder: &str, subspace: &str) {
        match self
            .projects
            .iter_mut()
            .find(|p| p.package_name == entry.package_name)
        {
            Some(existing) => {
                existing.project_folder = project_folder.to_string();
                existing.subspace_name = Some(subspace.to_string());
            }
            None => {
                let mut added = entry.clone();
                added.project_folder = project_folder.to_string();
                added.subspace_name = Some(subspace.to_string());
                self.projects.push(added);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<ProjectEntry> {
        let index = self.projects.iter().position(|p| p.package_name == name)?;
        Some(self.projects.remove(index))
    }
}

/// `common/config/rush/subspaces.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubspacesConfig {
    #[serde(default)]
    pub subspaces_enabled: bool,
    #[serde(default)]
    pub subspace_names: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubspacesConfig {
    pub fn load(ctx: &RepoContext) -> Result<Self> {
        read_json(&ctx.subspaces_json_path())
    }

    pub fn save(&self, ctx: &RepoContext) -> Result<()> {
        write_json(&ctx.subspaces_json_path(), self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.subspace_names.iter().any(|n| n == name)
    }

    /// Returns `true` if the name was not registered before.
    pub fn add(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.subspace_names.push(name.to_string());
        true
    }
}
