//! Conflict report for a project about to join (or living in) a subspace.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::census::SubspaceCensus;
use crate::context::RepoContext;
use crate::error::Result;
use crate::json_io::write_json;
use crate::manifest::PackageManifest;
use crate::registry::RushRegistry;
use crate::version::sort_versions;

/// Dependencies a project declares with a specifier none of the other
/// projects in the subspace use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    #[serde(skip)]
    pub project: String,
    #[serde(skip)]
    pub subspace: String,
    /// Dependency -> every specifier involved, the project's included.
    pub conflicting_versions: BTreeMap<String, Vec<String>>,
}

impl ConflictReport {
    pub fn build(
        ctx: &RepoContext,
        registry: &RushRegistry,
        project: &str,
        subspace: &str,
    ) -> Result<Self> {
        let entry = registry.require_project(project)?;
        let manifest = PackageManifest::load_for(ctx, entry)?;
        let others = registry
            .projects_in_subspace(subspace)
            .filter(|p| p.package_name != project);
        let census = SubspaceCensus::from_projects(ctx, subspace, others);

        let conflicting_versions = manifest
            .all_dependencies()
            .into_iter()
            .filter_map(|(dependency, version)| {
                let usage = census.dependency(&dependency)?;
                if usage.contains_version(&version) {
                    return None;
                }
                let versions = sort_versions(usage.versions().chain([version.as_str()]));
                Some((dependency, versions))
            })
            .collect();

        Ok(Self {
            project: project.to_string(),
            subspace: subspace.to_string(),
            conflicting_versions,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.conflicting_versions.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}
