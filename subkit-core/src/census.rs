//! Dependency census: which project of a subspace declares which specifier.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::context::RepoContext;
use crate::error::Result;
use crate::manifest::PackageManifest;
use crate::registry::{ProjectEntry, RushRegistry};
use crate::version::sort_versions;

/// Specifier -> names of the projects declaring it, for one dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionUsageMap {
    usages: BTreeMap<String, BTreeSet<String>>,
}

impl VersionUsageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: &str, project: &str) {
        self.usages
            .entry(version.to_string())
            .or_default()
            .insert(project.to_string());
    }

    pub fn len(&self) -> usize {
        self.usages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    pub fn contains_version(&self, version: &str) -> bool {
        self.usages.contains_key(version)
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.usages.keys().map(String::as_str)
    }

    /// Specifiers in comparator order.
    pub fn sorted_versions(&self) -> Vec<String> {
        sort_versions(self.usages.keys())
    }

    pub fn projects(&self, version: &str) -> Vec<&str> {
        self.usages
            .get(version)
            .map(|projects| projects.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.usages.iter().map(|(v, p)| (v.as_str(), p))
    }

    pub fn version_of(&self, project: &str) -> Option<&str> {
        self.usages
            .iter()
            .find(|(_, projects)| projects.contains(project))
            .map(|(version, _)| version.as_str())
    }

    pub fn project_count(&self) -> usize {
        self.usages.values().map(BTreeSet::len).sum()
    }

    /// The same usage with `project` left out; specifiers nobody else uses
    /// disappear.
    pub fn without_project(&self, project: &str) -> Self {
        let usages = self
            .usages
            .iter()
            .filter_map(|(version, projects)| {
                let rest: BTreeSet<String> =
                    projects.iter().filter(|p| *p != project).cloned().collect();
                (!rest.is_empty()).then(|| (version.clone(), rest))
            })
            .collect();
        Self { usages }
    }
}

impl<V: AsRef<str>, P: AsRef<str>> FromIterator<(V, P)> for VersionUsageMap {
    fn from_iter<I: IntoIterator<Item = (V, P)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (version, project) in iter {
            map.insert(version.as_ref(), project.as_ref());
        }
        map
    }
}

/// A project that could not be read while taking the census.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensusIssue {
    pub project: String,
    pub message: String,
}

/// Every dependency declared by the projects of one subspace.
#[derive(Debug, Clone, Default)]
pub struct SubspaceCensus {
    subspace: String,
    dependencies: BTreeMap<String, VersionUsageMap>,
    issues: Vec<CensusIssue>,
}

impl SubspaceCensus {
    /// Reads the manifests of `projects`. Unreadable manifests are recorded
    /// as issues and skipped.
    pub fn from_projects<'a>(
        ctx: &RepoContext,
        subspace: &str,
        projects: impl IntoIterator<Item = &'a ProjectEntry>,
    ) -> Self {
        let mut census = Self {
            subspace: subspace.to_string(),
            ..Self::default()
        };

        for project in projects {
            let manifest = match PackageManifest::load_for(ctx, project) {
                Ok(manifest) => manifest,
                Err(e) => {
                    tracing::warn!("Skipping {} in census: {}", project.package_name, e);
                    census.issues.push(CensusIssue {
                        project: project.package_name.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            for (dependency, version) in manifest.all_dependencies() {
                census
                    .dependencies
                    .entry(dependency)
                    .or_default()
                    .insert(&version, &project.package_name);
            }
        }

        tracing::debug!(
            "Census of {}: {} dependencies, {} issues",
            census.subspace,
            census.dependencies.len(),
            census.issues.len()
        );
        census
    }

    pub fn subspace(&self) -> &str {
        &self.subspace
    }

    pub fn dependency(&self, name: &str) -> Option<&VersionUsageMap> {
        self.dependencies.get(name)
    }

    pub fn dependencies(&self) -> &BTreeMap<String, VersionUsageMap> {
        &self.dependencies
    }

    pub fn issues(&self) -> &[CensusIssue] {
        &self.issues
    }

    /// Dependencies declared with more than one specifier.
    pub fn multi_version(&self) -> impl Iterator<Item = (&str, &VersionUsageMap)> {
        self.dependencies
            .iter()
            .filter(|(_, usage)| usage.len() > 1)
            .map(|(name, usage)| (name.as_str(), usage))
    }
}

/// Takes the census of every project assigned to `subspace`.
pub fn build_census(ctx: &RepoContext, subspace: &str) -> Result<SubspaceCensus> {
    let registry = RushRegistry::load(ctx)?;
    Ok(SubspaceCensus::from_projects(
        ctx,
        subspace,
        registry.projects_in_subspace(subspace),
    ))
}
