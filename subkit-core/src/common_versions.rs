//! Per-subspace `common-versions.json`: preferred and allowed alternative
//! versions.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::json_io::{read_json, write_json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonVersions {
    #[serde(default)]
    pub preferred_versions: IndexMap<String, String>,
    #[serde(default)]
    pub allowed_alternative_versions: IndexMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A preferred version both sides of a merge declare differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredVersionConflict {
    pub dependency: String,
    /// Value already in the target, which is kept.
    pub kept: String,
    /// Value from the incoming file, which is dropped.
    pub discarded: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub conflicts: Vec<PreferredVersionConflict>,
    pub preferred_added: usize,
    pub alternatives_added: usize,
}

impl MergeReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

impl CommonVersions {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Loads the file, or an empty record when it does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    pub fn alternatives(&self, dependency: &str) -> &[String] {
        self.allowed_alternative_versions
            .get(dependency)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends versions not yet allowed for `dependency`. Returns whether the
    /// list grew.
    pub fn add_alternatives(&mut self, dependency: &str, versions: &[String]) -> bool {
        let list = self
            .allowed_alternative_versions
            .entry(dependency.to_string())
            .or_default();
        let before = list.len();
        for version in versions {
            if !list.contains(version) {
                list.push(version.clone());
            }
        }
        let grew = list.len() > before;
        if list.is_empty() {
            self.allowed_alternative_versions.shift_remove(dependency);
        }
        grew
    }

    /// Replaces the allowed list; an empty list removes the key.
    pub fn set_alternatives(&mut self, dependency: &str, versions: Vec<String>) {
        if versions.is_empty() {
            self.allowed_alternative_versions.shift_remove(dependency);
        } else {
            self.allowed_alternative_versions
                .insert(dependency.to_string(), versions);
        }
    }

    /// Folds `incoming` into `self`.
    ///
    /// Preferred versions already present in `self` are kept and reported as
    /// conflicts. Alternative lists are concatenated without duplicates.
    pub fn merge_from(&mut self, incoming: &CommonVersions) -> MergeReport {
        let mut report = MergeReport::default();

        for (dependency, version) in &incoming.preferred_versions {
            match self.preferred_versions.get(dependency) {
                Some(existing) if existing == version => {}
                Some(existing) => {
                    tracing::warn!(
                        "Preferred version conflict for {}: keeping {} over {}",
                        dependency,
                        existing,
                        version
                    );
                    report.conflicts.push(PreferredVersionConflict {
                        dependency: dependency.clone(),
                        kept: existing.clone(),
                        discarded: version.clone(),
                    });
                }
                None => {
                    self.preferred_versions
                        .insert(dependency.clone(), version.clone());
                    report.preferred_added += 1;
                }
            }
        }

        for (dependency, versions) in &incoming.allowed_alternative_versions {
            let before = self.alternatives(dependency).len();
            self.add_alternatives(dependency, versions);
            report.alternatives_added += self.alternatives(dependency).len() - before;
        }

        report
    }
}
