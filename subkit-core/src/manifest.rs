//! Project manifests (`package.json`).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;

use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::json_io::{read_json, write_json};
use crate::registry::ProjectEntry;

/// The two dependency tables a manifest can declare versions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyTable {
    Dependencies,
    DevDependencies,
}

impl DependencyTable {
    pub const ALL: [DependencyTable; 2] =
        [DependencyTable::Dependencies, DependencyTable::DevDependencies];

    pub fn key(&self) -> &'static str {
        match self {
            DependencyTable::Dependencies => "dependencies",
            DependencyTable::DevDependencies => "devDependencies",
        }
    }
}

/// A loaded `package.json`. The document is kept whole so that saving only
/// changes the values that were rewritten.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    doc: Value,
}

impl PackageManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let doc = read_json(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Loads the manifest of a registered project.
    pub fn load_for(ctx: &RepoContext, project: &ProjectEntry) -> Result<Self> {
        let path = ctx.manifest_path(&project.project_folder);
        if !path.is_file() {
            return Err(Error::ManifestNotFound {
                project: project.package_name.clone(),
                path,
            });
        }
        Self::load(&path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.doc.get("name").and_then(Value::as_str)
    }

    /// String-valued entries of one dependency table, in file order.
    pub fn table(&self, table: DependencyTable) -> IndexMap<String, String> {
        self.doc
            .get(table.key())
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, spec)| Some((name.clone(), spec.as_str()?.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every declared dependency with its specifier. When both tables name
    /// the same dependency, the `dependencies` value wins.
    pub fn all_dependencies(&self) -> IndexMap<String, String> {
        let mut all = self.table(DependencyTable::Dependencies);
        for (name, spec) in self.table(DependencyTable::DevDependencies) {
            all.entry(name).or_insert(spec);
        }
        all
    }

    pub fn version_of(&self, dependency: &str) -> Option<String> {
        DependencyTable::ALL.iter().find_map(|table| {
            self.doc
                .get(table.key())
                .and_then(|deps| deps.get(dependency))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }

    /// Rewrites the value of every existing `dependency` key. Keys are never
    /// added or removed. Returns whether anything changed.
    pub fn set_version(&mut self, dependency: &str, version: &str) -> bool {
        let mut changed = false;
        for table in DependencyTable::ALL {
            let Some(slot) = self
                .doc
                .get_mut(table.key())
                .and_then(Value::as_object_mut)
                .and_then(|deps| deps.get_mut(dependency))
            else {
                continue;
            };
            if slot.as_str() != Some(version) {
                *slot = Value::String(version.to_string());
                changed = true;
            }
        }
        changed
    }

    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.doc)
    }
}
