#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use subkit_core::{RepoContext, RushRegistry};
use tempfile::TempDir;

/// A throwaway Rush repository with subspaces enabled.
pub struct TestRepo {
    pub dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Self { dir };
        repo.write_json("rush.json", &json!({
            "rushVersion": "5.100.0",
            "pnpmVersion": "8.6.0",
            "projects": []
        }));
        repo.write_json(
            "common/config/rush/subspaces.json",
            &json!({ "subspacesEnabled": true, "subspaceNames": ["default"] }),
        );
        repo.write_json(
            "common/config/subspaces/default/common-versions.json",
            &json!({ "preferredVersions": {}, "allowedAlternativeVersions": {} }),
        );
        repo
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn ctx(&self) -> RepoContext {
        RepoContext::new(self.root())
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn write_json(&self, relative: &str, value: &Value) {
        self.write(relative, &serde_json::to_string_pretty(value).unwrap());
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn read_json(&self, relative: &str) -> Value {
        serde_json::from_str(&self.read(relative)).unwrap()
    }

    /// Registers a project and writes its `package.json`.
    pub fn add_project(
        &self,
        name: &str,
        folder: &str,
        subspace: Option<&str>,
        deps: &[(&str, &str)],
        dev_deps: &[(&str, &str)],
    ) {
        let mut rush = self.read_json("rush.json");
        let mut entry = json!({ "packageName": name, "projectFolder": folder });
        if let Some(subspace) = subspace {
            entry["subspaceName"] = json!(subspace);
        }
        rush["projects"].as_array_mut().unwrap().push(entry);
        self.write_json("rush.json", &rush);

        let to_map = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), json!(v)))
                .collect::<serde_json::Map<_, _>>()
        };
        let mut manifest = json!({ "name": name, "version": "1.0.0" });
        if !deps.is_empty() {
            manifest["dependencies"] = Value::Object(to_map(deps));
        }
        if !dev_deps.is_empty() {
            manifest["devDependencies"] = Value::Object(to_map(dev_deps));
        }
        self.write_json(&format!("{}/package.json", folder), &manifest);
    }

    pub fn set_alternatives(&self, subspace: &str, dependency: &str, versions: &[&str]) {
        let relative = format!("common/config/subspaces/{}/common-versions.json", subspace);
        let mut common = if self.path(&relative).exists() {
            self.read_json(&relative)
        } else {
            json!({ "preferredVersions": {}, "allowedAlternativeVersions": {} })
        };
        common["allowedAlternativeVersions"][dependency] = json!(versions);
        self.write_json(&relative, &common);
    }

    pub fn alternatives(&self, subspace: &str, dependency: &str) -> Option<Vec<String>> {
        let common =
            self.read_json(&format!("common/config/subspaces/{}/common-versions.json", subspace));
        common["allowedAlternativeVersions"]
            .get(dependency)
            .map(|v| serde_json::from_value(v.clone()).unwrap())
    }

    pub fn dependency_version(&self, folder: &str, dependency: &str) -> Option<String> {
        let manifest = self.read_json(&format!("{}/package.json", folder));
        ["dependencies", "devDependencies"].iter().find_map(|table| {
            manifest[*table]
                .get(dependency)
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }

    pub fn registry(&self) -> RushRegistry {
        RushRegistry::load(&self.ctx()).unwrap()
    }
}
