//! Optional tool configuration read from `subkit.toml` at the repository root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "subkit.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubkitConfig {
    #[serde(default)]
    pub migrate: MigrateConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateConfig {
    /// Folder, relative to the root, that relocated projects are moved under.
    #[serde(default = "default_projects_folder")]
    pub projects_folder: String,
    /// Folder holding replacement subspace template files.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_file")]
    pub file_name: String,
}

fn default_projects_folder() -> String {
    "subspaces".to_string()
}

fn default_report_file() -> String {
    "analysis.json".to_string()
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            projects_folder: default_projects_folder(),
            templates_dir: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            file_name: default_report_file(),
        }
    }
}

impl SubkitConfig {
    /// Loads `subkit.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = crate::json_io::read_to_string(&path)?;
        Self::parse(&content).map_err(|error| Error::Toml {
            error,
            context: path.display().to_string(),
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
