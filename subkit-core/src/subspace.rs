//! Subspace bootstrap: enabling subspaces and creating subspace
//! configuration folders from templates.

use std::fs;

use regex::Regex;

use crate::context::{
    RepoContext, COMMON_VERSIONS_JSON, DEFAULT_SUBSPACE, NPMRC, REPO_STATE_JSON,
};
use crate::error::{Error, Result};
use crate::json_io::write_atomic;
use crate::registry::SubspacesConfig;

const DEFAULT_NPMRC: &str = "\
# Package manager settings for this subspace.
registry=https://registry.npmjs.org/
always-auth=false
";

const DEFAULT_COMMON_VERSIONS: &str = r#"{
  "preferredVersions": {},
  "allowedAlternativeVersions": {}
}
"#;

const DEFAULT_REPO_STATE: &str = r#"{}
"#;

const DEFAULT_SUBSPACES_JSON: &str = r#"{
  "subspacesEnabled": true,
  "subspaceNames": ["default"]
}
"#;

/// Files every subspace configuration folder starts with.
pub const TEMPLATE_FILES: [(&str, &str); 3] = [
    (NPMRC, DEFAULT_NPMRC),
    (COMMON_VERSIONS_JSON, DEFAULT_COMMON_VERSIONS),
    (REPO_STATE_JSON, DEFAULT_REPO_STATE),
];

/// Subspace names are lowercase letters and underscores.
pub fn validate_subspace_name(name: &str) -> Result<()> {
    let pattern = Regex::new(r"^[a-z_]+$")
        .map_err(|e| Error::Pattern(format!("Failed to create regex: {}", e)))?;
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidSubspaceName(name.to_string()))
    }
}

/// Whether the repository has subspaces switched on.
pub fn is_supported(ctx: &RepoContext) -> bool {
    ctx.subspaces_json_path().is_file() && ctx.subspace_dir(DEFAULT_SUBSPACE).is_dir()
}

/// Registered subspace names, `default` included.
pub fn list_subspaces(ctx: &RepoContext) -> Result<Vec<String>> {
    if !ctx.subspaces_json_path().is_file() {
        return Err(Error::SubspacesNotEnabled(ctx.root().to_path_buf()));
    }
    Ok(SubspacesConfig::load(ctx)?.subspace_names)
}

/// Turns subspaces on and creates the `default` subspace. Returns whether
/// anything had to be created.
pub fn init_subspaces(ctx: &RepoContext) -> Result<bool> {
    let mut created = false;
    let path = ctx.subspaces_json_path();
    if !path.is_file() {
        write_atomic(&path, DEFAULT_SUBSPACES_JSON.as_bytes())?;
        tracing::info!("Created {}", path.display());
        created = true;
    }
    created |= ensure_subspace(ctx, DEFAULT_SUBSPACE)?;
    Ok(created)
}

/// Makes sure `name` has a configuration folder with every template file and
/// is listed in `subspaces.json`. Existing files are left alone. Returns
/// whether anything had to be created.
pub fn ensure_subspace(ctx: &RepoContext, name: &str) -> Result<bool> {
    if name != DEFAULT_SUBSPACE {
        validate_subspace_name(name)?;
    }

    let dir = ctx.subspace_dir(name);
    let mut created = false;
    if !dir.is_dir() {
        fs::create_dir_all(&dir).map_err(|source| Error::File {
            path: dir.clone(),
            source,
        })?;
        created = true;
    }

    let overrides = ctx.templates_dir();
    for (file, builtin) in TEMPLATE_FILES {
        let target = dir.join(file);
        if target.exists() {
            continue;
        }
        match overrides.as_ref().map(|d| d.join(file)).filter(|p| p.is_file()) {
            Some(template) => {
                fs::copy(&template, &target).map_err(|source| Error::File {
                    path: target.clone(),
                    source,
                })?;
            }
            None => write_atomic(&target, builtin.as_bytes())?,
        }
        tracing::debug!("Created {}", target.display());
        created = true;
    }

    let mut subspaces = if ctx.subspaces_json_path().is_file() {
        SubspacesConfig::load(ctx)?
    } else {
        SubspacesConfig {
            subspaces_enabled: true,
            ..SubspacesConfig::default()
        }
    };
    if subspaces.add(name) {
        subspaces.save(ctx)?;
        created = true;
    }

    if created {
        tracing::info!(
            "Subspace {} is ready; run 'rush update --subspace {}' to refresh its lockfile",
            name,
            name
        );
    }
    Ok(created)
}
