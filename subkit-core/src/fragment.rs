//! Merging a subspace configuration fragment (common versions, `.npmrc`,
//! pnpmfile) into a target subspace folder. The target always wins; every
//! collision is reported.

use std::fs;
use std::path::{Path, PathBuf};

use crate::common_versions::CommonVersions;
use crate::context::{COMMON_VERSIONS_JSON, NPMRC, PNPMFILE};
use crate::error::{Error, Result};
use crate::json_io::{read_to_string, write_atomic};

/// A collision the merge could not settle on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentConflict {
    PreferredVersion {
        dependency: String,
        kept: String,
        discarded: String,
    },
    NpmrcSetting {
        key: String,
        kept: String,
        discarded: String,
    },
    /// Both sides ship a pnpmfile; the incoming one was parked at `parked`.
    Pnpmfile { parked: PathBuf },
}

impl std::fmt::Display for FragmentConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FragmentConflict::PreferredVersion {
                dependency,
                kept,
                discarded,
            } => write!(
                f,
                "preferred version of {}: kept {}, dropped {}",
                dependency, kept, discarded
            ),
            FragmentConflict::NpmrcSetting {
                key,
                kept,
                discarded,
            } => write!(
                f,
                ".npmrc setting {}: kept {}, dropped {}",
                key, kept, discarded
            ),
            FragmentConflict::Pnpmfile { parked } => write!(
                f,
                "pnpmfile differs; incoming copy saved as {} for manual reconciliation",
                parked.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentMerge {
    pub conflicts: Vec<FragmentConflict>,
    /// Target files created or rewritten.
    pub touched: Vec<PathBuf>,
}

impl FragmentMerge {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Merges `source_dir` into `target_dir`. `project` names the parked
/// pnpmfile when both sides have one.
pub fn merge_fragment(
    source_dir: &Path,
    target_dir: &Path,
    project: &str,
) -> Result<FragmentMerge> {
    let mut merge = FragmentMerge::default();
    merge_common_versions(source_dir, target_dir, &mut merge)?;
    merge_npmrc_file(source_dir, target_dir, &mut merge)?;
    merge_pnpmfile(source_dir, target_dir, project, &mut merge)?;
    tracing::debug!(
        "Merged {} into {}: {} conflicts",
        source_dir.display(),
        target_dir.display(),
        merge.conflicts.len()
    );
    Ok(merge)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map_err(|source| Error::File {
        path: to.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn merge_common_versions(
    source_dir: &Path,
    target_dir: &Path,
    merge: &mut FragmentMerge,
) -> Result<()> {
    let incoming_path = source_dir.join(COMMON_VERSIONS_JSON);
    if !incoming_path.is_file() {
        return Ok(());
    }
    let target_path = target_dir.join(COMMON_VERSIONS_JSON);
    if !target_path.is_file() {
        copy_file(&incoming_path, &target_path)?;
        merge.touched.push(target_path);
        return Ok(());
    }

    let incoming = CommonVersions::load(&incoming_path)?;
    let mut target = CommonVersions::load(&target_path)?;
    let report = target.merge_from(&incoming);
    if report.preferred_added > 0 || report.alternatives_added > 0 {
        target.save(&target_path)?;
        merge.touched.push(target_path);
    }
    merge
        .conflicts
        .extend(report.conflicts.into_iter().map(|c| FragmentConflict::PreferredVersion {
            dependency: c.dependency,
            kept: c.kept,
            discarded: c.discarded,
        }));
    Ok(())
}

fn npmrc_setting(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// Line-based `.npmrc` merge. Settings already in `target` keep their value;
/// new settings and unseen lines from `incoming` are appended.
pub fn merge_npmrc(target: &str, incoming: &str) -> (String, Vec<FragmentConflict>) {
    let mut merged = target.to_string();
    if !merged.is_empty() && !merged.ends_with('\n') {
        merged.push('\n');
    }
    let mut conflicts = Vec::new();

    for line in incoming.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some((key, value)) = npmrc_setting(trimmed) {
            let existing = merged
                .lines()
                .filter_map(npmrc_setting)
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string());
            match existing {
                Some(kept) if kept == value => continue,
                Some(kept) => {
                    tracing::warn!(
                        ".npmrc conflict on {}: keeping {} over {}",
                        key,
                        kept,
                        value
                    );
                    conflicts.push(FragmentConflict::NpmrcSetting {
                        key: key.to_string(),
                        kept,
                        discarded: value.to_string(),
                    });
                    continue;
                }
                None => {}
            }
        } else if merged.lines().any(|l| l.trim() == trimmed) {
            continue;
        }

        merged.push_str(trimmed);
        merged.push('\n');
    }

    (merged, conflicts)
}

fn merge_npmrc_file(
    source_dir: &Path,
    target_dir: &Path,
    merge: &mut FragmentMerge,
) -> Result<()> {
    let incoming_path = source_dir.join(NPMRC);
    if !incoming_path.is_file() {
        return Ok(());
    }
    let target_path = target_dir.join(NPMRC);
    let target = if target_path.is_file() {
        read_to_string(&target_path)?
    } else {
        String::new()
    };

    let (merged, conflicts) = merge_npmrc(&target, &read_to_string(&incoming_path)?);
    if merged != target {
        write_atomic(&target_path, merged.as_bytes())?;
        merge.touched.push(target_path);
    }
    merge.conflicts.extend(conflicts);
    Ok(())
}

/// `@scope/name` -> `scope-name`, usable in a file name.
fn file_stem(project: &str) -> String {
    project
        .trim_start_matches('@')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn merge_pnpmfile(
    source_dir: &Path,
    target_dir: &Path,
    project: &str,
    merge: &mut FragmentMerge,
) -> Result<()> {
    let incoming_path = source_dir.join(PNPMFILE);
    if !incoming_path.is_file() {
        return Ok(());
    }
    let target_path = target_dir.join(PNPMFILE);
    if !target_path.is_file() {
        copy_file(&incoming_path, &target_path)?;
        merge.touched.push(target_path);
        return Ok(());
    }
    if read_to_string(&incoming_path)? == read_to_string(&target_path)? {
        return Ok(());
    }

    let parked = target_dir.join(format!(".pnpmfile-subspace-{}.cjs", file_stem(project)));
    copy_file(&incoming_path, &parked)?;
    tracing::warn!(
        "Both subspaces define a pnpmfile; reconcile {} into {} manually",
        parked.display(),
        target_path.display()
    );
    merge.touched.push(parked.clone());
    merge.conflicts.push(FragmentConflict::Pnpmfile { parked });
    Ok(())
}
