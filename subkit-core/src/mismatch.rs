//! Mismatch detection: dependencies declared with conflicting specifiers.

use std::collections::BTreeMap;

use crate::census::{SubspaceCensus, VersionUsageMap};
use crate::common_versions::CommonVersions;
use crate::context::RepoContext;
use crate::error::Result;
use crate::registry::RushRegistry;

/// Dependency name -> usage of the specifiers that conflict.
pub type MismatchReport = BTreeMap<String, VersionUsageMap>;

/// Anything that can list the mismatched dependencies of a subspace.
///
/// Repositories whose build tool exposes its own consistency checker can plug
/// it in here; [`CensusMismatchSource`] computes the list from manifests.
pub trait MismatchSource {
    fn mismatches(&self, ctx: &RepoContext, subspace: &str) -> Result<MismatchReport>;
}

/// Derives mismatches from a fresh census and the subspace's allowed
/// alternative versions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CensusMismatchSource;

impl MismatchSource for CensusMismatchSource {
    fn mismatches(&self, ctx: &RepoContext, subspace: &str) -> Result<MismatchReport> {
        let registry = RushRegistry::load(ctx)?;
        let census =
            SubspaceCensus::from_projects(ctx, subspace, registry.projects_in_subspace(subspace));
        let common = CommonVersions::load_or_default(&ctx.common_versions_path(subspace))?;
        Ok(find_mismatches(&census, &common))
    }
}

/// A dependency is mismatched when more than one of its specifiers is not
/// listed among its allowed alternatives. The returned usage keeps every
/// specifier so callers see the full picture.
pub fn find_mismatches(census: &SubspaceCensus, common: &CommonVersions) -> MismatchReport {
    census
        .dependencies()
        .iter()
        .filter(|(dependency, usage)| {
            let allowed = common.alternatives(dependency);
            usage
                .versions()
                .filter(|version| !allowed.iter().any(|a| a == version))
                .count()
                > 1
        })
        .map(|(dependency, usage)| (dependency.clone(), usage.clone()))
        .collect()
}

/// Mismatches `project` takes part in.
pub fn project_mismatches(report: &MismatchReport, project: &str) -> MismatchReport {
    report
        .iter()
        .filter(|(_, usage)| usage.version_of(project).is_some())
        .map(|(dependency, usage)| (dependency.clone(), usage.clone()))
        .collect()
}
