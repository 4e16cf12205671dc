//! Alternative-version reduction: keep `allowedAlternativeVersions` minimal.

use crate::census::{SubspaceCensus, VersionUsageMap};
use crate::common_versions::CommonVersions;
use crate::context::RepoContext;
use crate::error::Result;
use crate::registry::RushRegistry;
use crate::version::VersionSpec;

/// Reduces one dependency's allowed list.
///
/// Entries nobody uses are dropped first. What remains is walked in
/// comparator order, dropping every entry that is a subset of another kept
/// entry. Sentinels are never dropped as redundant. The result is sorted
/// and reducing it again returns it unchanged.
pub fn reduce_alternatives(versions: &[String], usage: Option<&VersionUsageMap>) -> Vec<String> {
    let mut specs: Vec<VersionSpec> = Vec::new();
    for version in versions {
        let used = usage.is_some_and(|u| u.contains_version(version));
        if used && !specs.iter().any(|s| s.as_str() == version) {
            specs.push(VersionSpec::parse(version));
        }
    }
    specs.sort();

    let mut kept: Vec<VersionSpec> = Vec::with_capacity(specs.len());
    for spec in specs {
        if spec.is_sentinel() {
            kept.push(spec);
            continue;
        }
        if kept.iter().any(|k| !k.is_sentinel() && spec.is_subset_of(k)) {
            continue;
        }
        kept.retain(|k| k.is_sentinel() || !k.is_subset_of(&spec));
        kept.push(spec);
    }

    kept.into_iter().map(|s| s.as_str().to_string()).collect()
}

/// One dependency whose allowed list would change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeChange {
    pub dependency: String,
    pub before: Vec<String>,
    /// Empty when the key is removed.
    pub after: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReductionPlan {
    pub changes: Vec<AlternativeChange>,
}

impl ReductionPlan {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

pub struct AlternativeReducer<'a> {
    ctx: &'a RepoContext,
}

impl<'a> AlternativeReducer<'a> {
    pub fn new(ctx: &'a RepoContext) -> Self {
        Self { ctx }
    }

    /// Computes the reduction of `subspace` without writing anything.
    pub fn plan(&self, subspace: &str) -> Result<ReductionPlan> {
        let common = CommonVersions::load_or_default(&self.ctx.common_versions_path(subspace))?;
        let registry = RushRegistry::load(self.ctx)?;
        let census = SubspaceCensus::from_projects(
            self.ctx,
            subspace,
            registry.projects_in_subspace(subspace),
        );
        Ok(plan_reduction(&common, &census))
    }

    /// Reduces the allowed alternatives of `subspace`, saving only when
    /// something changed. Returns whether the file changed.
    pub fn reduce(&self, subspace: &str) -> Result<bool> {
        let plan = self.plan(subspace)?;
        self.apply(subspace, &plan)
    }

    pub fn apply(&self, subspace: &str, plan: &ReductionPlan) -> Result<bool> {
        if plan.is_empty() {
            tracing::debug!("Allowed alternatives of {} are already minimal", subspace);
            return Ok(false);
        }

        let path = self.ctx.common_versions_path(subspace);
        let mut common = CommonVersions::load_or_default(&path)?;
        for change in &plan.changes {
            tracing::info!(
                "{}: [{}] -> [{}]",
                change.dependency,
                change.before.join(", "),
                change.after.join(", ")
            );
            common.set_alternatives(&change.dependency, change.after.clone());
        }
        common.save(&path)?;
        Ok(true)
    }
}

pub fn plan_reduction(common: &CommonVersions, census: &SubspaceCensus) -> ReductionPlan {
    let changes = common
        .allowed_alternative_versions
        .iter()
        .filter_map(|(dependency, before)| {
            let after = reduce_alternatives(before, census.dependency(dependency));
            (after != *before).then(|| AlternativeChange {
                dependency: dependency.clone(),
                before: before.clone(),
                after,
            })
        })
        .collect();
    ReductionPlan { changes }
}
