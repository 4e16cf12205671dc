//! Core library for moving Rush projects between subspaces and keeping their
//! dependency versions consistent.

pub mod census;
pub mod common_versions;
pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod fragment;
pub mod graph;
pub mod json_io;
pub mod manifest;
pub mod migrate;
pub mod mismatch;
pub mod reducer;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod subspace;
pub mod sync_reporter;
pub mod version;

pub use census::{build_census, CensusIssue, SubspaceCensus, VersionUsageMap};
pub use common_versions::{CommonVersions, MergeReport, PreferredVersionConflict};
pub use config::SubkitConfig;
pub use context::RepoContext;
pub use decision::{
    AutoDecisions, DecisionProvider, Question, ResolutionChoice, ResolutionPrompt,
    ScriptedAnswer, ScriptedDecisions,
};
pub use error::{Error, Result};
pub use fragment::{FragmentConflict, FragmentMerge};
pub use graph::{ProjectGraph, TreeDirection, TreeNode};
pub use manifest::PackageManifest;
pub use migrate::{MigrationOrchestrator, MigrationOutcome};
pub use mismatch::{find_mismatches, CensusMismatchSource, MismatchReport, MismatchSource};
pub use reducer::{reduce_alternatives, AlternativeReducer, ReductionPlan};
pub use registry::{ProjectEntry, RushRegistry, SubspacesConfig};
pub use report::ConflictReport;
pub use resolver::{
    sync_project, sync_subspace, MismatchResolver, ResolutionAction, ResolutionOutcome,
    ResolutionScope, ResolutionState, SessionSummary,
};
pub use sync_reporter::{SilentReporter, SyncReporter};
pub use version::{compare, is_subset, sort_versions, SpecKind, VersionSpec};
