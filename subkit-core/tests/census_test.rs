mod common;

use common::TestRepo;
use subkit_core::{build_census, find_mismatches, CommonVersions, RushRegistry, SubspaceCensus};

#[test]
fn test_census_groups_projects_by_specifier() {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", Some("core"), &[("react", "17.0.2")], &[]);
    repo.add_project("b", "apps/b", Some("core"), &[("react", "~17.0.0")], &[]);
    repo.add_project("c", "apps/c", Some("core"), &[("react", "17.0.2")], &[("jest", "^29.0.0")]);
    repo.add_project("d", "apps/d", Some("other"), &[("react", "18.0.0")], &[]);

    let census = build_census(&repo.ctx(), "core").unwrap();
    let react = census.dependency("react").unwrap();

    assert_eq!(react.len(), 2);
    assert_eq!(react.projects("17.0.2"), vec!["a", "c"]);
    assert_eq!(react.projects("~17.0.0"), vec!["b"]);
    assert!(!react.contains_version("18.0.0"));
    assert_eq!(census.dependency("jest").unwrap().projects("^29.0.0"), vec!["c"]);
    assert!(census.issues().is_empty());
}

#[test]
fn test_census_prefers_dependencies_over_dev_dependencies() {
    let repo = TestRepo::new();
    repo.add_project(
        "a",
        "apps/a",
        Some("core"),
        &[("typescript", "~5.2.0")],
        &[("typescript", "^5.0.0")],
    );

    let census = build_census(&repo.ctx(), "core").unwrap();
    let usage = census.dependency("typescript").unwrap();
    assert_eq!(usage.version_of("a"), Some("~5.2.0"));
    assert_eq!(usage.len(), 1);
}

#[test]
fn test_census_records_unreadable_manifest_and_continues() {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", Some("core"), &[("lodash", "^4.17.0")], &[]);
    repo.add_project("broken", "apps/broken", Some("core"), &[], &[]);
    repo.write("apps/broken/package.json", "{ not json");
    repo.add_project("gone", "apps/gone", Some("core"), &[], &[]);
    std::fs::remove_file(repo.path("apps/gone/package.json")).unwrap();

    let census = build_census(&repo.ctx(), "core").unwrap();

    assert_eq!(census.issues().len(), 2);
    let failed: Vec<&str> = census.issues().iter().map(|i| i.project.as_str()).collect();
    assert!(failed.contains(&"broken"));
    assert!(failed.contains(&"gone"));
    assert!(census.dependency("lodash").is_some());
}

#[test]
fn test_default_subspace_includes_unassigned_projects() {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", None, &[("chalk", "^4.0.0")], &[]);
    repo.add_project("b", "apps/b", Some("default"), &[("chalk", "^5.0.0")], &[]);

    let census = build_census(&repo.ctx(), "default").unwrap();
    assert_eq!(census.dependency("chalk").unwrap().len(), 2);
}

#[test]
fn test_mismatch_ignores_allowed_alternatives() {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", Some("core"), &[("react", "17.0.2"), ("chalk", "^4.0.0")], &[]);
    repo.add_project("b", "apps/b", Some("core"), &[("react", "18.2.0"), ("chalk", "^5.0.0")], &[]);
    repo.set_alternatives("core", "chalk", &["^4.0.0"]);

    let ctx = repo.ctx();
    let registry = RushRegistry::load(&ctx).unwrap();
    let census = SubspaceCensus::from_projects(&ctx, "core", registry.projects_in_subspace("core"));
    let common = CommonVersions::load(&ctx.common_versions_path("core")).unwrap();
    let report = find_mismatches(&census, &common);

    assert_eq!(report.keys().collect::<Vec<_>>(), vec!["react"]);
    assert_eq!(census.multi_version().count(), 2);
}
