mod common;

use common::TestRepo;
use subkit_core::{reduce_alternatives, AlternativeReducer, VersionUsageMap};

fn usage(versions: &[&str]) -> VersionUsageMap {
    versions.iter().map(|v| (*v, "app")).collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_reduce_drops_unused_alternative() {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", Some("core"), &[("lodash", "~4.1.0")], &[]);
    repo.add_project("b", "apps/b", Some("core"), &[("lodash", "4.17.21")], &[]);
    repo.set_alternatives("core", "lodash", &["^4.0.0", "~4.1.0"]);

    let changed = AlternativeReducer::new(&repo.ctx()).reduce("core").unwrap();

    assert!(changed);
    assert_eq!(repo.alternatives("core", "lodash"), Some(strings(&["~4.1.0"])));
}

#[test]
fn test_reduce_reports_no_change_when_minimal() {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", Some("core"), &[("lodash", "~4.1.0")], &[]);
    repo.set_alternatives("core", "lodash", &["~4.1.0"]);
    let before = repo.read("common/config/subspaces/core/common-versions.json");

    let ctx = repo.ctx();
    let reducer = AlternativeReducer::new(&ctx);
    assert!(!reducer.reduce("core").unwrap());
    assert_eq!(repo.read("common/config/subspaces/core/common-versions.json"), before);
}

#[test]
fn test_reduce_removes_empty_key() {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", Some("core"), &[("lodash", "4.17.21")], &[]);
    repo.set_alternatives("core", "lodash", &["^3.0.0"]);
    repo.set_alternatives("core", "left-pad", &["1.0.0"]);

    assert!(AlternativeReducer::new(&repo.ctx()).reduce("core").unwrap());
    assert_eq!(repo.alternatives("core", "lodash"), None);
    assert_eq!(repo.alternatives("core", "left-pad"), None);
}

#[test]
fn test_reduce_is_idempotent_on_disk() {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", Some("core"), &[("lodash", "^4.0.0")], &[]);
    repo.add_project("b", "apps/b", Some("core"), &[("lodash", "~4.1.0")], &[]);
    repo.set_alternatives("core", "lodash", &["~4.1.0", "^4.0.0"]);

    let ctx = repo.ctx();
    let reducer = AlternativeReducer::new(&ctx);
    assert!(reducer.reduce("core").unwrap());
    assert_eq!(repo.alternatives("core", "lodash"), Some(strings(&["^4.0.0"])));
    assert!(!reducer.reduce("core").unwrap());
}

#[test]
fn test_plan_does_not_write() {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", Some("core"), &[("lodash", "4.17.21")], &[]);
    repo.set_alternatives("core", "lodash", &["^3.0.0"]);
    let before = repo.read("common/config/subspaces/core/common-versions.json");

    let plan = AlternativeReducer::new(&repo.ctx()).plan("core").unwrap();

    assert_eq!(plan.changes.len(), 1);
    assert_eq!(plan.changes[0].before, strings(&["^3.0.0"]));
    assert!(plan.changes[0].after.is_empty());
    assert_eq!(repo.read("common/config/subspaces/core/common-versions.json"), before);
}

#[test]
fn test_subset_entries_collapse_into_superset() {
    let list = strings(&["4.1.2", "~4.1.0", "^4.0.0"]);
    let reduced = reduce_alternatives(&list, Some(&usage(&["4.1.2", "~4.1.0", "^4.0.0"])));
    assert_eq!(reduced, strings(&["^4.0.0"]));
}

#[test]
fn test_disjoint_entries_are_kept_sorted() {
    let list = strings(&["^2.0.0", "^1.0.0"]);
    let reduced = reduce_alternatives(&list, Some(&usage(&["^1.0.0", "^2.0.0"])));
    assert_eq!(reduced, strings(&["^1.0.0", "^2.0.0"]));
}

#[test]
fn test_sentinels_are_never_redundant() {
    let list = strings(&["workspace:*", "latest", "^1.0.0"]);
    let reduced = reduce_alternatives(&list, Some(&usage(&["workspace:*", "latest", "^1.0.0"])));
    assert_eq!(reduced, strings(&["^1.0.0", "latest", "workspace:*"]));
}

#[test]
fn test_duplicates_collapse() {
    let list = strings(&["^1.0.0", "^1.0.0"]);
    let reduced = reduce_alternatives(&list, Some(&usage(&["^1.0.0"])));
    assert_eq!(reduced, strings(&["^1.0.0"]));
}
