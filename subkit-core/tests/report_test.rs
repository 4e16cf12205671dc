mod common;

use common::TestRepo;
use serde_json::json;
use subkit_core::ConflictReport;

fn repo() -> TestRepo {
    let repo = TestRepo::new();
    repo.add_project("a", "apps/a", Some("core"), &[("react", "17.0.2"), ("zod", "^3.0.0")], &[]);
    repo.add_project("b", "apps/b", Some("core"), &[("react", "^18.0.0")], &[]);
    repo
}

#[test]
fn test_report_lists_unshared_specifiers() {
    let repo = repo();
    repo.add_project(
        "new",
        "apps/new",
        None,
        &[("react", "~16.14.0"), ("zod", "^3.0.0"), ("chalk", "^5.0.0")],
        &[],
    );
    let ctx = repo.ctx();

    let report = ConflictReport::build(&ctx, &repo.registry(), "new", "core").unwrap();

    assert!(!report.is_empty());
    assert_eq!(report.conflicting_versions.len(), 1);
    assert_eq!(
        report.conflicting_versions["react"],
        vec!["~16.14.0", "17.0.2", "^18.0.0"]
    );
}

#[test]
fn test_report_ignores_the_project_itself() {
    let repo = repo();
    let report = ConflictReport::build(&repo.ctx(), &repo.registry(), "b", "core").unwrap();
    assert_eq!(report.conflicting_versions["react"], vec!["17.0.2", "^18.0.0"]);
}

#[test]
fn test_report_saves_camel_case_json() {
    let repo = repo();
    repo.add_project("new", "apps/new", None, &[("react", "17.0.2")], &[]);
    let ctx = repo.ctx();
    let report = ConflictReport::build(&ctx, &repo.registry(), "new", "core").unwrap();
    assert!(report.is_empty());

    report.save(&ctx.report_path()).unwrap();
    assert_eq!(repo.read_json("analysis.json"), json!({ "conflictingVersions": {} }));
}
