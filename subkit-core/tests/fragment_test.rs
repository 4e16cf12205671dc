mod common;

use common::TestRepo;
use serde_json::json;
use subkit_core::fragment::{merge_fragment, merge_npmrc};
use subkit_core::{CommonVersions, FragmentConflict};

fn common_versions(value: serde_json::Value) -> CommonVersions {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_merge_from_keeps_target_preferred_version() {
    let mut target = common_versions(json!({
        "preferredVersions": { "react": "18.2.0" },
        "allowedAlternativeVersions": { "typescript": ["~5.2.0"] }
    }));
    let incoming = common_versions(json!({
        "preferredVersions": { "react": "17.0.2", "zod": "3.22.0" },
        "allowedAlternativeVersions": { "typescript": ["~5.2.0", "~4.9.0"], "chalk": ["^4.0.0"] }
    }));

    let report = target.merge_from(&incoming);

    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].kept, "18.2.0");
    assert_eq!(report.conflicts[0].discarded, "17.0.2");
    assert_eq!(report.preferred_added, 1);
    assert_eq!(report.alternatives_added, 2);
    assert_eq!(target.preferred_versions["react"], "18.2.0");
    assert_eq!(target.preferred_versions["zod"], "3.22.0");
    assert_eq!(target.alternatives("typescript"), ["~5.2.0", "~4.9.0"]);
    assert_eq!(target.alternatives("chalk"), ["^4.0.0"]);
}

#[test]
fn test_merge_from_identical_values_is_quiet() {
    let mut target = common_versions(json!({ "preferredVersions": { "react": "18.2.0" } }));
    let incoming = target.clone();

    let report = target.merge_from(&incoming);
    assert!(!report.has_conflicts());
    assert_eq!(report.preferred_added, 0);
    assert_eq!(report.alternatives_added, 0);
}

#[test]
fn test_common_versions_keeps_unknown_fields() {
    let repo = TestRepo::new();
    repo.write(
        "common/config/subspaces/default/common-versions.json",
        r#"{
  // managed by the platform team
  "$schema": "https://developer.microsoft.com/json-schemas/rush/v5/common-versions.schema.json",
  "ensureConsistentVersions": true,
  "preferredVersions": {},
  "allowedAlternativeVersions": {}
}"#,
    );
    let path = repo.ctx().common_versions_path("default");

    let mut common = CommonVersions::load(&path).unwrap();
    assert!(common.add_alternatives("zod", &["^3.0.0".to_string()]));
    common.save(&path).unwrap();

    let saved = repo.read_json("common/config/subspaces/default/common-versions.json");
    assert_eq!(saved["ensureConsistentVersions"], true);
    assert!(saved["$schema"].as_str().unwrap().starts_with("https://"));
    assert_eq!(saved["allowedAlternativeVersions"]["zod"], json!(["^3.0.0"]));
}

#[test]
fn test_empty_alternatives_remove_the_key() {
    let mut common = common_versions(json!({
        "allowedAlternativeVersions": { "zod": ["^3.0.0"] }
    }));
    common.set_alternatives("zod", Vec::new());
    assert!(common.alternatives("zod").is_empty());
    assert!(!common.allowed_alternative_versions.contains_key("zod"));
}

#[test]
fn test_merge_npmrc_appends_new_settings() {
    let target = "registry=https://registry.npmjs.org/\nalways-auth=false\n";
    let incoming = "# extra\nalways-auth=false\nstrict-peer-dependencies=false\n";

    let (merged, conflicts) = merge_npmrc(target, incoming);

    assert!(conflicts.is_empty());
    assert_eq!(
        merged,
        "registry=https://registry.npmjs.org/\n\
         always-auth=false\n\
         # extra\n\
         strict-peer-dependencies=false\n"
    );
}

#[test]
fn test_merge_npmrc_target_wins_on_conflict() {
    let (merged, conflicts) = merge_npmrc(
        "registry=https://registry.npmjs.org/",
        "registry = https://npm.internal.example/\n",
    );

    assert_eq!(merged, "registry=https://registry.npmjs.org/\n");
    assert_eq!(
        conflicts,
        vec![FragmentConflict::NpmrcSetting {
            key: "registry".to_string(),
            kept: "https://registry.npmjs.org/".to_string(),
            discarded: "https://npm.internal.example/".to_string(),
        }]
    );
}

#[test]
fn test_merge_fragment_parks_differing_pnpmfile() {
    let repo = TestRepo::new();
    repo.write("legacy/.pnpmfile-subspace.cjs", "module.exports = { hooks: {} };\n");
    repo.write("target/.pnpmfile-subspace.cjs", "module.exports = {};\n");

    let merge =
        merge_fragment(&repo.path("legacy"), &repo.path("target"), "@acme/web-app").unwrap();

    let parked = repo.path("target/.pnpmfile-subspace-acme-web-app.cjs");
    assert_eq!(merge.conflicts, vec![FragmentConflict::Pnpmfile { parked: parked.clone() }]);
    assert_eq!(repo.read("target/.pnpmfile-subspace.cjs"), "module.exports = {};\n");
    assert_eq!(
        std::fs::read_to_string(parked).unwrap(),
        "module.exports = { hooks: {} };\n"
    );
}

#[test]
fn test_merge_fragment_copies_missing_files() {
    let repo = TestRepo::new();
    repo.write_json(
        "legacy/common-versions.json",
        &json!({ "preferredVersions": { "zod": "3.22.0" } }),
    );
    repo.write("legacy/.npmrc", "auto-install-peers=true\n");
    repo.write("legacy/.pnpmfile-subspace.cjs", "module.exports = {};\n");
    std::fs::create_dir_all(repo.path("target")).unwrap();

    let merge = merge_fragment(&repo.path("legacy"), &repo.path("target"), "app").unwrap();

    assert!(!merge.has_conflicts());
    assert_eq!(merge.touched.len(), 3);
    assert_eq!(repo.read_json("target/common-versions.json")["preferredVersions"]["zod"], "3.22.0");
    assert_eq!(repo.read("target/.npmrc"), "auto-install-peers=true\n");
    assert!(repo.path("target/.pnpmfile-subspace.cjs").is_file());
}
