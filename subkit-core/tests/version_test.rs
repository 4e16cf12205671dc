use std::cmp::Ordering;

use semver::Version;
use subkit_core::version::{min_version, recommended_version};
use subkit_core::{compare, is_subset, sort_versions, SpecKind, VersionSpec};

#[test]
fn test_workspace_protocol_sorts_last() {
    assert_eq!(compare("workspace:*", "1.0.0"), Ordering::Greater);
    assert_eq!(compare("1.0.0", "workspace:*"), Ordering::Less);
    assert!(!is_subset("1.0.0", "workspace:*"));
}

#[test]
fn test_narrower_range_sorts_first() {
    assert_eq!(
        sort_versions(["17.0.2", "~17.0.0"]),
        vec!["~17.0.0".to_string(), "17.0.2".to_string()]
    );
}

#[test]
fn test_equal_minimum_prefers_subset() {
    // ~1.0.0 and 1.0.x describe the same set; the raw string breaks the tie.
    assert_eq!(
        sort_versions(["^1.0.0", "~1.0.0", "1.0.x"]),
        vec!["1.0.x", "~1.0.0", "^1.0.0"]
    );
    assert_eq!(compare("~1.0.0", "^1.0.0"), Ordering::Less);
    assert_eq!(compare("^1.0.0", "~1.0.0"), Ordering::Greater);
}

#[test]
fn test_orders_by_minimum_version() {
    assert_eq!(
        sort_versions(["^2.0.0", "1.5.0", ">=1.2.0", "~1.0.1"]),
        vec!["~1.0.1", ">=1.2.0", "1.5.0", "^2.0.0"]
    );
}

#[test]
fn test_unparsable_sorts_first_and_sentinels_last() {
    assert_eq!(
        sort_versions(["^2.0.0", "latest", "not a version", "1.0.0", "workspace:*"]),
        vec!["not a version", "1.0.0", "^2.0.0", "latest", "workspace:*"]
    );
}

#[test]
fn test_identical_strings_compare_equal() {
    for spec in ["^1.0.0", "latest", "garbage!", "", "1.x || 2.x"] {
        assert_eq!(compare(spec, spec), Ordering::Equal, "{}", spec);
    }
    assert_ne!(compare("1.0.0", "=1.0.0"), Ordering::Equal);
}

#[test]
fn test_classification() {
    assert!(matches!(VersionSpec::parse("1.2.3").kind(), SpecKind::Exact(_)));
    assert!(matches!(VersionSpec::parse("v1.2.3").kind(), SpecKind::Exact(_)));
    assert_eq!(VersionSpec::parse("^1.2.3").kind(), &SpecKind::Range);
    assert_eq!(VersionSpec::parse("1.x").kind(), &SpecKind::Range);
    assert_eq!(VersionSpec::parse(">=1.0.0 <2").kind(), &SpecKind::Range);
    assert_eq!(VersionSpec::parse("1.0.0 - 2.0.0").kind(), &SpecKind::Range);
    assert_eq!(VersionSpec::parse("latest").kind(), &SpecKind::Sentinel);
    assert_eq!(VersionSpec::parse("workspace:*").kind(), &SpecKind::Sentinel);
    assert_eq!(VersionSpec::parse("workspace:^1.0.0").kind(), &SpecKind::Invalid);
    assert_eq!(VersionSpec::parse("next").kind(), &SpecKind::Invalid);
    assert_eq!(VersionSpec::parse("npm:lodash@4").kind(), &SpecKind::Invalid);
}

#[test]
fn test_range_subsets() {
    assert!(is_subset("^1.2.0", "^1.0.0"));
    assert!(!is_subset("^1.0.0", "^1.2.0"));
    assert!(is_subset("1.2.0", "^1.0.0"));
    assert!(is_subset("~1.2.3", "^1.2.0"));
    assert!(!is_subset("^1.2.0", "~1.2.3"));
    assert!(is_subset("^1.0.0", ">=1.0.0 <2.0.0"));
    assert!(is_subset("^1.0.0", "1.x || 2.x"));
    assert!(!is_subset("1.x || 2.x", "^1.0.0"));
    assert!(is_subset("1.5.0", "1.0.0 - 2.0.0"));
    assert!(is_subset("1.2 - 1.4", ">=1.2.0 <1.5.0-0"));
    assert!(is_subset("^1.0.0", "*"));
    assert!(!is_subset("^1.0.0", "^2.0.0"));
}

#[test]
fn test_caret_on_zero_major() {
    assert!(is_subset("0.2.5", "^0.2.3"));
    assert!(!is_subset("0.3.0", "^0.2.3"));
    assert!(is_subset("0.0.3", "^0.0.3"));
    assert!(!is_subset("0.0.4", "^0.0.3"));
    assert!(is_subset("0.0.9", "^0.0"));
    assert!(!is_subset("0.1.0", "^0.0"));
}

#[test]
fn test_subset_is_reflexive_for_any_string() {
    for spec in ["^1.0.0", "latest", "workspace:*", "workspace:^1", "???", ""] {
        assert!(is_subset(spec, spec), "{}", spec);
    }
}

#[test]
fn test_sentinel_and_invalid_subsets() {
    assert!(is_subset("latest", "workspace:*"));
    assert!(is_subset("workspace:*", "latest"));
    assert!(!is_subset("latest", "^1.0.0"));
    assert!(!is_subset("next", "*"));
    assert!(!is_subset("1.0.0", "next"));
}

#[test]
fn test_min_version() {
    let v = |s: &str| Some(Version::parse(s).unwrap());
    assert_eq!(min_version("^1.2.3"), v("1.2.3"));
    assert_eq!(min_version(">1.2.3"), v("1.2.4"));
    assert_eq!(min_version("1.x"), v("1.0.0"));
    assert_eq!(min_version("~1.2"), v("1.2.0"));
    assert_eq!(min_version("<2.0.0"), v("0.0.0"));
    assert_eq!(min_version(">=2.0.0 || 1.4.0"), v("1.4.0"));
    assert_eq!(min_version("1.2.3-beta.1"), v("1.2.3-beta.1"));
    assert_eq!(min_version(">=1.2.3 <1.2.3"), None);
    assert_eq!(min_version("latest"), None);
    assert_eq!(min_version("garbage"), None);
}

#[test]
fn test_matches() {
    let spec = VersionSpec::parse("~1.2.0");
    assert!(spec.matches(&Version::parse("1.2.9").unwrap()));
    assert!(!spec.matches(&Version::parse("1.3.0").unwrap()));
    assert!(!VersionSpec::parse("latest").matches(&Version::parse("1.0.0").unwrap()));
}

#[test]
fn test_recommended_version() {
    let candidates = ["2.0.0", "^1.1.0", "^1.0.0"];
    assert_eq!(
        recommended_version("1.2.0", &candidates),
        Some("^1.0.0".to_string())
    );
    assert_eq!(
        recommended_version("~1.1.4", &candidates),
        Some("^1.0.0".to_string())
    );
    assert_eq!(recommended_version("3.0.0", &candidates), None);
    assert_eq!(recommended_version("latest", &["workspace:*"]), Some("workspace:*".to_string()));
}
