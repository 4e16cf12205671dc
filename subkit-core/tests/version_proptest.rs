use std::cmp::Ordering;

use proptest::prelude::*;
use subkit_core::{compare, is_subset, reduce_alternatives, VersionUsageMap};

const SPECS: &[&str] = &[
    "1.0.0",
    "=1.0.0",
    "1.2.0",
    "2.0.0-beta.1",
    "^1.0.0",
    "^1.2.0",
    "~1.2.0",
    "~1.2.3",
    "1.x",
    "1.2.x",
    "*",
    ">=1.0.0",
    ">1.0.0 <2.0.0",
    "<=1.5.0",
    "1.0.0 - 1.4.0",
    "^1.0.0 || ^2.0.0",
    "1.0.0 || >=3.0.0",
    "^0.2.3",
    ">=1.2.3 <1.2.3",
    "latest",
    "workspace:*",
    "next",
    "workspace:^1.0.0",
    "not a version",
];

fn gen_spec() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SPECS)
}

fn gen_spec_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(gen_spec().prop_map(str::to_string), 0..8)
}

proptest! {
    #[test]
    fn test_compare_is_antisymmetric(a in gen_spec(), b in gen_spec()) {
        prop_assert_eq!(compare(a, b), compare(b, a).reverse());
    }

    #[test]
    fn test_compare_equal_only_for_identical_strings(a in gen_spec(), b in gen_spec()) {
        prop_assert_eq!(compare(a, b) == Ordering::Equal, a == b);
    }

    #[test]
    fn test_compare_is_transitive(a in gen_spec(), b in gen_spec(), c in gen_spec()) {
        if compare(a, b) != Ordering::Greater && compare(b, c) != Ordering::Greater {
            prop_assert_ne!(compare(a, c), Ordering::Greater);
        }
    }

    #[test]
    fn test_subset_is_reflexive(a in gen_spec()) {
        prop_assert!(is_subset(a, a));
    }

    #[test]
    fn test_strict_subset_sorts_first_on_equal_minimum(a in gen_spec(), b in gen_spec()) {
        let same_min = subkit_core::version::min_version(a) == subkit_core::version::min_version(b);
        if same_min && is_subset(a, b) && !is_subset(b, a) {
            prop_assert_eq!(compare(a, b), Ordering::Less);
        }
    }

    #[test]
    fn test_reduction_is_idempotent(list in gen_spec_list()) {
        let usage: VersionUsageMap = list.iter().map(|v| (v.as_str(), "app")).collect();
        let once = reduce_alternatives(&list, Some(&usage));
        let twice = reduce_alternatives(&once, Some(&usage));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_reduction_leaves_no_redundant_entry(list in gen_spec_list()) {
        let usage: VersionUsageMap = list.iter().map(|v| (v.as_str(), "app")).collect();
        let reduced = reduce_alternatives(&list, Some(&usage));
        for a in &reduced {
            for b in &reduced {
                let sentinels = ["latest", "workspace:*"];
                if a != b && !sentinels.contains(&a.as_str()) {
                    prop_assert!(!is_subset(a, b), "{} is a subset of {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_reduction_drops_unused_entries(list in gen_spec_list()) {
        let usage: VersionUsageMap = std::iter::empty::<(&str, &str)>().collect();
        prop_assert!(reduce_alternatives(&list, Some(&usage)).is_empty());
        prop_assert!(reduce_alternatives(&list, None).is_empty());
    }
}
