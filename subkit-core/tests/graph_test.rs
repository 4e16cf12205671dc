mod common;

use common::TestRepo;
use subkit_core::{Error, ProjectGraph, RushRegistry, TreeDirection};

fn cyclic_graph() -> ProjectGraph {
    let edges: [(&str, &[&str]); 5] = [
        ("a", &["b"]),
        ("b", &["d", "c"]),
        ("c", &[]),
        ("d", &["e"]),
        ("e", &["b"]),
    ];
    ProjectGraph::new(edges.iter().map(|(name, deps)| {
        (name.to_string(), deps.iter().map(|d| d.to_string()).collect::<Vec<_>>())
    }))
}

#[test]
fn test_tree_marks_cycles() {
    let tree = cyclic_graph().tree("a", TreeDirection::To, None).unwrap();
    assert_eq!(
        tree.render(),
        "a\n\
         └─┬ b\n  \
         ├── c\n  \
         └─┬ d\n    \
         └─┬ e\n      \
         └── b (circular)\n"
    );
}

#[test]
fn test_tree_from_walks_dependents() {
    let tree = cyclic_graph().tree("b", TreeDirection::From, None).unwrap();
    assert_eq!(
        tree.render(),
        "b\n\
         ├── a\n\
         └─┬ e\n  \
         └─┬ d\n    \
         └── b (circular)\n"
    );
}

#[test]
fn test_filter_prunes_unrelated_branches() {
    let tree = cyclic_graph().tree("a", TreeDirection::To, Some("c")).unwrap();
    assert_eq!(tree.render(), "a\n└─┬ b\n  └── c\n");

    let tree = cyclic_graph().tree("a", TreeDirection::To, Some("zzz")).unwrap();
    assert!(tree.children.is_empty());
    assert_eq!(tree.name, "a");
}

#[test]
fn test_direct_neighbors() {
    let graph = cyclic_graph();
    assert_eq!(graph.dependencies("b").unwrap(), vec!["c", "d"]);
    assert_eq!(graph.dependents("b").unwrap(), vec!["a", "e"]);
    assert!(graph.dependencies("c").unwrap().is_empty());
}

#[test]
fn test_unknown_root() {
    let err = cyclic_graph().tree("nope", TreeDirection::To, None).unwrap_err();
    match err {
        Error::ProjectNotFound { name, available } => {
            assert_eq!(name, "nope");
            assert_eq!(available, "a, b, c, d, e");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_load_reads_local_dependencies() {
    let repo = TestRepo::new();
    repo.add_project(
        "@acme/app",
        "apps/app",
        None,
        &[("@acme/ui", "workspace:*"), ("react", "^18.0.0")],
        &[],
    );
    repo.add_project("@acme/ui", "libs/ui", None, &[], &[("@acme/lint", "workspace:*")]);
    repo.add_project("@acme/lint", "tools/lint", None, &[], &[]);
    let ctx = repo.ctx();
    let registry = RushRegistry::load(&ctx).unwrap();

    let graph = ProjectGraph::load(&ctx, &registry);
    let tree = graph.tree("@acme/app", TreeDirection::To, None).unwrap();
    assert_eq!(tree.render(), "@acme/app\n└─┬ @acme/ui\n  └── @acme/lint\n");
}
