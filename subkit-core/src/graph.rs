//! Project dependency graph using petgraph, rendered as a tree.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::manifest::PackageManifest;
use crate::registry::RushRegistry;

/// Which way to walk from the root project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeDirection {
    /// Projects the root depends on.
    To,
    /// Projects that depend on the root.
    From,
}

/// Edges point from a project to the local projects it depends on.
#[derive(Debug)]
pub struct ProjectGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    /// Already on the path from the root; not expanded again.
    pub circular: bool,
    pub children: Vec<TreeNode>,
}

impl ProjectGraph {
    /// Builds the graph from `(project, local dependencies)` pairs. Names
    /// that are not projects themselves are ignored.
    pub fn new<I, D>(projects: I) -> Self
    where
        I: IntoIterator<Item = (String, D)>,
        D: IntoIterator<Item = String>,
    {
        let projects: Vec<(String, Vec<String>)> = projects
            .into_iter()
            .map(|(name, deps)| (name, deps.into_iter().collect()))
            .collect();

        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        for (name, _) in &projects {
            node_map
                .entry(name.clone())
                .or_insert_with(|| graph.add_node(name.clone()));
        }
        for (name, deps) in &projects {
            let from = node_map[name];
            for dep in deps.iter().collect::<BTreeSet<_>>() {
                if let Some(&to) = node_map.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self { graph, node_map }
    }

    /// Reads every registered project's manifest. Unreadable manifests
    /// contribute a node without edges.
    pub fn load(ctx: &RepoContext, registry: &RushRegistry) -> Self {
        Self::new(registry.projects.iter().map(|project| {
            let deps: Vec<String> = match PackageManifest::load_for(ctx, project) {
                Ok(manifest) => manifest.all_dependencies().into_keys().collect(),
                Err(e) => {
                    tracing::warn!("No dependencies read for {}: {}", project.package_name, e);
                    Vec::new()
                }
            };
            (project.package_name.clone(), deps)
        }))
    }

    fn index(&self, name: &str) -> Result<NodeIndex> {
        self.node_map
            .get(name)
            .copied()
            .ok_or_else(|| Error::ProjectNotFound {
                name: name.to_string(),
                available: {
                    let mut names: Vec<&str> = self.node_map.keys().map(String::as_str).collect();
                    names.sort_unstable();
                    names.join(", ")
                },
            })
    }

    fn neighbors(&self, index: NodeIndex, direction: TreeDirection) -> Vec<NodeIndex> {
        let dir = match direction {
            TreeDirection::To => Direction::Outgoing,
            TreeDirection::From => Direction::Incoming,
        };
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(index, dir).collect();
        neighbors.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        neighbors.dedup();
        neighbors
    }

    pub fn dependencies(&self, name: &str) -> Result<Vec<String>> {
        let index = self.index(name)?;
        Ok(self
            .neighbors(index, TreeDirection::To)
            .into_iter()
            .map(|i| self.graph[i].clone())
            .collect())
    }

    pub fn dependents(&self, name: &str) -> Result<Vec<String>> {
        let index = self.index(name)?;
        Ok(self
            .neighbors(index, TreeDirection::From)
            .into_iter()
            .map(|i| self.graph[i].clone())
            .collect())
    }

    /// Expands `root` in `direction`. With `filter`, branches that never
    /// mention the filter text are pruned; the root always stays.
    pub fn tree(
        &self,
        root: &str,
        direction: TreeDirection,
        filter: Option<&str>,
    ) -> Result<TreeNode> {
        let index = self.index(root)?;
        let mut path = Vec::new();
        let mut tree = self.expand(index, direction, &mut path);
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            tree.children.retain_mut(|child| child.prune(filter));
        }
        Ok(tree)
    }

    fn expand(
        &self,
        index: NodeIndex,
        direction: TreeDirection,
        path: &mut Vec<NodeIndex>,
    ) -> TreeNode {
        let name = self.graph[index].clone();
        if path.contains(&index) {
            return TreeNode {
                name,
                circular: true,
                children: Vec::new(),
            };
        }

        path.push(index);
        let children = self
            .neighbors(index, direction)
            .into_iter()
            .map(|child| self.expand(child, direction, path))
            .collect();
        path.pop();

        TreeNode {
            name,
            circular: false,
            children,
        }
    }
}

impl TreeNode {
    /// Keeps the node if its name or any descendant's matches. Returns
    /// whether it was kept.
    pub fn prune(&mut self, filter: &str) -> bool {
        self.children.retain_mut(|child| child.prune(filter));
        self.name.contains(filter) || !self.children.is_empty()
    }

    pub fn label(&self) -> String {
        if self.circular {
            format!("{} (circular)", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Renders the tree with box-drawing connectors, one node per line.
    pub fn render(&self) -> String {
        self.render_with(&|node: &TreeNode| node.label())
    }

    /// Like [`render`](Self::render) with a custom label for each node.
    pub fn render_with(&self, label: &dyn Fn(&TreeNode) -> String) -> String {
        let mut out = String::new();
        out.push_str(&label(self));
        out.push('\n');
        self.render_children(&mut out, "", label);
        out
    }

    fn render_children(
        &self,
        out: &mut String,
        prefix: &str,
        label: &dyn Fn(&TreeNode) -> String,
    ) {
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            let last = i + 1 == count;
            let branch = if last { "└─" } else { "├─" };
            let joint = if child.children.is_empty() { "─" } else { "┬" };
            out.push_str(prefix);
            out.push_str(branch);
            out.push_str(joint);
            out.push(' ');
            out.push_str(&label(child));
            out.push('\n');

            let next = format!("{}{}", prefix, if last { "  " } else { "│ " });
            child.render_children(out, &next, label);
        }
    }
}
