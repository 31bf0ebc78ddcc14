//! Dependency graph over scripts and data labels.
//!
//! Nodes are plain string identifiers: scripts are keyed by their path
//! relative to the project root, data by their label. Which identifiers
//! denote data is carried separately in the data-node set. Edges point from
//! a node to what it depends on.

pub mod scan;

use anyhow::Result;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::debug;

pub use scan::ScriptScanner;

/// Builds the dependency graph for a project
///
/// Failures are propagated to the caller untouched.
pub trait GraphProvider {
    fn build(&self, project_root: &Path) -> Result<DependencyGraph>;
}

/// Directed graph of "depends on" edges plus the set of data nodes
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    data_nodes: HashSet<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning the existing index if it is already present
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Add a node and mark it as a data artifact
    pub fn add_data_node(&mut self, label: &str) -> NodeIndex {
        self.data_nodes.insert(label.to_string());
        self.add_node(label)
    }

    /// Record that `from` depends on `to`
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let a = self.add_node(from);
        let b = self.add_node(to);
        if !self.graph.contains_edge(a, b) {
            debug!(from, to, "Added dependency edge");
            self.graph.add_edge(a, b, ());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn is_data_node(&self, id: &str) -> bool {
        self.data_nodes.contains(id)
    }

    pub fn data_nodes(&self) -> &HashSet<String> {
        &self.data_nodes
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct dependencies of a node, sorted
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n].as_str())
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Nodes visited by a depth-first pre-order walk from `start`, start included
    ///
    /// Each node appears once even when the graph has cycles. A start node
    /// that is not in the graph yields nothing.
    pub fn reachable_from(&self, start: &str) -> Vec<&str> {
        let Some(&start_idx) = self.index.get(start) else {
            return Vec::new();
        };

        let mut visited = Vec::new();
        let mut dfs = Dfs::new(&self.graph, start_idx);
        while let Some(idx) = dfs.next(&self.graph) {
            visited.push(self.graph[idx].as_str());
        }
        visited
    }

    /// Data nodes reachable from `start`
    pub fn select_data_nodes(&self, start: &str) -> BTreeSet<String> {
        self.reachable_from(start)
            .into_iter()
            .filter(|id| self.data_nodes.contains(*id))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_graph() -> DependencyGraph {
        // report.py reads summary_param, which summarize.py writes from raw
        let mut g = DependencyGraph::new();
        g.add_data_node("summary_param");
        g.add_data_node("raw");
        g.add_data_node("unrelated");
        g.add_edge("report.py", "summary_param");
        g.add_edge("summary_param", "summarize.py");
        g.add_edge("summarize.py", "raw");
        g.add_edge("unrelated", "other.py");
        g
    }

    #[test]
    fn test_reachable_is_preorder() {
        let g = sample_graph();
        assert_eq!(
            g.reachable_from("report.py"),
            vec!["report.py", "summary_param", "summarize.py", "raw"]
        );
    }

    #[test]
    fn test_select_transitive_data_nodes() {
        let g = sample_graph();
        let selected = g.select_data_nodes("report.py");
        let expected: BTreeSet<String> = ["raw", "summary_param"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(selected, expected);
    }

    #[test]
    fn test_select_tolerates_cycles() {
        let mut g = DependencyGraph::new();
        g.add_data_node("a_data");
        g.add_edge("a.py", "a_data");
        g.add_edge("a_data", "b.py");
        g.add_edge("b.py", "a.py");

        assert_eq!(g.reachable_from("a.py").len(), 3);
        assert_eq!(g.select_data_nodes("a.py").len(), 1);
    }

    #[test]
    fn test_start_without_edges() {
        let mut g = DependencyGraph::new();
        g.add_node("lonely.py");
        g.add_data_node("lonely_data");
        assert!(g.select_data_nodes("lonely.py").is_empty());

        // A data-labeled start node selects itself
        assert_eq!(g.select_data_nodes("lonely_data").len(), 1);
    }

    #[test]
    fn test_unknown_start_node() {
        let g = sample_graph();
        assert!(g.reachable_from("missing.py").is_empty());
        assert!(g.select_data_nodes("missing.py").is_empty());
    }

    #[test]
    fn test_duplicate_edges_are_ignored() {
        let mut g = DependencyGraph::new();
        g.add_edge("a.py", "data");
        g.add_edge("a.py", "data");
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.dependencies_of("a.py"), vec!["data"]);
    }

    fn arbitrary_graph() -> impl Strategy<Value = (DependencyGraph, String)> {
        let edges = proptest::collection::vec((0usize..8, 0usize..8), 0..20);
        let data = proptest::collection::vec(0usize..8, 0..8);
        (edges, data, 0usize..8).prop_map(|(edges, data, start)| {
            let mut g = DependencyGraph::new();
            for i in 0..8 {
                g.add_node(&format!("n{i}"));
            }
            for d in data {
                g.add_data_node(&format!("n{d}"));
            }
            for (a, b) in edges {
                g.add_edge(&format!("n{a}"), &format!("n{b}"));
            }
            (g, format!("n{start}"))
        })
    }

    proptest! {
        #[test]
        fn selection_is_reachable_data((g, start) in arbitrary_graph()) {
            let reachable: HashSet<&str> = g.reachable_from(&start).into_iter().collect();
            for node in g.select_data_nodes(&start) {
                prop_assert!(g.is_data_node(&node));
                prop_assert!(reachable.contains(node.as_str()));
            }
            if g.is_data_node(&start) {
                prop_assert!(g.select_data_nodes(&start).contains(&start));
            }
        }

        #[test]
        fn selection_is_idempotent((g, start) in arbitrary_graph()) {
            prop_assert_eq!(g.select_data_nodes(&start), g.select_data_nodes(&start));
        }

        #[test]
        fn traversal_visits_each_node_once((g, start) in arbitrary_graph()) {
            let visited = g.reachable_from(&start);
            let unique: HashSet<&str> = visited.iter().copied().collect();
            prop_assert_eq!(visited.len(), unique.len());
        }
    }
}
