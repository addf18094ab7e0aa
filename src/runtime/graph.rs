/// Adjacency construction for workflow traversal
///
/// Turns the flat node and edge lists of one workflow into a successor map that the
/// graph walker follows. Built fresh for every run and never persisted.

use crate::workflow::types::{Edge, Node};
use std::collections::HashMap;

/// Node ID -> IDs reachable through one outgoing edge, in edge insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacencyMap {
    successors: HashMap<String, Vec<String>>,
}

impl AdjacencyMap {
    /// Successors of a node; empty for nodes without outgoing edges or unknown IDs
    pub fn successors(&self, node_id: &str) -> &[String] {
        self.successors
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of keyed nodes
    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.successors.contains_key(node_id)
    }
}

/// Build the successor map for one workflow
///
/// Every node gets an entry, empty when it has no outgoing edges. Edges naming
/// unknown nodes are kept as-is: the walker fails to resolve them and skips them.
pub fn build_adjacency(nodes: &[Node], edges: &[Edge]) -> AdjacencyMap {
    tracing::debug!(
        "🏗️ Building adjacency for {} nodes and {} edges",
        nodes.len(),
        edges.len()
    );

    let mut successors: HashMap<String, Vec<String>> = nodes
        .iter()
        .map(|node| (node.id.clone(), Vec::new()))
        .collect();

    for edge in edges {
        successors
            .entry(edge.source_id.clone())
            .or_default()
            .push(edge.target_id.clone());
        tracing::debug!("  🔗 {} → {}", edge.source_id, edge.target_id);
    }

    AdjacencyMap { successors }
}
