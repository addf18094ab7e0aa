/// Depth-first graph walker
///
/// Visits nodes in pre-order starting from the trigger, following successors in
/// edge insertion order and finishing each successor's subtree before the next.
/// Uses an explicit stack so deep graphs never exhaust the call stack.
///
/// A node reachable through several paths runs once per path and its context entry
/// is overwritten each time. A successor already on the current path is a cycle
/// and fails the walk.

use crate::runtime::context::ExecutionContext;
use crate::runtime::error::EngineError;
use crate::runtime::executor::NodeExecutor;
use crate::runtime::graph::AdjacencyMap;
use crate::workflow::types::Node;
use std::collections::{HashMap, HashSet};

/// Pending work on the traversal stack
enum Step<'a> {
    /// Execute the node and schedule its successors
    Enter(&'a Node),
    /// Subtree finished; the node leaves the current path
    Leave(&'a str),
}

/// Traversal state borrowed from one run
pub struct GraphWalker<'a> {
    executor: &'a NodeExecutor,
    adjacency: &'a AdjacencyMap,
    /// Node lookup by ID for resolving successors
    nodes: HashMap<&'a str, &'a Node>,
}

impl<'a> GraphWalker<'a> {
    pub fn new(executor: &'a NodeExecutor, nodes: &'a [Node], adjacency: &'a AdjacencyMap) -> Self {
        Self {
            executor,
            adjacency,
            nodes: nodes.iter().map(|node| (node.id.as_str(), node)).collect(),
        }
    }

    /// Walk from `start`, writing every envelope into `context`
    ///
    /// Returns node IDs in visit order (a node appears once per visit). The first
    /// handler error or detected cycle stops the walk.
    pub async fn walk(
        &self,
        start: &'a Node,
        context: &mut ExecutionContext,
    ) -> Result<Vec<String>, EngineError> {
        let mut stack = vec![Step::Enter(start)];
        let mut on_path: HashSet<&'a str> = HashSet::new();
        let mut visited = Vec::new();

        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Leave(node_id) => {
                    on_path.remove(node_id);
                    continue;
                }
                Step::Enter(node) => node,
            };

            if !on_path.insert(node.id.as_str()) {
                tracing::error!("🔁 Cycle detected at node '{}'", node.id);
                return Err(EngineError::CycleDetected {
                    node_id: node.id.clone(),
                });
            }

            let envelope = self.executor.execute_node(node, context).await?;
            context.insert(node.id.clone(), envelope);
            visited.push(node.id.clone());

            stack.push(Step::Leave(node.id.as_str()));

            let successors = self.resolve_successors(node);
            // Reversed so the first successor is popped first
            stack.extend(successors.into_iter().rev().map(Step::Enter));
        }

        Ok(visited)
    }

    /// Successor nodes in edge order; IDs that match no node are skipped
    fn resolve_successors(&self, node: &Node) -> Vec<&'a Node> {
        self.adjacency
            .successors(&node.id)
            .iter()
            .filter_map(|successor_id| {
                let resolved = self.nodes.get(successor_id.as_str()).copied();
                if resolved.is_none() {
                    tracing::warn!(
                        "⏭️ Skipping edge '{}' → '{}': target node not found",
                        node.id,
                        successor_id
                    );
                }
                resolved
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::NodeOutput;
    use crate::runtime::graph::build_adjacency;
    use crate::workflow::types::Edge;
    use serde_json::{json, Value};

    fn node(id: &str, category: &str, config: Value) -> Node {
        let mut node = Node::new("wf", category, id, config);
        node.id = id.to_string();
        node
    }

    fn edge(from: &str, to: &str) -> Edge {
        Edge::new("wf", from, to).unwrap()
    }

    async fn walk(nodes: &[Node], edges: &[Edge]) -> (Result<Vec<String>, EngineError>, ExecutionContext) {
        let executor = NodeExecutor::with_stub_integrations();
        let adjacency = build_adjacency(nodes, edges);
        let walker = GraphWalker::new(&executor, nodes, &adjacency);
        let mut context = ExecutionContext::new();
        let result = walker.walk(&nodes[0], &mut context).await;
        (result, context)
    }

    #[tokio::test]
    async fn visits_in_depth_first_pre_order() {
        // t → a → c, t → b; a's subtree finishes before b
        let nodes = [
            node("t", "trigger", json!({})),
            node("a", "transform", json!({ "type": "filter" })),
            node("b", "transform", json!({ "type": "filter" })),
            node("c", "transform", json!({ "type": "filter" })),
        ];
        let edges = [edge("t", "a"), edge("t", "b"), edge("a", "c")];

        let (result, context) = walk(&nodes, &edges).await;
        assert_eq!(result.unwrap(), ["t", "a", "c", "b"]);
        assert_eq!(context.len(), 4);
    }

    #[tokio::test]
    async fn diamond_target_runs_once_per_path() {
        let nodes = [
            node("t", "trigger", json!({})),
            node("a", "data", json!({ "source": "weather" })),
            node("b", "data", json!({ "source": "calendar" })),
            node("c", "transform", json!({ "type": "summarize" })),
        ];
        let edges = [edge("t", "a"), edge("t", "b"), edge("a", "c"), edge("b", "c")];

        let (result, context) = walk(&nodes, &edges).await;
        assert_eq!(result.unwrap(), ["t", "a", "c", "b", "c"]);

        // The surviving entry comes from the second visit, after b ran
        let NodeOutput::Transform { data, .. } = &context.get("c").unwrap().output else {
            panic!("expected transform output");
        };
        assert_eq!(data["entries"], json!(4));
    }

    #[tokio::test]
    async fn cycle_fails_instead_of_looping() {
        let nodes = [
            node("t", "trigger", json!({})),
            node("a", "transform", json!({})),
            node("b", "transform", json!({})),
        ];
        let edges = [edge("t", "a"), edge("a", "b"), edge("b", "a")];

        let (result, _) = walk(&nodes, &edges).await;
        let err = result.unwrap_err();
        assert!(matches!(err, EngineError::CycleDetected { ref node_id } if node_id == "a"));
    }

    #[tokio::test]
    async fn missing_successor_is_skipped() {
        let nodes = [
            node("t", "trigger", json!({})),
            node("a", "action", json!({ "type": "sms", "to": "+15550100" })),
        ];
        let edges = [edge("t", "ghost"), edge("t", "a")];

        let (result, context) = walk(&nodes, &edges).await;
        assert_eq!(result.unwrap(), ["t", "a"]);
        assert!(context.get("ghost").is_none());
    }

    #[tokio::test]
    async fn unknown_category_halts_walk() {
        let nodes = [
            node("t", "trigger", json!({})),
            node("x", "webhook", json!({})),
            node("after", "transform", json!({})),
        ];
        let edges = [edge("t", "x"), edge("x", "after")];

        let (result, context) = walk(&nodes, &edges).await;
        assert!(result.unwrap_err().to_string().contains("'webhook'"));
        assert!(context.get("after").is_none());
    }

    #[tokio::test]
    async fn long_chain_does_not_recurse() {
        let mut nodes = vec![node("n0", "trigger", json!({}))];
        let mut edges = Vec::new();
        for i in 1..2_000 {
            nodes.push(node(&format!("n{i}"), "data", json!({})));
            edges.push(edge(&format!("n{}", i - 1), &format!("n{i}")));
        }

        let executor = NodeExecutor::new();
        let adjacency = build_adjacency(&nodes, &edges);
        let walker = GraphWalker::new(&executor, &nodes, &adjacency);
        let mut context = ExecutionContext::new();
        let visited = walker.walk(&nodes[0], &mut context).await.unwrap();
        assert_eq!(visited.len(), 2_000);
    }
}
