//! Reachability graph: the accumulated result of backward traversal.

use std::collections::{HashMap, HashSet};

use crate::{
    analysis::reachability::ExecutionPath,
    callgraph::{CallEdge, CallGraph},
    model::MethodId,
};

/// Stores the results of backward reachability analysis.
///
/// Contains every method that can reach the sink, the caller relationships
/// and incoming call edges discovered along the way, and all complete
/// root-to-sink paths. The graph is mutated only by the analyzer during
/// traversal and is immutable once returned.
///
/// Invariants:
///
/// - `reachable_methods()` always contains the sink
/// - every method appearing in the caller or edge index is also reachable
/// - a method is a root iff it is reachable, is not the sink, and has no
///   recorded callers
#[derive(Debug, Clone)]
pub struct ReachabilityGraph {
    /// The sink this graph was computed for.
    sink: MethodId,
    /// All methods with a directed call-graph walk to the sink.
    reachable_methods: HashSet<MethodId>,
    /// Per method: the distinct callers discovered during traversal.
    callers_map: HashMap<MethodId, HashSet<MethodId>>,
    /// Per method: the call edges into it, in discovery order, deduplicated.
    incoming_edges: HashMap<MethodId, Vec<CallEdge>>,
    /// All complete root-to-sink paths, in discovery order.
    complete_paths: Vec<ExecutionPath>,
}

impl ReachabilityGraph {
    /// Creates a new graph seeded with the sink.
    ///
    /// The sink is reachable from itself by definition.
    #[must_use]
    pub fn new(sink: MethodId) -> Self {
        let mut graph = ReachabilityGraph {
            sink,
            reachable_methods: HashSet::new(),
            callers_map: HashMap::new(),
            incoming_edges: HashMap::new(),
            complete_paths: Vec::new(),
        };
        graph.add_reachable_method(sink);
        graph
    }

    /// Records a method as reachable.
    pub(crate) fn add_reachable_method(&mut self, method: MethodId) {
        self.reachable_methods.insert(method);
        self.callers_map.entry(method).or_default();
        self.incoming_edges.entry(method).or_default();
    }

    /// Records that `caller` calls `callee` via `edge`.
    ///
    /// Both endpoints become reachable. Recording is idempotent per edge, so
    /// re-processing a method through a second path branch does not duplicate
    /// its incoming edges.
    pub(crate) fn add_caller(&mut self, callee: MethodId, caller: MethodId, edge: CallEdge) {
        self.add_reachable_method(callee);
        self.add_reachable_method(caller);

        if let Some(callers) = self.callers_map.get_mut(&callee) {
            callers.insert(caller);
        }
        if let Some(edges) = self.incoming_edges.get_mut(&callee) {
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
    }

    /// Stores a complete root-to-sink path.
    pub(crate) fn add_complete_path(&mut self, path: ExecutionPath) {
        self.complete_paths.push(path);
    }

    /// Returns the sink this graph was computed for.
    #[must_use]
    pub const fn sink(&self) -> MethodId {
        self.sink
    }

    /// Returns all methods that can reach the sink.
    #[must_use]
    pub const fn reachable_methods(&self) -> &HashSet<MethodId> {
        &self.reachable_methods
    }

    /// Returns `true` if the method can reach the sink.
    #[must_use]
    pub fn is_reachable(&self, method: MethodId) -> bool {
        self.reachable_methods.contains(&method)
    }

    /// Returns the recorded callers of a method.
    ///
    /// Unknown methods yield an empty set.
    #[must_use]
    pub fn callers(&self, method: MethodId) -> &HashSet<MethodId> {
        static EMPTY: std::sync::OnceLock<HashSet<MethodId>> = std::sync::OnceLock::new();
        self.callers_map
            .get(&method)
            .unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }

    /// Returns the recorded call edges into a method, in discovery order.
    #[must_use]
    pub fn incoming_edges(&self, method: MethodId) -> &[CallEdge] {
        self.incoming_edges
            .get(&method)
            .map_or(&[], Vec::as_slice)
    }

    /// Returns all complete root-to-sink paths, in discovery order.
    #[must_use]
    pub fn complete_paths(&self) -> &[ExecutionPath] {
        &self.complete_paths
    }

    /// Returns root methods: reachable, not the sink, and without callers.
    ///
    /// Sorted by method id for deterministic output.
    #[must_use]
    pub fn roots(&self) -> Vec<MethodId> {
        let mut roots: Vec<MethodId> = self
            .reachable_methods
            .iter()
            .copied()
            .filter(|&m| m != self.sink && self.callers(m).is_empty())
            .collect();
        roots.sort_unstable();
        roots
    }

    /// Returns aggregate statistics about this graph.
    #[must_use]
    pub fn stats(&self) -> ReachabilityStats {
        let lengths: Vec<usize> = self.complete_paths.iter().map(ExecutionPath::len).collect();
        let cyclic_paths = self
            .complete_paths
            .iter()
            .filter(|p| p.contains_cycle())
            .count();

        ReachabilityStats {
            reachable_methods: self.reachable_methods.len(),
            root_methods: self.roots().len(),
            complete_paths: self.complete_paths.len(),
            cyclic_paths,
            min_path_length: lengths.iter().copied().min().unwrap_or(0),
            max_path_length: lengths.iter().copied().max().unwrap_or(0),
        }
    }

    /// Renders a human-readable statistics report.
    ///
    /// # Arguments
    ///
    /// * `call_graph` - Used to resolve the sink signature
    #[must_use]
    pub fn statistics(&self, call_graph: &CallGraph) -> String {
        let stats = self.stats();
        let mut out = String::from("=== Reachability Graph Statistics ===\n");
        out.push_str(&format!("Sink: {}\n", call_graph.signature_of(self.sink)));
        out.push_str(&format!(
            "Total reachable methods: {}\n",
            stats.reachable_methods
        ));
        out.push_str(&format!(
            "Root methods (no callers): {}\n",
            stats.root_methods
        ));
        out.push_str(&format!(
            "Complete paths found: {}\n",
            stats.complete_paths
        ));
        if stats.complete_paths > 0 {
            out.push_str(&format!(
                "Path lengths - min: {}, max: {}\n",
                stats.min_path_length, stats.max_path_length
            ));
            if stats.cyclic_paths > 0 {
                out.push_str(&format!("Paths with cycles: {}\n", stats.cyclic_paths));
            }
        }
        out
    }
}

/// Aggregate metrics for a [`ReachabilityGraph`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReachabilityStats {
    /// Methods with a walk to the sink (including the sink).
    pub reachable_methods: usize,
    /// Reachable methods without callers (excluding the sink).
    pub root_methods: usize,
    /// Complete root-to-sink paths found.
    pub complete_paths: usize,
    /// Complete paths truncated at a cycle re-entry.
    pub cyclic_paths: usize,
    /// Shortest complete path length in methods (0 when no paths).
    pub min_path_length: usize,
    /// Longest complete path length in methods (0 when no paths).
    pub max_path_length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callgraph::CallSiteHandle;

    fn edge(a: usize, b: usize) -> CallEdge {
        CallEdge::new(MethodId::new(a), MethodId::new(b), CallSiteHandle::new(0))
    }

    #[test]
    fn test_sink_always_reachable() {
        let graph = ReachabilityGraph::new(MethodId::new(5));
        assert!(graph.is_reachable(MethodId::new(5)));
        assert_eq!(graph.sink(), MethodId::new(5));
        assert!(graph.callers(MethodId::new(5)).is_empty());
    }

    #[test]
    fn test_add_caller_makes_both_reachable() {
        let mut graph = ReachabilityGraph::new(MethodId::new(2));
        graph.add_caller(MethodId::new(2), MethodId::new(1), edge(1, 2));

        assert!(graph.is_reachable(MethodId::new(1)));
        assert!(graph.callers(MethodId::new(2)).contains(&MethodId::new(1)));
        assert_eq!(graph.incoming_edges(MethodId::new(2)), &[edge(1, 2)]);
    }

    #[test]
    fn test_edge_recording_is_idempotent() {
        let mut graph = ReachabilityGraph::new(MethodId::new(2));
        graph.add_caller(MethodId::new(2), MethodId::new(1), edge(1, 2));
        graph.add_caller(MethodId::new(2), MethodId::new(1), edge(1, 2));

        assert_eq!(graph.incoming_edges(MethodId::new(2)).len(), 1);
        assert_eq!(graph.callers(MethodId::new(2)).len(), 1);
    }

    #[test]
    fn test_roots_exclude_sink_and_called_methods() {
        // 0 -> 1 -> 2(sink); 3 -> 2
        let mut graph = ReachabilityGraph::new(MethodId::new(2));
        graph.add_caller(MethodId::new(2), MethodId::new(1), edge(1, 2));
        graph.add_caller(MethodId::new(1), MethodId::new(0), edge(0, 1));
        graph.add_caller(MethodId::new(2), MethodId::new(3), edge(3, 2));

        assert_eq!(graph.roots(), vec![MethodId::new(0), MethodId::new(3)]);
    }

    #[test]
    fn test_sink_with_callers_is_not_root() {
        let mut graph = ReachabilityGraph::new(MethodId::new(0));
        // Sink calls itself through a wrapper: sink has callers but the
        // caller has none.
        graph.add_caller(MethodId::new(0), MethodId::new(1), edge(1, 0));
        assert_eq!(graph.roots(), vec![MethodId::new(1)]);
    }

    #[test]
    fn test_stats_and_report() {
        let mut graph = ReachabilityGraph::new(MethodId::new(1));
        graph.add_caller(MethodId::new(1), MethodId::new(0), edge(0, 1));

        let mut path = ExecutionPath::new("path-0");
        path.add_method(MethodId::new(1));
        path.add_method(MethodId::new(0));
        path.add_edge(edge(0, 1));
        path.reverse();
        graph.add_complete_path(path);

        let stats = graph.stats();
        assert_eq!(stats.reachable_methods, 2);
        assert_eq!(stats.root_methods, 1);
        assert_eq!(stats.complete_paths, 1);
        assert_eq!(stats.cyclic_paths, 0);
        assert_eq!(stats.min_path_length, 2);
        assert_eq!(stats.max_path_length, 2);
    }
}
