//! Execution path representation.

use crate::{callgraph::CallEdge, callgraph::CallGraph, model::MethodId};

/// A single execution path from a root method to the sink.
///
/// Paths are built backward during traversal (sink toward root) by appending
/// methods and edges, then reversed exactly once so the stored order reads
/// root → sink. Branching in the traversal copies the path; a stored path is
/// never mutated again.
///
/// Invariants once a path is complete:
///
/// - `edges().len() == methods().len() - 1`
/// - `contains_cycle()` is `true` iff some method appears twice
///
/// The cycle flag latches: it is set the first time an already-present
/// method is appended and never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPath {
    /// Identifier assigned by the analyzer (`path-3`, `path-7-cyclic`, ...).
    path_id: String,
    /// Methods in root → sink order after normalization.
    methods: Vec<MethodId>,
    /// Call edges between consecutive methods.
    edges: Vec<CallEdge>,
    /// Whether any method appears more than once.
    contains_cycle: bool,
}

impl ExecutionPath {
    /// Creates a new empty path with the given identifier.
    #[must_use]
    pub fn new(path_id: impl Into<String>) -> Self {
        ExecutionPath {
            path_id: path_id.into(),
            methods: Vec::new(),
            edges: Vec::new(),
            contains_cycle: false,
        }
    }

    /// Appends a method to the path.
    ///
    /// If the method is already present the path is flagged as cyclic; the
    /// method is appended regardless so the truncation point stays visible
    /// in the stored sequence.
    pub fn add_method(&mut self, method: MethodId) {
        if self.methods.contains(&method) {
            self.contains_cycle = true;
        }
        self.methods.push(method);
    }

    /// Appends a call edge to the path.
    pub fn add_edge(&mut self, edge: CallEdge) {
        self.edges.push(edge);
    }

    /// Reverses the path in place.
    ///
    /// Called exactly once per path, after backward traversal reaches a root,
    /// so that the stored order reads root → sink.
    pub fn reverse(&mut self) {
        self.methods.reverse();
        self.edges.reverse();
    }

    /// Creates a copy of this path under a new identifier.
    ///
    /// Used when the backward traversal branches: each caller continues with
    /// its own copy, so sibling branches never share mutable state.
    #[must_use]
    pub fn copy_with_id(&self, new_path_id: impl Into<String>) -> Self {
        ExecutionPath {
            path_id: new_path_id.into(),
            methods: self.methods.clone(),
            edges: self.edges.clone(),
            contains_cycle: self.contains_cycle,
        }
    }

    /// Returns the path identifier.
    #[must_use]
    pub fn path_id(&self) -> &str {
        &self.path_id
    }

    /// Returns the number of methods in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if the path holds no methods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Returns `true` if any method appears more than once.
    #[must_use]
    pub const fn contains_cycle(&self) -> bool {
        self.contains_cycle
    }

    /// Returns the methods in root → sink order.
    #[must_use]
    pub fn methods(&self) -> &[MethodId] {
        &self.methods
    }

    /// Returns the call edges between consecutive methods.
    #[must_use]
    pub fn edges(&self) -> &[CallEdge] {
        &self.edges
    }

    /// Returns the first method of the path (the root), if any.
    #[must_use]
    pub fn first_method(&self) -> Option<MethodId> {
        self.methods.first().copied()
    }

    /// Returns the last method of the path (the sink), if any.
    #[must_use]
    pub fn last_method(&self) -> Option<MethodId> {
        self.methods.last().copied()
    }

    /// Renders a human-readable multi-line summary of this path.
    ///
    /// # Arguments
    ///
    /// * `call_graph` - Used to resolve method signatures
    #[must_use]
    pub fn summary(&self, call_graph: &CallGraph) -> String {
        let mut out = format!(
            "Path {}:\n  Length: {} methods\n  Methods:\n",
            self.path_id,
            self.len()
        );
        for (i, &method) in self.methods.iter().enumerate() {
            out.push_str(&format!(
                "    {}. {}\n",
                i + 1,
                call_graph.signature_of(method)
            ));
        }
        if self.contains_cycle {
            out.push_str("  [truncated: contains cycle]\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callgraph::CallSiteHandle;
    use crate::model::MethodDesc;

    fn edge(a: usize, b: usize) -> CallEdge {
        CallEdge::new(MethodId::new(a), MethodId::new(b), CallSiteHandle::new(0))
    }

    #[test]
    fn test_append_and_reverse() {
        // Built backward: sink first, root last
        let mut path = ExecutionPath::new("path-0");
        path.add_method(MethodId::new(2)); // sink
        path.add_method(MethodId::new(1));
        path.add_edge(edge(1, 2));
        path.add_method(MethodId::new(0)); // root
        path.add_edge(edge(0, 1));

        path.reverse();

        assert_eq!(
            path.methods(),
            &[MethodId::new(0), MethodId::new(1), MethodId::new(2)]
        );
        assert_eq!(path.first_method(), Some(MethodId::new(0)));
        assert_eq!(path.last_method(), Some(MethodId::new(2)));
        // edges.len() == methods.len() - 1 once complete
        assert_eq!(path.edges().len(), path.len() - 1);
        assert_eq!(path.edges()[0], edge(0, 1));
    }

    #[test]
    fn test_cycle_flag_latches() {
        let mut path = ExecutionPath::new("path-1");
        path.add_method(MethodId::new(0));
        assert!(!path.contains_cycle());

        path.add_method(MethodId::new(1));
        path.add_method(MethodId::new(0)); // revisit
        assert!(path.contains_cycle());
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut original = ExecutionPath::new("path-0");
        original.add_method(MethodId::new(0));

        let mut copy = original.copy_with_id("path-1");
        copy.add_method(MethodId::new(1));

        assert_eq!(original.len(), 1);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.path_id(), "path-1");
    }

    #[test]
    fn test_copy_preserves_cycle_flag() {
        let mut original = ExecutionPath::new("path-0");
        original.add_method(MethodId::new(0));
        original.add_method(MethodId::new(0));
        assert!(original.copy_with_id("path-0-cyclic").contains_cycle());
    }

    #[test]
    fn test_summary_resolves_signatures() {
        let mut graph = CallGraph::new();
        let root = graph.add_method(MethodDesc::new("com.app.Main", "main"));
        let sink = graph.add_method(MethodDesc::new("com.app.Crypto", "decrypt"));

        let mut path = ExecutionPath::new("path-0");
        path.add_method(sink);
        path.add_method(root);
        path.add_edge(CallEdge::new(root, sink, CallSiteHandle::new(0)));
        path.reverse();

        let summary = path.summary(&graph);
        assert!(summary.contains("com.app.Main::main"));
        assert!(summary.contains("com.app.Crypto::decrypt"));
        assert!(!summary.contains("cycle"));
    }
}
