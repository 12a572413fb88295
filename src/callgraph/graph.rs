//! Call graph construction and queries.
//!
//! [`CallGraph`] wraps the generic [`DirectedGraph`] with method interning:
//! descriptors go in once (keyed by signature), and every analysis phase
//! afterwards works with cheap [`MethodId`] handles. The container is built
//! incrementally by a frontend, then passed immutably into the analyzers.

use std::collections::HashMap;
use std::fmt::Write;

use crate::{
    callgraph::{CallEdge, CallSiteHandle},
    model::{MethodDesc, MethodId},
    utils::{escape_dot, graph::DirectedGraph, graph::NodeId},
    Result,
};

/// Interprocedural call graph over interned method descriptors.
///
/// Nodes are [`MethodDesc`] values stored in an arena; edges carry the
/// caller-supplied [`CallSiteHandle`]. Parallel edges are allowed: a caller
/// invoking the same callee from two sites contributes two edges, and the
/// reachability analysis sees both.
///
/// Interning is idempotent per signature, so frontends may re-add a method
/// when resolving forward references.
///
/// # Examples
///
/// ```rust
/// use sinktrace::callgraph::{CallGraph, CallSiteHandle};
/// use sinktrace::model::MethodDesc;
///
/// let mut graph = CallGraph::new();
/// let main = graph.add_method(MethodDesc::new("com.app.Main", "main"));
/// let helper = graph.add_method(MethodDesc::new("com.app.Util", "helper"));
/// graph.add_call(main, helper, CallSiteHandle::new(0))?;
///
/// assert_eq!(graph.callers(helper), vec![main]);
/// assert_eq!(graph.entry_points(), vec![main]);
/// # Ok::<(), sinktrace::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    /// The underlying directed graph: method descriptors joined by call edges.
    graph: DirectedGraph<MethodDesc, CallSiteHandle>,
    /// Map from method signature to arena id for O(1) interning.
    sig_to_id: HashMap<String, MethodId>,
}

impl CallGraph {
    /// Creates an empty call graph.
    #[must_use]
    pub fn new() -> Self {
        CallGraph {
            graph: DirectedGraph::new(),
            sig_to_id: HashMap::new(),
        }
    }

    /// Creates an empty call graph with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(method_capacity: usize, edge_capacity: usize) -> Self {
        CallGraph {
            graph: DirectedGraph::with_capacity(method_capacity, edge_capacity),
            sig_to_id: HashMap::with_capacity(method_capacity),
        }
    }

    /// Interns a method descriptor and returns its id.
    ///
    /// Idempotent per signature: re-adding a method with an already-known
    /// signature returns the existing id and keeps the first descriptor.
    ///
    /// # Arguments
    ///
    /// * `desc` - The descriptor to intern
    pub fn add_method(&mut self, desc: MethodDesc) -> MethodId {
        let signature = desc.signature();
        if let Some(&id) = self.sig_to_id.get(&signature) {
            return id;
        }
        let node = self.graph.add_node(desc);
        let id = MethodId::new(node.index());
        self.sig_to_id.insert(signature, id);
        id
    }

    /// Adds a call edge from `caller` to `callee` at the given site.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`](crate::Error::GraphError) if either id
    /// does not belong to this graph.
    pub fn add_call(
        &mut self,
        caller: MethodId,
        callee: MethodId,
        site: CallSiteHandle,
    ) -> Result<()> {
        self.graph
            .add_edge(NodeId::new(caller.index()), NodeId::new(callee.index()), site)?;
        Ok(())
    }

    /// Returns the descriptor for a method id.
    ///
    /// Returns `None` if the id does not belong to this graph.
    #[must_use]
    pub fn method(&self, id: MethodId) -> Option<&MethodDesc> {
        self.graph.node(NodeId::new(id.index()))
    }

    /// Looks up a method id by signature (`Class::name` form).
    #[must_use]
    pub fn lookup(&self, signature: &str) -> Option<MethodId> {
        self.sig_to_id.get(signature).copied()
    }

    /// Returns `true` if the id belongs to this graph.
    #[must_use]
    pub fn contains(&self, id: MethodId) -> bool {
        self.graph.contains_node(NodeId::new(id.index()))
    }

    /// Returns the signature for a method id, or a placeholder for an
    /// unknown id.
    ///
    /// Convenience used by statistics and DOT rendering, where a missing
    /// descriptor should degrade to readable output rather than an error.
    #[must_use]
    pub fn signature_of(&self, id: MethodId) -> String {
        self.method(id)
            .map_or_else(|| format!("<unknown {id}>"), MethodDesc::signature)
    }

    /// Returns the number of methods in the graph.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of call edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns `true` if the graph holds no methods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Returns an iterator over all method ids, in interning order.
    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.graph.node_ids().map(|n| MethodId::new(n.index()))
    }

    /// Returns the call edges into a method (its callers), in edge-insertion
    /// order.
    ///
    /// This is the query backward reachability is built on; the order is
    /// deterministic for a deterministically built graph.
    #[must_use]
    pub fn edges_into(&self, callee: MethodId) -> Vec<CallEdge> {
        let node = NodeId::new(callee.index());
        if !self.graph.contains_node(node) {
            return Vec::new();
        }
        self.graph
            .incoming_edges(node)
            .map(|(edge_id, &site)| {
                let (source, _) = self
                    .graph
                    .edge_endpoints(edge_id)
                    .unwrap_or((node, node));
                CallEdge::new(MethodId::new(source.index()), callee, site)
            })
            .collect()
    }

    /// Returns the call edges out of a method (its callees), in
    /// edge-insertion order.
    #[must_use]
    pub fn edges_out(&self, caller: MethodId) -> Vec<CallEdge> {
        let node = NodeId::new(caller.index());
        if !self.graph.contains_node(node) {
            return Vec::new();
        }
        self.graph
            .outgoing_edges(node)
            .map(|(edge_id, &site)| {
                let (_, target) = self
                    .graph
                    .edge_endpoints(edge_id)
                    .unwrap_or((node, node));
                CallEdge::new(caller, MethodId::new(target.index()), site)
            })
            .collect()
    }

    /// Returns the distinct callers of a method.
    #[must_use]
    pub fn callers(&self, callee: MethodId) -> Vec<MethodId> {
        let node = NodeId::new(callee.index());
        if !self.graph.contains_node(node) {
            return Vec::new();
        }
        let mut seen = std::collections::HashSet::new();
        self.graph
            .predecessors(node)
            .map(|n| MethodId::new(n.index()))
            .filter(|&m| seen.insert(m))
            .collect()
    }

    /// Returns the distinct callees of a method.
    #[must_use]
    pub fn callees(&self, caller: MethodId) -> Vec<MethodId> {
        let node = NodeId::new(caller.index());
        if !self.graph.contains_node(node) {
            return Vec::new();
        }
        let mut seen = std::collections::HashSet::new();
        self.graph
            .successors(node)
            .map(|n| MethodId::new(n.index()))
            .filter(|&m| seen.insert(m))
            .collect()
    }

    /// Returns entry points: methods with no callers within the graph.
    ///
    /// For an application these are typically lifecycle callbacks and
    /// externally-invoked handlers.
    #[must_use]
    pub fn entry_points(&self) -> Vec<MethodId> {
        self.graph
            .entry_nodes()
            .map(|n| MethodId::new(n.index()))
            .collect()
    }

    /// Returns aggregate statistics for the graph.
    #[must_use]
    pub fn stats(&self) -> CallGraphStats {
        let with_bodies = self
            .graph
            .nodes()
            .filter(|(_, desc)| desc.has_body())
            .count();

        CallGraphStats {
            method_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            methods_with_bodies: with_bodies,
            entry_points: self.entry_points().len(),
        }
    }

    /// Generates a DOT format representation of this call graph.
    ///
    /// Entry points are highlighted in green, bodiless methods in yellow.
    /// The output renders with Graphviz `dot`.
    ///
    /// # Arguments
    ///
    /// * `title` - Optional title for the graph
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CallGraph {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"{}\";", escape_dot(name));
        } else {
            dot.push_str("    label=\"Call Graph\";\n");
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        dot.push_str("    rankdir=TB;\n\n");

        let entry_points = self.entry_points();

        for (node, desc) in self.graph.nodes() {
            let id = MethodId::new(node.index());
            let style = if entry_points.contains(&id) {
                ", style=filled, fillcolor=lightgreen"
            } else if !desc.has_body() {
                ", style=filled, fillcolor=lightyellow"
            } else {
                ""
            };
            let _ = writeln!(
                dot,
                "    \"{id}\" [label=\"{}\"{style}];",
                escape_dot(&desc.signature()),
            );
        }

        dot.push('\n');

        for id in self.method_ids() {
            for edge in self.edges_out(id) {
                let _ = writeln!(dot, "    \"{}\" -> \"{}\";", edge.caller, edge.callee);
            }
        }

        dot.push_str("}\n");
        dot
    }
}

/// Aggregate statistics about a call graph.
#[derive(Debug, Clone, Default)]
pub struct CallGraphStats {
    /// Number of interned methods.
    pub method_count: usize,
    /// Number of call edges.
    pub edge_count: usize,
    /// Number of methods carrying analyzable bodies.
    pub methods_with_bodies: usize,
    /// Number of methods with no callers.
    pub entry_points: usize,
}
