//! Backward reachability worklist traversal.

use std::collections::{HashSet, VecDeque};

use crate::{
    analysis::{
        cfg::{CfgConstructionResult, MethodCfgBuilder, MethodCfgInfo},
        reachability::{ExecutionPath, ReachabilityGraph},
    },
    callgraph::CallGraph,
    model::MethodId,
    Error, Result,
};

/// Performs backward reachability analysis from a sink method.
///
/// Finds all paths from methods with no callers (roots) to the sink by
/// walking the call graph against its edges with a breadth-first worklist.
/// Each worklist item owns its own path and visited set, so branching at a
/// method with several callers never shares mutable state between branches.
///
/// Cycles are handled per branch: when a caller already occurs in the
/// branch's path, the branch is stored as a cycle-flagged complete path and
/// not expanded further. This truncation is what bounds the search on
/// recursive call graphs.
///
/// # Examples
///
/// ```rust
/// use sinktrace::analysis::BackwardReachabilityAnalyzer;
/// use sinktrace::callgraph::{CallGraph, CallSiteHandle};
/// use sinktrace::model::MethodDesc;
///
/// let mut graph = CallGraph::new();
/// let main = graph.add_method(MethodDesc::new("com.app.Main", "main"));
/// let sink = graph.add_method(MethodDesc::new("com.app.Crypto", "decrypt"));
/// graph.add_call(main, sink, CallSiteHandle::new(0))?;
///
/// let analyzer = BackwardReachabilityAnalyzer::new(&graph);
/// let reach = analyzer.find_paths_to_sink(sink)?;
///
/// assert!(reach.is_reachable(main));
/// assert_eq!(reach.complete_paths().len(), 1);
/// # Ok::<(), sinktrace::Error>(())
/// ```
#[derive(Debug)]
pub struct BackwardReachabilityAnalyzer<'a> {
    call_graph: &'a CallGraph,
}

/// One pending branch of the backward traversal.
#[derive(Debug)]
struct WorklistItem {
    /// Method currently being expanded.
    method: MethodId,
    /// Path accumulated so far, in sink → root order.
    path: ExecutionPath,
    /// Methods visited in THIS branch, for cycle detection.
    visited_in_path: HashSet<MethodId>,
}

impl<'a> BackwardReachabilityAnalyzer<'a> {
    /// Creates a new analyzer over the given call graph.
    #[must_use]
    pub const fn new(call_graph: &'a CallGraph) -> Self {
        BackwardReachabilityAnalyzer { call_graph }
    }

    /// Finds all paths from root methods to the sink using backward traversal.
    ///
    /// Algorithm:
    ///
    /// 1. Seed the worklist with the sink.
    /// 2. Pop an item and record its method as reachable.
    /// 3. Enumerate the call edges into the method (its callers), in the
    ///    call graph's edge-insertion order.
    /// 4. No callers: the branch reached a root; reverse the path to
    ///    root → sink order and store it as complete.
    /// 5. Otherwise record each caller relationship; a caller already seen
    ///    in this branch produces a cycle-flagged terminal path, every other
    ///    caller re-enqueues with copied path and visited set.
    ///
    /// # Arguments
    ///
    /// * `sink` - The sink method to analyze
    ///
    /// # Returns
    ///
    /// The completed [`ReachabilityGraph`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkNotFound`] if `sink` is not a method of the call
    /// graph. Nothing partial is produced in that case.
    pub fn find_paths_to_sink(&self, sink: MethodId) -> Result<ReachabilityGraph> {
        if !self.call_graph.contains(sink) {
            return Err(Error::SinkNotFound(self.call_graph.signature_of(sink)));
        }

        let mut reach_graph = ReachabilityGraph::new(sink);
        let mut worklist: VecDeque<WorklistItem> = VecDeque::new();

        let mut initial_path = ExecutionPath::new("path-0");
        initial_path.add_method(sink);
        let mut initial_visited = HashSet::new();
        initial_visited.insert(sink);

        worklist.push_back(WorklistItem {
            method: sink,
            path: initial_path,
            visited_in_path: initial_visited,
        });

        let mut path_counter = 1usize;

        while let Some(item) = worklist.pop_front() {
            reach_graph.add_reachable_method(item.method);

            let caller_edges = self.call_graph.edges_into(item.method);

            // No callers: this branch reached a root
            if caller_edges.is_empty() {
                let mut path = item.path;
                path.reverse();
                reach_graph.add_complete_path(path);
                continue;
            }

            for edge in caller_edges {
                let caller = edge.caller;

                // Caller relationships are recorded regardless of cycle status
                reach_graph.add_caller(item.method, caller, edge);

                if item.visited_in_path.contains(&caller) {
                    // Cycle in this branch: store a flagged terminal path and
                    // do not requeue
                    let mut cyclic_path = item
                        .path
                        .copy_with_id(format!("path-{path_counter}-cyclic"));
                    path_counter += 1;
                    cyclic_path.add_method(caller);
                    cyclic_path.add_edge(edge);
                    cyclic_path.reverse();
                    reach_graph.add_complete_path(cyclic_path);
                    continue;
                }

                let mut new_path = item.path.copy_with_id(format!("path-{path_counter}"));
                path_counter += 1;
                new_path.add_method(caller);
                new_path.add_edge(edge);

                let mut new_visited = item.visited_in_path.clone();
                new_visited.insert(caller);

                worklist.push_back(WorklistItem {
                    method: caller,
                    path: new_path,
                    visited_in_path: new_visited,
                });
            }
        }

        Ok(reach_graph)
    }

    /// Complete analysis: Phase 1 (reachability) plus optional Phase 2A
    /// (CFG construction).
    ///
    /// With `build_cfgs == false` the CFG phase is skipped entirely, which
    /// makes this a cheap reachability-only run. With `build_cfgs == true`
    /// the builder constructs one CFG per reachable method (plain mode) and
    /// tags sink-leading call sites.
    ///
    /// # Arguments
    ///
    /// * `sink` - The sink method to analyze
    /// * `build_cfgs` - Whether to run Phase 2A after reachability
    ///
    /// # Errors
    ///
    /// Returns [`Error::SinkNotFound`] if the sink is not in the call graph,
    /// and [`Error::SinkHasNoBody`] if CFGs were requested for a sink
    /// without an analyzable body. Both checks run before any traversal, so
    /// a failed run produces nothing partial.
    pub fn find_paths_and_build_cfgs(
        &self,
        sink: MethodId,
        build_cfgs: bool,
    ) -> Result<CompleteAnalysisResult> {
        if build_cfgs {
            let desc = self
                .call_graph
                .method(sink)
                .ok_or_else(|| Error::SinkNotFound(self.call_graph.signature_of(sink)))?;
            if !desc.has_body() {
                return Err(Error::SinkHasNoBody(desc.signature()));
            }
        }

        let reach_graph = self.find_paths_to_sink(sink)?;

        let cfg_result = if build_cfgs {
            let builder = MethodCfgBuilder::new(self.call_graph);
            let mut result = builder.build_cfgs(&reach_graph);
            builder.identify_sink_leading_calls(&mut result, &reach_graph);
            Some(result)
        } else {
            None
        };

        Ok(CompleteAnalysisResult {
            reachability: reach_graph,
            cfgs: cfg_result,
        })
    }
}

/// Result container for complete analysis (Phase 1 + optional Phase 2A).
#[derive(Debug)]
pub struct CompleteAnalysisResult {
    /// Reachability analysis results (Phase 1).
    reachability: ReachabilityGraph,
    /// CFG construction results (Phase 2A), when requested.
    cfgs: Option<CfgConstructionResult>,
}

impl CompleteAnalysisResult {
    /// Returns the reachability analysis results (Phase 1).
    #[must_use]
    pub const fn reachability_graph(&self) -> &ReachabilityGraph {
        &self.reachability
    }

    /// Returns the CFG construction results (Phase 2A), if performed.
    #[must_use]
    pub const fn cfg_result(&self) -> Option<&CfgConstructionResult> {
        self.cfgs.as_ref()
    }

    /// Returns `true` if CFG analysis was performed.
    #[must_use]
    pub const fn has_cfgs(&self) -> bool {
        self.cfgs.is_some()
    }

    /// Returns the CFG for a specific method, if one was built.
    #[must_use]
    pub fn cfg_for_method(&self, method: MethodId) -> Option<&MethodCfgInfo> {
        self.cfgs.as_ref().and_then(|c| c.cfg_for_method(method))
    }

    /// Returns all method CFGs, or an empty slice when CFG analysis was
    /// skipped.
    #[must_use]
    pub fn all_cfgs(&self) -> &[MethodCfgInfo] {
        self.cfgs.as_ref().map_or(&[], CfgConstructionResult::infos)
    }

    /// Renders a human-readable summary of the complete analysis.
    ///
    /// # Arguments
    ///
    /// * `call_graph` - Used to resolve the sink signature
    #[must_use]
    pub fn summary(&self, call_graph: &CallGraph) -> String {
        let mut out = String::from("=== Complete Analysis Summary ===\n");
        out.push_str(&format!(
            "Sink: {}\n",
            call_graph.signature_of(self.reachability.sink())
        ));
        out.push_str(&format!(
            "Reachable methods: {}\n",
            self.reachability.reachable_methods().len()
        ));
        out.push_str(&format!(
            "Complete paths: {}\n",
            self.reachability.complete_paths().len()
        ));

        if let Some(cfgs) = &self.cfgs {
            out.push_str(&format!("Methods with CFGs: {}\n", cfgs.total_methods()));
            out.push_str(&format!(
                "Total CFG instructions: {}\n",
                cfgs.total_instructions()
            ));
            out.push_str(&format!(
                "Sink-leading call sites: {}\n",
                cfgs.total_sink_leading_calls()
            ));
        } else {
            out.push_str("CFG analysis: Not performed\n");
        }

        out
    }
}
