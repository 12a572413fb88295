//! Batch CFG construction over the reachable set.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    analysis::{
        cfg::{BlockCfgExtractor, CfgMode, MethodCfgInfo, SkipReason},
        reachability::ReachabilityGraph,
    },
    callgraph::CallGraph,
    model::MethodId,
};

/// Builds control flow graphs for all methods that can reach the sink.
///
/// Takes the [`ReachabilityGraph`] from Phase 1 and produces one CFG per
/// reachable method. Extraction is independent per method, so the loop fans
/// out across a thread pool; results are collected back in method-id order,
/// keeping the output deterministic regardless of scheduling.
///
/// Methods that cannot be extracted (no body, empty body, malformed body)
/// are recorded with a typed [`SkipReason`] and do not fail the phase.
///
/// # Examples
///
/// ```rust,ignore
/// let builder = MethodCfgBuilder::new(&call_graph).with_mode(CfgMode::Exceptional);
/// let mut result = builder.build_cfgs(&reach_graph);
/// builder.identify_sink_leading_calls(&mut result, &reach_graph);
/// println!("{}", result.statistics());
/// ```
#[derive(Debug)]
pub struct MethodCfgBuilder<'a> {
    call_graph: &'a CallGraph,
    mode: CfgMode,
}

impl<'a> MethodCfgBuilder<'a> {
    /// Creates a builder over the given call graph, in plain mode.
    #[must_use]
    pub const fn new(call_graph: &'a CallGraph) -> Self {
        MethodCfgBuilder {
            call_graph,
            mode: CfgMode::Plain,
        }
    }

    /// Sets the CFG construction mode, consuming and returning the builder.
    #[must_use]
    pub const fn with_mode(mut self, mode: CfgMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builds CFGs for all reachable methods.
    ///
    /// # Arguments
    ///
    /// * `reach_graph` - The reachability graph from Phase 1
    ///
    /// # Returns
    ///
    /// A [`CfgConstructionResult`] holding the built CFGs (without
    /// sink-leading annotations yet) and the skip records.
    #[must_use]
    pub fn build_cfgs(&self, reach_graph: &ReachabilityGraph) -> CfgConstructionResult {
        let mut methods: Vec<MethodId> =
            reach_graph.reachable_methods().iter().copied().collect();
        methods.sort_unstable();

        let extractor = BlockCfgExtractor::new(self.mode);

        let extracted: Vec<(MethodId, Result<MethodCfgInfo, SkipReason>)> = methods
            .par_iter()
            .map(|&method| {
                let outcome = match self.call_graph.method(method) {
                    Some(desc) => extractor
                        .extract_cfg(method, desc)
                        .map(|cfg| MethodCfgInfo::new(method, cfg)),
                    None => Err(SkipReason::NoBody),
                };
                (method, outcome)
            })
            .collect();

        let mut infos = Vec::new();
        let mut skipped = Vec::new();
        for (method, outcome) in extracted {
            match outcome {
                Ok(info) => infos.push(info),
                Err(reason) => skipped.push((method, reason)),
            }
        }

        CfgConstructionResult::new(infos, skipped)
    }

    /// Tags sink-leading call sites in the built CFGs.
    ///
    /// A call instruction leads toward the sink iff its target is the sink
    /// itself, or the target is reachable and lists the call's owning method
    /// among its recorded callers in the reachability graph. Everything else
    /// is irrelevant to path expansion and left untagged.
    ///
    /// # Arguments
    ///
    /// * `result` - The construction result to annotate
    /// * `reach_graph` - The reachability graph from Phase 1
    pub fn identify_sink_leading_calls(
        &self,
        result: &mut CfgConstructionResult,
        reach_graph: &ReachabilityGraph,
    ) {
        let sink = reach_graph.sink();

        for info in result.infos_mut() {
            let owner = info.method();
            let mut tagged = Vec::new();

            for block in info.cfg().blocks() {
                for (position, instr) in block.instructions.iter().enumerate() {
                    let Some(target) = instr.invoked else {
                        continue;
                    };
                    let toward_sink = target == sink
                        || (reach_graph.is_reachable(target)
                            && reach_graph.callers(target).contains(&owner));
                    if toward_sink {
                        tagged.push(block.offset_of(position));
                    }
                }
            }

            for offset in tagged {
                info.add_sink_leading_call(offset);
            }
        }
    }
}

/// Result of the CFG construction phase.
///
/// Holds the per-method CFG infos in method-id order, an index for O(1)
/// method lookup, and the skip records for methods that could not be
/// extracted.
#[derive(Debug)]
pub struct CfgConstructionResult {
    /// Built CFGs, sorted by method id.
    infos: Vec<MethodCfgInfo>,
    /// Method id -> position in `infos`.
    index: HashMap<MethodId, usize>,
    /// Methods that were skipped, with their reasons, sorted by method id.
    skipped: Vec<(MethodId, SkipReason)>,
}

impl CfgConstructionResult {
    fn new(infos: Vec<MethodCfgInfo>, skipped: Vec<(MethodId, SkipReason)>) -> Self {
        let index = infos
            .iter()
            .enumerate()
            .map(|(i, info)| (info.method(), i))
            .collect();
        CfgConstructionResult {
            infos,
            index,
            skipped,
        }
    }

    /// Returns the built CFG infos, in method-id order.
    #[must_use]
    pub fn infos(&self) -> &[MethodCfgInfo] {
        &self.infos
    }

    pub(crate) fn infos_mut(&mut self) -> &mut [MethodCfgInfo] {
        &mut self.infos
    }

    /// Returns the CFG info for a method, if one was built.
    #[must_use]
    pub fn cfg_for_method(&self, method: MethodId) -> Option<&MethodCfgInfo> {
        self.index.get(&method).map(|&i| &self.infos[i])
    }

    /// Returns the methods that were skipped, with their reasons.
    #[must_use]
    pub fn skipped(&self) -> &[(MethodId, SkipReason)] {
        &self.skipped
    }

    /// Returns the number of methods with built CFGs.
    #[must_use]
    pub fn total_methods(&self) -> usize {
        self.infos.len()
    }

    /// Returns the total number of instructions across all built CFGs.
    #[must_use]
    pub fn total_instructions(&self) -> usize {
        self.infos.iter().map(|i| i.cfg().total_instructions()).sum()
    }

    /// Returns the total number of sink-leading call sites across all CFGs.
    #[must_use]
    pub fn total_sink_leading_calls(&self) -> usize {
        self.infos.iter().map(|i| i.sink_leading_calls().len()).sum()
    }

    /// Renders a human-readable summary of this phase.
    #[must_use]
    pub fn statistics(&self) -> String {
        let mut out = String::from("=== CFG Construction Result ===\n");
        out.push_str(&format!("Methods with CFGs: {}\n", self.total_methods()));
        out.push_str(&format!("Skipped methods: {}\n", self.skipped.len()));
        out.push_str(&format!(
            "Total instructions: {}\n",
            self.total_instructions()
        ));
        out.push_str(&format!(
            "Sink-leading call sites: {}\n",
            self.total_sink_leading_calls()
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::reachability::BackwardReachabilityAnalyzer;
    use crate::callgraph::CallSiteHandle;
    use crate::model::{Instruction, MethodBody, MethodDesc};

    /// root -> mid -> sink, plus a bodiless caller of the sink.
    fn fixture() -> (CallGraph, MethodId, MethodId, MethodId, MethodId) {
        let mut graph = CallGraph::new();

        let sink = graph.add_method(
            MethodDesc::new("com.app.Crypto", "decrypt")
                .with_body(MethodBody::new(vec![Instruction::ret()])),
        );

        let mid_body = MethodBody::new(vec![
            Instruction::invoke("decrypt()", sink),
            Instruction::ret(),
        ]);
        let mid =
            graph.add_method(MethodDesc::new("com.app.Repo", "load").with_body(mid_body));

        let root_body = MethodBody::new(vec![
            Instruction::invoke("load()", mid),
            Instruction::ret(),
        ]);
        let root =
            graph.add_method(MethodDesc::new("com.app.Main", "main").with_body(root_body));

        let external = graph.add_method(MethodDesc::new("com.app.Ext", "call"));

        graph.add_call(root, mid, CallSiteHandle::new(0)).unwrap();
        graph.add_call(mid, sink, CallSiteHandle::new(1)).unwrap();
        graph
            .add_call(external, sink, CallSiteHandle::new(2))
            .unwrap();

        (graph, root, mid, sink, external)
    }

    #[test]
    fn test_builds_cfgs_and_counts_skips() {
        let (graph, _, _, sink, external) = fixture();
        let reach = BackwardReachabilityAnalyzer::new(&graph)
            .find_paths_to_sink(sink)
            .unwrap();

        let builder = MethodCfgBuilder::new(&graph);
        let result = builder.build_cfgs(&reach);

        // Three methods have bodies; the external caller is skipped
        assert_eq!(result.total_methods(), 3);
        assert_eq!(result.skipped().len(), 1);
        assert_eq!(result.skipped()[0], (external, SkipReason::NoBody));
        assert!(result.cfg_for_method(external).is_none());
    }

    #[test]
    fn test_result_is_sorted_and_indexed() {
        let (graph, root, mid, sink, _) = fixture();
        let reach = BackwardReachabilityAnalyzer::new(&graph)
            .find_paths_to_sink(sink)
            .unwrap();

        let result = MethodCfgBuilder::new(&graph).build_cfgs(&reach);

        let methods: Vec<MethodId> = result.infos().iter().map(MethodCfgInfo::method).collect();
        let mut sorted = methods.clone();
        sorted.sort_unstable();
        assert_eq!(methods, sorted);

        for m in [root, mid, sink] {
            assert_eq!(result.cfg_for_method(m).unwrap().method(), m);
        }
    }

    #[test]
    fn test_sink_leading_identification() {
        let (graph, root, mid, sink, _) = fixture();
        let reach = BackwardReachabilityAnalyzer::new(&graph)
            .find_paths_to_sink(sink)
            .unwrap();

        let builder = MethodCfgBuilder::new(&graph);
        let mut result = builder.build_cfgs(&reach);
        builder.identify_sink_leading_calls(&mut result, &reach);

        // root's call to mid leads toward the sink; mid's call to sink does too
        let root_info = result.cfg_for_method(root).unwrap();
        assert_eq!(root_info.sink_leading_calls().len(), 1);
        assert!(root_info.is_sink_leading(0));

        let mid_info = result.cfg_for_method(mid).unwrap();
        assert!(mid_info.is_sink_leading(0));

        assert_eq!(result.total_sink_leading_calls(), 2);
    }

    #[test]
    fn test_irrelevant_call_not_tagged() {
        let mut graph = CallGraph::new();
        let sink = graph.add_method(
            MethodDesc::new("com.app.Crypto", "decrypt")
                .with_body(MethodBody::new(vec![Instruction::ret()])),
        );
        let helper = graph.add_method(
            MethodDesc::new("com.app.Util", "format")
                .with_body(MethodBody::new(vec![Instruction::ret()])),
        );
        let caller_body = MethodBody::new(vec![
            Instruction::invoke("format()", helper),
            Instruction::invoke("decrypt()", sink),
            Instruction::ret(),
        ]);
        let caller =
            graph.add_method(MethodDesc::new("com.app.Main", "run").with_body(caller_body));
        graph.add_call(caller, helper, CallSiteHandle::new(0)).unwrap();
        graph.add_call(caller, sink, CallSiteHandle::new(1)).unwrap();

        let reach = BackwardReachabilityAnalyzer::new(&graph)
            .find_paths_to_sink(sink)
            .unwrap();
        let builder = MethodCfgBuilder::new(&graph);
        let mut result = builder.build_cfgs(&reach);
        builder.identify_sink_leading_calls(&mut result, &reach);

        // Only the decrypt() call is sink-leading; format() is not on any
        // path to the sink
        let info = result.cfg_for_method(caller).unwrap();
        assert_eq!(info.sink_leading_calls().len(), 1);
        assert!(info.is_sink_leading(1));
        assert!(!info.is_sink_leading(0));
    }

    #[test]
    fn test_statistics_report() {
        let (graph, _, _, sink, _) = fixture();
        let reach = BackwardReachabilityAnalyzer::new(&graph)
            .find_paths_to_sink(sink)
            .unwrap();
        let builder = MethodCfgBuilder::new(&graph);
        let mut result = builder.build_cfgs(&reach);
        builder.identify_sink_leading_calls(&mut result, &reach);

        let report = result.statistics();
        assert!(report.contains("Methods with CFGs: 3"));
        assert!(report.contains("Skipped methods: 1"));
        assert!(report.contains("Sink-leading call sites: 2"));
    }
}
