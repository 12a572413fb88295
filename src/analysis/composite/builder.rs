//! Composite path generation across call boundaries.

use crate::{
    analysis::{
        callsite::{BlockRef, CallSite, CallSiteAnalysis},
        cfg::CfgConstructionResult,
        composite::{CompositePath, MethodPath, MethodPathEnumerator},
    },
    callgraph::CallGraph,
    model::MethodId,
};

/// Budget bounding composite-path expansion.
///
/// The cross-product of intraprocedural alternatives at every call boundary
/// is unbounded in general graphs, so expansion carries an explicit budget:
/// at most `max_paths` scenarios overall and at most `max_depth` frames per
/// scenario. Exhausting either limit flags the result set as truncated
/// instead of expanding further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathBudget {
    /// Maximum frames per scenario.
    pub max_depth: usize,
    /// Maximum number of scenarios overall.
    pub max_paths: usize,
}

impl PathBudget {
    /// Creates a budget with the given limits.
    #[must_use]
    pub const fn new(max_depth: usize, max_paths: usize) -> Self {
        PathBudget {
            max_depth,
            max_paths,
        }
    }

    /// Creates an effectively unlimited budget.
    ///
    /// Only sensible for small inputs under test; production callers should
    /// keep the default or tighter.
    #[must_use]
    pub const fn unbounded() -> Self {
        PathBudget {
            max_depth: usize::MAX,
            max_paths: usize::MAX,
        }
    }
}

impl Default for PathBudget {
    fn default() -> Self {
        PathBudget {
            max_depth: 64,
            max_paths: 4096,
        }
    }
}

/// The scenarios produced by one composite-path generation run.
#[derive(Debug, Default)]
pub struct CompositePathSet {
    /// Complete scenarios, in generation order.
    paths: Vec<CompositePath>,
    /// Whether the budget cut expansion short.
    truncated: bool,
}

impl CompositePathSet {
    /// Returns the generated scenarios.
    #[must_use]
    pub fn paths(&self) -> &[CompositePath] {
        &self.paths
    }

    /// Returns the number of generated scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if no scenarios were generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns `true` if the budget cut expansion short.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// Consumes the set, returning the scenarios.
    #[must_use]
    pub fn into_paths(self) -> Vec<CompositePath> {
        self.paths
    }
}

/// Builds composite paths by recursive scenario generation.
///
/// For each application entry point and each intraprocedural path through
/// it, call sites are resolved one at a time: the first call site of the
/// frame under scan either terminates the scenario (non-app target, missing
/// CFG) or fans out into one new scenario per path through the callee, which
/// is then scanned in turn. The expansion is realized as an explicit stack
/// loop rather than native recursion, bounded by the injected [`PathBudget`].
///
/// Call sites after the first in a frame's path are not expanded; scanning
/// continues in the callee only. One fully-expanded
/// scenario exists per combination of alternatives chosen at each *scanned*
/// call boundary.
///
/// # Examples
///
/// ```rust,ignore
/// let enumerator = MethodPathEnumerator::new();
/// let builder = CompositePathBuilder::new(&graph, "com.app", &enumerator, &analysis, &cfgs)
///     .with_budget(PathBudget::new(16, 1000));
/// let scenarios = builder.build_composite_paths(&graph.entry_points());
/// for path in scenarios.paths() {
///     println!("{}", path.summary(&graph));
/// }
/// ```
#[derive(Debug)]
pub struct CompositePathBuilder<'a> {
    call_graph: &'a CallGraph,
    package_prefix: String,
    path_enumerator: &'a MethodPathEnumerator,
    call_sites: &'a CallSiteAnalysis,
    cfgs: &'a CfgConstructionResult,
    budget: PathBudget,
}

impl<'a> CompositePathBuilder<'a> {
    /// Creates a builder with the default budget.
    ///
    /// # Arguments
    ///
    /// * `call_graph` - The program's call graph
    /// * `package_prefix` - Application package filter
    /// * `path_enumerator` - Shared intraprocedural path enumerator
    /// * `call_sites` - Result of the call-site scan
    /// * `cfgs` - CFGs built in Phase 2A
    #[must_use]
    pub fn new(
        call_graph: &'a CallGraph,
        package_prefix: impl Into<String>,
        path_enumerator: &'a MethodPathEnumerator,
        call_sites: &'a CallSiteAnalysis,
        cfgs: &'a CfgConstructionResult,
    ) -> Self {
        CompositePathBuilder {
            call_graph,
            package_prefix: package_prefix.into(),
            path_enumerator,
            call_sites,
            cfgs,
            budget: PathBudget::default(),
        }
    }

    /// Sets the expansion budget, consuming and returning the builder.
    #[must_use]
    pub fn with_budget(mut self, budget: PathBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Builds all composite paths starting from the given entry points.
    ///
    /// Entry points outside the application package, or without CFGs, are
    /// skipped and contribute no scenarios.
    ///
    /// # Arguments
    ///
    /// * `entry_points` - Candidate entry methods, processed in order
    #[must_use]
    pub fn build_composite_paths(&self, entry_points: &[MethodId]) -> CompositePathSet {
        let mut set = CompositePathSet::default();

        'entries: for &entry in entry_points {
            if !self.is_app_method(entry) {
                continue;
            }
            let Some(entry_info) = self.cfgs.cfg_for_method(entry) else {
                continue;
            };

            let entry_paths = self.path_enumerator.method_paths(entry_info.cfg());
            for entry_path in entry_paths.iter() {
                let initial = CompositePath::initial(entry, entry_path.clone());
                if !self.resolve_call_sites(initial, entry_path.clone(), &mut set) {
                    break 'entries;
                }
            }
        }

        set
    }

    /// Resolves call sites for one seed scenario with a stack-driven loop.
    ///
    /// Each pending item pairs a scenario with the frame path still being
    /// scanned. Returns `false` when the scenario budget is exhausted.
    fn resolve_call_sites(
        &self,
        initial: CompositePath,
        initial_scan: MethodPath,
        set: &mut CompositePathSet,
    ) -> bool {
        let mut pending: Vec<(CompositePath, MethodPath)> = vec![(initial, initial_scan)];

        while let Some((current, scan_path)) = pending.pop() {
            if set.paths.len() >= self.budget.max_paths {
                set.truncated = true;
                return false;
            }

            let sites = self.call_sites_in_path(&scan_path);

            // No application call sites: the scenario is complete
            let Some(&first) = sites.first() else {
                set.paths.push(current);
                continue;
            };

            // Non-expandable targets terminate the scenario at the call
            if !self.is_app_method(first.target) {
                set.paths.push(current);
                continue;
            }
            let Some(target_info) = self.cfgs.cfg_for_method(first.target) else {
                set.paths.push(current);
                continue;
            };

            if current.call_depth() >= self.budget.max_depth {
                set.truncated = true;
                set.paths.push(current);
                continue;
            }

            // One new scenario per path through the callee; reversed push
            // keeps the expansion order depth-first in enumeration order
            let target_paths = self.path_enumerator.method_paths(target_info.cfg());
            for target_path in target_paths.iter().rev() {
                pending.push((
                    current.combine(first, target_path.clone()),
                    target_path.clone(),
                ));
            }
        }

        true
    }

    /// Collects the call sites along a frame path, in block-sequence order
    /// and within each block in instruction order.
    fn call_sites_in_path(&self, path: &MethodPath) -> Vec<CallSite> {
        let mut sites = Vec::new();
        for &block in path.blocks() {
            sites.extend_from_slice(
                self.call_sites
                    .call_sites_for_block(BlockRef::new(path.method(), block)),
            );
        }
        sites
    }

    /// Returns `true` if the method lives under the application package.
    fn is_app_method(&self, method: MethodId) -> bool {
        self.call_graph
            .method(method)
            .is_some_and(|desc| desc.is_in_package(&self.package_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::callsite::CallSiteAnalyzer;
    use crate::analysis::cfg::{MethodCfgBuilder, MethodCfgInfo};
    use crate::analysis::reachability::BackwardReachabilityAnalyzer;
    use crate::callgraph::CallSiteHandle;
    use crate::model::{Instruction, MethodBody, MethodDesc};

    /// Runs phases 1 + 2A + the call-site scan for a prepared call graph.
    fn prepare(
        graph: &CallGraph,
        sink: MethodId,
    ) -> (CfgConstructionResult, CallSiteAnalysis) {
        let reach = BackwardReachabilityAnalyzer::new(graph)
            .find_paths_to_sink(sink)
            .unwrap();
        let builder = MethodCfgBuilder::new(graph);
        let mut cfgs = builder.build_cfgs(&reach);
        builder.identify_sink_leading_calls(&mut cfgs, &reach);

        let analyzer = CallSiteAnalyzer::new(graph, "com.app");
        let analysis =
            analyzer.analyze_call_sites(cfgs.infos().iter().map(MethodCfgInfo::cfg));
        (cfgs, analysis)
    }

    #[test]
    fn test_entry_without_call_sites_one_scenario_per_path() {
        let mut graph = CallGraph::new();
        // Entry with a branch and two single-block returns: two paths, no calls
        let body = MethodBody::new(vec![
            Instruction::branch("if x", 3),
            Instruction::stmt("y = 1"),
            Instruction::ret(),
            Instruction::stmt("y = 2"),
            Instruction::ret(),
        ]);
        let entry = graph.add_method(MethodDesc::new("com.app.Main", "main").with_body(body));

        let (cfgs, analysis) = prepare(&graph, entry);
        let enumerator = MethodPathEnumerator::new();
        let builder =
            CompositePathBuilder::new(&graph, "com.app", &enumerator, &analysis, &cfgs);
        let set = builder.build_composite_paths(&[entry]);

        assert_eq!(set.len(), 2);
        assert!(!set.truncated());
        for path in set.paths() {
            assert_eq!(path.call_depth(), 1);
            assert_eq!(path.entry_point(), entry);
        }
    }

    #[test]
    fn test_expansion_per_callee_path() {
        let mut graph = CallGraph::new();
        // Callee with two intraprocedural paths
        let callee_body = MethodBody::new(vec![
            Instruction::branch("if ok", 3),
            Instruction::stmt("r = 1"),
            Instruction::ret(),
            Instruction::stmt("r = 2"),
            Instruction::ret(),
        ]);
        let callee =
            graph.add_method(MethodDesc::new("com.app.Repo", "load").with_body(callee_body));

        let entry_body = MethodBody::new(vec![
            Instruction::invoke("load()", callee),
            Instruction::ret(),
        ]);
        let entry =
            graph.add_method(MethodDesc::new("com.app.Main", "main").with_body(entry_body));
        graph.add_call(entry, callee, CallSiteHandle::new(0)).unwrap();

        let (cfgs, analysis) = prepare(&graph, callee);
        let enumerator = MethodPathEnumerator::new();
        let builder =
            CompositePathBuilder::new(&graph, "com.app", &enumerator, &analysis, &cfgs);
        let set = builder.build_composite_paths(&[entry]);

        // One scenario per path through the callee, each two frames deep
        assert_eq!(set.len(), 2);
        for path in set.paths() {
            assert_eq!(path.call_depth(), 2);
            assert_eq!(path.executions()[1].path.method(), callee);
            assert_eq!(path.executions()[1].caller, Some(0));
        }
    }

    #[test]
    fn test_non_app_target_is_leaf() {
        let mut graph = CallGraph::new();
        let log = graph.add_method(
            MethodDesc::new("android.util.Log", "d")
                .with_body(MethodBody::new(vec![Instruction::ret()])),
        );
        let entry_body = MethodBody::new(vec![
            Instruction::invoke("Log.d()", log),
            Instruction::ret(),
        ]);
        let entry =
            graph.add_method(MethodDesc::new("com.app.Main", "main").with_body(entry_body));
        graph.add_call(entry, log, CallSiteHandle::new(0)).unwrap();

        let (cfgs, analysis) = prepare(&graph, log);
        let enumerator = MethodPathEnumerator::new();
        let builder =
            CompositePathBuilder::new(&graph, "com.app", &enumerator, &analysis, &cfgs);
        let set = builder.build_composite_paths(&[entry]);

        // The framework call is never recorded as a call site, so the
        // scenario completes with the entry frame alone
        assert_eq!(set.len(), 1);
        assert_eq!(set.paths()[0].call_depth(), 1);
    }

    #[test]
    fn test_missing_target_cfg_is_leaf() {
        let mut graph = CallGraph::new();
        // App-package callee without a body: no CFG will exist for it
        let callee = graph.add_method(MethodDesc::new("com.app.Native", "exec"));
        let entry_body = MethodBody::new(vec![
            Instruction::invoke("exec()", callee),
            Instruction::ret(),
        ]);
        let entry =
            graph.add_method(MethodDesc::new("com.app.Main", "main").with_body(entry_body));
        graph.add_call(entry, callee, CallSiteHandle::new(0)).unwrap();

        let (cfgs, analysis) = prepare(&graph, callee);
        let enumerator = MethodPathEnumerator::new();
        let builder =
            CompositePathBuilder::new(&graph, "com.app", &enumerator, &analysis, &cfgs);
        let set = builder.build_composite_paths(&[entry]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.paths()[0].call_depth(), 1);
        assert!(!set.truncated());
    }

    #[test]
    fn test_only_first_call_site_expands() {
        // The entry path contains two call sites; scanning continues in the
        // first callee only, so the second is never expanded
        let mut graph = CallGraph::new();
        let a = graph.add_method(
            MethodDesc::new("com.app.A", "first")
                .with_body(MethodBody::new(vec![Instruction::ret()])),
        );
        let b = graph.add_method(
            MethodDesc::new("com.app.B", "second")
                .with_body(MethodBody::new(vec![Instruction::ret()])),
        );
        let entry_body = MethodBody::new(vec![
            Instruction::invoke("first()", a),
            Instruction::invoke("second()", b),
            Instruction::ret(),
        ]);
        let entry =
            graph.add_method(MethodDesc::new("com.app.Main", "main").with_body(entry_body));
        graph.add_call(entry, a, CallSiteHandle::new(0)).unwrap();
        graph.add_call(entry, b, CallSiteHandle::new(1)).unwrap();

        let (cfgs, analysis) = prepare(&graph, a);
        let enumerator = MethodPathEnumerator::new();
        let builder =
            CompositePathBuilder::new(&graph, "com.app", &enumerator, &analysis, &cfgs);
        let set = builder.build_composite_paths(&[entry]);

        assert_eq!(set.len(), 1);
        let scenario = &set.paths()[0];
        assert_eq!(scenario.call_depth(), 2);

        let frame_methods: Vec<MethodId> = scenario
            .executions()
            .iter()
            .map(|e| e.path.method())
            .collect();
        assert_eq!(frame_methods, vec![entry, a]);
        assert!(!frame_methods.contains(&b));
    }

    #[test]
    fn test_budget_truncates_path_count() {
        let mut graph = CallGraph::new();
        let callee_body = MethodBody::new(vec![
            Instruction::branch("if ok", 3),
            Instruction::stmt("r = 1"),
            Instruction::ret(),
            Instruction::stmt("r = 2"),
            Instruction::ret(),
        ]);
        let callee =
            graph.add_method(MethodDesc::new("com.app.Repo", "load").with_body(callee_body));
        let entry_body = MethodBody::new(vec![
            Instruction::invoke("load()", callee),
            Instruction::ret(),
        ]);
        let entry =
            graph.add_method(MethodDesc::new("com.app.Main", "main").with_body(entry_body));
        graph.add_call(entry, callee, CallSiteHandle::new(0)).unwrap();

        let (cfgs, analysis) = prepare(&graph, callee);
        let enumerator = MethodPathEnumerator::new();
        let builder =
            CompositePathBuilder::new(&graph, "com.app", &enumerator, &analysis, &cfgs)
                .with_budget(PathBudget::new(64, 1));
        let set = builder.build_composite_paths(&[entry]);

        assert!(set.truncated());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_depth_budget_marks_truncation() {
        // Mutually recursive app methods would expand forever without the
        // depth bound. Interning is sequential, so the ids can be named
        // before the bodies that reference them are built.
        let a = MethodId::new(0);
        let b = MethodId::new(1);
        let mut graph = CallGraph::new();
        let a_id = graph.add_method(MethodDesc::new("com.app.A", "ping").with_body(
            MethodBody::new(vec![Instruction::invoke("pong()", b), Instruction::ret()]),
        ));
        let b_id = graph.add_method(MethodDesc::new("com.app.B", "pong").with_body(
            MethodBody::new(vec![Instruction::invoke("ping()", a), Instruction::ret()]),
        ));
        assert_eq!((a_id, b_id), (a, b));
        graph.add_call(a, b, CallSiteHandle::new(0)).unwrap();
        graph.add_call(b, a, CallSiteHandle::new(1)).unwrap();

        let (cfgs, analysis) = prepare(&graph, a);
        let enumerator = MethodPathEnumerator::new();
        let builder =
            CompositePathBuilder::new(&graph, "com.app", &enumerator, &analysis, &cfgs)
                .with_budget(PathBudget::new(4, 1000));
        let set = builder.build_composite_paths(&[a]);

        assert!(set.truncated());
        // The truncated scenario is still returned as a partial result
        assert!(!set.is_empty());
        assert!(set.paths().iter().any(|p| p.call_depth() == 4));
    }

    #[test]
    fn test_non_app_entry_ignored() {
        let mut graph = CallGraph::new();
        let entry = graph.add_method(
            MethodDesc::new("android.os.Looper", "loop")
                .with_body(MethodBody::new(vec![Instruction::ret()])),
        );
        let (cfgs, analysis) = prepare(&graph, entry);
        let enumerator = MethodPathEnumerator::new();
        let builder =
            CompositePathBuilder::new(&graph, "com.app", &enumerator, &analysis, &cfgs);
        let set = builder.build_composite_paths(&[entry]);

        assert!(set.is_empty());
    }
}
