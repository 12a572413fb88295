//! The sink-reachability analysis pipeline.
//!
//! Three phases, each consuming the previous one's artifacts:
//!
//! - **Phase 1** ([`reachability`]): backward worklist traversal from the
//!   sink over the call graph, producing the reachable-method set and all
//!   root-to-sink call chains.
//! - **Phase 2A** ([`cfg`]): block-level CFG construction for every
//!   reachable method, plus tagging of sink-leading call sites.
//! - **Phase 2B** ([`callsite`] + [`composite`]): call-site continuation
//!   analysis and composite execution-scenario generation.
//!
//! Phase 1 is mandatory; 2A and 2B are optional refinements. The phases
//! communicate only through immutable result values, so callers are free to
//! persist or inspect intermediate artifacts between phases.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sinktrace::analysis::BackwardReachabilityAnalyzer;
//!
//! let analyzer = BackwardReachabilityAnalyzer::new(&call_graph);
//! let result = analyzer.find_paths_and_build_cfgs(sink, true)?;
//! println!("{}", result.summary(&call_graph));
//! ```

pub mod callsite;
pub mod cfg;
pub mod composite;
pub mod reachability;

// Re-export primary types at module level
pub use callsite::{CallSiteAnalysis, CallSiteAnalyzer};
pub use cfg::{BlockCfgExtractor, CfgConstructionResult, MethodCfg, MethodCfgBuilder};
pub use composite::{CompositePath, CompositePathBuilder, MethodPathEnumerator, PathBudget};
pub use reachability::{
    BackwardReachabilityAnalyzer, CompleteAnalysisResult, ExecutionPath, ReachabilityGraph,
};
