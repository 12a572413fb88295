//! # sinktrace Prelude
//!
//! Convenient re-exports of the most commonly used types for sink
//! reachability analysis. Import this module to get quick access to the
//! whole pipeline without spelling out module paths.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all sinktrace operations
pub use crate::Error;

/// The result type used throughout sinktrace
pub use crate::Result;

// ================================================================================================
// Program Model
// ================================================================================================

/// Method descriptors, identifiers, and modifier flags
pub use crate::model::{MethodDesc, MethodFlags, MethodId};

/// Method bodies and instructions
pub use crate::model::{ExceptionHandler, FlowType, Instruction, MethodBody};

// ================================================================================================
// Call Graph
// ================================================================================================

/// The call graph container and its edge types
pub use crate::callgraph::{CallEdge, CallGraph, CallGraphStats, CallSiteHandle};

// ================================================================================================
// Phase 1: Backward Reachability
// ================================================================================================

/// Reachability analysis and its results
pub use crate::analysis::reachability::{
    BackwardReachabilityAnalyzer, CompleteAnalysisResult, ExecutionPath, ReachabilityGraph,
    ReachabilityStats,
};

// ================================================================================================
// Phase 2A: CFG Construction
// ================================================================================================

/// CFG extraction, batch construction, and results
pub use crate::analysis::cfg::{
    BasicBlock, BlockCfgExtractor, CfgConstructionResult, CfgEdgeKind, CfgMode, CfgStatistics,
    MethodCfg, MethodCfgBuilder, MethodCfgInfo, SkipReason,
};

// ================================================================================================
// Phase 2B: Call Sites and Composite Paths
// ================================================================================================

/// Call-site location and continuation analysis
pub use crate::analysis::callsite::{
    BlockRef, CallSite, CallSiteAnalysis, CallSiteAnalyzer, CallSiteInfo, Continuation,
};

/// Composite execution-scenario generation
pub use crate::analysis::composite::{
    CompositePath, CompositePathBuilder, CompositePathSet, MethodExecution, MethodPath,
    MethodPathEnumerator, PathBudget,
};
