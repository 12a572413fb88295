//! Phase 1: backward reachability from a sink.
//!
//! Starting at the designated sink, the analyzer walks the call graph
//! against the direction of its edges until it reaches methods nothing
//! calls (roots), collecting every distinct root-to-sink call chain along
//! the way. Cycles in the call graph terminate the affected branch and flag
//! the resulting path instead of expanding forever.
//!
//! # Key Types
//!
//! - [`BackwardReachabilityAnalyzer`] - The worklist traversal
//! - [`ReachabilityGraph`] - Accumulated result: reachable set, caller
//!   index, complete paths
//! - [`ExecutionPath`] - One root-to-sink call chain with cycle flag
//! - [`CompleteAnalysisResult`] - Phase 1 composed with optional Phase 2A

mod analyzer;
mod graph;
mod path;

pub use analyzer::{BackwardReachabilityAnalyzer, CompleteAnalysisResult};
pub use graph::{ReachabilityGraph, ReachabilityStats};
pub use path::ExecutionPath;
