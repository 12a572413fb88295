//! Phase 2A: control-flow graph construction for reachable methods.
//!
//! Builds a basic-block level CFG for every method in the reachability
//! graph and tags the call sites that lead toward the sink. CFG extraction
//! is independent per method and runs in parallel; a method that cannot be
//! extracted is skipped with a typed [`SkipReason`] rather than failing the
//! phase.
//!
//! # Key Types
//!
//! - [`BlockCfgExtractor`] - Body → [`MethodCfg`] for a single method
//! - [`MethodCfgBuilder`] - Batch construction plus sink-leading call tagging
//! - [`MethodCfg`] - Immutable per-method graph of [`BasicBlock`]s
//! - [`MethodCfgInfo`] - A CFG plus its sink-leading call annotations
//! - [`CfgConstructionResult`] - All CFGs, skip records, and statistics

mod block;
mod builder;
mod extractor;
mod graph;
mod info;

pub use block::{BasicBlock, CfgEdgeKind};
pub use builder::{CfgConstructionResult, MethodCfgBuilder};
pub use extractor::{BlockCfgExtractor, CfgMode, SkipReason};
pub use graph::MethodCfg;
pub use info::{CfgStatistics, MethodCfgInfo};
