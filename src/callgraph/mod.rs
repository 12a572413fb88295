//! Interprocedural call graph container.
//!
//! The call graph is the single input artifact of Phase 1: an arena of
//! interned [`MethodDesc`](crate::model::MethodDesc) values plus directed
//! call edges carrying opaque call-site references. How the graph is obtained
//! (dex frontend, Soot export, test fixture) is outside this crate; every
//! analyzer receives a read-only `&CallGraph` through its constructor, so
//! there is no process-wide registry to configure or reset.
//!
//! # Key Types
//!
//! - [`CallGraph`] - The container itself, with caller/callee queries
//! - [`CallEdge`] - One directed call relationship with its site handle
//! - [`CallSiteHandle`] - Caller-supplied opaque reference to the call site
//! - [`CallGraphStats`] - Aggregate metrics

mod edge;
mod graph;

pub use edge::{CallEdge, CallSiteHandle};
pub use graph::{CallGraph, CallGraphStats};
