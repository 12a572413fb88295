//! Program model consumed by the analysis pipeline.
//!
//! The crate never parses binaries itself; callers (a dex/jimple frontend, a
//! test fixture, a deserializer) supply the program shape through the types in
//! this module:
//!
//! - [`MethodDesc`] - An immutable method descriptor: declaring class, name,
//!   [`MethodFlags`], and an optional [`MethodBody`]
//! - [`MethodId`] - Strongly-typed handle for an interned method
//! - [`MethodBody`] - Ordered [`Instruction`] sequence plus
//!   [`ExceptionHandler`] ranges
//! - [`FlowType`] - How an instruction affects intraprocedural control flow
//!
//! Descriptors are interned into a [`CallGraph`](crate::callgraph::CallGraph)
//! which hands out [`MethodId`] values; every later analysis artifact refers
//! to methods by id and resolves display data through the owning call graph.

mod body;
mod method;

pub use body::{ExceptionHandler, FlowType, Instruction, MethodBody};
pub use method::{MethodDesc, MethodFlags, MethodId};
