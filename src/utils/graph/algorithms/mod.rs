//! Graph algorithms for program analysis.
//!
//! This module provides the traversal primitives the analysis pipeline needs:
//!
//! - [`dfs`] - Depth-first search traversal
//! - [`bfs`] - Breadth-first search traversal
//! - [`postorder`] - Postorder traversal (useful for backward data flow)
//! - [`reverse_postorder`] - Reverse postorder traversal (useful for forward
//!   data flow and deterministic block ordering)
//!
//! All algorithms run in O(V + E) and operate against the [`Successors`]
//! trait, so they work for both call graphs and method CFGs.
//!
//! [`Successors`]: crate::utils::graph::Successors

mod traversal;

pub use traversal::{bfs, dfs, postorder, reverse_postorder, BfsIterator, DfsIterator};
