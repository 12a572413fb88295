// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # sinktrace
//!
//! A framework for backward sink-reachability analysis and execution-scenario
//! generation over mobile application call graphs. Given a call graph, method
//! bodies, and a designated sensitive operation (the *sink*), `sinktrace`
//! determines every way program execution can reach the sink and materializes
//! those ways as concrete, block-level execution scenarios that a downstream
//! symbolic or taint engine can replay.
//!
//! ## Features
//!
//! - **Backward reachability** - Worklist traversal from the sink to all
//!   roots, with per-branch cycle truncation on recursive call graphs
//! - **Block-level CFGs** - Basic-block graphs per reachable method, plain or
//!   exception-aware, built in parallel across methods
//! - **Sink-leading call tagging** - Prunes call sites irrelevant to the sink
//!   before path expansion
//! - **Composite scenarios** - Cross-method execution paths stitched from
//!   intraprocedural block paths, under an explicit expansion budget
//! - **No global state** - The call graph is a value threaded through every
//!   analyzer; results are immutable and safe to share across threads
//!
//! ## Quick Start
//!
//! ```rust
//! use sinktrace::prelude::*;
//!
//! // Build (or import) a call graph
//! let mut graph = CallGraph::new();
//! let sink = graph.add_method(
//!     MethodDesc::new("com.app.CryptoUtil", "decrypt")
//!         .with_body(MethodBody::new(vec![Instruction::ret()])),
//! );
//! let main = graph.add_method(
//!     MethodDesc::new("com.app.MainActivity", "onCreate").with_body(MethodBody::new(vec![
//!         Instruction::invoke("decrypt()", sink),
//!         Instruction::ret(),
//!     ])),
//! );
//! graph.add_call(main, sink, CallSiteHandle::new(0))?;
//!
//! // Phase 1 + 2A: who reaches the sink, and through which call sites?
//! let analyzer = BackwardReachabilityAnalyzer::new(&graph);
//! let result = analyzer.find_paths_and_build_cfgs(sink, true)?;
//!
//! assert!(result.reachability_graph().is_reachable(main));
//! assert_eq!(result.reachability_graph().complete_paths().len(), 1);
//! # Ok::<(), sinktrace::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`model`] - Method descriptors and bodies supplied by a frontend
//! - [`callgraph`] - The interned, read-only call graph container
//! - [`analysis`] - The three-phase pipeline (reachability, CFGs, scenarios)
//! - [`utils`] - Generic graph infrastructure shared by call graph and CFGs
//!
//! The crate never parses application binaries. A frontend (dex importer,
//! Soot export reader, test fixture) populates the [`callgraph::CallGraph`];
//! everything downstream is pure computation over that value.
//!
//! ## Error Handling
//!
//! Fatal configuration errors (unknown sink, bodiless sink when CFGs were
//! requested) surface as [`Error`]; per-method extraction failures are typed
//! skip records in the phase results; call-graph cycles are findings flagged
//! on the affected paths, not errors.

pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use sinktrace::prelude::*;
///
/// let graph = CallGraph::new();
/// let analyzer = BackwardReachabilityAnalyzer::new(&graph);
/// ```
pub mod prelude;

/// The sink-reachability analysis pipeline: reachability, CFG construction,
/// call-site analysis, and composite path generation.
pub mod analysis;

/// Interprocedural call graph container with method interning.
pub mod callgraph;

/// Program model consumed by the analyses: method descriptors, bodies,
/// instructions.
pub mod model;

/// Shared utility infrastructure (generic graphs, DOT escaping).
pub mod utils;

/// `sinktrace` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. Used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `sinktrace` Error type
///
/// The main error type for all operations in this crate. Covers fatal
/// configuration errors and structural graph misuse; see the type's
/// documentation for the failure taxonomy.
pub use error::Error;
