//! Phase 2B (second half): composite execution scenario generation.
//!
//! Stitches intraprocedural block paths together across call boundaries to
//! produce complete multi-frame execution scenarios. Each scenario is a
//! replayable script for a downstream symbolic or taint engine: which blocks
//! run in which method, and which call produced each frame.
//!
//! Expansion is restricted to application code with available CFGs; anything
//! else terminates the scenario at the call. An explicit [`PathBudget`]
//! bounds the otherwise unbounded cross-product of intraprocedural
//! alternatives.
//!
//! # Key Types
//!
//! - [`MethodPathEnumerator`] - All acyclic block paths through one method
//! - [`MethodPath`] - One such path
//! - [`CompositePathBuilder`] - Cross-method scenario generation
//! - [`CompositePath`] / [`MethodExecution`] - One scenario and its frames
//! - [`CompositePathSet`] - Result with truncation flag

mod builder;
mod enumerator;
mod path;

pub use builder::{CompositePathBuilder, CompositePathSet, PathBudget};
pub use enumerator::{MethodPath, MethodPathEnumerator};
pub use path::{CompositePath, MethodExecution};
