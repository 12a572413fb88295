//! Phase 2B (first half): call-site location and continuation analysis.
//!
//! Scans the basic blocks of application-level CFGs for instructions that
//! invoke other application methods, and computes for each such call the
//! block where execution resumes once the callee returns. Framework and
//! library calls are invisible here: the package-prefix filter is the sole
//! admission test for "application code".
//!
//! # Key Types
//!
//! - [`CallSiteAnalyzer`] - The scan itself
//! - [`CallSiteAnalysis`] - Queryable result (sites per block, details)
//! - [`CallSite`] / [`CallSiteInfo`] - One call and its derived metadata
//! - [`Continuation`] - Post-return continuation point
//! - [`BlockRef`] - (method, block) pair naming one basic block

mod analyzer;
mod site;

pub use analyzer::{CallSiteAnalysis, CallSiteAnalyzer};
pub use site::{BlockRef, CallSite, CallSiteInfo, Continuation};
