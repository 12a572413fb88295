//! Call sites and their derived metadata.

use std::fmt;

use crate::model::MethodId;

/// Names one basic block: a method plus a block index within its CFG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockRef {
    /// The method owning the block.
    pub method: MethodId,
    /// The block index within the method's CFG.
    pub block: usize,
}

impl BlockRef {
    /// Creates a new block reference.
    #[must_use]
    pub const fn new(method: MethodId, block: usize) -> Self {
        BlockRef { method, block }
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_block_{}", self.method, self.block)
    }
}

/// A call into application code found inside a basic block.
///
/// Immutable value associated 1:1 with one instruction, identified by the
/// instruction's body offset within the calling method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    /// The method containing the call.
    pub caller: MethodId,
    /// The invoked application method.
    pub target: MethodId,
    /// Block index within the caller's CFG.
    pub block: usize,
    /// Body offset of the call instruction within the caller.
    pub offset: usize,
    /// Position of the call instruction within its block.
    pub position_in_block: usize,
}

impl CallSite {
    /// Returns the block this call lives in.
    #[must_use]
    pub const fn block_ref(&self) -> BlockRef {
        BlockRef::new(self.caller, self.block)
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} calls {} at offset {}",
            self.caller, self.target, self.offset
        )
    }
}

/// Where execution resumes after a call instruction returns.
///
/// Modeled purely from static block adjacency. When the calling block has
/// several successors only the first is used as the canonical continuation;
/// alternative successors are not modeled as distinct continuations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// More instructions follow in the calling block itself.
    SameBlock(BlockRef),
    /// The call ends its block; control resumes at the first successor.
    Successor(BlockRef),
    /// The call is the last instruction of an exit block; the method ends.
    MethodExit,
}

impl Continuation {
    /// Returns the continuation block, or `None` for a method exit.
    #[must_use]
    pub const fn block(&self) -> Option<BlockRef> {
        match self {
            Continuation::SameBlock(b) | Continuation::Successor(b) => Some(*b),
            Continuation::MethodExit => None,
        }
    }

    /// Returns `true` if the method ends at this call.
    #[must_use]
    pub const fn is_method_exit(&self) -> bool {
        matches!(self, Continuation::MethodExit)
    }
}

impl fmt::Display for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Continuation::SameBlock(b) => write!(f, "same block ({b})"),
            Continuation::Successor(b) => write!(f, "successor {b}"),
            Continuation::MethodExit => write!(f, "method exit"),
        }
    }
}

/// Derived metadata about one call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSiteInfo {
    /// The call this information describes.
    pub site: CallSite,
    /// Where execution resumes after the callee returns.
    pub continuation: Continuation,
    /// Whether the call is the last instruction of its block.
    pub is_last_in_block: bool,
    /// Whether statements follow the call within the same block.
    pub has_post_call_statements: bool,
}
