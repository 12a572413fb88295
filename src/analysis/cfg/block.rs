//! Basic blocks and control-flow edge kinds.

use crate::model::Instruction;

/// The kind of control flow represented by a CFG edge.
///
/// Classifies edges by their semantics, which downstream consumers use to
/// distinguish branch alternatives from exceptional transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfgEdgeKind {
    /// Unconditional flow: fall-through or a direct jump.
    Unconditional,
    /// The taken alternative of a conditional branch.
    ConditionalTrue,
    /// The fall-through alternative of a conditional branch.
    ConditionalFalse,
    /// Transfer to an exception handler.
    Exception,
}

impl CfgEdgeKind {
    /// Returns `true` for either alternative of a conditional branch.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        matches!(self, Self::ConditionalTrue | Self::ConditionalFalse)
    }

    /// Returns `true` for exceptional transfers.
    #[must_use]
    pub const fn is_exceptional(&self) -> bool {
        matches!(self, Self::Exception)
    }
}

/// A maximal straight-line instruction sequence with single entry and exit.
///
/// Blocks carry their index (position within the method, which is also their
/// node id in the owning [`MethodCfg`](crate::analysis::cfg::MethodCfg)), the
/// body offset of their first instruction, the instructions themselves, and
/// their successor block indices. Exceptional successors are kept separate
/// from normal flow so edge kinds survive graph construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    /// Position of this block within the method (0-based).
    pub index: usize,
    /// Body offset of the first instruction in this block.
    pub start: usize,
    /// Instructions in this block, in body order.
    pub instructions: Vec<Instruction>,
    /// Successor block indices reached by normal control flow.
    pub successors: Vec<usize>,
    /// Successor block indices reached by exceptional control flow.
    pub exceptional_successors: Vec<usize>,
}

impl BasicBlock {
    /// Creates a new block with no successors.
    #[must_use]
    pub fn new(index: usize, start: usize, instructions: Vec<Instruction>) -> Self {
        BasicBlock {
            index,
            start,
            instructions,
            successors: Vec::new(),
            exceptional_successors: Vec::new(),
        }
    }

    /// Returns the number of instructions in this block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the block holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the body offset of the instruction at the given position in
    /// this block.
    #[must_use]
    pub const fn offset_of(&self, position: usize) -> usize {
        self.start + position
    }

    /// Returns the statement texts of this block, for display.
    #[must_use]
    pub fn statements(&self) -> Vec<&str> {
        self.instructions.iter().map(|i| i.text.as_str()).collect()
    }
}
