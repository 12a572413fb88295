//! Block-level CFG extraction from method bodies.

use strum::{AsRefStr, Display};

use crate::{
    analysis::cfg::{BasicBlock, MethodCfg},
    model::{FlowType, MethodBody, MethodDesc, MethodId},
};

/// CFG construction mode.
///
/// The plain mode ignores exception ranges entirely; the exception-aware
/// mode adds handler entry points as block leaders and wires edges from
/// every protected block to its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CfgMode {
    /// Normal control flow only.
    #[default]
    Plain,
    /// Normal control flow plus exceptional edges into handlers.
    Exceptional,
}

/// Why a method was skipped during CFG construction.
///
/// Per-method failures are recoverable: the method is recorded with its
/// reason and the phase continues. The aggregated skip list lets a
/// caller (or a test) assert exact skip counts.
#[derive(Debug, Clone, PartialEq, Eq, Display, AsRefStr)]
pub enum SkipReason {
    /// The method has no analyzable body (abstract, native, or unresolved).
    NoBody,
    /// The body exists but holds no instructions.
    EmptyBody,
    /// The body is structurally inconsistent.
    MalformedBody {
        /// What was inconsistent.
        detail: String,
    },
}

/// Extracts a basic-block level control flow graph from one method body.
///
/// Block boundaries follow the classic leader rules: the first instruction,
/// every branch target, and every instruction following a block terminator
/// start a new block. In [`CfgMode::Exceptional`] every handler entry is a
/// leader too, and blocks overlapping a protected range gain an edge to the
/// handler block.
///
/// # Examples
///
/// ```rust
/// use sinktrace::analysis::cfg::{BlockCfgExtractor, CfgMode};
/// use sinktrace::model::{Instruction, MethodBody, MethodDesc, MethodId};
///
/// let body = MethodBody::new(vec![
///     Instruction::branch("if x > 0", 3),
///     Instruction::stmt("y = 1"),
///     Instruction::ret(),
///     Instruction::stmt("y = 2"),
///     Instruction::ret(),
/// ]);
/// let desc = MethodDesc::new("com.app.Main", "run").with_body(body);
///
/// let extractor = BlockCfgExtractor::new(CfgMode::Plain);
/// let cfg = extractor.extract_cfg(MethodId::new(0), &desc).unwrap();
/// assert_eq!(cfg.block_count(), 3);
/// assert_eq!(cfg.exits().len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockCfgExtractor {
    mode: CfgMode,
}

impl BlockCfgExtractor {
    /// Creates an extractor with the given mode.
    #[must_use]
    pub const fn new(mode: CfgMode) -> Self {
        BlockCfgExtractor { mode }
    }

    /// Returns the construction mode.
    #[must_use]
    pub const fn mode(&self) -> CfgMode {
        self.mode
    }

    /// Extracts the control flow graph for a method.
    ///
    /// # Arguments
    ///
    /// * `method` - Id of the method (recorded on the resulting CFG)
    /// * `desc` - The method descriptor carrying the body
    ///
    /// # Returns
    ///
    /// The extracted [`MethodCfg`].
    ///
    /// # Errors
    ///
    /// Returns a typed [`SkipReason`] when the method has no body, an empty
    /// body, or a structurally inconsistent one (branch target or handler
    /// range out of bounds). These are per-item skip conditions, not fatal
    /// analysis errors.
    pub fn extract_cfg(
        &self,
        method: MethodId,
        desc: &MethodDesc,
    ) -> Result<MethodCfg, SkipReason> {
        let body = desc.body().ok_or(SkipReason::NoBody)?;
        if body.is_empty() {
            return Err(SkipReason::EmptyBody);
        }
        Self::validate(body)?;

        let instruction_count = body.len();
        let leaders = self.find_leaders(body);

        // Map each instruction offset to its block index
        let mut block_of = vec![0usize; instruction_count];
        let mut current = 0usize;
        for offset in 0..instruction_count {
            if offset > 0 && leaders[offset] {
                current += 1;
            }
            block_of[offset] = current;
        }

        // Materialize the blocks
        let starts: Vec<usize> = (0..instruction_count).filter(|&o| leaders[o]).collect();
        let mut blocks: Vec<BasicBlock> = starts
            .iter()
            .enumerate()
            .map(|(index, &start)| {
                let end = starts.get(index + 1).copied().unwrap_or(instruction_count);
                BasicBlock::new(index, start, body.instructions()[start..end].to_vec())
            })
            .collect();

        // Wire normal successors from each block's terminating instruction
        for block in &mut blocks {
            let last_offset = block.start + block.len() - 1;
            let last = &body.instructions()[last_offset];
            let mut successors = Vec::new();

            match last.flow {
                FlowType::Branch => {
                    for &target in &last.targets {
                        successors.push(block_of[target]);
                    }
                    if last_offset + 1 < instruction_count {
                        successors.push(block_of[last_offset + 1]);
                    }
                }
                FlowType::Goto => {
                    for &target in &last.targets {
                        successors.push(block_of[target]);
                    }
                }
                FlowType::Return | FlowType::Throw => {}
                FlowType::Sequential => {
                    if last_offset + 1 < instruction_count {
                        successors.push(block_of[last_offset + 1]);
                    }
                }
            }

            successors.dedup();
            block.successors = successors;
        }

        // Exceptional edges: every block overlapping a protected range can
        // transfer to the handler
        if self.mode == CfgMode::Exceptional {
            for handler in body.handlers() {
                let handler_block = block_of[handler.handler_start];
                for block in &mut blocks {
                    let block_end = block.start + block.len();
                    let overlaps = block.start < handler.try_end && block_end > handler.try_start;
                    if overlaps
                        && block.index != handler_block
                        && !block.exceptional_successors.contains(&handler_block)
                    {
                        block.exceptional_successors.push(handler_block);
                    }
                }
            }
        }

        MethodCfg::from_blocks(method, blocks).map_err(|e| SkipReason::MalformedBody {
            detail: e.to_string(),
        })
    }

    /// Marks block leaders per the mode.
    fn find_leaders(&self, body: &MethodBody) -> Vec<bool> {
        let instruction_count = body.len();
        let mut leaders = vec![false; instruction_count];
        leaders[0] = true;

        for (offset, instr) in body.instructions().iter().enumerate() {
            for &target in &instr.targets {
                leaders[target] = true;
            }
            if instr.flow.is_block_terminator() && offset + 1 < instruction_count {
                leaders[offset + 1] = true;
            }
        }

        if self.mode == CfgMode::Exceptional {
            for handler in body.handlers() {
                leaders[handler.handler_start] = true;
            }
        }

        leaders
    }

    /// Validates branch targets and handler ranges against the body bounds.
    fn validate(body: &MethodBody) -> Result<(), SkipReason> {
        let instruction_count = body.len();

        for (offset, instr) in body.instructions().iter().enumerate() {
            for &target in &instr.targets {
                if target >= instruction_count {
                    return Err(SkipReason::MalformedBody {
                        detail: format!(
                            "instruction {offset} branches to {target}, body has {instruction_count} instructions"
                        ),
                    });
                }
            }
        }

        for handler in body.handlers() {
            if handler.handler_start >= instruction_count
                || handler.try_end > instruction_count
                || handler.try_start >= handler.try_end
            {
                return Err(SkipReason::MalformedBody {
                    detail: format!(
                        "handler range {}..{} -> {} out of bounds for {instruction_count} instructions",
                        handler.try_start, handler.try_end, handler.handler_start
                    ),
                });
            }
        }

        Ok(())
    }
}
