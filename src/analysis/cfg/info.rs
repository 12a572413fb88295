//! Per-method CFG metadata.

use std::collections::BTreeSet;

use crate::{analysis::cfg::MethodCfg, model::FlowType, model::MethodId};

/// A method's control flow graph plus the annotations Phase 2B consumes.
///
/// Carries the CFG itself and the set of call instructions (identified by
/// body offset) that lead toward the sink. The sink-leading set is filled by
/// [`MethodCfgBuilder::identify_sink_leading_calls`](crate::analysis::cfg::MethodCfgBuilder::identify_sink_leading_calls)
/// and is the pruning signal for downstream path expansion: calls that are
/// not on any path toward the sink need not be explored.
#[derive(Debug, Clone)]
pub struct MethodCfgInfo {
    /// The method this information belongs to.
    method: MethodId,
    /// The block-level control flow graph.
    cfg: MethodCfg,
    /// Body offsets of call instructions leading toward the sink.
    sink_leading_calls: BTreeSet<usize>,
}

impl MethodCfgInfo {
    /// Creates info for a freshly built CFG with no annotations yet.
    #[must_use]
    pub fn new(method: MethodId, cfg: MethodCfg) -> Self {
        MethodCfgInfo {
            method,
            cfg,
            sink_leading_calls: BTreeSet::new(),
        }
    }

    /// Returns the method this CFG belongs to.
    #[must_use]
    pub const fn method(&self) -> MethodId {
        self.method
    }

    /// Returns the control flow graph.
    #[must_use]
    pub const fn cfg(&self) -> &MethodCfg {
        &self.cfg
    }

    /// Returns the body offsets of sink-leading call instructions, in
    /// ascending order.
    #[must_use]
    pub const fn sink_leading_calls(&self) -> &BTreeSet<usize> {
        &self.sink_leading_calls
    }

    /// Returns `true` if the instruction at the given body offset is a
    /// sink-leading call.
    #[must_use]
    pub fn is_sink_leading(&self, offset: usize) -> bool {
        self.sink_leading_calls.contains(&offset)
    }

    /// Records a sink-leading call site.
    pub(crate) fn add_sink_leading_call(&mut self, offset: usize) {
        self.sink_leading_calls.insert(offset);
    }

    /// Computes statistics for this CFG.
    #[must_use]
    pub fn statistics(&self) -> CfgStatistics {
        let mut total_instructions = 0;
        let mut call_sites = 0;
        let mut branch_points = 0;

        for block in self.cfg.blocks() {
            total_instructions += block.len();
            for instr in &block.instructions {
                if instr.is_call() {
                    call_sites += 1;
                }
                if instr.flow == FlowType::Branch {
                    branch_points += 1;
                }
            }
        }

        CfgStatistics {
            total_instructions,
            call_sites,
            branch_points,
            sink_leading_calls: self.sink_leading_calls.len(),
        }
    }
}

/// Statistics about one method CFG.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CfgStatistics {
    /// Total instructions across all blocks.
    pub total_instructions: usize,
    /// Instructions that invoke a method.
    pub call_sites: usize,
    /// Conditional branch instructions.
    pub branch_points: usize,
    /// Call sites tagged as sink-leading.
    pub sink_leading_calls: usize,
}
