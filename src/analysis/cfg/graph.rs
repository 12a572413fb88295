//! Per-method control flow graph.

use std::fmt::Write;

use crate::{
    analysis::cfg::{BasicBlock, CfgEdgeKind},
    model::{FlowType, MethodId},
    utils::{
        escape_dot,
        graph::{algorithms, DirectedGraph, NodeId},
    },
    Error, Result,
};

/// A basic-block level control flow graph for one method.
///
/// Wraps the generic [`DirectedGraph`] with block semantics: each node is a
/// [`BasicBlock`] whose node id equals its block index, each edge carries a
/// [`CfgEdgeKind`]. Entry blocks are blocks without predecessors (the method
/// entry, block 0, is always included); exit blocks have no successors.
///
/// The structure is immutable after construction and safe to share across
/// threads.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCfg {
    /// The method this CFG belongs to.
    method: MethodId,
    /// The underlying block graph.
    graph: DirectedGraph<BasicBlock, CfgEdgeKind>,
    /// Entry block indices.
    entries: Vec<usize>,
    /// Exit block indices.
    exits: Vec<usize>,
}

impl MethodCfg {
    /// Creates a control flow graph from extracted basic blocks.
    ///
    /// Successor relationships recorded on the blocks become typed edges:
    /// the targets of a block ending in a conditional branch are classified
    /// as taken/fall-through alternatives, every other normal successor is
    /// unconditional, and exceptional successors get [`CfgEdgeKind::Exception`]
    /// edges.
    ///
    /// # Arguments
    ///
    /// * `method` - The owning method
    /// * `blocks` - Extracted blocks, indexed by their position
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if the block list is empty or a
    /// recorded successor index is out of range.
    pub fn from_blocks(method: MethodId, blocks: Vec<BasicBlock>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(Error::GraphError(
                "cannot create CFG from empty block list".to_string(),
            ));
        }

        let block_count = blocks.len();
        let mut graph: DirectedGraph<BasicBlock, CfgEdgeKind> =
            DirectedGraph::with_capacity(block_count, block_count * 2);

        let successors: Vec<(Vec<usize>, Vec<usize>, Option<FlowType>)> = blocks
            .iter()
            .map(|b| {
                (
                    b.successors.clone(),
                    b.exceptional_successors.clone(),
                    b.instructions.last().map(|i| i.flow),
                )
            })
            .collect();

        for block in blocks {
            graph.add_node(block);
        }

        for (index, (normal, exceptional, flow)) in successors.iter().enumerate() {
            let source = NodeId::new(index);
            for (position, &succ) in normal.iter().enumerate() {
                if succ >= block_count {
                    return Err(Error::GraphError(format!(
                        "block {index} has successor {succ} but method has {block_count} blocks"
                    )));
                }
                let kind = Self::classify_edge(*flow, position);
                graph.add_edge(source, NodeId::new(succ), kind)?;
            }
            for &succ in exceptional {
                if succ >= block_count {
                    return Err(Error::GraphError(format!(
                        "block {index} has exceptional successor {succ} but method has {block_count} blocks"
                    )));
                }
                graph.add_edge(source, NodeId::new(succ), CfgEdgeKind::Exception)?;
            }
        }

        // Entry blocks: no predecessors; the method entry is always one
        let mut entries: Vec<usize> = graph.entry_nodes().map(NodeId::index).collect();
        if !entries.contains(&0) {
            entries.insert(0, 0);
        }
        let exits: Vec<usize> = graph.exit_nodes().map(NodeId::index).collect();

        Ok(MethodCfg {
            method,
            graph,
            entries,
            exits,
        })
    }

    /// Classifies a normal-flow edge from the terminating instruction's flow
    /// type and the successor's position in the recorded list.
    ///
    /// For a conditional branch the recorded targets come first and the
    /// fall-through last.
    fn classify_edge(flow: Option<FlowType>, position: usize) -> CfgEdgeKind {
        match flow {
            Some(FlowType::Branch) => {
                if position == 0 {
                    CfgEdgeKind::ConditionalTrue
                } else {
                    CfgEdgeKind::ConditionalFalse
                }
            }
            _ => CfgEdgeKind::Unconditional,
        }
    }

    /// Returns the method this CFG belongs to.
    #[must_use]
    pub const fn method(&self) -> MethodId {
        self.method
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the block at the given index, if any.
    #[must_use]
    pub fn block(&self, index: usize) -> Option<&BasicBlock> {
        self.graph.node(NodeId::new(index))
    }

    /// Returns an iterator over all blocks, in index order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.graph.nodes().map(|(_, block)| block)
    }

    /// Returns the successor block indices of a block, normal and
    /// exceptional flow combined, in edge-insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid block.
    pub fn successors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.successors(NodeId::new(index)).map(NodeId::index)
    }

    /// Returns the predecessor block indices of a block.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid block.
    pub fn predecessors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .predecessors(NodeId::new(index))
            .map(NodeId::index)
    }

    /// Returns the outgoing edges of a block as `(target, kind)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid block.
    pub fn outgoing_edges(&self, index: usize) -> impl Iterator<Item = (usize, CfgEdgeKind)> + '_ {
        let node = NodeId::new(index);
        self.graph.outgoing_edges(node).filter_map(move |(id, &kind)| {
            self.graph
                .edge_endpoints(id)
                .map(|(_, target)| (target.index(), kind))
        })
    }

    /// Returns the entry block indices.
    #[must_use]
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    /// Returns the exit block indices.
    #[must_use]
    pub fn exits(&self) -> &[usize] {
        &self.exits
    }

    /// Returns `true` if the block is an exit block.
    #[must_use]
    pub fn is_exit_block(&self, index: usize) -> bool {
        self.exits.contains(&index)
    }

    /// Returns the total number of instructions across all blocks.
    #[must_use]
    pub fn total_instructions(&self) -> usize {
        self.blocks().map(BasicBlock::len).sum()
    }

    /// Returns the blocks reachable from the method entry in reverse
    /// postorder.
    ///
    /// The canonical deterministic iteration order for forward walks over
    /// the CFG.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<usize> {
        algorithms::reverse_postorder(&self.graph, NodeId::new(0))
            .into_iter()
            .map(NodeId::index)
            .collect()
    }

    /// Performs a depth-first traversal from the method entry.
    pub fn dfs(&self) -> impl Iterator<Item = usize> + '_ {
        algorithms::dfs(&self.graph, NodeId::new(0)).map(NodeId::index)
    }

    /// Performs a breadth-first traversal from the method entry.
    pub fn bfs(&self) -> impl Iterator<Item = usize> + '_ {
        algorithms::bfs(&self.graph, NodeId::new(0)).map(NodeId::index)
    }

    /// Generates a DOT format representation of this CFG.
    ///
    /// Entry blocks are highlighted in green, exit blocks in red; edge
    /// labels show branch alternatives and exceptional transfers.
    ///
    /// # Arguments
    ///
    /// * `title` - Optional title, typically the method signature
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CFG {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"CFG: {}\";", escape_dot(name));
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n\n");

        for block in self.blocks() {
            let is_entry = self.entries.contains(&block.index);
            let is_exit = self.exits.contains(&block.index);

            let mut label = format!("B{}", block.index);
            if is_entry {
                label.push_str(" (entry)");
            }
            if is_exit {
                label.push_str(" (exit)");
            }
            label.push_str("\\l");
            for (pos, instr) in block.instructions.iter().enumerate() {
                let _ = write!(
                    label,
                    "{}: {}\\l",
                    block.offset_of(pos),
                    escape_dot(&instr.text)
                );
            }

            let style = if is_entry {
                ", style=filled, fillcolor=lightgreen"
            } else if is_exit {
                ", style=filled, fillcolor=lightcoral"
            } else {
                ""
            };
            let _ = writeln!(dot, "    B{} [label=\"{label}\"{style}];", block.index);
        }

        dot.push('\n');

        for block in self.blocks() {
            for (target, kind) in self.outgoing_edges(block.index) {
                let (edge_label, color) = match kind {
                    CfgEdgeKind::Unconditional => ("", "black"),
                    CfgEdgeKind::ConditionalTrue => ("true", "green"),
                    CfgEdgeKind::ConditionalFalse => ("false", "red"),
                    CfgEdgeKind::Exception => ("catch", "purple"),
                };
                let _ = writeln!(
                    dot,
                    "    B{} -> B{target} [label=\"{edge_label}\", color={color}];",
                    block.index
                );
            }
        }

        dot.push_str("}\n");
        dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Instruction;

    /// Creates a block whose last instruction has the given flow shape.
    fn make_block(index: usize, start: usize, successors: Vec<usize>, last: Instruction) -> BasicBlock {
        let mut block = BasicBlock::new(index, start, vec![last]);
        block.successors = successors;
        block
    }

    #[test]
    fn test_empty_blocks_rejected() {
        assert!(MethodCfg::from_blocks(MethodId::new(0), vec![]).is_err());
    }

    #[test]
    fn test_single_block_method() {
        let blocks = vec![make_block(0, 0, vec![], Instruction::ret())];
        let cfg = MethodCfg::from_blocks(MethodId::new(0), blocks).unwrap();

        assert_eq!(cfg.block_count(), 1);
        assert_eq!(cfg.entries(), &[0]);
        assert_eq!(cfg.exits(), &[0]);
        assert!(cfg.is_exit_block(0));
    }

    #[test]
    fn test_linear_blocks() {
        let blocks = vec![
            make_block(0, 0, vec![1], Instruction::stmt("x = 1")),
            make_block(1, 1, vec![2], Instruction::stmt("x = 2")),
            make_block(2, 2, vec![], Instruction::ret()),
        ];
        let cfg = MethodCfg::from_blocks(MethodId::new(0), blocks).unwrap();

        assert_eq!(cfg.block_count(), 3);
        assert_eq!(cfg.successors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(cfg.predecessors(2).collect::<Vec<_>>(), vec![1]);
        assert_eq!(cfg.entries(), &[0]);
        assert_eq!(cfg.exits(), &[2]);
        assert_eq!(cfg.total_instructions(), 3);
    }

    #[test]
    fn test_conditional_edge_kinds() {
        // Diamond: 0 -> 1 (taken), 0 -> 2 (fall-through), both -> 3
        let blocks = vec![
            make_block(0, 0, vec![1, 2], Instruction::branch("if x > 0", 1)),
            make_block(1, 1, vec![3], Instruction::stmt("y = 1")),
            make_block(2, 2, vec![3], Instruction::stmt("y = 2")),
            make_block(3, 3, vec![], Instruction::ret()),
        ];
        let cfg = MethodCfg::from_blocks(MethodId::new(0), blocks).unwrap();

        let edges: Vec<(usize, CfgEdgeKind)> = cfg.outgoing_edges(0).collect();
        assert_eq!(edges[0], (1, CfgEdgeKind::ConditionalTrue));
        assert_eq!(edges[1], (2, CfgEdgeKind::ConditionalFalse));

        let merge_preds: Vec<usize> = cfg.predecessors(3).collect();
        assert_eq!(merge_preds, vec![1, 2]);
    }

    #[test]
    fn test_exceptional_edges() {
        let mut protected = make_block(0, 0, vec![1], Instruction::stmt("risky()"));
        protected.exceptional_successors = vec![2];
        let blocks = vec![
            protected,
            make_block(1, 1, vec![], Instruction::ret()),
            make_block(2, 2, vec![], Instruction::ret()),
        ];
        let cfg = MethodCfg::from_blocks(MethodId::new(0), blocks).unwrap();

        let edges: Vec<(usize, CfgEdgeKind)> = cfg.outgoing_edges(0).collect();
        assert!(edges.contains(&(1, CfgEdgeKind::Unconditional)));
        assert!(edges.contains(&(2, CfgEdgeKind::Exception)));

        // Handler is not an entry block: it has an exceptional predecessor
        assert_eq!(cfg.entries(), &[0]);
        assert_eq!(cfg.exits(), &[1, 2]);
    }

    #[test]
    fn test_invalid_successor_rejected() {
        let blocks = vec![make_block(0, 0, vec![7], Instruction::ret())];
        assert!(MethodCfg::from_blocks(MethodId::new(0), blocks).is_err());
    }

    #[test]
    fn test_entry_always_contains_block_zero() {
        // Loop back to block 0: it has a predecessor but is still the entry
        let blocks = vec![
            make_block(0, 0, vec![1], Instruction::stmt("x += 1")),
            make_block(1, 1, vec![0, 2], Instruction::branch("if x < 10", 0)),
            make_block(2, 2, vec![], Instruction::ret()),
        ];
        let cfg = MethodCfg::from_blocks(MethodId::new(0), blocks).unwrap();
        assert!(cfg.entries().contains(&0));
    }

    #[test]
    fn test_traversal_orders() {
        let blocks = vec![
            make_block(0, 0, vec![1, 2], Instruction::branch("if x", 1)),
            make_block(1, 1, vec![3], Instruction::stmt("a")),
            make_block(2, 2, vec![3], Instruction::stmt("b")),
            make_block(3, 3, vec![], Instruction::ret()),
        ];
        let cfg = MethodCfg::from_blocks(MethodId::new(0), blocks).unwrap();

        let rpo = cfg.reverse_postorder();
        assert_eq!(rpo[0], 0);
        assert_eq!(*rpo.last().unwrap(), 3);

        assert_eq!(cfg.dfs().count(), 4);
        assert_eq!(cfg.bfs().next(), Some(0));
    }

    #[test]
    fn test_to_dot_output() {
        let blocks = vec![
            make_block(0, 0, vec![1], Instruction::stmt("x = 1")),
            make_block(1, 1, vec![], Instruction::ret()),
        ];
        let cfg = MethodCfg::from_blocks(MethodId::new(0), blocks).unwrap();
        let dot = cfg.to_dot(Some("com.app.Main::run"));

        assert!(dot.contains("digraph CFG"));
        assert!(dot.contains("com.app.Main::run"));
        assert!(dot.contains("B0 -> B1"));
        assert!(dot.contains("(entry)"));
        assert!(dot.contains("(exit)"));
    }
}
