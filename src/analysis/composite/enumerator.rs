//! Intraprocedural path enumeration.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    analysis::cfg::MethodCfg,
    callgraph::CallGraph,
    model::MethodId,
};

/// A single acyclic path through one method, as a block-index sequence.
///
/// Paths run from an entry block to an exit block of the method's CFG and
/// never revisit a block, so loops contribute their zero-iteration and
/// one-iteration shapes rather than unbounded unrollings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPath {
    /// The method this path runs through.
    method: MethodId,
    /// Block indices from entry to exit.
    blocks: Vec<usize>,
}

impl MethodPath {
    /// Creates a new path.
    #[must_use]
    pub fn new(method: MethodId, blocks: Vec<usize>) -> Self {
        MethodPath { method, blocks }
    }

    /// Returns the method this path runs through.
    #[must_use]
    pub const fn method(&self) -> MethodId {
        self.method
    }

    /// Returns the block sequence.
    #[must_use]
    pub fn blocks(&self) -> &[usize] {
        &self.blocks
    }

    /// Returns the entry block of this path, if any.
    #[must_use]
    pub fn entry_block(&self) -> Option<usize> {
        self.blocks.first().copied()
    }

    /// Returns the exit block of this path, if any.
    #[must_use]
    pub fn exit_block(&self) -> Option<usize> {
        self.blocks.last().copied()
    }

    /// Returns the path length in blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the path holds no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns `true` if the path visits the given block.
    #[must_use]
    pub fn contains_block(&self, block: usize) -> bool {
        self.blocks.contains(&block)
    }

    /// Renders a human-readable one-line summary.
    ///
    /// # Arguments
    ///
    /// * `call_graph` - Used to resolve the method name
    #[must_use]
    pub fn summary(&self, call_graph: &CallGraph) -> String {
        let name = call_graph
            .method(self.method)
            .map_or_else(|| self.method.to_string(), |d| d.name().to_string());
        match (self.entry_block(), self.exit_block()) {
            (Some(entry), Some(exit)) => format!(
                "{name}: block_{entry} -> block_{exit} ({} blocks)",
                self.len()
            ),
            _ => format!("{name}: empty path"),
        }
    }
}

/// Enumerates all acyclic entry-to-exit block paths within single methods.
///
/// Paths are found by depth-first search with backtracking: the per-path
/// visited set forbids block revisits, which keeps the enumeration finite on
/// looping CFGs. Results are cached per method in a concurrent map, so the
/// composite builder can re-request paths for a method reached through many
/// call chains without recomputation.
///
/// Deterministic order: entries in recorded order, successors in recorded
/// order, so two runs over the same CFG yield the same path list.
#[derive(Debug, Default)]
pub struct MethodPathEnumerator {
    /// Per-method cache of enumerated paths.
    cache: DashMap<MethodId, Arc<Vec<MethodPath>>>,
}

impl MethodPathEnumerator {
    /// Creates an enumerator with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        MethodPathEnumerator {
            cache: DashMap::new(),
        }
    }

    /// Returns all internal paths for a method, computing and caching them
    /// on first request.
    ///
    /// # Arguments
    ///
    /// * `cfg` - The method's control flow graph
    #[must_use]
    pub fn method_paths(&self, cfg: &MethodCfg) -> Arc<Vec<MethodPath>> {
        if let Some(paths) = self.cache.get(&cfg.method()) {
            return Arc::clone(&*paths);
        }
        let paths = Arc::new(Self::enumerate_internal_paths(cfg));
        self.cache.insert(cfg.method(), Arc::clone(&paths));
        paths
    }

    /// Returns the number of methods with cached paths.
    #[must_use]
    pub fn cached_methods(&self) -> usize {
        self.cache.len()
    }

    /// Drops all cached paths.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Enumerates all paths from each entry block to any exit block.
    fn enumerate_internal_paths(cfg: &MethodCfg) -> Vec<MethodPath> {
        let mut paths = Vec::new();
        for &entry in cfg.entries() {
            Self::dfs_paths(cfg, entry, &mut paths);
        }
        paths
    }

    /// Backtracking DFS from one entry block.
    ///
    /// Implemented with an explicit frame stack so deep CFGs cannot overflow
    /// the native call stack.
    fn dfs_paths(cfg: &MethodCfg, entry: usize, paths: &mut Vec<MethodPath>) {
        let method = cfg.method();

        if cfg.is_exit_block(entry) {
            paths.push(MethodPath::new(method, vec![entry]));
            return;
        }

        let mut current_path: Vec<usize> = vec![entry];
        let mut visited: HashSet<usize> = HashSet::from([entry]);
        // Frame: (block, successor list, next successor to try)
        let mut frames: Vec<(usize, Vec<usize>, usize)> =
            vec![(entry, cfg.successors(entry).collect(), 0)];

        while let Some(frame) = frames.last_mut() {
            if frame.2 < frame.1.len() {
                let succ = frame.1[frame.2];
                frame.2 += 1;

                if visited.contains(&succ) {
                    continue;
                }

                if cfg.is_exit_block(succ) {
                    // Complete path; an exit block has nothing to expand
                    let mut blocks = current_path.clone();
                    blocks.push(succ);
                    paths.push(MethodPath::new(method, blocks));
                    continue;
                }

                current_path.push(succ);
                visited.insert(succ);
                frames.push((succ, cfg.successors(succ).collect(), 0));
            } else {
                let (block, _, _) = frames.pop().unwrap_or((entry, Vec::new(), 0));
                current_path.pop();
                visited.remove(&block);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::cfg::{BlockCfgExtractor, CfgMode};
    use crate::model::{Instruction, MethodBody, MethodDesc};

    fn cfg_for(instructions: Vec<Instruction>) -> MethodCfg {
        let desc = MethodDesc::new("com.app.Main", "run").with_body(MethodBody::new(instructions));
        BlockCfgExtractor::new(CfgMode::Plain)
            .extract_cfg(MethodId::new(0), &desc)
            .unwrap()
    }

    #[test]
    fn test_single_block_single_path() {
        let cfg = cfg_for(vec![Instruction::stmt("x = 1"), Instruction::ret()]);
        let enumerator = MethodPathEnumerator::new();
        let paths = enumerator.method_paths(&cfg);

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].blocks(), &[0]);
        assert_eq!(paths[0].entry_block(), paths[0].exit_block());
    }

    #[test]
    fn test_branch_yields_two_paths() {
        // if/else with separate returns
        let cfg = cfg_for(vec![
            Instruction::branch("if x", 3),
            Instruction::stmt("y = 1"),
            Instruction::ret(),
            Instruction::stmt("y = 2"),
            Instruction::ret(),
        ]);
        let enumerator = MethodPathEnumerator::new();
        let paths = enumerator.method_paths(&cfg);

        assert_eq!(paths.len(), 2);
        let sequences: Vec<&[usize]> = paths.iter().map(MethodPath::blocks).collect();
        assert!(sequences.contains(&&[0, 2][..]));
        assert!(sequences.contains(&&[0, 1][..]));
    }

    #[test]
    fn test_diamond_yields_two_paths_to_merge() {
        let cfg = cfg_for(vec![
            Instruction::branch("if x", 3),
            Instruction::stmt("y = 1"),
            Instruction::goto(4),
            Instruction::stmt("y = 2"),
            Instruction::ret(),
        ]);
        let enumerator = MethodPathEnumerator::new();
        let paths = enumerator.method_paths(&cfg);

        assert_eq!(paths.len(), 2);
        for path in paths.iter() {
            assert_eq!(path.entry_block(), Some(0));
            assert_eq!(path.exit_block(), Some(3));
        }
    }

    #[test]
    fn test_loop_is_not_unrolled() {
        // while loop: the body leads back to the visited header, so the
        // only complete path skips the loop
        let cfg = cfg_for(vec![
            Instruction::stmt("x = 0"),
            Instruction::branch("if x >= n", 4),
            Instruction::stmt("x += 1"),
            Instruction::goto(1),
            Instruction::ret(),
        ]);
        let enumerator = MethodPathEnumerator::new();
        let paths = enumerator.method_paths(&cfg);

        // Acyclic enumeration: the back edge is never followed twice
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].blocks(), &[0, 1, 3]);

        for path in paths.iter() {
            let mut seen = HashSet::new();
            assert!(path.blocks().iter().all(|&b| seen.insert(b)));
        }
    }

    #[test]
    fn test_cache_hit_returns_same_paths() {
        let cfg = cfg_for(vec![Instruction::ret()]);
        let enumerator = MethodPathEnumerator::new();

        let first = enumerator.method_paths(&cfg);
        let second = enumerator.method_paths(&cfg);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(enumerator.cached_methods(), 1);

        enumerator.clear_cache();
        assert_eq!(enumerator.cached_methods(), 0);
    }

    #[test]
    fn test_path_summary() {
        let mut graph = CallGraph::new();
        let id = graph.add_method(MethodDesc::new("com.app.Main", "run"));
        let path = MethodPath::new(id, vec![0, 2, 3]);
        assert_eq!(path.summary(&graph), "run: block_0 -> block_3 (3 blocks)");
        assert!(path.contains_block(2));
        assert!(!path.contains_block(1));
    }
}
