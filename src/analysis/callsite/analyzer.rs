//! Call-site scan over application-level CFGs.

use std::collections::HashMap;

use crate::{
    analysis::{
        callsite::{BlockRef, CallSite, CallSiteInfo, Continuation},
        cfg::MethodCfg,
    },
    callgraph::CallGraph,
    model::MethodId,
};

/// Analyzes method call sites within blocks and their continuation points.
///
/// App-agnostic: the analyzer is configured with a package prefix and works
/// for any application. Both the calling method and the invoked method must
/// live under the prefix for a call to be recorded; everything else is an
/// opaque framework or library boundary.
///
/// # Examples
///
/// ```rust,ignore
/// let analyzer = CallSiteAnalyzer::new(&call_graph, "com.app");
/// let analysis = analyzer.analyze_call_sites(cfg_result.infos().iter().map(|i| i.cfg()));
/// for block in analysis.blocks_with_call_sites() {
///     for site in analysis.call_sites_for_block(block) {
///         println!("{site}");
///     }
/// }
/// ```
#[derive(Debug)]
pub struct CallSiteAnalyzer<'a> {
    call_graph: &'a CallGraph,
    package_prefix: String,
}

impl<'a> CallSiteAnalyzer<'a> {
    /// Creates an analyzer for the given application package prefix.
    #[must_use]
    pub fn new(call_graph: &'a CallGraph, package_prefix: impl Into<String>) -> Self {
        CallSiteAnalyzer {
            call_graph,
            package_prefix: package_prefix.into(),
        }
    }

    /// Returns the configured package prefix.
    #[must_use]
    pub fn package_prefix(&self) -> &str {
        &self.package_prefix
    }

    /// Returns `true` if the method's declaring class lives under the
    /// application package prefix.
    #[must_use]
    pub fn is_app_method(&self, method: MethodId) -> bool {
        self.call_graph
            .method(method)
            .is_some_and(|desc| desc.is_in_package(&self.package_prefix))
    }

    /// Scans the supplied CFGs for application-level call sites.
    ///
    /// For every call found, the continuation point is computed from static
    /// block adjacency: remaining instructions in the same block mean the
    /// continuation is that block; otherwise the first successor; otherwise
    /// the method ends at the call.
    ///
    /// # Arguments
    ///
    /// * `cfgs` - The CFGs to scan; non-application methods are ignored
    ///
    /// # Returns
    ///
    /// A queryable [`CallSiteAnalysis`].
    pub fn analyze_call_sites<'b, I>(&self, cfgs: I) -> CallSiteAnalysis
    where
        I: IntoIterator<Item = &'b MethodCfg>,
    {
        let mut block_call_sites: HashMap<BlockRef, Vec<CallSite>> = HashMap::new();
        let mut details: HashMap<(BlockRef, usize), CallSiteInfo> = HashMap::new();

        for cfg in cfgs {
            if !self.is_app_method(cfg.method()) {
                continue;
            }
            self.analyze_block_call_sites(cfg, &mut block_call_sites, &mut details);
        }

        CallSiteAnalysis {
            block_call_sites,
            details,
        }
    }

    /// Scans one method's blocks.
    fn analyze_block_call_sites(
        &self,
        cfg: &MethodCfg,
        block_call_sites: &mut HashMap<BlockRef, Vec<CallSite>>,
        details: &mut HashMap<(BlockRef, usize), CallSiteInfo>,
    ) {
        let caller = cfg.method();

        for block in cfg.blocks() {
            let block_ref = BlockRef::new(caller, block.index);
            let mut sites = Vec::new();

            for (position, instr) in block.instructions.iter().enumerate() {
                let Some(target) = instr.invoked else {
                    continue;
                };
                if !self.is_app_method(target) {
                    continue;
                }

                let site = CallSite {
                    caller,
                    target,
                    block: block.index,
                    offset: block.offset_of(position),
                    position_in_block: position,
                };
                sites.push(site);

                let is_last_in_block = position == block.len() - 1;
                let continuation = if !is_last_in_block {
                    Continuation::SameBlock(block_ref)
                } else if let Some(successor) = cfg.successors(block.index).next() {
                    // Multiple successors collapse to the first; alternative
                    // continuations are not modeled
                    Continuation::Successor(BlockRef::new(caller, successor))
                } else {
                    Continuation::MethodExit
                };

                details.insert(
                    (block_ref, site.offset),
                    CallSiteInfo {
                        site,
                        continuation,
                        is_last_in_block,
                        has_post_call_statements: !is_last_in_block,
                    },
                );
            }

            if !sites.is_empty() {
                block_call_sites.insert(block_ref, sites);
            }
        }
    }
}

/// Queryable result of a call-site scan.
#[derive(Debug, Default)]
pub struct CallSiteAnalysis {
    /// Blocks containing application calls, with their sites in block order.
    block_call_sites: HashMap<BlockRef, Vec<CallSite>>,
    /// Per-site derived metadata, keyed by (block, body offset).
    details: HashMap<(BlockRef, usize), CallSiteInfo>,
}

impl CallSiteAnalysis {
    /// Returns the call sites found in a block, in instruction order.
    #[must_use]
    pub fn call_sites_for_block(&self, block: BlockRef) -> &[CallSite] {
        self.block_call_sites
            .get(&block)
            .map_or(&[], Vec::as_slice)
    }

    /// Returns the derived metadata for a call site.
    ///
    /// # Arguments
    ///
    /// * `block` - The block containing the call
    /// * `offset` - The body offset of the call instruction
    #[must_use]
    pub fn call_site_info(&self, block: BlockRef, offset: usize) -> Option<&CallSiteInfo> {
        self.details.get(&(block, offset))
    }

    /// Returns all blocks containing call sites, sorted for determinism.
    #[must_use]
    pub fn blocks_with_call_sites(&self) -> Vec<BlockRef> {
        let mut blocks: Vec<BlockRef> = self.block_call_sites.keys().copied().collect();
        blocks.sort_unstable();
        blocks
    }

    /// Returns `true` if the block contains at least one call site.
    #[must_use]
    pub fn has_call_sites(&self, block: BlockRef) -> bool {
        self.block_call_sites.contains_key(&block)
    }

    /// Returns the total number of call sites found.
    #[must_use]
    pub fn total_call_sites(&self) -> usize {
        self.block_call_sites.values().map(Vec::len).sum()
    }

    /// Renders a human-readable summary of the scan.
    ///
    /// # Arguments
    ///
    /// * `call_graph` - Used to resolve method names
    #[must_use]
    pub fn summary(&self, call_graph: &CallGraph) -> String {
        let mut out = String::from("=== Call Site Analysis Summary ===\n");
        out.push_str(&format!(
            "Blocks with call sites: {}\n",
            self.block_call_sites.len()
        ));
        out.push_str(&format!("Total call sites: {}\n", self.total_call_sites()));

        for block in self.blocks_with_call_sites() {
            out.push_str(&format!(
                "\n{} ({} calls):\n",
                block,
                self.call_sites_for_block(block).len()
            ));
            for site in self.call_sites_for_block(block) {
                let continuation = self
                    .call_site_info(block, site.offset)
                    .map_or_else(|| "?".to_string(), |info| info.continuation.to_string());
                out.push_str(&format!(
                    "  -> {} (continuation: {continuation})\n",
                    call_graph.signature_of(site.target)
                ));
            }
        }

        out
    }
}
