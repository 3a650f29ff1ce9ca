//! Dominance analysis over a control flow graph.
//!
//! Required for: phi placement and variable renaming during SSA
//! construction.
//!
//! Computes full dominance sets with the classic iterative fixpoint
//! (intersect predecessor sets until stable), then derives immediate
//! dominators, the dominator tree, and dominance frontiers from them. The
//! fixpoint is O(blocks^2) in the worst case, which is fine for
//! function-scale CFGs.

use crate::cfg::{BlockId, FlowGraph};
use rustc_hash::{FxHashMap, FxHashSet};

/// Dominance information for every block reachable from the graph entry.
///
/// Block A **dominates** block B if every path from the entry to B passes
/// through A (every block dominates itself). The **immediate dominator** of
/// B is its closest strict dominator; the immediate-dominator edges form the
/// dominator tree. The **dominance frontier** of A is the set of blocks
/// where A's dominance "just stops": A dominates a predecessor but not the
/// block itself.
#[derive(Debug)]
pub struct DominatorTree {
    /// Full dominance set per block (includes the block itself).
    dom_sets: FxHashMap<BlockId, FxHashSet<BlockId>>,
    /// Immediate dominator per block. The entry maps to itself.
    idom: FxHashMap<BlockId, BlockId>,
    /// Dominator-tree children: block -> blocks it immediately dominates,
    /// sorted by arena index for deterministic traversal.
    children: FxHashMap<BlockId, Vec<BlockId>>,
    /// Dominance frontier per block.
    frontiers: FxHashMap<BlockId, Vec<BlockId>>,
}

impl DominatorTree {
    /// Compute dominance sets, immediate dominators, and frontiers for all
    /// blocks reachable from `graph.entry`.
    pub fn build(graph: &FlowGraph) -> Self {
        let universe = graph.reachable_blocks();
        let dom_sets = Self::solve_dominators(graph, &universe);
        let idom = Self::immediate_dominators(graph, &universe, &dom_sets);

        // Materialize the tree once; the renamer walks it directly instead
        // of re-deriving parent/child pairs from the sets.
        let mut children: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
        for &block in &universe {
            children.insert(block, Vec::new());
        }
        for (&block, &dom) in &idom {
            if block != dom {
                children.entry(dom).or_default().push(block);
            }
        }
        for list in children.values_mut() {
            list.sort();
        }

        let frontiers = Self::compute_frontiers(graph, &universe, &idom);

        DominatorTree {
            dom_sets,
            idom,
            children,
            frontiers,
        }
    }

    /// Iterative dominance-set fixpoint.
    ///
    /// The entry starts at `{entry}`; every other block starts at the full
    /// universe (conservative over-approximation). Each pass recomputes a
    /// block's set as the intersection of its predecessors' sets plus the
    /// block itself. Sets only shrink and the universe is finite, so the
    /// loop terminates; a pass with no set change (set equality, not count)
    /// ends it.
    fn solve_dominators(
        graph: &FlowGraph,
        universe: &[BlockId],
    ) -> FxHashMap<BlockId, FxHashSet<BlockId>> {
        let all: FxHashSet<BlockId> = universe.iter().copied().collect();
        let mut sets: FxHashMap<BlockId, FxHashSet<BlockId>> = FxHashMap::default();
        for &block in universe {
            if block == graph.entry {
                sets.insert(block, std::iter::once(block).collect());
            } else {
                sets.insert(block, all.clone());
            }
        }

        let mut changed = true;
        while changed {
            changed = false;
            for &block in universe {
                if block == graph.entry {
                    continue;
                }
                let mut candidate: Option<FxHashSet<BlockId>> = None;
                for pred in graph.preds(block) {
                    // Predecessors outside the universe are unreachable and
                    // contribute no entry-to-block paths.
                    let Some(pred_set) = sets.get(pred) else {
                        continue;
                    };
                    candidate = Some(match candidate {
                        None => pred_set.clone(),
                        Some(acc) => acc.intersection(pred_set).copied().collect(),
                    });
                }
                let mut candidate = candidate.unwrap_or_default();
                candidate.insert(block);
                if sets.get(&block) != Some(&candidate) {
                    sets.insert(block, candidate);
                    changed = true;
                }
            }
        }
        sets
    }

    /// Derive each non-entry block's immediate dominator: the strict
    /// dominator that every other strict dominator dominates (the maximal
    /// element of the strict-dominator chain).
    fn immediate_dominators(
        graph: &FlowGraph,
        universe: &[BlockId],
        dom_sets: &FxHashMap<BlockId, FxHashSet<BlockId>>,
    ) -> FxHashMap<BlockId, BlockId> {
        let mut idom: FxHashMap<BlockId, BlockId> = FxHashMap::default();
        idom.insert(graph.entry, graph.entry);

        for &block in universe {
            if block == graph.entry {
                continue;
            }
            let Some(doms) = dom_sets.get(&block) else {
                continue;
            };
            let strict: Vec<BlockId> = doms.iter().copied().filter(|&d| d != block).collect();
            let closest = strict.iter().copied().find(|&d| {
                strict.iter().all(|&other| {
                    other == d || dom_sets.get(&d).is_some_and(|s| s.contains(&other))
                })
            });
            if let Some(closest) = closest {
                idom.insert(block, closest);
            }
        }
        idom
    }

    /// Compute dominance frontiers with the runner walk.
    ///
    /// For each merge block (2+ predecessors), walk from every predecessor
    /// up the idom chain toward the merge block's idom (exclusive), adding
    /// the merge block to each visited block's frontier. A back-edge whose
    /// target is its own predecessor's dominator puts the block in its own
    /// frontier, which is exactly what loop headers need.
    fn compute_frontiers(
        graph: &FlowGraph,
        universe: &[BlockId],
        idom: &FxHashMap<BlockId, BlockId>,
    ) -> FxHashMap<BlockId, Vec<BlockId>> {
        let mut frontiers: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
        for &block in universe {
            frontiers.insert(block, Vec::new());
        }

        for &block in universe {
            let preds = graph.preds(block);
            if preds.len() < 2 {
                continue;
            }
            let block_idom = idom.get(&block).copied();
            for &pred in preds {
                if !idom.contains_key(&pred) {
                    continue;
                }
                let mut runner = pred;
                while Some(runner) != block_idom {
                    let frontier = frontiers.entry(runner).or_default();
                    if !frontier.contains(&block) {
                        frontier.push(block);
                    }
                    match idom.get(&runner) {
                        Some(&dom) if dom != runner => runner = dom,
                        _ => break,
                    }
                }
            }
        }
        frontiers
    }

    /// Returns true if block `a` dominates block `b`.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dom_sets.get(&b).is_some_and(|s| s.contains(&a))
    }

    /// Returns the full dominance set of a block.
    pub fn dominators(&self, block: BlockId) -> Option<&FxHashSet<BlockId>> {
        self.dom_sets.get(&block)
    }

    /// Returns the immediate dominator of a block. The entry has none.
    pub fn immediate_dominator(&self, block: BlockId) -> Option<BlockId> {
        self.idom
            .get(&block)
            .copied()
            .filter(|&dom| dom != block)
    }

    /// Returns the dominator-tree children of a block.
    pub fn children(&self, block: BlockId) -> &[BlockId] {
        self.children
            .get(&block)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the dominance frontier of a block.
    pub fn frontier(&self, block: BlockId) -> &[BlockId] {
        self.frontiers
            .get(&block)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
