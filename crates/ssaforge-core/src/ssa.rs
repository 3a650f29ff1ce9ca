//! Static Single Assignment (SSA) form construction.
//!
//! SSA form assigns each variable a unique version at each definition point
//! and inserts phi-instructions at join points where multiple definitions
//! could reach.
//!
//! Uses the Cytron et al. algorithm:
//! 1. Wrap the graph in a synthetic entry defining every variable once
//! 2. Place phi-instructions using dominance frontiers (iterative worklist)
//! 3. Rename variables via a dominator tree preorder walk
//!
//! Phi placement and renaming are driven one variable name at a time; the
//! version counter and version stack are local to that name's pass and never
//! leak across names.

use crate::cfg::{BlockId, FlowGraph, Instruction, Variable};
use crate::dominance::DominatorTree;
use crate::error::SsaError;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Convert a control flow graph to SSA form in place.
///
/// A synthetic wrapper block becomes the new entry: it holds one
/// zero-operand "parameter" definition per distinct variable name in the
/// graph, so every variable has an initial version before any real block
/// executes. Its single successor is the original entry.
///
/// On success every variable occurrence in the reachable graph is versioned,
/// every merge point carries fully wired phis, and the wrapper's id is
/// returned as the new root. On error the graph may be partially renamed and
/// should be discarded.
pub fn build_ssa(graph: &mut FlowGraph) -> Result<BlockId, SsaError> {
    let names = graph.variable_names();

    let old_entry = graph.entry;
    let wrapper = graph.add_block();
    for name in &names {
        graph.blocks[wrapper.0 as usize]
            .instructions
            .push(Instruction::new(name.clone(), &[]));
    }
    graph.add_edge(wrapper, old_entry);
    graph.entry = wrapper;
    debug!(variables = names.len(), "inserted parameter wrapper block");

    let dom = DominatorTree::build(graph);
    for name in &names {
        let placed = place_phis(graph, name, &dom);
        debug!(name = name.as_str(), placed, "phi placement done");
        rename_variable(graph, name, &dom)?;
    }
    debug!("ssa construction complete");
    Ok(wrapper)
}

/// Insert phi-instructions for one variable name at every merge point that
/// needs one. Returns the number of phis inserted.
///
/// Worklist seeded with every block that defines the name; each inserted phi
/// is itself a new definition, so its block goes back on the worklist. The
/// phi-table lookup makes insertion idempotent, which bounds each block to
/// one enqueue per name.
pub fn place_phis(graph: &mut FlowGraph, name: &str, dom: &DominatorTree) -> usize {
    let mut worklist: Vec<BlockId> = graph
        .reachable_blocks()
        .into_iter()
        .filter(|&block| {
            graph.blocks[block.0 as usize]
                .instructions
                .iter()
                .any(|inst| inst.lhs.name == name)
        })
        .collect();

    let mut placed = 0;
    while let Some(block) = worklist.pop() {
        for &target in dom.frontier(block) {
            let target_block = &mut graph.blocks[target.0 as usize];
            if target_block.phis.contains_key(name) {
                continue;
            }
            // One operand per predecessor edge, in predecessor order, each
            // starting as the unversioned name.
            let operand_count = target_block.preds.len();
            target_block.phis.insert(
                name.to_string(),
                Instruction {
                    lhs: Variable::new(name),
                    operands: vec![Variable::new(name); operand_count],
                },
            );
            placed += 1;
            worklist.push(target);
        }
    }
    placed
}

/// One step of the iterative dominator-tree walk.
enum Frame {
    /// Process a block's phis, instructions, and successor phi operands.
    Enter(BlockId),
    /// Pop the version stack once per definition made in the block.
    Leave(usize),
}

/// Assign SSA versions for one variable name.
///
/// Walks the dominator tree depth-first from the graph entry with an
/// explicit frame stack (no recursion, so deep graphs cannot overflow). A
/// definition's version is visible exactly within its dominator subtree:
/// entering a block pushes a version per definition, leaving pops them.
///
/// Fails with [`SsaError::UndefinedVariable`] if a use is reached while the
/// version stack is empty, and [`SsaError::InconsistentGraph`] if a phi
/// operand cannot be matched to a predecessor edge.
pub fn rename_variable(
    graph: &mut FlowGraph,
    name: &str,
    dom: &DominatorTree,
) -> Result<(), SsaError> {
    let mut counter: u32 = 0;
    let mut versions: Vec<u32> = Vec::new();
    let mut visited: FxHashSet<BlockId> = FxHashSet::default();
    let mut stack = vec![Frame::Enter(graph.entry)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(block) => {
                if !visited.insert(block) {
                    continue;
                }
                let mut pushed = 0;

                let block_data = &mut graph.blocks[block.0 as usize];

                // A phi for this name defines it before any instruction runs.
                if let Some(phi) = block_data.phis.get_mut(name) {
                    phi.lhs.version = Some(counter);
                    versions.push(counter);
                    counter += 1;
                    pushed += 1;
                }

                // Uses read the innermost active version; a matching LHS
                // starts a fresh one, shadowing within the same block.
                for inst in &mut block_data.instructions {
                    for operand in &mut inst.operands {
                        if operand.name == name {
                            let current = *versions.last().ok_or_else(|| {
                                SsaError::UndefinedVariable {
                                    name: name.to_string(),
                                }
                            })?;
                            operand.version = Some(current);
                        }
                    }
                    if inst.lhs.name == name {
                        inst.lhs.version = Some(counter);
                        versions.push(counter);
                        counter += 1;
                        pushed += 1;
                    }
                }

                // Wire this block's outgoing phi operands now, whether or
                // not the successor has been renamed yet; each predecessor
                // fills in its own slot when it is processed.
                let succs: Vec<BlockId> = graph.succs(block).to_vec();
                for succ in succs {
                    if !graph.blocks[succ.0 as usize].phis.contains_key(name) {
                        continue;
                    }
                    let slots: Vec<usize> = graph
                        .preds(succ)
                        .iter()
                        .enumerate()
                        .filter(|&(_, &pred)| pred == block)
                        .map(|(i, _)| i)
                        .collect();
                    if slots.is_empty() {
                        return Err(SsaError::InconsistentGraph {
                            from: block,
                            to: succ,
                        });
                    }
                    let current = *versions.last().ok_or_else(|| SsaError::UndefinedVariable {
                        name: name.to_string(),
                    })?;
                    if let Some(phi) = graph.blocks[succ.0 as usize].phis.get_mut(name) {
                        for slot in slots {
                            let operand = phi.operands.get_mut(slot).ok_or(
                                SsaError::InconsistentGraph {
                                    from: block,
                                    to: succ,
                                },
                            )?;
                            operand.version = Some(current);
                        }
                    }
                }

                stack.push(Frame::Leave(pushed));
                for &child in dom.children(block).iter().rev() {
                    if !visited.contains(&child) {
                        stack.push(Frame::Enter(child));
                    }
                }
            }
            Frame::Leave(pushed) => {
                for _ in 0..pushed {
                    versions.pop();
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::FlowGraph;

    fn push_inst(g: &mut FlowGraph, block: BlockId, lhs: &str, operands: &[&str]) {
        g.blocks[block.0 as usize]
            .instructions
            .push(Instruction::new(lhs, operands));
    }

    #[test]
    fn test_straight_line_versions() {
        // x = f(); x = f(x); y = f(x)
        let mut g = FlowGraph::new();
        let b = g.add_block();
        push_inst(&mut g, b, "x", &[]);
        push_inst(&mut g, b, "x", &["x"]);
        push_inst(&mut g, b, "y", &["x"]);

        build_ssa(&mut g).unwrap();

        let insts = &g.blocks[b.0 as usize].instructions;
        assert_eq!(insts[0].lhs.version, Some(1)); // wrapper took version 0
        assert_eq!(insts[1].operands[0].version, Some(1));
        assert_eq!(insts[1].lhs.version, Some(2));
        assert_eq!(insts[2].operands[0].version, Some(2));
        // No merge points, no phis.
        for block in &g.blocks {
            assert!(block.phis.is_empty());
        }
    }

    #[test]
    fn test_phi_placement_at_merge() {
        // entry branches to two arms that both define v; arms join.
        let mut g = FlowGraph::new();
        let entry = g.add_block();
        let left = g.add_block();
        let right = g.add_block();
        let join = g.add_block();
        g.add_edge(entry, left);
        g.add_edge(entry, right);
        g.add_edge(left, join);
        g.add_edge(right, join);
        push_inst(&mut g, left, "v", &[]);
        push_inst(&mut g, right, "v", &[]);

        let dom = DominatorTree::build(&g);
        let placed = place_phis(&mut g, "v", &dom);

        assert_eq!(placed, 1);
        let phi = g.blocks[join.0 as usize].phis.get("v").unwrap();
        assert_eq!(phi.operands.len(), 2);
    }

    #[test]
    fn test_phi_placement_iterates_through_frontiers() {
        // Two nested merges: a def in one arm of the inner diamond must
        // force a phi at the inner join, and that phi (a new definition)
        // must force one at the outer join too.
        let mut g = FlowGraph::new();
        let entry = g.add_block();
        let inner_left = g.add_block();
        let inner_right = g.add_block();
        let inner_join = g.add_block();
        let outer_arm = g.add_block();
        let outer_join = g.add_block();
        g.add_edge(entry, inner_left);
        g.add_edge(entry, inner_right);
        g.add_edge(inner_left, inner_join);
        g.add_edge(inner_right, inner_join);
        g.add_edge(entry, outer_arm);
        g.add_edge(inner_join, outer_join);
        g.add_edge(outer_arm, outer_join);
        push_inst(&mut g, inner_left, "v", &[]);

        let dom = DominatorTree::build(&g);
        place_phis(&mut g, "v", &dom);

        assert!(g.blocks[inner_join.0 as usize].phis.contains_key("v"));
        assert!(g.blocks[outer_join.0 as usize].phis.contains_key("v"));
    }

    #[test]
    fn test_use_without_definition_fails() {
        // y = f(x) with no definition of x anywhere, renamed directly
        // (build_ssa would paper over this with a wrapper parameter).
        let mut g = FlowGraph::new();
        let b = g.add_block();
        push_inst(&mut g, b, "y", &["x"]);

        let dom = DominatorTree::build(&g);
        let err = rename_variable(&mut g, "x", &dom).unwrap_err();
        assert_eq!(
            err,
            SsaError::UndefinedVariable {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn test_broken_predecessor_list_fails() {
        let mut g = FlowGraph::new();
        let a = g.add_block();
        let b = g.add_block();
        g.add_edge(a, b);
        push_inst(&mut g, a, "x", &[]);
        // Hand-insert a phi, then corrupt the edge invariant.
        g.blocks[b.0 as usize]
            .phis
            .insert("x".to_string(), Instruction::new("x", &["x"]));
        g.blocks[b.0 as usize].preds.clear();

        let dom = DominatorTree::build(&g);
        let err = rename_variable(&mut g, "x", &dom).unwrap_err();
        assert_eq!(err, SsaError::InconsistentGraph { from: a, to: b });
    }

    #[test]
    fn test_rename_is_per_variable() {
        // Renaming x must not touch y occurrences.
        let mut g = FlowGraph::new();
        let b = g.add_block();
        push_inst(&mut g, b, "x", &[]);
        push_inst(&mut g, b, "y", &["x"]);

        let dom = DominatorTree::build(&g);
        rename_variable(&mut g, "x", &dom).unwrap();

        let insts = &g.blocks[b.0 as usize].instructions;
        assert_eq!(insts[0].lhs.version, Some(0));
        assert_eq!(insts[1].operands[0].version, Some(0));
        assert_eq!(insts[1].lhs.version, None);
    }

    #[test]
    fn test_wrapper_defines_every_name() {
        let mut g = FlowGraph::new();
        let b = g.add_block();
        push_inst(&mut g, b, "y", &["x"]);

        let root = build_ssa(&mut g).unwrap();

        let wrapper = &g.blocks[root.0 as usize];
        let params: Vec<&str> = wrapper
            .instructions
            .iter()
            .map(|inst| inst.lhs.name.as_str())
            .collect();
        assert_eq!(params, vec!["x", "y"]);
        assert!(wrapper.instructions.iter().all(|i| i.operands.is_empty()));
        assert_eq!(g.succs(root), &[b]);
        assert_eq!(g.entry, root);
        // The use of x resolves to the wrapper's parameter version.
        assert_eq!(
            g.blocks[b.0 as usize].instructions[0].operands[0].version,
            Some(0)
        );
    }
}
