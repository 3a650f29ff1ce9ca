//! Graphviz DOT serialization of a flow graph.
//!
//! Blocks become rectangle nodes labeled with their phi- and regular
//! instructions; CFG edges become directed edges between display labels
//! assigned in DFS preorder.

use ssaforge_core::{FlowGraph, Instruction};

/// Render the graph as a DOT digraph. Assigns fresh display labels first.
pub fn to_dot(graph: &mut FlowGraph) -> String {
    graph.assign_labels();

    let mut out = String::from("digraph G {\nnode[shape=rectangle]\n");
    for id in graph.reachable_blocks() {
        let Some(block) = graph.block(id) else {
            continue;
        };
        let mut label = String::new();
        for phi in block.phis.values() {
            label.push_str(&render_inst(phi, "phi"));
            label.push_str("\\n");
        }
        for inst in &block.instructions {
            label.push_str(&render_inst(inst, "f"));
            label.push_str("\\n");
        }
        out.push_str(&format!("{} [label=\"{}\"]\n", block.label, label));
        for &succ in &block.succs {
            if let Some(succ_block) = graph.block(succ) {
                out.push_str(&format!("{} -> {}\n", block.label, succ_block.label));
            }
        }
    }
    out.push('}');
    out.push('\n');
    out
}

/// `lhs = fname(op1,op2,...)` with versioned variables as `name(version)`.
fn render_inst(inst: &Instruction, fname: &str) -> String {
    let operands: Vec<String> = inst.operands.iter().map(|op| op.to_string()).collect();
    format!("{} = {}({})", inst.lhs, fname, operands.join(","))
}
