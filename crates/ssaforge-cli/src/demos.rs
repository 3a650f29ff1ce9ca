//! The two bundled demonstration CFGs.
//!
//! These stand in for a real front end: they build the graphs by hand, in
//! the shape a lowering pass would produce them. Every instruction is an
//! opaque `lhs = f(operands)` definition.

use ssaforge_core::{BlockId, FlowGraph, Instruction};

fn def(g: &mut FlowGraph, block: BlockId, lhs: &str, operands: &[&str]) {
    g.blocks[block.0 as usize]
        .instructions
        .push(Instruction::new(lhs, operands));
}

/// A branch diamond:
///
/// ```text
///       S1        x = f(); x = f(x)
///      /  \
///    S2    S3     each arm redefines y from x
///      \  /
///       S4        uses both x and y
/// ```
pub fn diamond() -> FlowGraph {
    let mut g = FlowGraph::new();
    let s1 = g.add_block();
    let s2 = g.add_block();
    let s3 = g.add_block();
    let s4 = g.add_block();

    def(&mut g, s1, "x", &[]);
    def(&mut g, s1, "x", &["x"]);
    def(&mut g, s2, "y", &["x"]);
    def(&mut g, s2, "w", &["y"]);
    def(&mut g, s3, "y", &["x"]);
    def(&mut g, s4, "w", &["x", "y"]);
    def(&mut g, s4, "z", &["x", "y"]);

    g.add_edge(s1, s2);
    g.add_edge(s1, s3);
    g.add_edge(s2, s4);
    g.add_edge(s3, s4);
    g
}

/// A natural loop:
///
/// ```text
///    S1           i = f()
///    |
///    S2 <---+     c = f(i)
///    |  \   |
///    S4  S3-+     S3 redefines i and loops back
/// ```
pub fn natural_loop() -> FlowGraph {
    let mut g = FlowGraph::new();
    let s1 = g.add_block();
    let s2 = g.add_block();
    let s3 = g.add_block();
    let s4 = g.add_block();

    def(&mut g, s1, "i", &[]);
    def(&mut g, s2, "c", &["i"]);
    def(&mut g, s3, "i", &["i"]);
    def(&mut g, s4, "r", &["i"]);

    g.add_edge(s1, s2);
    g.add_edge(s2, s3);
    g.add_edge(s3, s2);
    g.add_edge(s2, s4);
    g
}
