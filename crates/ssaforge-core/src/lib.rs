//! SSA construction for control flow graphs of straight-line instructions.
//!
//! Takes a CFG built by a front end and rewrites it into Static Single
//! Assignment form: every definition gets a unique version, merge points get
//! phi-instructions, and every use is rewired to its reaching definition.
//! The analyses form a dependency chain:
//!
//! ```text
//! FlowGraph (built by the caller)
//!  └─> DominatorTree (dominance sets, idoms, frontiers)
//!       └─> build_ssa (phi placement + renaming)
//! ```
//!
//! The pipeline is single-threaded and owns the graph exclusively for its
//! duration; it mutates blocks in place and returns the id of a synthetic
//! entry block that parameterizes every variable.
//!
//! ```
//! use ssaforge_core::{build_ssa, FlowGraph, Instruction};
//!
//! let mut graph = FlowGraph::new();
//! let block = graph.add_block();
//! graph.blocks[0].instructions.push(Instruction::new("x", &[]));
//! graph.blocks[0].instructions.push(Instruction::new("y", &["x"]));
//!
//! let root = build_ssa(&mut graph).expect("well-formed graph");
//! assert_eq!(graph.entry, root);
//! assert!(graph.block(block).unwrap().instructions[1].operands[0].is_versioned());
//! ```

pub mod cfg;
pub mod dominance;
pub mod error;
pub mod ssa;

pub use cfg::{BasicBlock, BlockId, FlowGraph, Instruction, Variable};
pub use dominance::DominatorTree;
pub use error::SsaError;
pub use ssa::{build_ssa, place_phis, rename_variable};
