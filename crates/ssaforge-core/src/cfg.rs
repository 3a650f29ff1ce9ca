//! Control Flow Graph (CFG) model: basic blocks, instructions, variables.
//!
//! Required for: dominance analysis, phi placement, SSA renaming.
//!
//! Design: blocks live in an arena (`Vec<BasicBlock>`) owned by the graph,
//! and edges are plain `BlockId` indices rather than references. Predecessor
//! lists point back at the same nodes the successor lists point forward to,
//! so index-addressing sidesteps the reference cycle entirely.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// Unique identifier for a basic block within a graph. An index into the
/// graph's block arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// A variable occurrence: a source name plus an optional SSA version.
///
/// Pre-SSA, identity is the name alone. Post-SSA, two occurrences denote the
/// same value iff both name and version match. This is a value type — every
/// operand list and left-hand side stores its own copy, so renaming one
/// occurrence never aliases another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    /// The source-level variable name.
    pub name: String,
    /// SSA version number, assigned during renaming. `None` = unversioned.
    pub version: Option<u32>,
}

impl Variable {
    /// Create an unversioned variable.
    pub fn new(name: impl Into<String>) -> Self {
        Variable {
            name: name.into(),
            version: None,
        }
    }

    /// Returns true once renaming has assigned a version.
    pub fn is_versioned(&self) -> bool {
        self.version.is_some()
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.version {
            Some(v) => write!(f, "{}({})", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A single definition: a left-hand-side variable and its operand list.
///
/// Regular instructions have a fixed, externally-given operand count. A
/// phi-instruction (stored in [`BasicBlock::phis`]) has exactly one operand
/// per predecessor edge of its owning block, in predecessor order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The variable this instruction defines.
    pub lhs: Variable,
    /// The variables this instruction depends on.
    pub operands: Vec<Variable>,
}

impl Instruction {
    /// Create an instruction defining `lhs` from unversioned operands.
    pub fn new(lhs: impl Into<String>, operands: &[&str]) -> Self {
        Instruction {
            lhs: Variable::new(lhs),
            operands: operands.iter().map(|&op| Variable::new(op)).collect(),
        }
    }
}

/// A basic block: straight-line instructions plus adjacency lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicBlock {
    /// Display label assigned by [`FlowGraph::assign_labels`]. Not
    /// structurally meaningful; 0 = unlabeled.
    pub label: u32,
    /// Regular instructions, in execution order.
    pub instructions: Vec<Instruction>,
    /// Phi-instructions, at most one per variable name. Insertion-ordered so
    /// rendering and traversal stay deterministic.
    pub phis: IndexMap<String, Instruction>,
    /// Blocks that can jump here. Mutual inverse of `succs`.
    pub preds: Vec<BlockId>,
    /// Blocks reachable from here. Mutual inverse of `preds`.
    pub succs: Vec<BlockId>,
}

/// A control flow graph rooted at a single entry block.
///
/// The entry block must have no predecessors, and every other block must be
/// reachable from it via successor edges. The graph does not validate this —
/// callers guarantee well-formedness before running analyses over it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowGraph {
    /// Block arena, indexed by `BlockId`.
    pub blocks: Vec<BasicBlock>,
    /// The designated entry block.
    pub entry: BlockId,
}

impl FlowGraph {
    /// Create an empty graph. The first block added becomes the entry unless
    /// [`FlowGraph::entry`] is reassigned.
    pub fn new() -> Self {
        FlowGraph {
            blocks: Vec::new(),
            entry: BlockId(0),
        }
    }

    /// Append a new empty block to the arena and return its id.
    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock::default());
        id
    }

    /// Add a control-flow edge `from -> to`, updating both adjacency lists
    /// together so they remain mutual inverses.
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        self.blocks[from.index()].succs.push(to);
        self.blocks[to.index()].preds.push(from);
    }

    /// Returns the block with the given id, if it exists.
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    /// Returns a mutable reference to the block with the given id.
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(id.index())
    }

    /// Returns the predecessors of a block.
    pub fn preds(&self, id: BlockId) -> &[BlockId] {
        &self.blocks[id.index()].preds
    }

    /// Returns the successors of a block.
    pub fn succs(&self, id: BlockId) -> &[BlockId] {
        &self.blocks[id.index()].succs
    }

    /// Returns all blocks reachable from the entry, in DFS preorder over
    /// successor edges. Cycle-safe via a visited set.
    pub fn reachable_blocks(&self) -> Vec<BlockId> {
        let mut visited = FxHashSet::default();
        let mut order = Vec::new();
        let mut stack = vec![self.entry];
        while let Some(block) = stack.pop() {
            if !visited.insert(block) {
                continue;
            }
            order.push(block);
            // Reverse push so the first successor is visited first.
            for &succ in self.succs(block).iter().rev() {
                if !visited.contains(&succ) {
                    stack.push(succ);
                }
            }
        }
        order
    }

    /// Returns every distinct variable name appearing as a definition or an
    /// operand in any reachable block, sorted.
    pub fn variable_names(&self) -> Vec<String> {
        let mut names = FxHashSet::default();
        for id in self.reachable_blocks() {
            let block = &self.blocks[id.index()];
            for inst in &block.instructions {
                names.insert(inst.lhs.name.clone());
                for op in &inst.operands {
                    names.insert(op.name.clone());
                }
            }
        }
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names
    }

    /// Assign display labels 1, 2, 3, ... to reachable blocks in DFS
    /// preorder over successor edges.
    pub fn assign_labels(&mut self) {
        for block in &mut self.blocks {
            block.label = 0;
        }
        for (i, id) in self.reachable_blocks().into_iter().enumerate() {
            self.blocks[id.index()].label = i as u32 + 1;
        }
    }
}
