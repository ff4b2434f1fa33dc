//! Control Flow Graph
//!
//! Builds the instruction-level control graph of a whole program, including
//! the interprocedural edges of calls and returns, and partitions it into
//! basic blocks.
//!
//! # Call/return linkage
//!
//! A `CALL L` jumps to the instruction labelled `L`. The function body is
//! everything from `L` up to the first `RET` found by scanning forward, and
//! that `RET` gets an edge back to the instruction after *every* call site of
//! `L`. Liveness therefore merges all call sites at the return (the analysis is
//! context-insensitive), which is safe but may cost colors.

use super::error::AllocError;
use crate::asm::{Instr, JumpKind, Program};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

/// A maximal straight-line run of instructions, `start..end` in program order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasicBlock {
    pub start: usize,
    pub end: usize,
}

impl BasicBlock {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Index of the block's last instruction
    pub fn last(&self) -> usize {
        self.end - 1
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Directed graph over instruction positions of a program
#[derive(Clone, Debug)]
pub struct ControlGraph {
    program: Program,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    labels: HashMap<String, usize>,
    /// RET index -> CALL instructions returning through it
    callers: BTreeMap<usize, Vec<usize>>,
    blocks: Vec<BasicBlock>,
    block_of: Vec<usize>,
}

impl ControlGraph {
    /// Build the control graph of `program`
    pub fn build(program: &Program) -> Result<Self, AllocError> {
        let program = program.clone();
        let n = program.len();

        let labels = Self::index_labels(&program)?;

        let mut graph = ControlGraph {
            successors: vec![Vec::new(); n],
            predecessors: vec![Vec::new(); n],
            labels,
            callers: BTreeMap::new(),
            blocks: Vec::new(),
            block_of: Vec::new(),
            program,
        };

        graph.link_calls()?;

        // Sequential edges
        for i in 0..n.saturating_sub(1) {
            if graph.program[i].instr.falls_through() {
                graph.add_edge(i, i + 1);
            }
        }

        // Jump and branch edges
        for i in 0..n {
            if let Some(target) = graph.program[i].instr.target() {
                let to = graph.resolve(target, i)?;
                graph.add_edge(i, to);
            }
        }

        // Return edges, fanned out to every caller
        let returns: Vec<(usize, usize)> = graph
            .callers
            .iter()
            .flat_map(|(&ret, calls)| calls.iter().map(move |&call| (ret, call + 1)))
            .filter(|&(_, after_call)| after_call < n)
            .collect();
        for (ret, after_call) in returns {
            graph.add_edge(ret, after_call);
        }

        graph.partition_blocks();

        log::debug!(
            "control graph: {} instructions, {} edges, {} blocks, {} returns linked",
            n,
            graph.edge_count(),
            graph.blocks.len(),
            graph.callers.len()
        );

        Ok(graph)
    }

    fn index_labels(program: &Program) -> Result<HashMap<String, usize>, AllocError> {
        let mut labels = HashMap::new();
        for (i, inst) in program.iter().enumerate() {
            if let Some(label) = &inst.label
                && let Some(&first) = labels.get(label)
            {
                return Err(AllocError::DuplicateLabel {
                    label: label.clone(),
                    first,
                    second: i,
                });
            }
            if let Some(label) = &inst.label {
                labels.insert(label.clone(), i);
            }
        }
        Ok(labels)
    }

    /// Record, for every CALL, the RET its callee returns through
    fn link_calls(&mut self) -> Result<(), AllocError> {
        for (call, inst) in self.program.iter().enumerate() {
            let Instr::JumpCall {
                kind: JumpKind::Call,
                target,
            } = &inst.instr
            else {
                continue;
            };

            let entry = self.resolve(target, call)?;
            let ret = self
                .program
                .iter()
                .enumerate()
                .skip(entry)
                .find(|(_, candidate)| matches!(candidate.instr, Instr::Ret))
                .map(|(index, _)| index)
                .ok_or_else(|| AllocError::UnresolvedCallTarget {
                    label: target.clone(),
                    call,
                })?;

            self.callers.entry(ret).or_default().push(call);
        }
        Ok(())
    }

    fn resolve(&self, label: &str, at: usize) -> Result<usize, AllocError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| AllocError::DanglingJumpTarget {
                label: label.to_string(),
                at,
            })
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        if !self.successors[from].contains(&to) {
            self.successors[from].push(to);
            self.predecessors[to].push(from);
        }
    }

    fn partition_blocks(&mut self) {
        let n = self.program.len();
        self.block_of = vec![0; n];

        let mut start = 0;
        for i in 0..n {
            self.block_of[i] = self.blocks.len();

            let instr = &self.program[i].instr;
            let closes = self.successors[i].len() > 1
                || !instr.falls_through()
                || i + 1 == n
                || self.program[i + 1].label.is_some();

            if closes {
                self.blocks.push(BasicBlock { start, end: i + 1 });
                start = i + 1;
            }
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    pub fn successors(&self, index: usize) -> &[usize] {
        &self.successors[index]
    }

    pub fn predecessors(&self, index: usize) -> &[usize] {
        &self.predecessors[index]
    }

    /// All edges as `(from, to)` pairs, sources in program order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(from, succs)| succs.iter().map(move |&to| (from, to)))
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.successors[from].contains(&to)
    }

    /// Instruction carrying `label`
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    /// CALL instructions whose callee returns through the RET at `ret`
    pub fn callers_of(&self, ret: usize) -> &[usize] {
        self.callers.get(&ret).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Index of the block containing instruction `index`
    pub fn block_of(&self, index: usize) -> usize {
        self.block_of[index]
    }

    /// Successor blocks of block `block`, ascending and without repeats
    pub fn block_successors(&self, block: usize) -> Vec<usize> {
        let last = self.blocks[block].last();
        let mut succs: Vec<usize> = self.successors[last]
            .iter()
            .map(|&s| self.block_of[s])
            .collect();
        succs.sort_unstable();
        succs.dedup();
        succs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_program;

    fn cfg(src: &str) -> ControlGraph {
        let program = parse_program(src).unwrap();
        ControlGraph::build(&program).unwrap()
    }

    #[test]
    fn test_sequential_edges() {
        let g = cfg("XOR R0 R0 R0\nADDi R0 R0 5\nOUT R0\nSTOP");
        assert_eq!(g.successors(0), &[1]);
        assert_eq!(g.successors(1), &[2]);
        assert_eq!(g.successors(2), &[3]);
        assert!(g.successors(3).is_empty());
        assert_eq!(g.blocks().len(), 1);
    }

    #[test]
    fn test_jump_skips_next_instruction() {
        let g = cfg("XOR R0 R0 R0\nADDi R0 R0 5\nJMP test\nXOR R0 R0 R0\ntest: ADDi R1 R0 5");
        assert_eq!(g.successors(2), &[4]);
        assert!(g.predecessors(3).is_empty());
        assert_eq!(g.predecessors(4), &[3, 2]);
    }

    #[test]
    fn test_conditional_jump_has_both_successors() {
        let g = cfg("XOR R0 R0 R0\nADDi R0 R0 5\nJEQU R1 R0 test\nXOR R0 R0 R0\ntest: ADDi R1 R0 5");
        assert_eq!(g.successors(2), &[3, 4]);
        assert_eq!(g.edge_count(), 5);
    }

    #[test]
    fn test_return_edges_fan_out_to_every_caller() {
        let src = "
                XOR R0 R0 R0
                CALL inc
                CALL inc
                STOP
            inc: ADDi R0 R0 1
                RET
        ";
        let g = cfg(src);
        assert_eq!(g.successors(1), &[4]);
        assert_eq!(g.successors(2), &[4]);
        assert_eq!(g.callers_of(5), &[1, 2]);
        assert_eq!(g.successors(5), &[2, 3]);
    }

    #[test]
    fn test_call_as_last_instruction_has_no_return_edge() {
        let g = cfg("f: RET\nCALL f");
        assert_eq!(g.callers_of(0), &[1]);
        assert!(g.successors(0).is_empty());
        assert_eq!(g.successors(1), &[0]);
    }

    #[test]
    fn test_blocks_close_on_labels_and_jumps() {
        let src = "
                XOR R0 R0 R0
                ADDi R1 R0 1
            L:  ADD R0 R0 R1
                JNEQ R0 R1 L
                OUT R0
                STOP
        ";
        let g = cfg(src);
        let blocks: Vec<_> = g.blocks().iter().map(BasicBlock::range).collect();
        assert_eq!(blocks, vec![0..2, 2..4, 4..6]);
        assert_eq!(g.block_of(3), 1);
        assert_eq!(g.block_successors(1), vec![2, 1]);
    }

    #[test]
    fn test_every_instruction_in_exactly_one_block() {
        let src = "
                XOR R0 R0 R0
                CALL f
                OUT R0
                STOP
            f:  ADDi R0 R0 1
                JSUP R0 R0 g
            g:  RET
        ";
        let g = cfg(src);
        let covered: usize = g.blocks().iter().map(BasicBlock::len).sum();
        assert_eq!(covered, g.len());
        for pair in g.blocks().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_duplicate_label_is_rejected() {
        let program = parse_program("a: STOP\na: STOP").unwrap();
        let err = ControlGraph::build(&program).unwrap_err();
        assert_eq!(
            err,
            AllocError::DuplicateLabel {
                label: "a".to_string(),
                first: 0,
                second: 1
            }
        );
    }

    #[test]
    fn test_call_without_return_is_rejected() {
        let program = parse_program("CALL f\nSTOP\nf: ADDi R0 R0 1\nSTOP").unwrap();
        let err = ControlGraph::build(&program).unwrap_err();
        assert_eq!(
            err,
            AllocError::UnresolvedCallTarget {
                label: "f".to_string(),
                call: 0
            }
        );
    }

    #[test]
    fn test_dangling_jump_is_rejected() {
        let program = parse_program("XOR R0 R0 R0\nJMP nowhere").unwrap();
        let err = ControlGraph::build(&program).unwrap_err();
        assert_eq!(
            err,
            AllocError::DanglingJumpTarget {
                label: "nowhere".to_string(),
                at: 1
            }
        );
    }

    #[test]
    fn test_empty_program() {
        let g = ControlGraph::build(&Program::new()).unwrap();
        assert!(g.is_empty());
        assert!(g.blocks().is_empty());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_block_successors_are_sorted_and_unique() {
        let g = cfg("
                XOR R0 R0 R0
            L:  ADDi R0 R0 1
                JNEQ R0 R1 L
                STOP
        ");
        let jump_block = g.block_of(2);
        let loop_block = g.block_of(1);
        let exit_block = g.block_of(3);
        assert!(loop_block < exit_block);
        // the back edge is recorded after the fall-through edge
        assert_eq!(g.successors(2), &[3, 1]);
        assert_eq!(g.block_successors(jump_block), vec![loop_block, exit_block]);
    }
}
