//! Liveness Analysis
//!
//! This module computes which virtual registers are live before and after
//! every block and every instruction of a program.
//!
//! # Algorithm
//!
//! Backward dataflow over the basic blocks of the [`ControlGraph`], repeated
//! until no set changes:
//! - exit[B] = ∪ entry[S] for all successors S of B
//! - entry[B] = (exit[B] - KILL[B]) ∪ GEN[B]
//!
//! KILL[B] and GEN[B] are plain unions over the block's instructions. Taking
//! every use of the block as GEN over-approximates liveness, which only ever
//! adds interference edges. Per-instruction sets are then recovered by
//! replaying the same equation backwards inside each block.

use super::cfg::{BasicBlock, ControlGraph};
use crate::asm::{Instr, IoKind, MemKind, VirtualReg};
use im::OrdSet;

/// Set of live virtual registers
pub type LiveSet = OrdSet<VirtualReg>;

/// Registers live immediately before (`entry`) and after (`exit`) a program point
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveVars {
    pub entry: LiveSet,
    pub exit: LiveSet,
}

/// Converged liveness of a whole program
#[derive(Clone, Debug)]
pub struct Liveness {
    blocks: Vec<LiveVars>,
    instructions: Vec<LiveVars>,
    sweeps: usize,
}

impl Liveness {
    /// Per-block sets, indexed like [`ControlGraph::blocks`]
    pub fn blocks(&self) -> &[LiveVars] {
        &self.blocks
    }

    pub fn block(&self, block: usize) -> &LiveVars {
        &self.blocks[block]
    }

    /// Per-instruction sets, indexed by program position
    pub fn instructions(&self) -> &[LiveVars] {
        &self.instructions
    }

    pub fn instruction(&self, index: usize) -> &LiveVars {
        &self.instructions[index]
    }

    /// Backward sweeps the solver ran, the last one being the no-change sweep
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }
}

/// The register an instruction defines, if any
pub fn kills(instr: &Instr) -> Option<VirtualReg> {
    let reg = match instr {
        Instr::BinOp { dst, .. } => Some(*dst),
        Instr::BinOpImm { dst, .. } => Some(*dst),
        Instr::Mem {
            kind: MemKind::Load,
            reg,
            ..
        } => Some(*reg),
        Instr::Io { kind, reg } if kind.is_input() => Some(*reg),
        Instr::Mem {
            kind: MemKind::Store,
            ..
        }
        | Instr::Io { .. }
        | Instr::CondJump { .. }
        | Instr::JumpCall { .. }
        | Instr::Ret
        | Instr::Stop => None,
    };

    // Only virtual registers take part in allocation
    reg.and_then(|r| r.as_virtual())
}

/// The registers an instruction reads, without duplicates
pub fn gens(instr: &Instr) -> Vec<VirtualReg> {
    let regs = match instr {
        Instr::BinOp { lhs, rhs, .. } => vec![*lhs, *rhs],
        Instr::BinOpImm { src, .. } => vec![*src],
        Instr::Mem {
            kind: MemKind::Store,
            reg,
            addr,
        } => vec![*reg, *addr],
        Instr::Mem {
            kind: MemKind::Load,
            addr,
            ..
        } => vec![*addr],
        Instr::Io {
            kind: IoKind::Out | IoKind::Print,
            reg,
        } => vec![*reg],
        Instr::Io {
            kind: IoKind::In | IoKind::Read,
            ..
        } => vec![],
        Instr::CondJump { lhs, rhs, .. } => vec![*lhs, *rhs],
        Instr::JumpCall { .. } | Instr::Ret | Instr::Stop => vec![],
    };

    let mut uses: Vec<VirtualReg> = Vec::with_capacity(regs.len());
    for v in regs.into_iter().filter_map(|r| r.as_virtual()) {
        if !uses.contains(&v) {
            uses.push(v);
        }
    }
    uses
}

/// `entry = (exit - kill) ∪ gen` for one instruction
pub fn transfer(instr: &Instr, exit: &LiveSet) -> LiveSet {
    let mut entry = exit.clone();
    if let Some(def) = kills(instr) {
        entry.remove(&def);
    }
    entry.extend(gens(instr));
    entry
}

/// Liveness analysis engine
pub struct LivenessAnalysis;

impl LivenessAnalysis {
    /// Analyze liveness for a program, starting from empty sets
    pub fn analyze(cfg: &ControlGraph) -> Liveness {
        Self::resume(cfg, vec![LiveVars::default(); cfg.blocks().len()])
    }

    /// Run the solver from a previous per-block solution
    ///
    /// Sets only grow, so seeding with a converged solution runs a single
    /// sweep and hands the same sets back. The seed is cut or padded with
    /// empty sets to one entry per block.
    pub fn resume(cfg: &ControlGraph, mut seed: Vec<LiveVars>) -> Liveness {
        if seed.len() != cfg.blocks().len() {
            log::debug!(
                "liveness seed has {} entries for {} blocks, resizing",
                seed.len(),
                cfg.blocks().len()
            );
            seed.resize(cfg.blocks().len(), LiveVars::default());
        }

        let local: Vec<(LiveSet, LiveSet)> = cfg
            .blocks()
            .iter()
            .map(|block| Self::compute_kill_gen(cfg, block))
            .collect();
        let successors: Vec<Vec<usize>> = (0..cfg.blocks().len())
            .map(|b| cfg.block_successors(b))
            .collect();

        let mut blocks = seed;
        let mut sweeps = 0;
        let mut changed = true;
        while changed {
            changed = false;
            sweeps += 1;

            // Reverse program order converges faster for a backward problem
            for b in (0..blocks.len()).rev() {
                let mut new_exit = LiveSet::new();
                for &succ in &successors[b] {
                    new_exit.extend(blocks[succ].entry.iter().copied());
                }

                let (kill, gen_set) = &local[b];
                let mut new_entry = gen_set.clone();
                for reg in &new_exit {
                    if !kill.contains(reg) {
                        new_entry.insert(*reg);
                    }
                }

                let current = &mut blocks[b];
                if new_entry != current.entry || new_exit != current.exit {
                    changed = true;
                    current.entry = new_entry;
                    current.exit = new_exit;
                }
            }
        }

        log::debug!(
            "liveness converged after {} sweeps over {} blocks",
            sweeps,
            blocks.len()
        );

        let mut instructions = vec![LiveVars::default(); cfg.len()];
        for (block, vars) in cfg.blocks().iter().zip(&blocks) {
            let per_instr = Self::compute_instruction_liveness(cfg, block, &vars.exit);
            for (index, live) in block.range().zip(per_instr) {
                log::trace!(
                    "{:>4} {:<24} in={:?} out={:?}",
                    index,
                    cfg.program()[index].to_string(),
                    live.entry,
                    live.exit
                );
                instructions[index] = live;
            }
        }

        Liveness {
            blocks,
            instructions,
            sweeps,
        }
    }

    /// KILL and GEN of a block: unions over its instructions
    fn compute_kill_gen(cfg: &ControlGraph, block: &BasicBlock) -> (LiveSet, LiveSet) {
        let mut kill = LiveSet::new();
        let mut gen_set = LiveSet::new();
        for index in block.range() {
            let instr = &cfg.program()[index].instr;
            gen_set.extend(gens(instr));
            if let Some(def) = kills(instr) {
                kill.insert(def);
            }
        }
        (kill, gen_set)
    }

    /// Replay the transfer function backwards through a block
    pub fn compute_instruction_liveness(
        cfg: &ControlGraph,
        block: &BasicBlock,
        live_out: &LiveSet,
    ) -> Vec<LiveVars> {
        let mut live = vec![LiveVars::default(); block.len()];
        let mut exit = live_out.clone();
        for (slot, index) in block.range().enumerate().rev() {
            let entry = transfer(&cfg.program()[index].instr, &exit);
            live[slot] = LiveVars {
                entry: entry.clone(),
                exit,
            };
            exit = entry;
        }
        live
    }
}
