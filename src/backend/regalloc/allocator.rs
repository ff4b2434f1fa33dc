//! Register Allocator
//!
//! Maps the virtual registers of a program onto the physical registers of the
//! target machine, using as few of them as the coloring allows.
//!
//! # Algorithm
//!
//! 1. Build the control graph and run liveness analysis
//! 2. Build the interference graph and color it (Welsh–Powell)
//! 3. Fail if the coloring needs more registers than the target has
//! 4. Emit the stack pointer prologue, then every instruction with its
//!    virtual operands renamed to `PhysicalReg(color + 2)`
//! 5. Around each `CALL`, push the registers live at the call before it and
//!    pop them in reverse order after it (caller-saved discipline)

use super::cfg::ControlGraph;
use super::coloring::Coloring;
use super::error::AllocError;
use super::interference::InterferenceGraph;
use super::liveness::{Liveness, LivenessAnalysis};
use crate::asm::{
    AluOp, Instr, Instruction, MemKind, PhysicalReg, Program, RESERVED_OFFSET, Reg, VirtualReg,
};
use crate::backend::target::TargetConfig;
use std::collections::BTreeSet;

/// Everything the allocator derives from a program before rewriting it
#[derive(Clone, Debug)]
pub struct Analysis {
    pub cfg: ControlGraph,
    pub liveness: Liveness,
    pub interference: InterferenceGraph,
    pub coloring: Coloring,
}

/// Registers saved around one call site
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSave {
    /// Index of the `CALL` in the input program
    pub call: usize,
    /// Saved registers in push order
    pub registers: Vec<PhysicalReg>,
}

/// Result of register allocation
#[derive(Clone, Debug)]
pub struct Allocation {
    /// The rewritten program, prologue included
    pub program: Program,
    /// Color of every register of the interference graph
    pub coloring: Coloring,
    /// Number of physical registers used for virtual ones
    pub color_count: usize,
    /// One entry per `CALL`, in program order
    pub saves: Vec<CallSave>,
}

impl Allocation {
    /// Physical register a virtual register was renamed to
    pub fn physical(&self, reg: VirtualReg) -> PhysicalReg {
        physical_for(&self.coloring, reg)
    }
}

/// Graph coloring register allocator
#[derive(Clone, Copy, Debug, Default)]
pub struct RegisterAllocator {
    target: TargetConfig,
}

impl RegisterAllocator {
    pub fn new(target: TargetConfig) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    /// Run every analysis the rewrite needs, without rewriting
    pub fn analyze(&self, program: &Program) -> Result<Analysis, AllocError> {
        let cfg = ControlGraph::build(program)?;
        let liveness = LivenessAnalysis::analyze(&cfg);
        let interference = InterferenceGraph::build(&cfg, &liveness);
        let coloring = Coloring::welsh_powell(&interference);

        Ok(Analysis {
            cfg,
            liveness,
            interference,
            coloring,
        })
    }

    /// Allocate physical registers for `program`
    pub fn minimize_registers(&self, program: &Program) -> Result<Allocation, AllocError> {
        let analysis = self.analyze(program)?;
        self.rewrite(program, &analysis)
    }

    /// Rewrite `program` using a previously computed analysis
    pub fn rewrite(
        &self,
        program: &Program,
        analysis: &Analysis,
    ) -> Result<Allocation, AllocError> {
        let coloring = &analysis.coloring;
        let needed = coloring.color_count();
        let available = self.target.allocatable();
        if needed > available {
            return Err(AllocError::InsufficientRegisters { needed, available });
        }

        let mut out = Program::new();
        out.extend(self.prologue());

        let mut saves = Vec::new();
        for (index, inst) in program.iter().enumerate() {
            let instr = inst.instr.map_registers(|reg| rename(coloring, reg));

            if !inst.instr.is_call() {
                out.push(Instruction {
                    label: inst.label.clone(),
                    instr,
                });
                continue;
            }

            let live = &analysis.liveness.instruction(index).entry;
            let registers = saved_registers(coloring, live.iter());
            log::debug!(
                "call at {} saves {:?}",
                index,
                registers.iter().map(ToString::to_string).collect::<Vec<_>>()
            );

            // Jumps into the call site must still run the saves
            let mut label = inst.label.clone();
            for &reg in &registers {
                out.push(Instruction {
                    label: label.take(),
                    instr: Instr::BinOpImm {
                        op: AluOp::Sub,
                        dst: Reg::sp(),
                        src: Reg::sp(),
                        imm: 1,
                    },
                });
                out.push(Instr::Mem {
                    kind: MemKind::Store,
                    reg: reg.into(),
                    addr: Reg::sp(),
                });
            }

            out.push(Instruction { label, instr });

            for &reg in registers.iter().rev() {
                out.push(Instr::Mem {
                    kind: MemKind::Load,
                    reg: reg.into(),
                    addr: Reg::sp(),
                });
                out.push(Instr::BinOpImm {
                    op: AluOp::Add,
                    dst: Reg::sp(),
                    src: Reg::sp(),
                    imm: 1,
                });
            }

            saves.push(CallSave {
                call: index,
                registers,
            });
        }

        log::debug!(
            "allocated {} colors for {} registers, {} instructions out",
            needed,
            coloring.len(),
            out.len()
        );

        Ok(Allocation {
            program: out,
            coloring: coloring.clone(),
            color_count: needed,
            saves,
        })
    }

    /// `SP := 0; SP := SP + stack_top`
    fn prologue(&self) -> [Instruction; PROLOGUE_LEN] {
        [
            Instr::BinOp {
                op: AluOp::Xor,
                dst: Reg::sp(),
                lhs: Reg::sp(),
                rhs: Reg::sp(),
            }
            .into(),
            Instr::BinOpImm {
                op: AluOp::Add,
                dst: Reg::sp(),
                src: Reg::sp(),
                imm: self.target.stack_top,
            }
            .into(),
        ]
    }
}

/// Allocate with the default target
pub fn minimize_registers(program: &Program) -> Result<Allocation, AllocError> {
    RegisterAllocator::default().minimize_registers(program)
}

/// Instructions the prologue adds in front of every allocated program
pub const PROLOGUE_LEN: usize = 2;

fn physical_for(coloring: &Coloring, reg: VirtualReg) -> PhysicalReg {
    match coloring.color_of(reg) {
        Some(color) => PhysicalReg::from_color(color),
        // Never defined: any allocatable register will do
        None => PhysicalReg(RESERVED_OFFSET as u8),
    }
}

fn rename(coloring: &Coloring, reg: Reg) -> Reg {
    match reg {
        Reg::Virtual(v) => Reg::Physical(physical_for(coloring, v)),
        Reg::Physical(_) => reg,
    }
}

/// Colored registers among `live`, one per physical register, ascending
fn saved_registers<'a>(
    coloring: &Coloring,
    live: impl Iterator<Item = &'a VirtualReg>,
) -> Vec<PhysicalReg> {
    live.filter_map(|&v| coloring.color_of(v))
        .map(PhysicalReg::from_color)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
