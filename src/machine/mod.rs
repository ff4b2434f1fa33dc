//! Reference machine
//!
//! Executes programs instruction by instruction so allocated code can be
//! checked against its virtual-register original. Physical and virtual
//! registers live in separate files, so both kinds of program run.
//!
//! `CALL` keeps its return position on a hidden stack; like the real machine
//! it saves no register, which is what makes the caller-saved rewrite
//! observable.

pub mod error;

pub use error::MachineError;

use crate::asm::{AluOp, Instr, MemKind, PhysicalReg, Program, Reg, VirtualReg};
use crate::backend::target::TargetConfig;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Steps after which a run is considered non-terminating
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Observable result of a halted run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Execution {
    /// Values written by `OUT` and `PRINT`, in order
    pub output: Vec<i64>,
    pub steps: usize,
    /// Final value of every physical register ever written
    pub physical: BTreeMap<PhysicalReg, i64>,
    /// Final value of every virtual register ever written
    pub virtuals: BTreeMap<VirtualReg, i64>,
}

#[derive(Debug, Default)]
struct Registers {
    physical: BTreeMap<PhysicalReg, i64>,
    virtuals: BTreeMap<VirtualReg, i64>,
}

impl Registers {
    fn get(&self, reg: Reg) -> i64 {
        match reg {
            Reg::Physical(p) => self.physical.get(&p).copied().unwrap_or(0),
            Reg::Virtual(v) => self.virtuals.get(&v).copied().unwrap_or(0),
        }
    }

    fn set(&mut self, reg: Reg, value: i64) {
        match reg {
            Reg::Physical(p) => {
                self.physical.insert(p, value);
            }
            Reg::Virtual(v) => {
                self.virtuals.insert(v, value);
            }
        }
    }
}

/// Interpreter over a borrowed program
pub struct Machine<'p> {
    program: &'p Program,
    labels: HashMap<&'p str, usize>,
    target: TargetConfig,
    step_limit: usize,
}

impl<'p> Machine<'p> {
    pub fn new(program: &'p Program, target: TargetConfig) -> Self {
        let mut labels = HashMap::new();
        for (i, inst) in program.iter().enumerate() {
            if let Some(label) = &inst.label {
                labels.entry(label.as_str()).or_insert(i);
            }
        }
        Self {
            program,
            labels,
            target,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    pub fn with_step_limit(self, step_limit: usize) -> Self {
        Self { step_limit, ..self }
    }

    /// Run from the first instruction until `STOP` or the end of the program
    pub fn run(&self, inputs: &[i64]) -> Result<Execution, MachineError> {
        let mut regs = Registers::default();
        let mut memory = vec![0i64; self.target.memory_words];
        let mut inputs: VecDeque<i64> = inputs.iter().copied().collect();
        let mut returns: Vec<usize> = Vec::new();
        let mut output = Vec::new();

        let mut pc = 0;
        let mut steps = 0;
        while pc != self.program.len() {
            if steps == self.step_limit {
                return Err(MachineError::StepLimitExceeded {
                    limit: self.step_limit,
                });
            }
            steps += 1;

            let inst = self
                .program
                .get(pc)
                .ok_or(MachineError::PcOutOfRange { pc })?;
            log::trace!("[step {}] {:>4}: {}", steps, pc, inst);

            let mut next = pc + 1;
            match &inst.instr {
                Instr::BinOp { op, dst, lhs, rhs } => {
                    let value = alu(*op, regs.get(*lhs), regs.get(*rhs), pc)?;
                    regs.set(*dst, value);
                }
                Instr::BinOpImm { op, dst, src, imm } => {
                    let value = alu(*op, regs.get(*src), *imm, pc)?;
                    regs.set(*dst, value);
                }
                Instr::Mem { kind, reg, addr } => {
                    let address = regs.get(*addr);
                    let slot = usize::try_from(address)
                        .ok()
                        .filter(|&a| a < memory.len())
                        .ok_or(MachineError::MemoryOutOfBounds { address, at: pc })?;
                    match kind {
                        MemKind::Load => regs.set(*reg, memory[slot]),
                        MemKind::Store => memory[slot] = regs.get(*reg),
                    }
                }
                Instr::Io { kind, reg } => {
                    if kind.is_input() {
                        let value = inputs
                            .pop_front()
                            .ok_or(MachineError::InputExhausted { at: pc })?;
                        regs.set(*reg, value);
                    } else {
                        output.push(regs.get(*reg));
                    }
                }
                Instr::CondJump {
                    op,
                    lhs,
                    rhs,
                    target,
                } => {
                    if op.holds(regs.get(*lhs), regs.get(*rhs)) {
                        next = self.resolve(target, pc)?;
                    }
                }
                Instr::JumpCall { kind, target } => {
                    if inst.instr.is_call() {
                        returns.push(pc + 1);
                    }
                    log::trace!("{} {}", kind.mnemonic(), target);
                    next = self.resolve(target, pc)?;
                }
                Instr::Ret => {
                    next = returns
                        .pop()
                        .ok_or(MachineError::ReturnWithoutCall { at: pc })?;
                }
                Instr::Stop => break,
            }
            pc = next;
        }

        log::debug!(
            "machine halted after {} steps, {} values out",
            steps,
            output.len()
        );

        Ok(Execution {
            output,
            steps,
            physical: regs.physical,
            virtuals: regs.virtuals,
        })
    }

    fn resolve(&self, label: &str, at: usize) -> Result<usize, MachineError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| MachineError::UnknownLabel {
                label: label.to_string(),
                at,
            })
    }
}

/// Wrapping 64-bit arithmetic; shifts use the low 6 bits of the amount
fn alu(op: AluOp, lhs: i64, rhs: i64, at: usize) -> Result<i64, MachineError> {
    let value = match op {
        AluOp::Add => lhs.wrapping_add(rhs),
        AluOp::Sub => lhs.wrapping_sub(rhs),
        AluOp::Mul => lhs.wrapping_mul(rhs),
        AluOp::Div | AluOp::Mod if rhs == 0 => return Err(MachineError::DivisionByZero { at }),
        AluOp::Div => lhs.wrapping_div(rhs),
        AluOp::Mod => lhs.wrapping_rem(rhs),
        AluOp::Xor => lhs ^ rhs,
        AluOp::And => lhs & rhs,
        AluOp::Or => lhs | rhs,
        AluOp::Sl => lhs.wrapping_shl((rhs & 63) as u32),
        AluOp::Sr => lhs.wrapping_shr((rhs & 63) as u32),
    };
    Ok(value)
}
