//! Machine instructions
//!
//! One variant per opcode family. Every analysis over instructions is an
//! exhaustive `match`, so adding an opcode forces every pass to handle it.

use crate::asm::regs::Reg;
use std::fmt;

/// Register-register / register-immediate arithmetic and logic
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Xor,
    And,
    Or,
    Sl,
    Sr,
}

impl AluOp {
    pub const ALL: [AluOp; 10] = [
        AluOp::Add,
        AluOp::Sub,
        AluOp::Mul,
        AluOp::Div,
        AluOp::Mod,
        AluOp::Xor,
        AluOp::And,
        AluOp::Or,
        AluOp::Sl,
        AluOp::Sr,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Mul => "MUL",
            AluOp::Div => "DIV",
            AluOp::Mod => "MOD",
            AluOp::Xor => "XOR",
            AluOp::And => "AND",
            AluOp::Or => "OR",
            AluOp::Sl => "SL",
            AluOp::Sr => "SR",
        }
    }
}

/// Conditional branch predicates, `lhs op rhs`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CondOp {
    /// equal
    Jequ,
    /// not equal
    Jneq,
    /// greater than
    Jsup,
    /// less than
    Jinf,
    /// greater or equal
    Jseq,
    /// less or equal
    Jieq,
}

impl CondOp {
    pub const ALL: [CondOp; 6] = [
        CondOp::Jequ,
        CondOp::Jneq,
        CondOp::Jsup,
        CondOp::Jinf,
        CondOp::Jseq,
        CondOp::Jieq,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            CondOp::Jequ => "JEQU",
            CondOp::Jneq => "JNEQ",
            CondOp::Jsup => "JSUP",
            CondOp::Jinf => "JINF",
            CondOp::Jseq => "JSEQ",
            CondOp::Jieq => "JIEQ",
        }
    }

    /// Whether the branch is taken
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CondOp::Jequ => lhs == rhs,
            CondOp::Jneq => lhs != rhs,
            CondOp::Jsup => lhs > rhs,
            CondOp::Jinf => lhs < rhs,
            CondOp::Jseq => lhs >= rhs,
            CondOp::Jieq => lhs <= rhs,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemKind {
    Load,
    Store,
}

impl MemKind {
    pub fn mnemonic(self) -> &'static str {
        match self {
            MemKind::Load => "LD",
            MemKind::Store => "ST",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IoKind {
    In,
    Out,
    Print,
    Read,
}

impl IoKind {
    pub const ALL: [IoKind; 4] = [IoKind::In, IoKind::Out, IoKind::Print, IoKind::Read];

    pub fn mnemonic(self) -> &'static str {
        match self {
            IoKind::In => "IN",
            IoKind::Out => "OUT",
            IoKind::Print => "PRINT",
            IoKind::Read => "READ",
        }
    }

    /// `IN` and `READ` write their register, `OUT` and `PRINT` read it
    pub fn is_input(self) -> bool {
        matches!(self, IoKind::In | IoKind::Read)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JumpKind {
    Jump,
    Call,
}

impl JumpKind {
    pub fn mnemonic(self) -> &'static str {
        match self {
            JumpKind::Jump => "JMP",
            JumpKind::Call => "CALL",
        }
    }
}

/// An instruction without its label
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Instr {
    /// dst = lhs op rhs
    BinOp {
        op: AluOp,
        dst: Reg,
        lhs: Reg,
        rhs: Reg,
    },
    /// dst = src op imm
    BinOpImm {
        op: AluOp,
        dst: Reg,
        src: Reg,
        imm: i64,
    },
    /// LD reg, [addr] / ST reg, [addr]
    Mem { kind: MemKind, reg: Reg, addr: Reg },
    Io { kind: IoKind, reg: Reg },
    /// Branch to `target` when `lhs op rhs`, fall through otherwise
    CondJump {
        op: CondOp,
        lhs: Reg,
        rhs: Reg,
        target: String,
    },
    JumpCall { kind: JumpKind, target: String },
    Ret,
    /// Halts the machine
    Stop,
}

impl Instr {
    /// All register operands, in operand order
    pub fn registers(&self) -> Vec<Reg> {
        match self {
            Instr::BinOp { dst, lhs, rhs, .. } => vec![*dst, *lhs, *rhs],
            Instr::BinOpImm { dst, src, .. } => vec![*dst, *src],
            Instr::Mem { reg, addr, .. } => vec![*reg, *addr],
            Instr::Io { reg, .. } => vec![*reg],
            Instr::CondJump { lhs, rhs, .. } => vec![*lhs, *rhs],
            Instr::JumpCall { .. } | Instr::Ret | Instr::Stop => vec![],
        }
    }

    /// Rebuild the instruction with every register operand passed through `f`
    pub fn map_registers(&self, mut f: impl FnMut(Reg) -> Reg) -> Instr {
        match self {
            Instr::BinOp { op, dst, lhs, rhs } => Instr::BinOp {
                op: *op,
                dst: f(*dst),
                lhs: f(*lhs),
                rhs: f(*rhs),
            },
            Instr::BinOpImm { op, dst, src, imm } => Instr::BinOpImm {
                op: *op,
                dst: f(*dst),
                src: f(*src),
                imm: *imm,
            },
            Instr::Mem { kind, reg, addr } => Instr::Mem {
                kind: *kind,
                reg: f(*reg),
                addr: f(*addr),
            },
            Instr::Io { kind, reg } => Instr::Io {
                kind: *kind,
                reg: f(*reg),
            },
            Instr::CondJump {
                op,
                lhs,
                rhs,
                target,
            } => Instr::CondJump {
                op: *op,
                lhs: f(*lhs),
                rhs: f(*rhs),
                target: target.clone(),
            },
            Instr::JumpCall { .. } | Instr::Ret | Instr::Stop => self.clone(),
        }
    }

    /// Label this instruction transfers control to, if any
    pub fn target(&self) -> Option<&str> {
        match self {
            Instr::CondJump { target, .. } | Instr::JumpCall { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(
            self,
            Instr::JumpCall {
                kind: JumpKind::Call,
                ..
            }
        )
    }

    /// `JMP`, `CALL`, `RET` and `STOP` never continue with the next instruction
    pub fn falls_through(&self) -> bool {
        !matches!(self, Instr::JumpCall { .. } | Instr::Ret | Instr::Stop)
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instr::BinOp { op, dst, lhs, rhs } => {
                write!(f, "{} {} {} {}", op.mnemonic(), dst, lhs, rhs)
            }
            Instr::BinOpImm { op, dst, src, imm } => {
                write!(f, "{}i {} {} {}", op.mnemonic(), dst, src, imm)
            }
            Instr::Mem { kind, reg, addr } => write!(f, "{} {} {}", kind.mnemonic(), reg, addr),
            Instr::Io { kind, reg } => write!(f, "{} {}", kind.mnemonic(), reg),
            Instr::CondJump {
                op,
                lhs,
                rhs,
                target,
            } => write!(f, "{} {} {} {}", op.mnemonic(), lhs, rhs, target),
            Instr::JumpCall { kind, target } => write!(f, "{} {}", kind.mnemonic(), target),
            Instr::Ret => write!(f, "RET"),
            Instr::Stop => write!(f, "STOP"),
        }
    }
}

/// An instruction occupying one position of a program
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// Jump/call target name, unique within a program
    pub label: Option<String>,
    pub instr: Instr,
}

impl Instruction {
    pub fn new(instr: Instr) -> Self {
        Self { label: None, instr }
    }

    pub fn labelled(label: impl Into<String>, instr: Instr) -> Self {
        Self {
            label: Some(label.into()),
            instr,
        }
    }
}

impl From<Instr> for Instruction {
    fn from(instr: Instr) -> Self {
        Instruction::new(instr)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{}: ", label)?;
        }
        write!(f, "{}", self.instr)
    }
}
