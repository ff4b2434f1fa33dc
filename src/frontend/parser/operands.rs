use super::ParseError;
use crate::asm::{AluOp, CondOp, Instr, IoKind, JumpKind, MemKind, PhysicalReg, Reg, VirtualReg};
use crate::common::ast::{Operand, Statement};
use crate::common::span::{Span, Spanned};

/// Operand layout of a mnemonic
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Alu(AluOp),
    AluImm(AluOp),
    Mem(MemKind),
    Io(IoKind),
    Cond(CondOp),
    Jump(JumpKind),
    Ret,
    Stop,
}

impl Shape {
    fn of(mnemonic: &str) -> Option<Shape> {
        if let Some(op) = AluOp::ALL.into_iter().find(|op| op.mnemonic() == mnemonic) {
            return Some(Shape::Alu(op));
        }
        if let Some(base) = mnemonic.strip_suffix('i')
            && let Some(op) = AluOp::ALL.into_iter().find(|op| op.mnemonic() == base)
        {
            return Some(Shape::AluImm(op));
        }
        if let Some(op) = CondOp::ALL.into_iter().find(|op| op.mnemonic() == mnemonic) {
            return Some(Shape::Cond(op));
        }
        if let Some(kind) = IoKind::ALL.into_iter().find(|k| k.mnemonic() == mnemonic) {
            return Some(Shape::Io(kind));
        }
        match mnemonic {
            "LD" => Some(Shape::Mem(MemKind::Load)),
            "ST" => Some(Shape::Mem(MemKind::Store)),
            "JMP" => Some(Shape::Jump(JumpKind::Jump)),
            "CALL" => Some(Shape::Jump(JumpKind::Call)),
            "RET" => Some(Shape::Ret),
            "STOP" => Some(Shape::Stop),
            _ => None,
        }
    }

    /// Human readable operand list, for error messages
    fn expected(self) -> &'static str {
        match self {
            Shape::Alu(_) => "three registers",
            Shape::AluImm(_) => "two registers and an immediate",
            Shape::Mem(_) => "a value register and an address register",
            Shape::Io(_) => "one register",
            Shape::Cond(_) => "two registers and a label",
            Shape::Jump(_) => "a label",
            Shape::Ret | Shape::Stop => "no operands",
        }
    }
}

/// Check a statement's operands against its mnemonic and build the instruction
pub fn build_instr(statement: &Statement<'_>) -> Result<Instr, ParseError> {
    let (mnemonic, mnemonic_span) = statement.mnemonic;
    let shape = Shape::of(mnemonic).ok_or_else(|| ParseError::UnknownMnemonic {
        mnemonic: mnemonic.to_string(),
        span: mnemonic_span,
    })?;

    let mismatch = || ParseError::Operands {
        mnemonic: mnemonic.to_string(),
        expected: shape.expected(),
        span: operands_span(statement),
    };

    let ops = statement.operands.as_slice();
    let instr = match (shape, ops) {
        (Shape::Alu(op), [dst, lhs, rhs]) => Instr::BinOp {
            op,
            dst: register(dst).ok_or_else(mismatch)??,
            lhs: register(lhs).ok_or_else(mismatch)??,
            rhs: register(rhs).ok_or_else(mismatch)??,
        },
        (Shape::AluImm(op), [dst, src, imm]) => Instr::BinOpImm {
            op,
            dst: register(dst).ok_or_else(mismatch)??,
            src: register(src).ok_or_else(mismatch)??,
            imm: immediate(imm).ok_or_else(mismatch)??,
        },
        (Shape::Mem(kind), [reg, addr]) => Instr::Mem {
            kind,
            reg: register(reg).ok_or_else(mismatch)??,
            addr: register(addr).ok_or_else(mismatch)??,
        },
        (Shape::Io(kind), [reg]) => Instr::Io {
            kind,
            reg: register(reg).ok_or_else(mismatch)??,
        },
        (Shape::Cond(op), [lhs, rhs, target]) => Instr::CondJump {
            op,
            lhs: register(lhs).ok_or_else(mismatch)??,
            rhs: register(rhs).ok_or_else(mismatch)??,
            target: label(target).ok_or_else(mismatch)?,
        },
        (Shape::Jump(kind), [target]) => Instr::JumpCall {
            kind,
            target: label(target).ok_or_else(mismatch)?,
        },
        (Shape::Ret, []) => Instr::Ret,
        (Shape::Stop, []) => Instr::Stop,
        _ => return Err(mismatch()),
    };

    Ok(instr)
}

/// Span covering every operand, or the mnemonic when there are none
fn operands_span(statement: &Statement<'_>) -> Span {
    match (statement.operands.first(), statement.operands.last()) {
        (Some((_, first)), Some((_, last))) => (first.start..last.end).into(),
        _ => statement.mnemonic.1,
    }
}

/// `None` when the operand is not a register at all
fn register(operand: &Spanned<Operand<'_>>) -> Option<Result<Reg, ParseError>> {
    let (Operand::Reg(name), span) = operand else {
        return None;
    };
    let reg = match *name {
        "RV" => Ok(Reg::Physical(PhysicalReg::RETURN)),
        "SP" => Ok(Reg::sp()),
        _ => name[1..]
            .parse::<u32>()
            .map(|id| Reg::Virtual(VirtualReg(id)))
            .map_err(|_| ParseError::BadRegister {
                name: name.to_string(),
                span: *span,
            }),
    };
    Some(reg)
}

fn immediate(operand: &Spanned<Operand<'_>>) -> Option<Result<i64, ParseError>> {
    let (Operand::Imm(text), span) = operand else {
        return None;
    };
    Some(text.parse::<i64>().map_err(|_| ParseError::BadImmediate {
        text: text.to_string(),
        span: *span,
    }))
}

fn label(operand: &Spanned<Operand<'_>>) -> Option<String> {
    match operand {
        (Operand::Label(name), _) => Some(name.to_string()),
        _ => None,
    }
}
