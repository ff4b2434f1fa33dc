use crate::asm::{AluOp, CondOp, Instr, IoKind, JumpKind, MemKind, PhysicalReg, Reg, VirtualReg};
use crate::frontend::{ParseError, parse_program};

fn v(n: u32) -> Reg {
    Reg::Virtual(VirtualReg(n))
}

fn single(src: &str) -> Instr {
    let program = parse_program(src).unwrap();
    assert_eq!(program.len(), 1);
    program[0].instr.clone()
}

fn error(src: &str) -> ParseError {
    let mut errors = parse_program(src).unwrap_err();
    assert_eq!(errors.len(), 1);
    errors.remove(0)
}

#[test]
fn test_register_ops() {
    assert_eq!(
        single("ADD R2 R0 R1"),
        Instr::BinOp {
            op: AluOp::Add,
            dst: v(2),
            lhs: v(0),
            rhs: v(1)
        }
    );
    assert_eq!(
        single("SR R2, R0, R1"),
        Instr::BinOp {
            op: AluOp::Sr,
            dst: v(2),
            lhs: v(0),
            rhs: v(1)
        }
    );
}

#[test]
fn test_immediate_ops() {
    assert_eq!(
        single("SUBi SP SP 1"),
        Instr::BinOpImm {
            op: AluOp::Sub,
            dst: Reg::sp(),
            src: Reg::sp(),
            imm: 1
        }
    );
    assert_eq!(
        single("MODi R3,R4,-5"),
        Instr::BinOpImm {
            op: AluOp::Mod,
            dst: v(3),
            src: v(4),
            imm: -5
        }
    );
}

#[test]
fn test_memory_and_io() {
    assert_eq!(
        single("ST RV SP"),
        Instr::Mem {
            kind: MemKind::Store,
            reg: Reg::Physical(PhysicalReg::RETURN),
            addr: Reg::sp()
        }
    );
    assert_eq!(
        single("LD R1 R7"),
        Instr::Mem {
            kind: MemKind::Load,
            reg: v(1),
            addr: v(7)
        }
    );
    for kind in IoKind::ALL {
        assert_eq!(
            single(&format!("{} R9", kind.mnemonic())),
            Instr::Io { kind, reg: v(9) }
        );
    }
}

#[test]
fn test_jumps() {
    for op in CondOp::ALL {
        assert_eq!(
            single(&format!("{} R0 R1 END", op.mnemonic())),
            Instr::CondJump {
                op,
                lhs: v(0),
                rhs: v(1),
                target: "END".to_string()
            }
        );
    }
    assert_eq!(
        single("CALL f"),
        Instr::JumpCall {
            kind: JumpKind::Call,
            target: "f".to_string()
        }
    );
    assert_eq!(single("RET"), Instr::Ret);
    assert_eq!(single("STOP"), Instr::Stop);
}

#[test]
fn test_unknown_mnemonic() {
    assert!(matches!(
        error("ADDI R0 R0 1"),
        ParseError::UnknownMnemonic { mnemonic, .. } if mnemonic == "ADDI"
    ));
}

#[test]
fn test_operand_mismatch() {
    assert!(matches!(
        error("ADD R0 R1"),
        ParseError::Operands { expected: "three registers", .. }
    ));
    assert!(matches!(error("ADDi R0 R1 R2"), ParseError::Operands { .. }));
    assert!(matches!(error("JMP R1"), ParseError::Operands { .. }));
    assert!(matches!(error("STOP R1"), ParseError::Operands { .. }));
}

#[test]
fn test_out_of_range_operands() {
    assert!(matches!(
        error("OUT R99999999999"),
        ParseError::BadRegister { name, .. } if name == "R99999999999"
    ));
    assert!(matches!(
        error("ADDi R0 R0 99999999999999999999"),
        ParseError::BadImmediate { .. }
    ));
}

#[test]
fn test_error_span_points_at_operands() {
    let src = "STOP\nADD R0 R1";
    let err = parse_program(src).unwrap_err().remove(0);
    assert_eq!(&src[err.span().start..err.span().end], "R0 R1");
}
