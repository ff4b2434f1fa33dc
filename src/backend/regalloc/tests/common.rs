use crate::asm::{AluOp, CondOp, Instr, Instruction, IoKind, Program, Reg, VirtualReg};
use crate::backend::regalloc::{Allocation, ControlGraph, minimize_registers};
use crate::backend::target::TargetConfig;
use crate::frontend::parse_program;
use crate::machine::{Execution, Machine};
use proptest::prelude::*;

pub fn parse(src: &str) -> Program {
    parse_program(src).unwrap()
}

pub fn allocate(src: &str) -> (Program, Allocation) {
    let program = parse(src);
    let allocation = minimize_registers(&program).unwrap();
    (program, allocation)
}

pub fn run(program: &Program, inputs: &[i64]) -> Execution {
    Machine::new(program, TargetConfig::default())
        .run(inputs)
        .unwrap()
}

/// Rendered instructions, for readable assertions
pub fn lines(program: &Program) -> Vec<String> {
    program.iter().map(ToString::to_string).collect()
}

pub fn cfg(program: &Program) -> ControlGraph {
    ControlGraph::build(program).unwrap()
}

/// Registers every generated program initializes first
pub const REGISTERS: u32 = 6;

/// One step of a generated call-free program
#[derive(Clone, Debug)]
pub enum Step {
    Alu(AluOp, u32, u32, u32),
    Imm(AluOp, u32, u32, i64),
    Out(u32),
    /// Branch forward by 1..=3 steps
    Branch(CondOp, u32, u32, usize),
}

fn alu_op() -> impl Strategy<Value = AluOp> {
    // DIV and MOD are left out so runs never fault
    prop::sample::select(vec![
        AluOp::Add,
        AluOp::Sub,
        AluOp::Mul,
        AluOp::Xor,
        AluOp::And,
        AluOp::Or,
        AluOp::Sl,
        AluOp::Sr,
    ])
}

fn cond_op() -> impl Strategy<Value = CondOp> {
    prop::sample::select(CondOp::ALL.to_vec())
}

fn reg() -> impl Strategy<Value = u32> {
    0..REGISTERS
}

pub fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (alu_op(), reg(), reg(), reg()).prop_map(|(op, d, l, r)| Step::Alu(op, d, l, r)),
        (alu_op(), reg(), reg(), -20i64..20).prop_map(|(op, d, s, imm)| Step::Imm(op, d, s, imm)),
        reg().prop_map(Step::Out),
        (cond_op(), reg(), reg(), 1usize..=3).prop_map(|(op, l, r, skip)| Step::Branch(op, l, r, skip)),
    ]
}

fn v(n: u32) -> Reg {
    Reg::Virtual(VirtualReg(n))
}

/// Build a terminating program: registers set from `seeds`, then the steps
/// (each labelled `S<i>`, branches only jump forward), then `END: STOP`
pub fn build(seeds: &[i64], steps: &[Step]) -> Program {
    let mut program = Program::new();
    for (n, &seed) in (0..REGISTERS).zip(seeds.iter().cycle()) {
        program.push(Instr::BinOp {
            op: AluOp::Xor,
            dst: v(n),
            lhs: v(n),
            rhs: v(n),
        });
        program.push(Instr::BinOpImm {
            op: AluOp::Add,
            dst: v(n),
            src: v(n),
            imm: seed,
        });
    }

    let target = |i: usize| {
        if i >= steps.len() {
            "END".to_string()
        } else {
            format!("S{}", i)
        }
    };

    for (i, step) in steps.iter().enumerate() {
        let instr = match *step {
            Step::Alu(op, d, l, r) => Instr::BinOp {
                op,
                dst: v(d),
                lhs: v(l),
                rhs: v(r),
            },
            Step::Imm(op, d, s, imm) => Instr::BinOpImm {
                op,
                dst: v(d),
                src: v(s),
                imm,
            },
            Step::Out(r) => Instr::Io {
                kind: IoKind::Out,
                reg: v(r),
            },
            Step::Branch(op, l, r, skip) => Instr::CondJump {
                op,
                lhs: v(l),
                rhs: v(r),
                target: target(i + skip),
            },
        };
        program.push(Instruction::labelled(format!("S{}", i), instr));
    }

    program.push(Instruction::labelled("END", Instr::Stop));
    program
}
