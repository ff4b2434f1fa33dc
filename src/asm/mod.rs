//! Register-machine assembly
//!
//! The instruction language shared by the code generator (virtual registers)
//! and the register allocator's output (physical registers).

pub mod instr;
pub mod program;
pub mod regs;

pub use instr::{AluOp, CondOp, Instr, Instruction, IoKind, JumpKind, MemKind};
pub use program::Program;
pub use regs::{PhysicalReg, RESERVED_OFFSET, Reg, VirtualReg, VirtualRegAllocator};
