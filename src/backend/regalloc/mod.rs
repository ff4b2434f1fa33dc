//! Register Allocation
//!
//! This module maps the unbounded virtual registers of a program onto the
//! physical registers of the target machine.
//!
//! # Pipeline
//!
//! ```text
//! Program (virtual regs) → CFG → Liveness → Interference → Coloring → Program (physical regs)
//! ```
//!
//! Registers live across a `CALL` are pushed before it and popped after it;
//! the callee never protects anything.

pub mod allocator;
pub mod cfg;
pub mod coloring;
pub mod dot;
pub mod error;
pub mod interference;
pub mod liveness;

#[cfg(test)]
mod tests;

pub use allocator::{
    Allocation, Analysis, CallSave, PROLOGUE_LEN, RegisterAllocator, minimize_registers,
};
pub use cfg::{BasicBlock, ControlGraph};
pub use coloring::Coloring;
pub use error::AllocError;
pub use interference::InterferenceGraph;
pub use liveness::{LiveSet, LiveVars, Liveness, LivenessAnalysis};
