//! Compiler Backend
//!
//! Turns a program over virtual registers into one the target machine can
//! run.
//!
//! # Modules
//!
//! - `target`: limits of the target machine
//! - `regalloc`: control graph, liveness, interference and coloring

pub mod regalloc;
pub mod target;

pub use regalloc::{AllocError, Allocation, RegisterAllocator, minimize_registers};
pub use target::TargetConfig;
