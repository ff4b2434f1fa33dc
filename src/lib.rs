//! Register allocation for TCL assembly
//!
//! Reads programs written over unbounded virtual registers and rewrites them
//! onto the fixed register file of the target machine, saving live registers
//! around every `CALL`.

pub mod asm;
pub mod backend;
pub mod cli;
pub mod common;
pub mod frontend;
pub mod machine;
pub mod pipeline;
