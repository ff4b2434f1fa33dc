//! Register allocation errors
//!
//! All of these are compiler-internal: the input program is malformed or the
//! target is too small. None is retried; allocation of the program aborts.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AllocError {
    /// Two instructions carry the same label
    #[error("label `{label}` is defined twice (instructions {first} and {second})")]
    DuplicateLabel {
        label: String,
        first: usize,
        second: usize,
    },

    /// No `RET` follows the label a `CALL` targets
    #[error("no RET reachable from `{label}`, called by instruction {call}")]
    UnresolvedCallTarget { label: String, call: usize },

    /// A jump, branch or call names a label no instruction carries
    #[error("instruction {at} jumps to undefined label `{label}`")]
    DanglingJumpTarget { label: String, at: usize },

    /// The coloring needs more registers than the machine has
    #[error("program needs {needed} registers but only {available} are allocatable")]
    InsufficientRegisters { needed: usize, available: usize },
}

impl AllocError {
    /// Index of the instruction the error points at, if it points at one
    pub fn instruction(&self) -> Option<usize> {
        match self {
            AllocError::DuplicateLabel { second, .. } => Some(*second),
            AllocError::UnresolvedCallTarget { call, .. } => Some(*call),
            AllocError::DanglingJumpTarget { at, .. } => Some(*at),
            AllocError::InsufficientRegisters { .. } => None,
        }
    }
}
