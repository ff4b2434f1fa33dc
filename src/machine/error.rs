//! Reference machine faults

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("instruction {at} jumps to undefined label `{label}`")]
    UnknownLabel { label: String, at: usize },

    #[error("instruction {at} accesses address {address} outside memory")]
    MemoryOutOfBounds { address: i64, at: usize },

    #[error("instruction {at} divides by zero")]
    DivisionByZero { at: usize },

    #[error("instruction {at} returns with no call in progress")]
    ReturnWithoutCall { at: usize },

    #[error("instruction {at} reads input but none is left")]
    InputExhausted { at: usize },

    #[error("no halt after {limit} steps")]
    StepLimitExceeded { limit: usize },

    #[error("program counter {pc} is outside the program")]
    PcOutOfRange { pc: usize },
}
