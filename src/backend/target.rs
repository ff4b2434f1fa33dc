//! Target machine description
//!
//! The register allocator and the reference machine both read their limits
//! from a [`TargetConfig`].

use crate::asm::RESERVED_OFFSET;

/// Registers on the default machine, reserved ones included
pub const DEFAULT_REGISTER_COUNT: usize = 32;

/// Largest register file a `PhysicalReg` can number
pub const MAX_REGISTER_COUNT: usize = u8::MAX as usize + 1;

/// Memory size of the default machine, in words
pub const DEFAULT_MEMORY_WORDS: usize = 65536;

/// Limits of the machine programs are allocated for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetConfig {
    /// Physical registers, including the return register and stack pointer
    pub register_count: usize,
    /// Initial stack pointer; the first push writes to `stack_top - 1`
    pub stack_top: i64,
    /// Addressable memory, in words
    pub memory_words: usize,
}

impl TargetConfig {
    pub fn with_register_count(self, register_count: usize) -> Self {
        Self {
            register_count,
            ..self
        }
    }

    /// Registers the colorer may hand out
    ///
    /// Registers past [`MAX_REGISTER_COUNT`] cannot be named, so larger
    /// targets are capped.
    pub fn allocatable(&self) -> usize {
        self.register_count
            .min(MAX_REGISTER_COUNT)
            .saturating_sub(RESERVED_OFFSET)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            register_count: DEFAULT_REGISTER_COUNT,
            stack_top: DEFAULT_MEMORY_WORDS as i64,
            memory_words: DEFAULT_MEMORY_WORDS,
        }
    }
}
