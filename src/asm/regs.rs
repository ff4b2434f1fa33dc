//! Register definitions
//!
//! This module defines the virtual registers produced by code generation and
//! the physical registers of the target machine.

use std::fmt;

/// A virtual register (before physical allocation)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualReg(pub u32);

impl fmt::Display for VirtualReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Allocator for virtual registers
///
/// The counter is an ordinary value: whoever generates code owns one and
/// threads it through, there is no process-wide register counter.
#[derive(Debug, Default, Clone)]
pub struct VirtualRegAllocator {
    next_id: u32,
}

impl VirtualRegAllocator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Start handing out ids above every register already used by `program`
    pub fn after(program: &super::Program) -> Self {
        let next_id = program
            .iter()
            .flat_map(|inst| inst.instr.registers())
            .filter_map(|reg| reg.as_virtual())
            .map(|v| v.0 + 1)
            .max()
            .unwrap_or(0);
        Self { next_id }
    }

    /// Allocate a fresh virtual register
    pub fn fresh(&mut self) -> VirtualReg {
        let id = self.next_id;
        self.next_id += 1;
        VirtualReg(id)
    }

    /// Get the number of registers allocated so far
    pub fn count(&self) -> u32 {
        self.next_id
    }
}

/// A machine register, identified by its number on the target
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysicalReg(pub u8);

impl PhysicalReg {
    /// Holds function results
    pub const RETURN: PhysicalReg = PhysicalReg(0);
    /// Stack pointer, the stack grows toward lower addresses
    pub const STACK_POINTER: PhysicalReg = PhysicalReg(1);

    /// Physical register carrying `color`
    ///
    /// Only colors below `TargetConfig::allocatable` fit in a register number.
    pub fn from_color(color: usize) -> Self {
        PhysicalReg((color + RESERVED_OFFSET) as u8)
    }

    pub fn is_reserved(self) -> bool {
        (self.0 as usize) < RESERVED_OFFSET
    }
}

impl fmt::Display for PhysicalReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Number of physical registers that are never a coloring target
/// (the return register and the stack pointer).
pub const RESERVED_OFFSET: usize = 2;

/// A register that can be either virtual or physical
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reg {
    Virtual(VirtualReg),
    Physical(PhysicalReg),
}

impl Reg {
    pub fn as_virtual(self) -> Option<VirtualReg> {
        match self {
            Reg::Virtual(v) => Some(v),
            Reg::Physical(_) => None,
        }
    }

    pub fn sp() -> Self {
        Reg::Physical(PhysicalReg::STACK_POINTER)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reg::Virtual(v) => write!(f, "{}", v),
            Reg::Physical(p) => write!(f, "{}", p),
        }
    }
}

impl From<VirtualReg> for Reg {
    fn from(v: VirtualReg) -> Self {
        Reg::Virtual(v)
    }
}

impl From<PhysicalReg> for Reg {
    fn from(p: PhysicalReg) -> Self {
        Reg::Physical(p)
    }
}
