//! Assembly text front end
//!
//! Reads register-machine assembly (`START: XOR R0,R0,R0`) into a
//! [`Program`](crate::asm::Program) and reports malformed input with
//! source-highlighted diagnostics.

pub mod lexer;
pub mod parser;
pub mod report;

#[cfg(test)]
mod tests;

pub use parser::{ParseError, ParsedProgram, parse_program, parse_spanned};
pub use report::{report_alloc_error, report_parse_errors};
