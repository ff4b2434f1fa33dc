//! Register Allocation Pipeline
//!
//! End-to-end path from assembly text over virtual registers to assembly
//! text over physical registers.
//!
//! # Pipeline Stages
//!
//! ```text
//! Source Code (&str)
//!     │
//!     ▼ lexer + parser
//! Program (virtual registers, with spans)
//!     │
//!     ▼ control graph, liveness, interference, coloring
//! Allocation
//!     │
//!     ▼ Display
//! Output (String)
//! ```

use crate::backend::regalloc::{AllocError, Allocation, Analysis, RegisterAllocator};
use crate::backend::target::TargetConfig;
use crate::frontend::{ParseError, ParsedProgram, parse_spanned, report_alloc_error, report_parse_errors};
use thiserror::Error;

/// Compilation error types
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The text is not a well-formed program
    #[error("{} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),
    /// The program cannot be allocated
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Result of a successful compilation
#[derive(Clone, Debug)]
pub struct CompileOutput {
    /// The input program and its instruction spans
    pub parsed: ParsedProgram,
    /// Control graph, liveness, interference and coloring of the input
    pub analysis: Analysis,
    pub allocation: Allocation,
    /// The allocated program as text
    pub text: String,
}

/// Parse and allocate `source` for `target`
///
/// # Example
///
/// ```
/// use tcl_regalloc::backend::TargetConfig;
/// use tcl_regalloc::pipeline::compile;
///
/// let output = compile("XOR R0 R0 R0\nOUT R0\nSTOP", &TargetConfig::default()).unwrap();
/// assert!(output.text.contains("XOR R2 R2 R2"));
/// ```
pub fn compile(source: &str, target: &TargetConfig) -> Result<CompileOutput, CompileError> {
    // Stage 1: Parsing
    let parsed = parse_spanned(source).map_err(CompileError::Parse)?;
    log::debug!("parsed {} instructions", parsed.program.len());

    // Stage 2: Analysis
    let allocator = RegisterAllocator::new(*target);
    let analysis = allocator.analyze(&parsed.program)?;

    // Stage 3: Rewrite
    let allocation = allocator.rewrite(&parsed.program, &analysis)?;

    // Stage 4: Emit text
    let text = allocation.program.to_string();

    Ok(CompileOutput {
        parsed,
        analysis,
        allocation,
        text,
    })
}

/// Compile source code and report errors with source context
///
/// # Returns
///
/// * `Ok(CompileOutput)` - The allocated program
/// * `Err(())` - Compilation failed (errors printed to stderr)
#[allow(clippy::result_unit_err)]
pub fn compile_and_report(
    filename: &str,
    source: &str,
    target: &TargetConfig,
) -> Result<CompileOutput, ()> {
    let parsed = match parse_spanned(source) {
        Ok(parsed) => parsed,
        Err(errors) => {
            report_parse_errors(filename, source, &errors);
            return Err(());
        }
    };

    let allocator = RegisterAllocator::new(*target);
    let result = allocator
        .analyze(&parsed.program)
        .and_then(|analysis| {
            let allocation = allocator.rewrite(&parsed.program, &analysis)?;
            Ok((analysis, allocation))
        });

    match result {
        Ok((analysis, allocation)) => {
            let text = allocation.program.to_string();
            Ok(CompileOutput {
                parsed,
                analysis,
                allocation,
                text,
            })
        }
        Err(e) => {
            report_alloc_error(filename, source, &parsed, &e);
            Err(())
        }
    }
}
