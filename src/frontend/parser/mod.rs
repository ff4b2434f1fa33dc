//! Assembly text parser
//!
//! Chumsky turns the token stream into raw lines; [`assemble`] then checks
//! every statement against its mnemonic and attaches bare labels to the
//! instruction that follows them.

pub mod operands;
pub mod program;

pub use operands::build_instr;
pub use program::{line_parser, program_parser, statement_parser};

use crate::asm::{Instruction, Program};
use crate::common::ast::Line;
use crate::common::span::Span;
use crate::frontend::lexer::lexer;
use chumsky::prelude::*;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Unexpected character or token
    #[error("{message}")]
    Syntax { message: String, span: Span },

    #[error("unknown mnemonic `{mnemonic}`")]
    UnknownMnemonic { mnemonic: String, span: Span },

    /// Wrong number or kind of operands
    #[error("`{mnemonic}` expects {expected}")]
    Operands {
        mnemonic: String,
        expected: &'static str,
        span: Span,
    },

    #[error("register `{name}` is out of range")]
    BadRegister { name: String, span: Span },

    #[error("immediate `{text}` does not fit in 64 bits")]
    BadImmediate { text: String, span: Span },

    /// A bare label with no instruction after it
    #[error("label `{label}` is not followed by an instruction")]
    DanglingLabel { label: String, span: Span },

    /// A bare label followed by a labelled instruction or another bare label
    #[error("label `{label}` is followed by another label")]
    StackedLabels { label: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Syntax { span, .. }
            | ParseError::UnknownMnemonic { span, .. }
            | ParseError::Operands { span, .. }
            | ParseError::BadRegister { span, .. }
            | ParseError::BadImmediate { span, .. }
            | ParseError::DanglingLabel { span, .. }
            | ParseError::StackedLabels { span, .. } => *span,
        }
    }

    fn syntax<'a, T>(error: &Rich<'a, T, Span>) -> Self
    where
        Rich<'a, T, Span>: std::fmt::Display,
    {
        ParseError::Syntax {
            message: error.to_string(),
            span: *error.span(),
        }
    }
}

/// A program together with the source span of every instruction
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedProgram {
    pub program: Program,
    /// `spans[i]` covers instruction `i`, its label included
    pub spans: Vec<Span>,
}

impl ParsedProgram {
    pub fn span_of(&self, index: usize) -> Option<Span> {
        self.spans.get(index).copied()
    }
}

/// Parse assembly text into a program, keeping instruction spans
pub fn parse_spanned(src: &str) -> Result<ParsedProgram, Vec<ParseError>> {
    let (tokens, lex_errors) = lexer().parse(src).into_output_errors();
    if !lex_errors.is_empty() {
        return Err(lex_errors.iter().map(ParseError::syntax).collect());
    }
    let tokens = tokens.unwrap_or_default();
    log::trace!("lexed {} tokens", tokens.len());

    let (lines, parse_errors) = program_parser()
        .parse(
            tokens
                .as_slice()
                .map((src.len()..src.len()).into(), |(t, s)| (t, s)),
        )
        .into_output_errors();
    if !parse_errors.is_empty() {
        return Err(parse_errors.iter().map(ParseError::syntax).collect());
    }

    assemble(lines.unwrap_or_default())
}

/// Parse assembly text into a program
pub fn parse_program(src: &str) -> Result<Program, Vec<ParseError>> {
    parse_spanned(src).map(|parsed| parsed.program)
}

/// Check raw lines and build the program
///
/// Every line is checked, so one call reports all malformed instructions.
pub fn assemble(lines: Vec<Line<'_>>) -> Result<ParsedProgram, Vec<ParseError>> {
    let mut parsed = ParsedProgram::default();
    let mut errors = Vec::new();
    let mut pending: Option<(&str, Span)> = None;

    for line in lines {
        match (line.label, line.statement) {
            (None, None) => {}
            (Some(label), None) => {
                if let Some((previous, span)) = pending.replace(label) {
                    errors.push(ParseError::StackedLabels {
                        label: previous.to_string(),
                        span,
                    });
                }
            }
            (label, Some((statement, span))) => {
                let label = match (pending.take(), label) {
                    (Some((previous, previous_span)), Some(_)) => {
                        errors.push(ParseError::StackedLabels {
                            label: previous.to_string(),
                            span: previous_span,
                        });
                        continue;
                    }
                    (Some(bare), None) => Some(bare),
                    (None, own) => own,
                };

                let start = label.map_or(span.start, |(_, label_span)| label_span.start);
                match build_instr(&statement) {
                    Ok(instr) => {
                        parsed.program.push(Instruction {
                            label: label.map(|(name, _)| name.to_string()),
                            instr,
                        });
                        parsed.spans.push((start..span.end).into());
                    }
                    Err(error) => errors.push(error),
                }
            }
        }
    }

    if let Some((label, span)) = pending {
        errors.push(ParseError::DanglingLabel {
            label: label.to_string(),
            span,
        });
    }

    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(errors)
    }
}
