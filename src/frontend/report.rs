// Pretty error reporting with source highlighting using ariadne

use super::parser::{ParseError, ParsedProgram};
use crate::backend::regalloc::AllocError;
use crate::common::span::Span;
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::ops::Range;

/// Report parse errors with source highlighting
pub fn report_parse_errors(filename: &str, source: &str, errors: &[ParseError]) {
    for error in errors {
        eprint_report(build_parse_report(error, true), source);
        eprintln!("  --> {}:{}", filename, get_line_col(source, error.span().start));
    }
}

/// Report an allocation error against the instruction it names
pub fn report_alloc_error(filename: &str, source: &str, parsed: &ParsedProgram, error: &AllocError) {
    let span = error.instruction().and_then(|i| parsed.span_of(i));
    eprint_report(build_alloc_report(error, span, true), source);
    if let Some(span) = span {
        eprintln!("  --> {}:{}", filename, get_line_col(source, span.start));
    } else {
        eprintln!("  --> {}", filename);
    }
}

/// Render a parse error without colors, as printed on a terminal
pub fn render_parse_error(source: &str, error: &ParseError) -> String {
    render(build_parse_report(error, false), source)
}

/// Render an allocation error without colors, as printed on a terminal
pub fn render_alloc_error(source: &str, parsed: &ParsedProgram, error: &AllocError) -> String {
    let span = error.instruction().and_then(|i| parsed.span_of(i));
    render(build_alloc_report(error, span, false), source)
}

fn eprint_report(report: Report<'static, Range<usize>>, source: &str) {
    if let Err(e) = report.eprint(Source::from(source)) {
        log::error!("failed to print error report: {}", e);
    }
}

fn render(report: Report<'static, Range<usize>>, source: &str) -> String {
    let mut out = Vec::new();
    if let Err(e) = report.write(Source::from(source), &mut out) {
        log::error!("failed to render error report: {}", e);
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn get_line_col(source: &str, offset: usize) -> String {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    format!("{}:{}", line, col)
}

fn range(span: Span) -> Range<usize> {
    span.start..span.end
}

/// Build an ariadne Report from a ParseError
fn build_parse_report(error: &ParseError, color: bool) -> Report<'static, Range<usize>> {
    let span = range(error.span());
    let (code, label, help): (&str, String, Option<String>) = match error {
        ParseError::Syntax { message, .. } => ("E101", message.clone(), None),
        ParseError::UnknownMnemonic { .. } => (
            "E102",
            "not an instruction".to_string(),
            Some("Mnemonics are case sensitive, immediates use a lowercase `i` suffix".into()),
        ),
        ParseError::Operands { expected, .. } => (
            "E103",
            format!("expected {}", expected),
            None,
        ),
        ParseError::BadRegister { .. } => (
            "E104",
            "register number does not fit in 32 bits".to_string(),
            None,
        ),
        ParseError::BadImmediate { .. } => (
            "E105",
            "immediate does not fit in 64 bits".to_string(),
            None,
        ),
        ParseError::DanglingLabel { .. } => (
            "E106",
            "nothing to label".to_string(),
            Some("A bare label attaches to the next instruction".into()),
        ),
        ParseError::StackedLabels { .. } => (
            "E107",
            "second label for the same instruction".to_string(),
            Some("An instruction carries at most one label".into()),
        ),
    };

    let mut report = Report::build(ReportKind::Error, span.clone())
        .with_config(Config::default().with_color(color))
        .with_code(code)
        .with_message(error.to_string())
        .with_label(
            Label::new(span)
                .with_message(label)
                .with_color(Color::Red),
        );
    if let Some(help) = help {
        report = report.with_help(help);
    }
    report.finish()
}

/// Build an ariadne Report from an AllocError
fn build_alloc_report(
    error: &AllocError,
    span: Option<Span>,
    color: bool,
) -> Report<'static, Range<usize>> {
    let at = span.map_or(0..0, range);
    let report = Report::build(ReportKind::Error, at.clone())
        .with_config(Config::default().with_color(color))
        .with_message(error.to_string());

    let report = match error {
        AllocError::DuplicateLabel { first, .. } => report
            .with_code("E201")
            .with_label(
                Label::new(at)
                    .with_message("label defined again here")
                    .with_color(Color::Red),
            )
            .with_note(format!("first defined on instruction {}", first)),
        AllocError::UnresolvedCallTarget { label, .. } => report
            .with_code("E202")
            .with_label(
                Label::new(at)
                    .with_message(format!("`{}` never returns", label))
                    .with_color(Color::Red),
            )
            .with_help("A called label must be followed by a RET"),
        AllocError::DanglingJumpTarget { label, .. } => report
            .with_code("E203")
            .with_label(
                Label::new(at)
                    .with_message(format!("no instruction is labelled `{}`", label))
                    .with_color(Color::Red),
            ),
        AllocError::InsufficientRegisters { needed, .. } => report
            .with_code("E204")
            .with_help(format!(
                "Run with --registers {} or more",
                needed + crate::asm::RESERVED_OFFSET
            )),
    };
    report.finish()
}
