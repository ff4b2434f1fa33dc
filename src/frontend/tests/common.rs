use crate::common::ast::{Line, Token};
use crate::common::span::Spanned;
use crate::frontend::lexer::lexer;
use crate::frontend::parser::program_parser;
use chumsky::prelude::*;

pub fn parse_tokens(src: &str) -> Vec<Spanned<Token<'_>>> {
    lexer().parse(src).into_result().unwrap()
}

pub fn parse_lines(src: &str) -> Vec<Line<'_>> {
    let tokens = parse_tokens(src);
    program_parser()
        .parse(
            tokens
                .as_slice()
                .map((src.len()..src.len()).into(), |(t, s)| (t, s)),
        )
        .into_result()
        .unwrap()
}
