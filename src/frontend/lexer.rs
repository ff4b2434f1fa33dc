use crate::common::ast::Token;
use crate::common::span::{Span, Spanned};
use chumsky::prelude::*;

/// Whether an identifier names a register: `RV`, `SP` or `R` followed by digits
fn is_register(ident: &str) -> bool {
    match ident {
        "RV" | "SP" => true,
        _ => ident
            .strip_prefix('R')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
    }
}

// Lexer
pub fn lexer<'src>()
-> impl Parser<'src, &'src str, Vec<Spanned<Token<'src>>>, extra::Err<Rich<'src, char, Span>>> {
    // A parser for numbers, the sign belongs to the literal
    let num = just('-')
        .or_not()
        .then(text::int(10))
        .to_slice()
        .map(Token::Num);

    // A parser for control characters
    let ctrl = one_of(":,").map(Token::Ctrl);

    // Lines are significant: every instruction ends at a newline
    let newline = just('\n').to(Token::Newline);

    // A parser for mnemonics, labels and register names
    let ident = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated(),
        )
        .to_slice()
        .map(|ident: &str| {
            if is_register(ident) {
                Token::Reg(ident)
            } else {
                Token::Ident(ident)
            }
        });

    let token = num.or(ctrl).or(newline).or(ident);

    // `;` and `//` comments run to the end of the line, the newline stays
    let comment = just(';')
        .ignored()
        .or(just("//").ignored())
        .then(any().and_is(just('\n').not()).repeated())
        .ignored();

    let blank = one_of(" \t\r").ignored().or(comment).repeated();

    blank.clone().ignore_then(
        token
            .map_with(|tok, e| (tok, e.span()))
            .then_ignore(blank)
            // If we encounter an error, skip and attempt to lex the next character as a token instead
            .recover_with(skip_then_retry_until(any().ignored(), end()))
            .repeated()
            .collect(),
    )
}
