use crate::common::ast::{Line, Operand, Statement, Token};
use crate::common::span::{Span, Spanned};
use chumsky::{input::ValueInput, prelude::*};

// Statement parser: MNEMONIC op[,] op[,] op
pub fn statement_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Spanned<Statement<'src>>, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    let mnemonic = select! { Token::Ident(name) => name }
        .map_with(|name, e| (name, e.span()))
        .labelled("mnemonic");

    let operand = select! {
        Token::Reg(name) => Operand::Reg(name),
        Token::Num(text) => Operand::Imm(text),
        Token::Ident(label) => Operand::Label(label),
    }
    .map_with(|operand, e| (operand, e.span()))
    .labelled("operand");

    // Commas between operands are optional
    let operands = operand
        .separated_by(just(Token::Ctrl(',')).or_not())
        .collect::<Vec<_>>();

    mnemonic
        .then(operands)
        .map_with(|(mnemonic, operands), e| (Statement { mnemonic, operands }, e.span()))
        .labelled("instruction")
}

// Line parser: [label:] [statement]
pub fn line_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Line<'src>, extra::Err<Rich<'tokens, Token<'src>, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    let label = select! { Token::Ident(name) => name }
        .map_with(|name, e| (name, e.span()))
        .then_ignore(just(Token::Ctrl(':')))
        .labelled("label");

    label
        .or_not()
        .then(statement_parser().or_not())
        .map(|(label, statement)| Line { label, statement })
}

// Program parser: lines separated by newlines
pub fn program_parser<'tokens, 'src: 'tokens, I>()
-> impl Parser<'tokens, I, Vec<Line<'src>>, extra::Err<Rich<'tokens, Token<'src>, Span>>>
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = Span>,
{
    line_parser()
        .separated_by(just(Token::Newline))
        .collect::<Vec<_>>()
        .then_ignore(end())
        .boxed()
}
