use super::span::Spanned;
use std::fmt;

// Token definition
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'src> {
    /// Decimal integer, possibly negative, kept as text until it is range checked
    Num(&'src str),
    /// Mnemonic or label name
    Ident(&'src str),
    /// `R<n>`, `RV` or `SP`
    Reg(&'src str),
    Ctrl(char),
    Newline,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{n}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Reg(s) => write!(f, "{s}"),
            Token::Ctrl(c) => write!(f, "{c}"),
            Token::Newline => write!(f, "end of line"),
        }
    }
}

/// An operand as written, before it is checked against its mnemonic
#[derive(Clone, Debug, PartialEq)]
pub enum Operand<'src> {
    Reg(&'src str),
    Imm(&'src str),
    Label(&'src str),
}

impl Operand<'_> {
    /// Operand kind for error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Operand::Reg(_) => "register",
            Operand::Imm(_) => "immediate",
            Operand::Label(_) => "label",
        }
    }
}

/// `MNEMONIC op op op`
#[derive(Clone, Debug, PartialEq)]
pub struct Statement<'src> {
    pub mnemonic: Spanned<&'src str>,
    pub operands: Vec<Spanned<Operand<'src>>>,
}

/// One source line: an optional label and an optional statement
#[derive(Clone, Debug, PartialEq)]
pub struct Line<'src> {
    pub label: Option<Spanned<&'src str>>,
    pub statement: Option<Spanned<Statement<'src>>>,
}
