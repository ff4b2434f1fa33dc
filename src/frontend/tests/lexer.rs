use super::common::parse_tokens;
use crate::common::ast::Token;
use crate::frontend::lexer::lexer;
use chumsky::prelude::*;

#[test]
fn test_lexer_basic_instruction() {
    let tokens = parse_tokens("START: XOR R0,R0,R0");
    assert_eq!(tokens.len(), 8);
    assert_eq!(tokens[0].0, Token::Ident("START"));
    assert_eq!(tokens[1].0, Token::Ctrl(':'));
    assert_eq!(tokens[2].0, Token::Ident("XOR"));
    assert_eq!(tokens[3].0, Token::Reg("R0"));
    assert_eq!(tokens[4].0, Token::Ctrl(','));
    assert_eq!(tokens[7].0, Token::Reg("R0"));
}

#[test]
fn test_lexer_registers() {
    let tokens = parse_tokens("R12 RV SP R RET R1x");
    assert_eq!(tokens[0].0, Token::Reg("R12"));
    assert_eq!(tokens[1].0, Token::Reg("RV"));
    assert_eq!(tokens[2].0, Token::Reg("SP"));
    assert_eq!(tokens[3].0, Token::Ident("R"));
    assert_eq!(tokens[4].0, Token::Ident("RET"));
    assert_eq!(tokens[5].0, Token::Ident("R1x"));
}

#[test]
fn test_lexer_numbers() {
    let tokens = parse_tokens("ADDi R1 R0 -42");
    assert_eq!(tokens[3].0, Token::Num("-42"));
    let tokens = parse_tokens("65536");
    assert_eq!(tokens[0].0, Token::Num("65536"));
}

#[test]
fn test_lexer_newlines_are_tokens() {
    let tokens = parse_tokens("STOP\n\nRET\n");
    let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        kinds,
        vec![
            Token::Ident("STOP"),
            Token::Newline,
            Token::Newline,
            Token::Ident("RET"),
            Token::Newline
        ]
    );
}

#[test]
fn test_lexer_comments() {
    let tokens = parse_tokens("OUT R0 ; print it\n// whole line\nSTOP // done");
    let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        kinds,
        vec![
            Token::Ident("OUT"),
            Token::Reg("R0"),
            Token::Newline,
            Token::Newline,
            Token::Ident("STOP"),
        ]
    );
}

#[test]
fn test_lexer_spans() {
    let tokens = parse_tokens("  JMP L");
    assert_eq!(tokens[0].1.start, 2);
    assert_eq!(tokens[0].1.end, 5);
    assert_eq!(tokens[1].1.start, 6);
}

#[test]
fn test_lexer_blank_input() {
    assert!(parse_tokens("").is_empty());
    assert!(parse_tokens("   \t ; nothing").is_empty());
}

#[test]
fn test_lexer_rejects_stray_characters() {
    let (_, errors) = lexer().parse("XOR R0 R0 # R0").into_output_errors();
    assert!(!errors.is_empty());
}
