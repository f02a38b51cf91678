//! Unit tests for the lexer module.

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.foc".to_string()))
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "int char bool void true false if elif else while continue break return let print fn";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Int,
            TokenKind::Char,
            TokenKind::Bool,
            TokenKind::Void,
            TokenKind::True,
            TokenKind::False,
            TokenKind::If,
            TokenKind::Elif,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Continue,
            TokenKind::Break,
            TokenKind::Return,
            TokenKind::Let,
            TokenKind::Print,
            TokenKind::Fn,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar baz_123 _underscore integer".to_string();
    let tokens = tokenize(source, Some("test.foc".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[2].value, "baz_123");
    assert_eq!(tokens[3].value, "_underscore");
    // Keywords only match whole words.
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].value, "integer");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 0 1000".to_string();
    let tokens = tokenize(source, Some("test.foc".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "0");
    assert_eq!(tokens[2].value, "1000");
}

#[test]
fn test_tokenize_strings_and_escapes() {
    let source = r#""hello" "a\nb" "say \"hi\"" """#.to_string();
    let tokens = tokenize(source, Some("test.foc".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "a\nb");
    assert_eq!(tokens[2].value, "say \"hi\"");
    assert_eq!(tokens[3].value, "");
}

#[test]
fn test_tokenize_char_literals() {
    let source = r"'a' '\n' '\x41' '\''".to_string();
    let tokens = tokenize(source, Some("test.foc".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::CharLiteral);
    assert_eq!(tokens[0].value, "a");
    assert_eq!(tokens[1].value, "\n");
    assert_eq!(tokens[2].value, "A");
    assert_eq!(tokens[3].value, "'");
}

#[test]
fn test_tokenize_invalid_escape() {
    let result = tokenize(r#""bad \q""#.to_string(), Some("test.foc".to_string()));
    let error = result.unwrap_err();

    assert_eq!(error.get_error_name(), "InvalidEscape");
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("+ - * / == != < <= > >= && || ! = -> & ? ~"),
        vec![
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Assignment,
            TokenKind::Arrow,
            TokenKind::Ampersand,
            TokenKind::Question,
            TokenKind::Tilde,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] ; ,"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_adjacent_operators() {
    // `&&` wins over two `&`, and `>` never merges with a following `>`.
    assert_eq!(
        kinds("&&x t<a<0>>"),
        vec![
            TokenKind::And,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Less,
            TokenKind::Identifier,
            TokenKind::Less,
            TokenKind::Number,
            TokenKind::Greater,
            TokenKind::Greater,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_comments() {
    let source = "int x = 5; // trailing comment\n// whole line\nx;";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Int,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Number,
            TokenKind::Semicolon,
            TokenKind::Identifier,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_function_declaration() {
    let source = "int add(int a, int b) { return a + b; }";
    let kinds = kinds(source);

    assert_eq!(kinds[0], TokenKind::Int);
    assert_eq!(kinds[1], TokenKind::Identifier);
    assert_eq!(kinds[2], TokenKind::OpenParen);
    assert_eq!(kinds.last(), Some(&TokenKind::EOF));
    assert_eq!(kinds.len(), 17);
}

#[test]
fn test_tokenize_spans() {
    let tokens = tokenize("int  x".to_string(), Some("test.foc".to_string())).unwrap();

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 3);
    assert_eq!(tokens[1].span.start.0, 5);
    assert_eq!(tokens[1].span.end.0, 6);
    assert_eq!(tokens[2].span.start.0, 6);
}

#[test]
fn test_tokenize_unrecognized_token() {
    let result = tokenize("int x = @;".to_string(), Some("test.foc".to_string()));
    let error = result.unwrap_err();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 8);
}

#[test]
fn test_tokenize_default_file_name() {
    let tokens = tokenize("x".to_string(), None).unwrap();
    assert_eq!(tokens[0].span.start.1.as_str(), "shell");
}

#[test]
fn test_tokenize_empty_source() {
    assert_eq!(kinds(""), vec![TokenKind::EOF]);
    assert_eq!(kinds("   \n\t "), vec![TokenKind::EOF]);
}
