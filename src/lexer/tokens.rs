use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("int", TokenKind::Int);
        map.insert("char", TokenKind::Char);
        map.insert("bool", TokenKind::Bool);
        map.insert("void", TokenKind::Void);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("if", TokenKind::If);
        map.insert("elif", TokenKind::Elif);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("continue", TokenKind::Continue);
        map.insert("break", TokenKind::Break);
        map.insert("return", TokenKind::Return);
        map.insert("let", TokenKind::Let);
        map.insert("print", TokenKind::Print);
        map.insert("fn", TokenKind::Fn);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    CharLiteral,
    String,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    Ampersand, // &
    Question,  // ?
    Tilde,     // ~
    Semicolon,
    Comma,
    Arrow,

    Plus,
    Dash,
    Slash,
    Star,

    // Reserved
    Int,
    Char,
    Bool,
    Void,
    True,
    False,
    If,
    Elif,
    Else,
    While,
    Continue,
    Break,
    Return,
    Let,
    Print,
    Fn,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_payload() {
            write!(f, "{} ({})", self.kind, self.value)
        } else {
            write!(f, "{} ()", self.kind)
        }
    }
}

impl Token {
    fn has_payload(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::String | TokenKind::CharLiteral | TokenKind::Identifier | TokenKind::Number
        )
    }
}
