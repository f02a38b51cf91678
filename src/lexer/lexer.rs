use std::rc::Rc;

use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_PATTERN, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

#[derive(Clone)]
pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

#[derive(Clone)]
pub struct Lexer {
    patterns: Vec<RegexPattern>,
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        // Longer operators must come before their prefixes.
        Lexer {
            pos: 0,
            tokens: vec![],
            patterns: vec![
                MK_PATTERN!(r"^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
                MK_PATTERN!(r"^[0-9]+", number_handler),
                MK_PATTERN!(r"^\s+", skip_handler),
                MK_PATTERN!(r"^//[^\n]*", skip_handler),
                MK_PATTERN!(r#"^"(\\.|[^"\\\n])*""#, string_handler),
                MK_PATTERN!(r"^'(\\x[0-9a-fA-F]{2}|\\.|[^'\\\n])'", char_handler),
                MK_PATTERN!(r"^\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
                MK_PATTERN!(r"^\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
                MK_PATTERN!(r"^\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
                MK_PATTERN!(r"^\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
                MK_PATTERN!(r"^\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
                MK_PATTERN!(r"^\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
                MK_PATTERN!(r"^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
                MK_PATTERN!(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
                MK_PATTERN!(r"^!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
                MK_PATTERN!(r"^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
                MK_PATTERN!(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
                MK_PATTERN!(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
                MK_PATTERN!(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
                MK_PATTERN!(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
                MK_PATTERN!(r"^\|\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
                MK_PATTERN!(r"^&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
                MK_PATTERN!(r"^&", MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&")),
                MK_PATTERN!(r"^\?", MK_DEFAULT_HANDLER!(TokenKind::Question, "?")),
                MK_PATTERN!(r"^~", MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~")),
                MK_PATTERN!(r"^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
                MK_PATTERN!(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
                MK_PATTERN!(r"^->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
                MK_PATTERN!(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
                MK_PATTERN!(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
                MK_PATTERN!(r"^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
                MK_PATTERN!(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
            ],
            source,
            file: file_name,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self) -> Position {
        Position(self.pos as u32, Rc::clone(&self.file))
    }

    /// Span covering the next `len` bytes.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position(),
            end: Position((self.pos + len) as u32, Rc::clone(&self.file)),
        }
    }
}

fn matched_text(lexer: &Lexer, regex: &Regex) -> Result<String, Error> {
    regex
        .find(lexer.remainder())
        .map(|found| found.as_str().to_string())
        .ok_or_else(|| {
            Error::new(
                ErrorImpl::UnrecognisedToken {
                    token: lexer.at().to_string(),
                },
                lexer.position(),
            )
        })
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = matched_text(lexer, regex)?;

    let span = lexer.span_of(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::Number, matched.clone(), span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = matched_text(lexer, regex)?;
    lexer.advance_n(matched.len());
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = matched_text(lexer, regex)?;
    let body = &matched[1..matched.len() - 1];

    let value = unescape(body).map_err(|sequence| {
        Error::new(ErrorImpl::InvalidEscape { sequence }, lexer.position())
    })?;

    let span = lexer.span_of(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::String, value, span));
    lexer.advance_n(matched.len());
    Ok(())
}

fn char_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = matched_text(lexer, regex)?;
    let body = &matched[1..matched.len() - 1];

    let value = unescape(body).map_err(|sequence| {
        Error::new(ErrorImpl::InvalidEscape { sequence }, lexer.position())
    })?;

    let span = lexer.span_of(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::CharLiteral, value, span));
    lexer.advance_n(matched.len());
    Ok(())
}

/// Resolves backslash escapes. On failure returns the offending sequence.
fn unescape(body: &str) -> Result<String, String> {
    let mut result = String::new();
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('\'') => result.push('\''),
            Some('"') => result.push('"'),
            Some('x') => {
                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(digit) if digit.is_ascii_hexdigit() => {
                            hex.push(*digit);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(byte as char),
                    Err(_) => return Err(format!("\\x{}", hex)),
                }
            }
            Some(other) => return Err(format!("\\{}", other)),
            None => return Err(String::from("\\")),
        }
    }

    Ok(result)
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = matched_text(lexer, regex)?;
    let span = lexer.span_of(value.len());
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.push(MK_TOKEN!(kind, value.clone(), span));
    lexer.advance_n(value.len());
    Ok(())
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = lex
            .patterns
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()))
            .map(|pattern| (pattern.handler, pattern.regex.clone()));

        match pattern {
            Some((handler, regex)) => handler(&mut lex, &regex)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position(),
                ))
            }
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}
