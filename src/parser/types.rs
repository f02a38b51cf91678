//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Primitive types (`int`, `char`, `bool`, `void`)
//! - Pointers `*T` and optionals `?T`
//! - Tuples `<T, U>` and arrays `[T; N]`
//! - Function types `fn(T, U) -> R`
//!
//! Similar to expression parsing, it dispatches on the first token through
//! a lookup table of NUD handlers. Every type constructor is prefix, so no
//! LED table is needed.

use std::collections::HashMap;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
///
/// # Arguments
///
/// * `parser` - Mutable reference to the parser to initialize
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Int, parse_primitive_type);
    parser.type_nud(TokenKind::Char, parse_primitive_type);
    parser.type_nud(TokenKind::Bool, parse_primitive_type);
    parser.type_nud(TokenKind::Void, parse_primitive_type);
    parser.type_nud(TokenKind::Star, parse_wrapped_type);
    parser.type_nud(TokenKind::Question, parse_wrapped_type);
    parser.type_nud(TokenKind::Less, parse_tuple_type);
    parser.type_nud(TokenKind::OpenBracket, parse_array_type);
    parser.type_nud(TokenKind::Fn, parse_function_type);
}

pub fn parse_primitive_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.advance().clone();
    match token.kind {
        TokenKind::Int => Ok(Type::Int),
        TokenKind::Char => Ok(Type::Char),
        TokenKind::Bool => Ok(Type::Bool),
        TokenKind::Void => Ok(Type::Unit),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken { token: token.value },
            token.span.start,
        )),
    }
}

/// `*T` and `?T`.
pub fn parse_wrapped_type(parser: &mut Parser) -> Result<Type, Error> {
    let kind = parser.advance().kind;
    let inner = Box::new(parse_type(parser)?);

    if kind == TokenKind::Star {
        Ok(Type::Ptr(inner))
    } else {
        Ok(Type::Optional(inner))
    }
}

/// Comma separated types up to `close`, which is consumed.
fn parse_type_list(parser: &mut Parser, close: TokenKind) -> Result<Vec<Type>, Error> {
    let mut types = vec![];

    while parser.current_token_kind() != close {
        types.push(parse_type(parser)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != close {
            return Err(parser.unexpected("expected `,` or the end of the type list"));
        }
    }

    parser.expect(close)?;
    Ok(types)
}

pub fn parse_tuple_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.advance();
    Ok(Type::Tuple(parse_type_list(parser, TokenKind::Greater)?))
}

pub fn parse_array_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.advance();
    let element = parse_type(parser)?;
    parser.expect(TokenKind::Semicolon)?;

    let length = parser.expect(TokenKind::Number)?;
    let length = length.value.parse::<usize>().map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: length.value.clone(),
            },
            length.span.start.clone(),
        )
    })?;

    parser.expect(TokenKind::CloseBracket)?;
    Ok(Type::Array(Box::new(element), length))
}

pub fn parse_function_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.advance();
    parser.expect(TokenKind::OpenParen)?;
    let args = parse_type_list(parser, TokenKind::CloseParen)?;

    parser.expect(TokenKind::Arrow)?;
    let ret = parse_type(parser)?;

    Ok(Type::Function(args, Box::new(ret)))
}

pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    let token_kind = parser.current_token_kind();
    match parser.get_type_nud_lookup().get(&token_kind).copied() {
        Some(handler) => handler(parser),
        None => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected a type"),
            },
            parser.get_position(),
        )),
    }
}
