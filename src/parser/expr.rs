use crate::{
    ast::{
        ast::Identifier,
        expressions::{Expr, ExprKind, Literal, OptLiteral, Operator, PtrLiteral},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind).copied() {
        Some(nud) => nud,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud(parser)?;

    loop {
        // `t<0>` binds as tightly as a call; a `<` that does not close into
        // a tuple index falls through to the comparison below.
        if parser.current_token_kind() == TokenKind::Less && bp < BindingPower::Call {
            if let Some(index) = try_parse_tuple_index(parser) {
                let span = Span {
                    start: left.span.start.clone(),
                    end: parser.get_last_end(),
                };
                left = Expr::new(
                    ExprKind::TupleIndex {
                        tuple: Box::new(left),
                        index: Box::new(index),
                    },
                    span,
                );
                continue;
            }
        }

        // While LED and current BP is less than BP of current token, continue parsing lhs
        let token_bp = parser.current_binding_power();
        if token_bp <= bp {
            break;
        }

        let token_kind = parser.current_token_kind();
        let led = match parser.get_led_lookup().get(&token_kind).copied() {
            Some(led) => led,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: parser.current_token().value.clone(),
                    },
                    parser.get_position(),
                ))
            }
        };

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

/// Attempts `< expr >` at the current position, rewinding on failure.
fn try_parse_tuple_index(parser: &mut Parser) -> Option<Expr> {
    let saved = parser.save();
    parser.advance();

    let attempt = parse_expr(parser, BindingPower::Relational)
        .and_then(|index| parser.expect(TokenKind::Greater).map(|_| index));

    match attempt {
        Ok(index) => Some(index),
        Err(_) => {
            parser.restore(saved);
            None
        }
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();

    let literal = match token.kind {
        TokenKind::Number => match token.value.parse::<i64>() {
            Ok(value) => Literal::Int(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::CharLiteral => match token.value.chars().next() {
            Some(value) if token.value.chars().count() == 1 => Literal::Char(value),
            _ => return Err(parser.unexpected("expected a single character")),
        },
        TokenKind::String => Literal::Str(token.value.clone()),
        TokenKind::True => Literal::Bool(true),
        TokenKind::False => Literal::Bool(false),
        TokenKind::Identifier => {
            parser.advance();
            return Ok(Expr::new(
                ExprKind::Identifier(Identifier::new(token.value, token.span.clone())),
                token.span,
            ));
        }
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    parser.advance();
    Ok(Expr::new(ExprKind::Literal(literal), token.span))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match Operator::from_token(operator_token.kind) {
        Some(operator) => operator,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;

    let span = Span {
        start: left.span.start.clone(),
        end: right.span.end.clone(),
    };
    Ok(Expr::new(
        ExprKind::Binary(operator, Box::new(left), Box::new(right)),
        span,
    ))
}

/// `-e` and `!e` both toggle the negation flag of their operand.
pub fn parse_negation_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();
    let mut operand = parse_expr(parser, BindingPower::Unary)?;

    operand.span.start = start;
    Ok(operand.negated())
}

/// `&e`, `*e` and the bare null pointer `&`.
pub fn parse_pointer_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator = parser.advance().clone();

    let literal = match operator.kind {
        TokenKind::Ampersand if !starts_operand(parser) => PtrLiteral::Null,
        TokenKind::Ampersand => {
            PtrLiteral::Ref(Box::new(parse_expr(parser, BindingPower::Unary)?))
        }
        _ => PtrLiteral::Deref(Box::new(parse_expr(parser, BindingPower::Unary)?)),
    };

    let span = parser.span_from(operator.span.start);
    Ok(Expr::new(ExprKind::Literal(Literal::Ptr(literal)), span))
}

/// `?e`, `~e` and the bare empty optional `?`.
pub fn parse_optional_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator = parser.advance().clone();

    let literal = match operator.kind {
        TokenKind::Question if !starts_operand(parser) => OptLiteral::Empty,
        TokenKind::Question => {
            OptLiteral::Wrap(Box::new(parse_expr(parser, BindingPower::Unary)?))
        }
        _ => OptLiteral::Unwrap(Box::new(parse_expr(parser, BindingPower::Unary)?)),
    };

    let span = parser.span_from(operator.span.start);
    Ok(Expr::new(ExprKind::Literal(Literal::Optional(literal)), span))
}

fn starts_operand(parser: &Parser) -> bool {
    parser
        .get_nud_lookup()
        .contains_key(&parser.current_token_kind())
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Comma separated expressions up to `close`, which is consumed.
fn parse_expr_list(
    parser: &mut Parser,
    close: TokenKind,
    bp: BindingPower,
) -> Result<Vec<Expr>, Error> {
    let mut items = vec![];

    while parser.current_token_kind() != close {
        items.push(parse_expr(parser, bp)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != close {
            return Err(parser.unexpected("expected `,` or the end of the list"));
        }
    }

    parser.expect(close)?;
    Ok(items)
}

pub fn parse_tuple_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();
    // Members stop before `>` so it closes the literal.
    let members = parse_expr_list(parser, TokenKind::Greater, BindingPower::Relational)?;

    let span = parser.span_from(start);
    Ok(Expr::new(ExprKind::Literal(Literal::Tuple(members)), span))
}

pub fn parse_array_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();
    let elements = parse_expr_list(parser, TokenKind::CloseBracket, BindingPower::Default)?;

    let span = parser.span_from(start);
    Ok(Expr::new(ExprKind::Literal(Literal::Array(elements)), span))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let args = parse_expr_list(parser, TokenKind::CloseParen, BindingPower::Default)?;

    let span = parser.span_from(left.span.start.clone());
    Ok(Expr::new(
        ExprKind::Call {
            callee: Box::new(left),
            args: if args.is_empty() { None } else { Some(args) },
        },
        span,
    ))
}

pub fn parse_array_index_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    let span = parser.span_from(left.span.start.clone());
    Ok(Expr::new(
        ExprKind::ArrayIndex {
            array: Box::new(left),
            index: Box::new(index),
        },
        span,
    ))
}
