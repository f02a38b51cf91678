use crate::{
    ast::{
        ast::Identifier,
        statements::{
            Assign, Block, Cond, Control, Flow, FunArg, FunDecl, IfBranch, Loop, Stmt, VarDecl,
        },
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token_kind = parser.current_token_kind();
    if let Some(handler) = parser.get_stmt_lookup().get(&token_kind).copied() {
        return handler(parser);
    }

    // `*int p;` and `*p = 1;` share a first token, so try the declaration
    // first and rewind if it does not fit.
    if matches!(
        token_kind,
        TokenKind::Star | TokenKind::Question | TokenKind::Less | TokenKind::OpenBracket
    ) {
        let saved = parser.save();
        if let Ok(stmt) = parse_var_decl_stmt(parser) {
            return Ok(stmt);
        }
        parser.restore(saved);
    }

    let start = parser.get_position();
    let expr = parse_expr(parser, BindingPower::Default)?;

    if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        parser.expect(TokenKind::Semicolon)?;

        return Ok(Stmt::Assign(Assign {
            target: expr,
            value,
            span: parser.span_from(start),
        }));
    }

    parser.expect(TokenKind::Semicolon)?;
    Ok(Stmt::Expr(expr))
}

pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    parser.expect(TokenKind::OpenCurly)?;

    let mut body = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected("expected `}` before the end of the file"));
        }
        body.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;
    Ok(body)
}

fn parse_identifier(parser: &mut Parser) -> Result<Identifier, Error> {
    let error = parser.unexpected("expected identifier");
    let token = parser.expect_error(TokenKind::Identifier, Some(error))?;
    Ok(Identifier::new(token.value, token.span))
}

/// `x`, `[a, b]` or `<a, b>`.
fn parse_binding(parser: &mut Parser) -> Result<Vec<Identifier>, Error> {
    let close = match parser.current_token_kind() {
        TokenKind::OpenBracket => TokenKind::CloseBracket,
        TokenKind::Less => TokenKind::Greater,
        _ => return Ok(vec![parse_identifier(parser)?]),
    };
    parser.advance();

    let mut ids = vec![];
    while parser.current_token_kind() != close {
        ids.push(parse_identifier(parser)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != close {
            return Err(parser.unexpected("expected `,` or the end of the binding"));
        }
    }

    parser.expect(close)?;
    Ok(ids)
}

/// `type binding [= expr];`
pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();

    let ty = parse_type(parser)?;
    let ids = parse_binding(parser)?;

    let value = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::VarDecl(VarDecl {
        ty: Some(ty),
        ids: Some(ids),
        value,
        span: parser.span_from(start),
    }))
}

/// `let binding = expr;`
pub fn parse_let_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let ids = parse_binding(parser)?;

    let error = parser.unexpected("expected `=` after a `let` binding");
    parser.expect_error(TokenKind::Assignment, Some(error))?;
    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::VarDecl(VarDecl {
        ty: None,
        ids: Some(ids),
        value: Some(value),
        span: parser.span_from(start),
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let mut branches = vec![];
    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;
    branches.push(IfBranch { condition, body });

    while parser.current_token_kind() == TokenKind::Elif {
        parser.advance();
        let condition = parse_expr(parser, BindingPower::Default)?;
        let body = parse_block(parser)?;
        branches.push(IfBranch { condition, body });
    }

    let otherwise = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(parse_block(parser)?)
    } else {
        None
    };

    Ok(Stmt::Flow(Flow::Cond(Cond {
        branches,
        otherwise,
        span: parser.span_from(start),
    })))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Stmt::Flow(Flow::Loop(Loop {
        condition,
        body,
        span: parser.span_from(start),
    })))
}

pub fn parse_control_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let keyword = parser.advance().clone();
    parser.expect(TokenKind::Semicolon)?;

    let span = parser.span_from(keyword.span.start);
    let control = if keyword.kind == TokenKind::Break {
        Control::Break(span)
    } else {
        Control::Continue(span)
    };

    Ok(Stmt::Flow(Flow::Control(control)))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = if parser.current_token_kind() == TokenKind::Semicolon {
        None
    } else {
        Some(parse_expr(parser, BindingPower::Default)?)
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Flow(Flow::Control(Control::Return(
        value,
        parser.span_from(start),
    ))))
}

pub fn parse_print_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    parser.advance();

    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Stmt::Print(value))
}

/// `type name(type arg, ...) { ... }`
pub fn parse_fun_decl(parser: &mut Parser) -> Result<FunDecl, Error> {
    let start = parser.get_position();

    let return_type = parse_type(parser)?;
    let id = parse_identifier(parser)?;

    parser.expect(TokenKind::OpenParen)?;

    let mut args = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        let ty = parse_type(parser)?;
        let id = parse_identifier(parser)?;
        args.push(FunArg { ty, id });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected("expected `,` or `)` in the parameter list"));
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let body = parse_block(parser)?;

    Ok(FunDecl {
        return_type,
        id,
        args,
        body,
        span: parser.span_from(start),
    })
}
