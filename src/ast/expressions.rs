use std::fmt::Display;

use crate::{lexer::tokens::TokenKind, Span};

use super::{ast::Identifier, types::Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    And,
    Or,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl Operator {
    pub fn from_token(kind: TokenKind) -> Option<Operator> {
        match kind {
            TokenKind::Plus => Some(Operator::Add),
            TokenKind::Dash => Some(Operator::Sub),
            TokenKind::Star => Some(Operator::Mul),
            TokenKind::Slash => Some(Operator::Div),
            TokenKind::Equals => Some(Operator::Equal),
            TokenKind::NotEquals => Some(Operator::NotEqual),
            TokenKind::And => Some(Operator::And),
            TokenKind::Or => Some(Operator::Or),
            TokenKind::Less => Some(Operator::Less),
            TokenKind::Greater => Some(Operator::Greater),
            TokenKind::LessEquals => Some(Operator::LessEqual),
            TokenKind::GreaterEquals => Some(Operator::GreaterEqual),
            _ => None,
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Operator::Add | Operator::Sub | Operator::Mul | Operator::Div)
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Operator::Equal | Operator::NotEqual)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Operator::Less | Operator::Greater | Operator::LessEqual | Operator::GreaterEqual
        )
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
        };
        write!(f, "{}", symbol)
    }
}

/// What the checker learned about an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Unchecked,
    Typed(Type),
    /// Inference failed and the diagnostic has already been reported.
    Failed,
}

#[derive(Debug, Clone)]
pub enum PtrLiteral {
    Ref(Box<Expr>),
    Deref(Box<Expr>),
    Null,
}

#[derive(Debug, Clone)]
pub enum OptLiteral {
    Wrap(Box<Expr>),
    Unwrap(Box<Expr>),
    Empty,
}

#[derive(Debug, Clone)]
pub enum Literal {
    Int(i64),
    Char(char),
    Str(String),
    Bool(bool),
    Ptr(PtrLiteral),
    Optional(OptLiteral),
    Tuple(Vec<Expr>),
    Array(Vec<Expr>),
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Binary(Operator, Box<Expr>, Box<Expr>),
    ArrayIndex {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    TupleIndex {
        tuple: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Option<Vec<Expr>>,
    },
    Identifier(Identifier),
    Literal(Literal),
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    /// Unary minus for integers, logical not for booleans. Each prefix `-`
    /// or `!` toggles it.
    pub negate: bool,
    pub span: Span,
    pub annotation: Annotation,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            negate: false,
            span,
            annotation: Annotation::Unchecked,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// The inferred type, once the checker has succeeded on this node.
    pub fn get_type(&self) -> Option<&Type> {
        match &self.annotation {
            Annotation::Typed(ty) => Some(ty),
            _ => None,
        }
    }

    /// Whether the expression designates a storage location.
    pub fn is_lvalue(&self) -> bool {
        if self.negate {
            return false;
        }

        match &self.kind {
            ExprKind::Identifier(_) => true,
            ExprKind::ArrayIndex { array, .. } => array.is_lvalue(),
            ExprKind::TupleIndex { tuple, .. } => tuple.is_lvalue(),
            ExprKind::Literal(Literal::Ptr(PtrLiteral::Deref(inner))) => inner.is_lvalue(),
            _ => false,
        }
    }

    /// Evaluates integer literals combined with `+ - * /` and negation.
    ///
    /// Anything else, overflow, or division by zero yields `None`.
    pub fn fold_constant(&self) -> Option<i64> {
        let value = match &self.kind {
            ExprKind::Literal(Literal::Int(value)) => *value,
            ExprKind::Binary(operator, left, right) => {
                let left = left.fold_constant()?;
                let right = right.fold_constant()?;
                match operator {
                    Operator::Add => left.checked_add(right)?,
                    Operator::Sub => left.checked_sub(right)?,
                    Operator::Mul => left.checked_mul(right)?,
                    Operator::Div => left.checked_div(right)?,
                    _ => return None,
                }
            }
            _ => return None,
        };

        if self.negate {
            value.checked_neg()
        } else {
            Some(value)
        }
    }
}
