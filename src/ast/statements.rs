use crate::Span;

use super::{ast::Identifier, expressions::Expr, types::Type};

pub type Block = Vec<Stmt>;

/// `int x = 1;`, `let <a, b> = t;`, `[int; 3] xs;`
///
/// A single identifier binds the whole value; two or more destructure an
/// array or tuple.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: Option<Type>,
    pub ids: Option<Vec<Identifier>>,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Assign {
    pub target: Expr,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Block,
}

/// `if` followed by any number of `elif`s, then an optional `else`.
#[derive(Debug, Clone)]
pub struct Cond {
    pub branches: Vec<IfBranch>,
    pub otherwise: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Loop {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Control {
    Continue(Span),
    Break(Span),
    Return(Option<Expr>, Span),
}

#[derive(Debug, Clone)]
pub enum Flow {
    Cond(Cond),
    Loop(Loop),
    Control(Control),
}

#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl(VarDecl),
    Assign(Assign),
    Flow(Flow),
    Expr(Expr),
    Print(Expr),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::VarDecl(decl) => &decl.span,
            Stmt::Assign(assign) => &assign.span,
            Stmt::Flow(Flow::Cond(cond)) => &cond.span,
            Stmt::Flow(Flow::Loop(lp)) => &lp.span,
            Stmt::Flow(Flow::Control(Control::Continue(span)))
            | Stmt::Flow(Flow::Control(Control::Break(span)))
            | Stmt::Flow(Flow::Control(Control::Return(_, span))) => span,
            Stmt::Expr(expr) | Stmt::Print(expr) => &expr.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunArg {
    pub ty: Type,
    pub id: Identifier,
}

#[derive(Debug, Clone)]
pub struct FunDecl {
    pub return_type: Type,
    pub id: Identifier,
    pub args: Vec<FunArg>,
    pub body: Block,
    pub span: Span,
}

impl FunDecl {
    /// The `Function` type other code sees when referring to this function.
    pub fn get_type(&self) -> Type {
        Type::Function(
            self.args.iter().map(|arg| arg.ty.clone()).collect(),
            Box::new(self.return_type.clone()),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub decls: Vec<FunDecl>,
}
