use tracing::debug;

use crate::{
    ast::{
        ast::Identifier,
        expressions::{Annotation, Expr, ExprKind, Literal, OptLiteral, PtrLiteral},
        statements::{Assign, Block, Cond, Control, Flow, Loop, Program, Stmt, VarDecl},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl, InternalError, Warning},
    Position, Span,
};

use super::scope::ScopeChain;

/// Checks a whole program, annotating every expression it reaches.
///
/// Returns the number of diagnostics reported.
pub fn check(program: &mut Program, limit: usize) -> Result<usize, InternalError> {
    SemanticChecker::new(limit).check_program(program)
}

#[derive(Debug)]
pub struct SemanticChecker {
    scopes: ScopeChain,
    errors: Vec<Error>,
    warnings: Vec<Warning>,
    limit: usize,
}

impl SemanticChecker {
    /// A checker that stops after `limit` diagnostics. A limit of zero is
    /// treated as one.
    pub fn new(limit: usize) -> Self {
        SemanticChecker {
            scopes: ScopeChain::new(),
            errors: vec![],
            warnings: vec![],
            limit: limit.max(1),
        }
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn scopes(&self) -> &ScopeChain {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeChain {
        &mut self.scopes
    }

    fn report(&mut self, error: ErrorImpl, position: Position) {
        debug!("diagnostic: {}", error);
        self.errors.push(Error::new(error, position));
    }

    fn limit_reached(&self) -> bool {
        self.errors.len() >= self.limit
    }

    pub fn check_program(&mut self, program: &mut Program) -> Result<usize, InternalError> {
        // Every function is visible in every body, including its own.
        for decl in &program.decls {
            if self.scopes.is_declared(&decl.id) {
                self.report(
                    ErrorImpl::FunctionAlreadyDeclared {
                        function: decl.id.name.clone(),
                    },
                    decl.id.span.start.clone(),
                );
            } else {
                self.scopes.add(&decl.id, decl.get_type());
            }
        }

        for decl in program.decls.iter_mut() {
            if self.limit_reached() {
                break;
            }
            debug!("checking function `{}`", decl.id);

            if decl.return_type.byte_size().is_none() {
                self.report(
                    ErrorImpl::UnsizedType {
                        type_: decl.return_type.to_string(),
                    },
                    decl.span.start.clone(),
                );
            }

            self.scopes.push();
            for arg in &decl.args {
                if arg.ty.byte_size().is_none() {
                    self.report(
                        ErrorImpl::UnsizedType {
                            type_: arg.ty.to_string(),
                        },
                        arg.id.span.start.clone(),
                    );
                }
                if let Some(warning) = self.scopes.add(&arg.id, arg.ty.clone()) {
                    self.warnings.push(warning);
                }
            }

            let result = self.check_block(&mut decl.body, &decl.return_type, false);
            self.scopes.pop();
            result?;
        }

        Ok(self.errors.len())
    }

    /// Checks the statements of a block in the current scope.
    pub fn check_block(
        &mut self,
        body: &mut Block,
        return_type: &Type,
        in_loop: bool,
    ) -> Result<(), InternalError> {
        for stmt in body.iter_mut() {
            if self.limit_reached() {
                break;
            }
            self.check_stmt(stmt, return_type, in_loop)?;
        }

        Ok(())
    }

    /// Checks `body` in a fresh scope.
    fn check_scoped_block(
        &mut self,
        body: &mut Block,
        return_type: &Type,
        in_loop: bool,
    ) -> Result<(), InternalError> {
        self.scopes.push();
        let result = self.check_block(body, return_type, in_loop);
        self.scopes.pop();
        result
    }

    fn check_stmt(
        &mut self,
        stmt: &mut Stmt,
        return_type: &Type,
        in_loop: bool,
    ) -> Result<(), InternalError> {
        match stmt {
            Stmt::VarDecl(decl) => self.check_var_decl(decl),
            Stmt::Assign(assign) => {
                self.check_assign(assign);
                Ok(())
            }
            Stmt::Flow(Flow::Cond(cond)) => self.check_cond(cond, return_type, in_loop),
            Stmt::Flow(Flow::Loop(lp)) => self.check_loop(lp, return_type),
            Stmt::Flow(Flow::Control(control)) => {
                self.check_control(control, return_type, in_loop);
                Ok(())
            }
            Stmt::Expr(expr) => {
                if let Some(ty) = self.infer(expr) {
                    if ty.byte_size().is_none() {
                        self.report(
                            ErrorImpl::UnsizedType {
                                type_: ty.to_string(),
                            },
                            expr.span.start.clone(),
                        );
                    }
                }
                Ok(())
            }
            Stmt::Print(expr) => {
                if let Some(ty) = self.infer(expr) {
                    if !ty.is_word() {
                        self.report(
                            ErrorImpl::PrintNonWord {
                                received: ty.to_string(),
                            },
                            expr.span.start.clone(),
                        );
                    }
                }
                Ok(())
            }
        }
    }

    fn check_var_decl(&mut self, decl: &mut VarDecl) -> Result<(), InternalError> {
        if decl.ty.is_none() && decl.value.is_none() {
            return Err(InternalError::UntypedDeclaration {
                position: decl.span.start.0,
            });
        }

        let value_type = decl.value.as_mut().map(|value| self.infer(value));
        let position = decl.span.start.clone();

        let bound = match (&decl.ty, value_type) {
            (Some(declared), Some(Some(value))) => {
                if !declared.is_equivalent(&value) {
                    self.report(
                        ErrorImpl::TypeMatchError {
                            expected: declared.to_string(),
                            received: value.to_string(),
                        },
                        position.clone(),
                    );
                }
                declared.clone()
            }
            (Some(declared), _) => declared.clone(),
            (None, Some(Some(value))) => value,
            (None, _) => {
                // Keep the names visible so later uses do not cascade.
                self.bind_unknown(decl.ids.as_deref());
                return Ok(());
            }
        };

        if bound.byte_size().is_none() {
            self.report(
                ErrorImpl::UnsizedType {
                    type_: bound.to_string(),
                },
                position.clone(),
            );
        }

        match self.scopes.bind_declaration(decl.ids.as_deref(), &bound) {
            Ok(warnings) => self.warnings.extend(warnings),
            Err(error) => {
                self.report(error, position);
                self.bind_unknown(decl.ids.as_deref());
            }
        }

        Ok(())
    }

    fn bind_unknown(&mut self, ids: Option<&[Identifier]>) {
        for id in ids.unwrap_or(&[]) {
            if let Some(warning) = self.scopes.add(id, Type::Unknown) {
                self.warnings.push(warning);
            }
        }
    }

    fn check_assign(&mut self, assign: &mut Assign) {
        let target = self.infer(&mut assign.target);
        let value = self.infer(&mut assign.value);

        if !assign.target.is_lvalue() {
            self.report(ErrorImpl::NotAnLvalue, assign.target.span.start.clone());
            return;
        }

        let (Some(target), Some(value)) = (target, value) else {
            return;
        };

        if !target.is_equivalent(&value) {
            self.report(
                ErrorImpl::TypeMatchError {
                    expected: target.to_string(),
                    received: value.to_string(),
                },
                assign.value.span.start.clone(),
            );
            return;
        }

        let merged = target.merge(&value);
        if merged.byte_size().is_none() {
            self.report(
                ErrorImpl::UnsizedType {
                    type_: merged.to_string(),
                },
                assign.span.start.clone(),
            );
        }
    }

    fn check_condition(&mut self, condition: &mut Expr) {
        if let Some(ty) = self.infer(condition) {
            // Strict: a condition of unknown type cannot be tested.
            if ty != Type::Bool {
                self.report(
                    ErrorImpl::ConditionNotBool {
                        received: ty.to_string(),
                    },
                    condition.span.start.clone(),
                );
            }
        }
    }

    fn check_cond(
        &mut self,
        cond: &mut Cond,
        return_type: &Type,
        in_loop: bool,
    ) -> Result<(), InternalError> {
        if cond.branches.is_empty() {
            return Err(InternalError::EmptyConditional {
                position: cond.span.start.0,
            });
        }

        for branch in cond.branches.iter_mut() {
            self.check_condition(&mut branch.condition);
            self.check_scoped_block(&mut branch.body, return_type, in_loop)?;
        }

        if let Some(otherwise) = &mut cond.otherwise {
            self.check_scoped_block(otherwise, return_type, in_loop)?;
        }

        Ok(())
    }

    fn check_loop(&mut self, lp: &mut Loop, return_type: &Type) -> Result<(), InternalError> {
        self.check_condition(&mut lp.condition);
        self.check_scoped_block(&mut lp.body, return_type, true)
    }

    fn check_control(&mut self, control: &mut Control, return_type: &Type, in_loop: bool) {
        match control {
            Control::Continue(span) => self.check_loop_control("continue", span, in_loop),
            Control::Break(span) => self.check_loop_control("break", span, in_loop),
            Control::Return(Some(value), _) => {
                if let Some(ty) = self.infer(value) {
                    if !ty.is_equivalent(return_type) {
                        self.report(
                            ErrorImpl::ReturnTypeMismatch {
                                expected: return_type.to_string(),
                                received: ty.to_string(),
                            },
                            value.span.start.clone(),
                        );
                    }
                }
            }
            Control::Return(None, span) => {
                if *return_type != Type::Unit {
                    self.report(
                        ErrorImpl::MissingReturnValue {
                            expected: return_type.to_string(),
                        },
                        span.start.clone(),
                    );
                }
            }
        }
    }

    fn check_loop_control(&mut self, keyword: &str, span: &Span, in_loop: bool) {
        if !in_loop {
            self.report(
                ErrorImpl::ControlOutsideLoop {
                    keyword: String::from(keyword),
                },
                span.start.clone(),
            );
        }
    }

    /// Infers and caches the type of `expr`.
    ///
    /// `None` means a diagnostic has already been reported for it. Inferring
    /// an expression a second time returns the cached result silently.
    pub fn infer(&mut self, expr: &mut Expr) -> Option<Type> {
        match &expr.annotation {
            Annotation::Typed(ty) => return Some(ty.clone()),
            Annotation::Failed => return None,
            Annotation::Unchecked => {}
        }

        let position = expr.span.start.clone();
        let result = match self.infer_kind(&mut expr.kind, &position) {
            Some(ty) if expr.negate && ty != Type::Int && ty != Type::Bool => {
                self.report(
                    ErrorImpl::InvalidNegation {
                        received: ty.to_string(),
                    },
                    position,
                );
                None
            }
            result => result,
        };

        expr.annotation = match &result {
            Some(ty) => Annotation::Typed(ty.clone()),
            None => Annotation::Failed,
        };
        result
    }

    fn infer_kind(&mut self, kind: &mut ExprKind, position: &Position) -> Option<Type> {
        match kind {
            ExprKind::Binary(operator, left, right) => {
                let left_type = self.infer(left);
                let right_type = self.infer(right);
                let (left_type, right_type) = (left_type?, right_type?);

                if !left_type.is_equivalent(&right_type) {
                    self.report(
                        ErrorImpl::TypeMatchError {
                            expected: left_type.to_string(),
                            received: right_type.to_string(),
                        },
                        right.span.start.clone(),
                    );
                    return None;
                }

                let operand = left_type.merge(&right_type);

                if operator.is_equality() {
                    if operand.byte_size().is_none() {
                        self.report(
                            ErrorImpl::UnsizedType {
                                type_: operand.to_string(),
                            },
                            position.clone(),
                        );
                        return None;
                    }
                    return Some(Type::Bool);
                }

                let (expected, result) = if operator.is_logical() {
                    (Type::Bool, Type::Bool)
                } else if operator.is_relational() {
                    (Type::Int, Type::Bool)
                } else {
                    (Type::Int, Type::Int)
                };

                if !operand.is_equivalent(&expected) {
                    self.report(
                        ErrorImpl::OperandTypeError {
                            operator: operator.to_string(),
                            expected: expected.to_string(),
                            received: operand.to_string(),
                        },
                        position.clone(),
                    );
                    return None;
                }

                Some(result)
            }
            ExprKind::ArrayIndex { array, index } => {
                let array_type = self.infer(array);
                let index_type = self.infer(index);
                let (array_type, index_type) = (array_type?, index_type?);

                let element = match array_type {
                    Type::Array(element, _) => element,
                    other => {
                        self.report(
                            ErrorImpl::NotAnArray {
                                received: other.to_string(),
                            },
                            array.span.start.clone(),
                        );
                        return None;
                    }
                };

                if !index_type.is_equivalent(&Type::Int) {
                    self.report(
                        ErrorImpl::TypeMatchError {
                            expected: Type::Int.to_string(),
                            received: index_type.to_string(),
                        },
                        index.span.start.clone(),
                    );
                    return None;
                }

                Some(*element)
            }
            ExprKind::TupleIndex { tuple, index } => {
                let tuple_type = self.infer(tuple);

                let Some(value) = index.fold_constant() else {
                    self.report(ErrorImpl::NonConstantTupleIndex, index.span.start.clone());
                    return None;
                };
                index.annotation = Annotation::Typed(Type::Int);

                let members = match tuple_type? {
                    Type::Tuple(members) => members,
                    other => {
                        self.report(
                            ErrorImpl::NotATuple {
                                received: other.to_string(),
                            },
                            tuple.span.start.clone(),
                        );
                        return None;
                    }
                };

                if value < 0 {
                    self.report(
                        ErrorImpl::NegativeTupleIndex { index: value },
                        index.span.start.clone(),
                    );
                    return None;
                }

                match members.get(value as usize) {
                    Some(member) => Some(member.clone()),
                    None => {
                        self.report(
                            ErrorImpl::TupleIndexOutOfRange {
                                index: value,
                                arity: members.len(),
                            },
                            index.span.start.clone(),
                        );
                        None
                    }
                }
            }
            ExprKind::Call { callee, args } => {
                let callee_type = self.infer(callee);
                let arg_types: Vec<Option<Type>> = args
                    .iter_mut()
                    .flatten()
                    .map(|arg| self.infer(arg))
                    .collect();

                let (params, ret) = match callee_type? {
                    Type::Function(params, ret) => (params, ret),
                    other => {
                        self.report(
                            ErrorImpl::NotAFunction {
                                received: other.to_string(),
                            },
                            callee.span.start.clone(),
                        );
                        return None;
                    }
                };

                if params.len() != arg_types.len() {
                    self.report(
                        ErrorImpl::ArgumentCountMismatch {
                            expected: params.len(),
                            received: arg_types.len(),
                        },
                        position.clone(),
                    );
                    return None;
                }

                let mut valid = true;
                for ((param, arg_type), arg) in params
                    .iter()
                    .zip(arg_types)
                    .zip(args.iter().flatten())
                {
                    match arg_type {
                        Some(arg_type) if !arg_type.is_equivalent(param) => {
                            self.report(
                                ErrorImpl::ArgumentTypeMatchError {
                                    expected: param.to_string(),
                                    received: arg_type.to_string(),
                                },
                                arg.span.start.clone(),
                            );
                            valid = false;
                        }
                        Some(_) => {}
                        None => valid = false,
                    }
                }

                valid.then(|| *ret)
            }
            ExprKind::Identifier(id) => match self.scopes.find_type(id) {
                Some(ty) => Some(ty.clone()),
                None => {
                    self.report(
                        ErrorImpl::VariableNotDeclared {
                            variable: id.name.clone(),
                        },
                        position.clone(),
                    );
                    None
                }
            },
            ExprKind::Literal(literal) => self.infer_literal(literal, position),
        }
    }

    fn infer_literal(&mut self, literal: &mut Literal, position: &Position) -> Option<Type> {
        match literal {
            Literal::Int(_) => Some(Type::Int),
            Literal::Char(_) => Some(Type::Char),
            Literal::Bool(_) => Some(Type::Bool),
            Literal::Str(value) => Some(Type::Array(Box::new(Type::Char), value.chars().count())),
            Literal::Ptr(PtrLiteral::Ref(inner)) => {
                let inner_type = self.infer(inner);

                if !inner.is_lvalue() {
                    self.report(ErrorImpl::AddressOfTemporary, position.clone());
                    return None;
                }

                let inner_type = inner_type?;
                if inner_type.byte_size().is_none() {
                    self.report(
                        ErrorImpl::UnsizedType {
                            type_: inner_type.to_string(),
                        },
                        inner.span.start.clone(),
                    );
                    return None;
                }

                Some(Type::Ptr(Box::new(inner_type)))
            }
            Literal::Ptr(PtrLiteral::Deref(inner)) => match self.infer(inner)? {
                Type::Ptr(pointee) => Some(*pointee),
                other => {
                    self.report(
                        ErrorImpl::DerefNonPointer {
                            received: other.to_string(),
                        },
                        position.clone(),
                    );
                    None
                }
            },
            Literal::Ptr(PtrLiteral::Null) => Some(Type::Ptr(Box::new(Type::Unknown))),
            Literal::Optional(OptLiteral::Wrap(inner)) => {
                Some(Type::Optional(Box::new(self.infer(inner)?)))
            }
            Literal::Optional(OptLiteral::Unwrap(inner)) => match self.infer(inner)? {
                Type::Optional(payload) => Some(*payload),
                other => {
                    self.report(
                        ErrorImpl::UnwrapNonOptional {
                            received: other.to_string(),
                        },
                        position.clone(),
                    );
                    None
                }
            },
            Literal::Optional(OptLiteral::Empty) => Some(Type::Optional(Box::new(Type::Unknown))),
            Literal::Tuple(members) => {
                let types: Vec<Option<Type>> =
                    members.iter_mut().map(|member| self.infer(member)).collect();
                types.into_iter().collect::<Option<Vec<Type>>>().map(Type::Tuple)
            }
            Literal::Array(elements) => {
                if elements.is_empty() {
                    self.report(ErrorImpl::EmptyArrayLiteral, position.clone());
                    return None;
                }

                let length = elements.len();
                let mut element_type = Type::Unknown;
                let mut valid = true;

                for element in elements.iter_mut() {
                    let Some(ty) = self.infer(element) else {
                        valid = false;
                        continue;
                    };

                    if element_type.is_equivalent(&ty) {
                        element_type = element_type.merge(&ty);
                    } else {
                        self.report(
                            ErrorImpl::TypeMatchError {
                                expected: element_type.to_string(),
                                received: ty.to_string(),
                            },
                            element.span.start.clone(),
                        );
                        valid = false;
                    }
                }

                valid.then(|| Type::Array(Box::new(element_type), length))
            }
        }
    }
}
