//! Unit tests for the scope chain and the semantic checker.

use std::rc::Rc;

use super::{
    scope::ScopeChain,
    type_checker::{check, SemanticChecker},
};
use crate::{
    ast::{
        ast::Identifier,
        expressions::{Annotation, Expr, ExprKind, Literal, Operator},
        statements::{Cond, Control, Flow, Program, Stmt, VarDecl},
        types::Type,
    },
    errors::errors::{ErrorImpl, InternalError, Warning},
    lexer::lexer::tokenize,
    parser::parser::parse,
    Span,
};

fn parse_program(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.foc".to_string())).unwrap();
    parse(tokens, Rc::new("test.foc".to_string())).unwrap()
}

fn run(source: &str, limit: usize) -> (SemanticChecker, Program) {
    let mut program = parse_program(source);
    let mut checker = SemanticChecker::new(limit);
    checker.check_program(&mut program).unwrap();
    (checker, program)
}

/// Every diagnostic reported for `source`, with a generous limit.
fn errors_of(source: &str) -> Vec<ErrorImpl> {
    let (checker, _) = run(source, 100);
    checker
        .errors()
        .iter()
        .map(|error| error.get_internal_error().clone())
        .collect()
}

/// Diagnostics for `body` placed inside `void main()`.
fn body_errors(body: &str) -> Vec<ErrorImpl> {
    errors_of(&format!("void main() {{ {} }}", body))
}

/// Checks `body` as the top level block of a scope that stays open so the
/// bindings can be inspected.
fn open_block(body: &str) -> SemanticChecker {
    let mut program = parse_program(&format!("void main() {{ {} }}", body));
    let mut checker = SemanticChecker::new(100);
    checker.scopes_mut().push();
    checker
        .check_block(&mut program.decls[0].body, &Type::Unit, false)
        .unwrap();
    checker
}

fn int(value: i64) -> Expr {
    Expr::new(ExprKind::Literal(Literal::Int(value)), Span::null())
}

fn boolean(value: bool) -> Expr {
    Expr::new(ExprKind::Literal(Literal::Bool(value)), Span::null())
}

fn binary(operator: Operator, left: Expr, right: Expr) -> Expr {
    Expr::new(
        ExprKind::Binary(operator, Box::new(left), Box::new(right)),
        Span::null(),
    )
}

fn id(name: &str) -> Identifier {
    Identifier::bare(name)
}

#[test]
fn test_scope_lookup_walks_outwards() {
    let mut scopes = ScopeChain::new();
    scopes.add(&id("x"), Type::Int);
    scopes.push();
    scopes.add(&id("y"), Type::Bool);

    assert_eq!(scopes.find_type(&id("x")), Some(&Type::Int));
    assert_eq!(scopes.find_type(&id("y")), Some(&Type::Bool));
    assert!(!scopes.is_declared(&id("z")));

    scopes.pop();
    assert!(!scopes.is_declared(&id("y")));
    assert!(scopes.is_declared(&id("x")));
}

#[test]
fn test_global_frame_survives_pop() {
    let mut scopes = ScopeChain::new();
    scopes.add(&id("f"), Type::Int);
    scopes.pop();

    assert_eq!(scopes.depth(), 1);
    assert!(scopes.is_declared(&id("f")));
}

#[test]
fn test_shadowing_warns_and_replaces() {
    let mut scopes = ScopeChain::new();
    assert!(scopes.add(&id("x"), Type::Int).is_none());

    scopes.push();
    let warning = scopes.add(&id("x"), Type::Char);
    assert!(matches!(warning, Some(Warning::Shadowing { ref variable, .. }) if variable == "x"));
    assert_eq!(scopes.find_type(&id("x")), Some(&Type::Char));

    // Redeclaring inside the same frame is also only a warning.
    assert!(scopes.add(&id("x"), Type::Bool).is_some());
    assert_eq!(scopes.find_type(&id("x")), Some(&Type::Bool));

    scopes.pop();
    assert_eq!(scopes.find_type(&id("x")), Some(&Type::Int));
}

#[test]
fn test_add_tied_destructures() {
    let mut scopes = ScopeChain::new();
    let tuple = Type::Tuple(vec![Type::Int, Type::Char]);
    scopes.add_tied(&[id("a"), id("b")], &tuple).unwrap();
    assert_eq!(scopes.find_type(&id("a")), Some(&Type::Int));
    assert_eq!(scopes.find_type(&id("b")), Some(&Type::Char));

    let array = Type::Array(Box::new(Type::Bool), 3);
    scopes.add_tied(&[id("c"), id("d"), id("e")], &array).unwrap();
    assert_eq!(scopes.find_type(&id("e")), Some(&Type::Bool));
}

#[test]
fn test_add_tied_rejects_mismatch_without_binding() {
    let mut scopes = ScopeChain::new();
    let array = Type::Array(Box::new(Type::Int), 3);

    let error = scopes.add_tied(&[id("a"), id("b")], &array).unwrap_err();
    assert_eq!(
        error,
        ErrorImpl::TieError {
            type_: String::from("[int; 3]"),
            ids: 2
        }
    );
    assert!(!scopes.is_declared(&id("a")));

    assert!(scopes.add_tied(&[id("a"), id("b")], &Type::Int).is_err());
}

#[test]
fn test_bind_declaration_shapes() {
    let mut scopes = ScopeChain::new();
    let empty_array = Type::Array(Box::new(Type::Int), 0);

    assert!(scopes.bind_declaration(None, &empty_array).is_ok());
    assert!(scopes.bind_declaration(Some(&[]), &Type::Tuple(vec![])).is_ok());
    assert!(scopes.bind_declaration(None, &Type::Int).is_err());

    let pair = Type::Tuple(vec![Type::Int, Type::Int]);
    scopes.bind_declaration(Some(&[id("whole")]), &pair).unwrap();
    assert_eq!(scopes.find_type(&id("whole")), Some(&pair));
}

#[test]
fn test_simple_program_is_clean() {
    let mut program = parse_program("int main() { int x = 2 + 3; return x; }");
    assert_eq!(check(&mut program, 10), Ok(0));
}

#[test]
fn test_check_block_binds_locals() {
    let checker = open_block("int x = 2 + 3; let y = x < 4;");
    assert!(checker.errors().is_empty());
    assert_eq!(checker.scopes().find_type(&id("x")), Some(&Type::Int));
    assert_eq!(checker.scopes().find_type(&id("y")), Some(&Type::Bool));
}

#[test]
fn test_return_type_mismatch() {
    let errors = errors_of("int main() { return true; }");
    assert!(!errors.is_empty());
    assert_eq!(
        errors[0],
        ErrorImpl::ReturnTypeMismatch {
            expected: String::from("int"),
            received: String::from("bool")
        }
    );
}

#[test]
fn test_missing_return_value() {
    assert_eq!(
        errors_of("int f() { return; } int main() { return f(); }"),
        vec![ErrorImpl::MissingReturnValue {
            expected: String::from("int")
        }]
    );
    assert!(errors_of("void f() { return; } int main() { f(); return 0; }").is_empty());
}

#[test]
fn test_tuple_indexing() {
    assert!(body_errors("<int, char> t = <1, 'a'>; int a = t<0>; char b = t<1>;").is_empty());

    assert_eq!(
        body_errors("<int, char> t = <1, 'a'>; int a = t<5>;"),
        vec![ErrorImpl::TupleIndexOutOfRange { index: 5, arity: 2 }]
    );
    assert_eq!(
        body_errors("<int> t = <1>; int a = t<0 - 1>;"),
        vec![ErrorImpl::NegativeTupleIndex { index: -1 }]
    );
    assert_eq!(
        body_errors("<int> t = <1>; int i = 0; int a = t<i>;"),
        vec![ErrorImpl::NonConstantTupleIndex]
    );
    assert_eq!(
        body_errors("int x = 1; x<0>;"),
        vec![ErrorImpl::NotATuple {
            received: String::from("int")
        }]
    );
}

#[test]
fn test_tuple_index_folds_arithmetic() {
    let checker = open_block("<int, bool, char> t = <1, true, 'c'>; let c = t<4 / 2>;");
    assert!(checker.errors().is_empty());
    assert_eq!(checker.scopes().find_type(&id("c")), Some(&Type::Char));
}

#[test]
fn test_tuple_index_is_annotated() {
    let (checker, program) = run(
        "void main() { <int, bool> t = <1, true>; bool b = t<0 + 1>; }",
        10,
    );
    assert!(checker.errors().is_empty());

    let Stmt::VarDecl(VarDecl {
        value: Some(value), ..
    }) = &program.decls[0].body[1]
    else {
        panic!("expected a declaration");
    };
    let ExprKind::TupleIndex { index, .. } = &value.kind else {
        panic!("expected a tuple index");
    };
    assert_eq!(index.annotation, Annotation::Typed(Type::Int));
    assert_eq!(value.annotation, Annotation::Typed(Type::Bool));
}

#[test]
fn test_control_outside_loop() {
    assert_eq!(
        errors_of("void main() { break; }"),
        vec![ErrorImpl::ControlOutsideLoop {
            keyword: String::from("break")
        }]
    );
    assert_eq!(
        body_errors("if true { continue; }"),
        vec![ErrorImpl::ControlOutsideLoop {
            keyword: String::from("continue")
        }]
    );
    assert!(body_errors("while true { if false { break; } continue; }").is_empty());
}

#[test]
fn test_self_recursion() {
    let source = "
        int fact(int n) {
            if n <= 1 { return 1; }
            return n * fact(n - 1);
        }
        int main() { return fact(5); }
    ";
    assert!(errors_of(source).is_empty());
}

#[test]
fn test_functions_are_visible_before_declaration() {
    assert!(errors_of("int main() { return later(); } int later() { return 1; }").is_empty());
}

#[test]
fn test_duplicate_function() {
    assert_eq!(
        errors_of("void f() {} void f() {} int main() { return 0; }"),
        vec![ErrorImpl::FunctionAlreadyDeclared {
            function: String::from("f")
        }]
    );
}

#[test]
fn test_reinference_uses_cached_annotation() {
    let mut checker = SemanticChecker::new(10);

    let mut bad = binary(Operator::Add, int(1), boolean(true));
    assert_eq!(checker.infer(&mut bad), None);
    assert_eq!(checker.errors().len(), 1);
    assert_eq!(bad.annotation, Annotation::Failed);

    assert_eq!(checker.infer(&mut bad), None);
    assert_eq!(checker.errors().len(), 1);

    let mut good = binary(Operator::Mul, int(2), int(3));
    assert_eq!(checker.infer(&mut good), Some(Type::Int));
    assert_eq!(good.annotation, Annotation::Typed(Type::Int));
    assert_eq!(checker.infer(&mut good), Some(Type::Int));
    assert_eq!(checker.errors().len(), 1);
}

#[test]
fn test_check_annotates_expressions() {
    let (_, program) = run("int main() { return 1 + 2; }", 10);
    match &program.decls[0].body[0] {
        Stmt::Flow(Flow::Control(Control::Return(Some(value), _))) => {
            assert_eq!(value.get_type(), Some(&Type::Int));
        }
        other => panic!("expected a return, got {:?}", other),
    }
}

#[test]
fn test_operator_typing() {
    assert!(body_errors("bool a = 1 < 2 && !false; bool b = 'a' == 'b'; int c = -(4 / 2);")
        .is_empty());

    assert_eq!(
        body_errors("bool b = true + false;"),
        vec![ErrorImpl::OperandTypeError {
            operator: String::from("+"),
            expected: String::from("int"),
            received: String::from("bool")
        }]
    );
    assert_eq!(
        body_errors("bool b = 1 || 2;"),
        vec![ErrorImpl::OperandTypeError {
            operator: String::from("||"),
            expected: String::from("bool"),
            received: String::from("int")
        }]
    );
    assert_eq!(
        body_errors("bool b = 1 == 'a';"),
        vec![ErrorImpl::TypeMatchError {
            expected: String::from("int"),
            received: String::from("char")
        }]
    );
    assert_eq!(
        body_errors("bool b = ? == ?;"),
        vec![ErrorImpl::UnsizedType {
            type_: String::from("?_")
        }]
    );
}

#[test]
fn test_invalid_negation() {
    assert_eq!(
        body_errors("char c = -'a';"),
        vec![ErrorImpl::InvalidNegation {
            received: String::from("char")
        }]
    );
}

#[test]
fn test_unknown_condition_is_rejected() {
    assert_eq!(
        body_errors("if *& { }"),
        vec![ErrorImpl::ConditionNotBool {
            received: String::from("_")
        }]
    );
}

#[test]
fn test_arrays_and_strings() {
    assert!(body_errors("[int; 3] xs = [1, 2, 3]; int x = xs[1 + 1]; [char; 2] s = \"hi\";")
        .is_empty());

    assert_eq!(
        body_errors("[char; 3] s = \"hi\";"),
        vec![ErrorImpl::TypeMatchError {
            expected: String::from("[char; 3]"),
            received: String::from("[char; 2]")
        }]
    );
    assert_eq!(
        body_errors("let xs = [1, 'a'];"),
        vec![ErrorImpl::TypeMatchError {
            expected: String::from("int"),
            received: String::from("char")
        }]
    );
    assert_eq!(body_errors("let xs = [];"), vec![ErrorImpl::EmptyArrayLiteral]);
    assert_eq!(
        body_errors("int x = 3; int y = x[0];"),
        vec![ErrorImpl::NotAnArray {
            received: String::from("int")
        }]
    );
    assert_eq!(
        body_errors("[int; 1] xs = [1]; int y = xs[true];"),
        vec![ErrorImpl::TypeMatchError {
            expected: String::from("int"),
            received: String::from("bool")
        }]
    );
}

#[test]
fn test_array_literal_merges_placeholders() {
    let checker = open_block("int x = 1; let ps = [&, &x, &];");
    assert!(checker.errors().is_empty());
    assert_eq!(
        checker.scopes().find_type(&id("ps")),
        Some(&Type::Array(Box::new(Type::Ptr(Box::new(Type::Int))), 3))
    );
}

#[test]
fn test_calls() {
    let prelude = "int add(int a, int b) { return a + b; } ";

    assert!(errors_of(&format!("{}int main() {{ return add(1, 2); }}", prelude)).is_empty());
    assert_eq!(
        errors_of(&format!("{}int main() {{ return add(1); }}", prelude)),
        vec![ErrorImpl::ArgumentCountMismatch {
            expected: 2,
            received: 1
        }]
    );
    assert_eq!(
        errors_of(&format!("{}int main() {{ return add(); }}", prelude)),
        vec![ErrorImpl::ArgumentCountMismatch {
            expected: 2,
            received: 0
        }]
    );
    assert_eq!(
        errors_of(&format!("{}int main() {{ return add(1, 'c'); }}", prelude)),
        vec![ErrorImpl::ArgumentTypeMatchError {
            expected: String::from("int"),
            received: String::from("char")
        }]
    );
    assert_eq!(
        body_errors("int x = 1; x();"),
        vec![ErrorImpl::NotAFunction {
            received: String::from("int")
        }]
    );
}

#[test]
fn test_function_parameters_need_a_size() {
    let source = "
        int twice(int x) { return x * 2; }
        int apply(fn(int) -> int f, int x) { return f(x); }
        int main() { return twice(4); }
    ";
    assert_eq!(
        errors_of(source),
        vec![ErrorImpl::UnsizedType {
            type_: String::from("fn(int) -> int")
        }]
    );
}

#[test]
fn test_undeclared_variable() {
    assert_eq!(
        body_errors("int x = y;"),
        vec![ErrorImpl::VariableNotDeclared {
            variable: String::from("y")
        }]
    );
}

#[test]
fn test_failed_initializer_does_not_cascade() {
    assert_eq!(
        body_errors("let x = y; int z = x + 1;"),
        vec![ErrorImpl::VariableNotDeclared {
            variable: String::from("y")
        }]
    );
}

#[test]
fn test_pointers() {
    assert!(body_errors("int x = 1; *int p = &x; *p = 2; int y = *p; *int q = &; q = p;")
        .is_empty());

    assert_eq!(body_errors("*int p = &1;"), vec![ErrorImpl::AddressOfTemporary]);
    assert_eq!(
        body_errors("int x = 1; int y = *x;"),
        vec![ErrorImpl::DerefNonPointer {
            received: String::from("int")
        }]
    );
    assert_eq!(
        body_errors("int x = 1; *char p = &x;"),
        vec![ErrorImpl::TypeMatchError {
            expected: String::from("*char"),
            received: String::from("*int")
        }]
    );
}

#[test]
fn test_optionals() {
    assert!(body_errors("?int o = ?3; int x = ~o; o = ?;").is_empty());

    assert_eq!(
        body_errors("int x = ~3;"),
        vec![ErrorImpl::UnwrapNonOptional {
            received: String::from("int")
        }]
    );
    assert_eq!(
        body_errors("let o = ?;"),
        vec![ErrorImpl::UnsizedType {
            type_: String::from("?_")
        }]
    );
}

#[test]
fn test_assignment_rules() {
    assert_eq!(body_errors("1 = 2;"), vec![ErrorImpl::NotAnLvalue]);
    assert_eq!(
        body_errors("int x = 1; x = true;"),
        vec![ErrorImpl::TypeMatchError {
            expected: String::from("int"),
            received: String::from("bool")
        }]
    );
    assert!(body_errors("<int, [int; 2]> t = <1, [2, 3]>; t<1>[0] = 5;").is_empty());
}

#[test]
fn test_conditions_must_be_bool() {
    assert_eq!(
        body_errors("if 1 { } elif true { } else { }"),
        vec![ErrorImpl::ConditionNotBool {
            received: String::from("int")
        }]
    );
    assert_eq!(
        body_errors("while 'c' { }"),
        vec![ErrorImpl::ConditionNotBool {
            received: String::from("char")
        }]
    );
}

#[test]
fn test_branch_scopes_are_dropped() {
    assert_eq!(
        body_errors("if true { int inner = 1; } int x = inner;"),
        vec![ErrorImpl::VariableNotDeclared {
            variable: String::from("inner")
        }]
    );
}

#[test]
fn test_print_requires_word() {
    assert!(body_errors("print 1; print 'c'; print true;").is_empty());
    assert_eq!(
        body_errors("print <1, 2>;"),
        vec![ErrorImpl::PrintNonWord {
            received: String::from("<int, int>")
        }]
    );
}

#[test]
fn test_single_identifier_binds_whole_value() {
    let checker = open_block("let <a> = <1, 'c'>; let [b] = [1, 2];");
    assert!(checker.errors().is_empty());
    assert_eq!(
        checker.scopes().find_type(&id("a")),
        Some(&Type::Tuple(vec![Type::Int, Type::Char]))
    );
    assert_eq!(
        checker.scopes().find_type(&id("b")),
        Some(&Type::Array(Box::new(Type::Int), 2))
    );
}

#[test]
fn test_tied_declarations() {
    let checker = open_block("let <a, b> = <1, 'c'>; [int; 2] [c, d] = [3, 4]; let <> = <>;");
    assert!(checker.errors().is_empty());
    assert_eq!(checker.scopes().find_type(&id("b")), Some(&Type::Char));
    assert_eq!(checker.scopes().find_type(&id("d")), Some(&Type::Int));

    assert_eq!(
        body_errors("let [a, b] = [1, 2, 3];"),
        vec![ErrorImpl::TieError {
            type_: String::from("[int; 3]"),
            ids: 2
        }]
    );
    assert_eq!(
        body_errors("let [] = [1];"),
        vec![ErrorImpl::TieError {
            type_: String::from("[int; 1]"),
            ids: 0
        }]
    );
}

#[test]
fn test_shadowing_is_a_warning() {
    let (checker, _) = run(
        "void main() { int x = 1; if true { int x = 2; } int x = 3; }",
        10,
    );
    assert!(checker.errors().is_empty());
    assert_eq!(checker.warnings().len(), 2);
}

#[test]
fn test_unsized_declarations() {
    assert_eq!(
        errors_of("int f() { return 1; } void main() { let g = f; }"),
        vec![ErrorImpl::UnsizedType {
            type_: String::from("fn() -> int")
        }]
    );
}

#[test]
fn test_oversized_declarations() {
    assert_eq!(
        body_errors("[int; 3000000000000000000] xs;"),
        vec![ErrorImpl::UnsizedType {
            type_: String::from("[int; 3000000000000000000]")
        }]
    );
}

#[test]
fn test_error_limit() {
    let source = "void main() { int a = true; int b = true; int c = true; }";

    let (checker, _) = run(source, 1);
    assert_eq!(checker.errors().len(), 1);

    let (checker, _) = run(source, 10);
    assert_eq!(checker.errors().len(), 3);

    let mut program = parse_program(source);
    assert_eq!(check(&mut program, 0), Ok(1));
}

#[test]
fn test_error_positions() {
    let (checker, _) = run("void main() {\n  int x = y;\n}", 10);
    assert_eq!(checker.errors()[0].get_position().0, 24);
}

#[test]
fn test_internal_errors() {
    let mut checker = SemanticChecker::new(10);

    let mut body = vec![Stmt::VarDecl(VarDecl {
        ty: None,
        ids: Some(vec![id("x")]),
        value: None,
        span: Span::null(),
    })];
    assert_eq!(
        checker.check_block(&mut body, &Type::Unit, false),
        Err(InternalError::UntypedDeclaration { position: 0 })
    );

    let mut body = vec![Stmt::Flow(Flow::Cond(Cond {
        branches: vec![],
        otherwise: None,
        span: Span::null(),
    }))];
    assert_eq!(
        checker.check_block(&mut body, &Type::Unit, false),
        Err(InternalError::EmptyConditional { position: 0 })
    );

    assert!(checker.errors().is_empty());
}
