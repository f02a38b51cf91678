use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// A diagnosable error: reported with its source position, counted against
/// the error limit, and never fatal on its own.
#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::InvalidEscape { .. } => "InvalidEscape",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::OperandTypeError { .. } => "OperandTypeError",
            ErrorImpl::NotAnArray { .. } => "NotAnArray",
            ErrorImpl::NotATuple { .. } => "NotATuple",
            ErrorImpl::NonConstantTupleIndex => "NonConstantTupleIndex",
            ErrorImpl::NegativeTupleIndex { .. } => "NegativeTupleIndex",
            ErrorImpl::TupleIndexOutOfRange { .. } => "TupleIndexOutOfRange",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::NotAnLvalue => "NotAnLvalue",
            ErrorImpl::AddressOfTemporary => "AddressOfTemporary",
            ErrorImpl::ControlOutsideLoop { .. } => "ControlOutsideLoop",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::ConditionNotBool { .. } => "ConditionNotBool",
            ErrorImpl::TieError { .. } => "TieError",
            ErrorImpl::EmptyArrayLiteral => "EmptyArrayLiteral",
            ErrorImpl::InvalidNegation { .. } => "InvalidNegation",
            ErrorImpl::DerefNonPointer { .. } => "DerefNonPointer",
            ErrorImpl::UnwrapNonOptional { .. } => "UnwrapNonOptional",
            ErrorImpl::UnsizedType { .. } => "UnsizedType",
            ErrorImpl::PrintNonWord { .. } => "PrintNonWord",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::InvalidEscape { sequence } => {
                ErrorTip::Suggestion(format!("Unknown escape sequence `{}`", sequence))
            }
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::FunctionAlreadyDeclared { function } => {
                ErrorTip::Suggestion(format!("Function `{}` already declared", function))
            }
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::OperandTypeError {
                operator,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` expects `{}` operands, received `{}`",
                operator, expected, received
            )),
            ErrorImpl::NotAnArray { received } => {
                ErrorTip::Suggestion(format!("Only arrays can be indexed with [], found `{}`", received))
            }
            ErrorImpl::NotATuple { received } => {
                ErrorTip::Suggestion(format!("Only tuples can be indexed with <>, found `{}`", received))
            }
            ErrorImpl::NonConstantTupleIndex => ErrorTip::Suggestion(String::from(
                "Tuple indices must be built from integer literals and + - * /",
            )),
            ErrorImpl::NegativeTupleIndex { index } => {
                ErrorTip::Suggestion(format!("Tuple index {} is negative", index))
            }
            ErrorImpl::TupleIndexOutOfRange { index, arity } => ErrorTip::Suggestion(format!(
                "Tuple index {} out of range for a tuple of {} members",
                index, arity
            )),
            ErrorImpl::NotAFunction { received } => {
                ErrorTip::Suggestion(format!("`{}` cannot be called", received))
            }
            ErrorImpl::ArgumentCountMismatch { expected, received } => ErrorTip::Suggestion(
                format!("Expected {} arguments, received {}", expected, received),
            ),
            ErrorImpl::ArgumentTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::NotAnLvalue => ErrorTip::Suggestion(String::from(
                "Only variables, their elements and dereferenced pointers can be assigned to",
            )),
            ErrorImpl::AddressOfTemporary => ErrorTip::Suggestion(String::from(
                "Cannot take the address of a temporary value",
            )),
            ErrorImpl::ControlOutsideLoop { keyword } => {
                ErrorTip::Suggestion(format!("`{}` used outside of a loop", keyword))
            }
            ErrorImpl::ReturnTypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Function returns `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::MissingReturnValue { expected } => {
                ErrorTip::Suggestion(format!("Expected a return value of type `{}`", expected))
            }
            ErrorImpl::ConditionNotBool { received } => {
                ErrorTip::Suggestion(format!("Conditions must be `bool`, received `{}`", received))
            }
            ErrorImpl::TieError { type_, ids } => ErrorTip::Suggestion(format!(
                "Cannot bind {} identifiers to a value of type `{}`",
                ids, type_
            )),
            ErrorImpl::EmptyArrayLiteral => {
                ErrorTip::Suggestion(String::from("Array literals need at least one element"))
            }
            ErrorImpl::InvalidNegation { received } => ErrorTip::Suggestion(format!(
                "Only `int` and `bool` values can be negated, received `{}`",
                received
            )),
            ErrorImpl::DerefNonPointer { received } => {
                ErrorTip::Suggestion(format!("Cannot dereference `{}`", received))
            }
            ErrorImpl::UnwrapNonOptional { received } => {
                ErrorTip::Suggestion(format!("Cannot unwrap `{}`", received))
            }
            ErrorImpl::UnsizedType { type_ } => {
                ErrorTip::Suggestion(format!("Values of type `{}` cannot be stored", type_))
            }
            ErrorImpl::PrintNonWord { received } => ErrorTip::Suggestion(format!(
                "Only single word values can be printed, received `{}`",
                received
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}:{}", self.internal_error, self.position.1, self.position.0)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("invalid escape sequence: {sequence:?}")]
    InvalidEscape { sequence: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("operator {operator} expects {expected} operands, received {received}")]
    OperandTypeError {
        operator: String,
        expected: String,
        received: String,
    },
    #[error("{received} is not an array")]
    NotAnArray { received: String },
    #[error("{received} is not a tuple")]
    NotATuple { received: String },
    #[error("tuple index is not a constant")]
    NonConstantTupleIndex,
    #[error("tuple index {index} is negative")]
    NegativeTupleIndex { index: i64 },
    #[error("tuple index {index} out of range for {arity} members")]
    TupleIndexOutOfRange { index: i64, arity: usize },
    #[error("{received} is not a function")]
    NotAFunction { received: String },
    #[error("wrong argument count: expected {expected}, received {received}")]
    ArgumentCountMismatch { expected: usize, received: usize },
    #[error("argument types do not match: expected {expected}, received {received}")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("expression is not assignable")]
    NotAnLvalue,
    #[error("cannot take the address of a temporary")]
    AddressOfTemporary,
    #[error("{keyword} outside of a loop")]
    ControlOutsideLoop { keyword: String },
    #[error("return type mismatch: expected {expected}, received {received}")]
    ReturnTypeMismatch { expected: String, received: String },
    #[error("missing return value of type {expected}")]
    MissingReturnValue { expected: String },
    #[error("condition must be bool, received {received}")]
    ConditionNotBool { received: String },
    #[error("cannot bind {ids} identifiers to {type_}")]
    TieError { type_: String, ids: usize },
    #[error("empty array literal")]
    EmptyArrayLiteral,
    #[error("cannot negate {received}")]
    InvalidNegation { received: String },
    #[error("cannot dereference {received}")]
    DerefNonPointer { received: String },
    #[error("cannot unwrap {received}")]
    UnwrapNonOptional { received: String },
    #[error("type {type_} has no storage size")]
    UnsizedType { type_: String },
    #[error("cannot print {received}")]
    PrintNonWord { received: String },
}

/// Broken invariants of the parsed tree. These abort checking immediately
/// and are never counted as diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalError {
    #[error("declaration at offset {position} has neither a type nor a value")]
    UntypedDeclaration { position: u32 },
    #[error("conditional at offset {position} has no branches")]
    EmptyConditional { position: u32 },
}

/// Failures of the code generator. A program that passed the checker only
/// hits these when it has no `main`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("no `main` function found")]
    MissingMain,
    #[error("`main` must not take arguments")]
    MainSignature,
    #[error("unknown symbol `{name}`")]
    UnknownSymbol { name: String },
    #[error("expression at offset {position} was not type checked")]
    UncheckedExpression { position: u32 },
    #[error("type {type_} has no storage size")]
    UnsizedType { type_: String },
    #[error("tuple index at offset {position} is not a non-negative constant")]
    NonConstantTupleIndex { position: u32 },
    #[error("expression at offset {position} has no address")]
    NotAddressable { position: u32 },
    #[error("loop control outside of a loop")]
    ControlOutsideLoop,
    #[error("return at offset {position} outside of a function")]
    ReturnOutsideFunction { position: u32 },
}

/// Informational diagnostics. Never counted, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    Shadowing { variable: String, position: Position },
}

impl Warning {
    pub fn get_position(&self) -> &Position {
        match self {
            Warning::Shadowing { position, .. } => position,
        }
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::Shadowing { variable, .. } => {
                write!(f, "`{}` shadows an earlier declaration", variable)
            }
        }
    }
}
