//! Type checking and semantic analysis module.
//!
//! This module performs type checking and semantic analysis on the AST.
//! It annotates every expression in place with its inferred type while:
//!
//! - Verifying type correctness of expressions and statements
//! - Resolving variable and function references through a scope chain
//! - Checking function signatures and argument types
//! - Enforcing where `break`, `continue` and `return` may appear
//! - Warning when a declaration shadows an earlier one
//!
//! Diagnostics accumulate up to a configurable limit. Malformed trees that
//! the parser never produces abort checking with an `InternalError`.

pub mod scope;
pub mod type_checker;

#[cfg(test)]
mod tests;
