//! Error types and error handling for the compiler.
//!
//! - `Error`/`ErrorImpl`: positioned, counted diagnostics
//! - `InternalError`: fatal tree invariant violations
//! - `CodegenError`: code generation failures
//! - `Warning`: uncounted informational diagnostics

pub mod errors;
