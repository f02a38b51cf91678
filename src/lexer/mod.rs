//! Lexical analysis module for the compiler.
//!
//! Converts Foc source text into a stream of tokens. Every token kind is
//! described by an anchored regex paired with a handler; keywords are
//! recognised by looking identifiers up in `RESERVED_LOOKUP`. Whitespace and
//! `//` comments are skipped, and every token records its source span.

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
