//! Utility macros for the compiler.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a lexer handler for fixed-text tokens
//! - `MK_PATTERN!` - Pairs an anchored regex with its lexer handler

/// Creates a Token instance.
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a lexer handler for a token whose text never varies.
///
/// The generated handler pushes a token of the given kind and advances the
/// lexer past the literal.
///
/// # Example
///
/// ```ignore
/// MK_PATTERN!("^->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->"))
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| -> Result<(), Error> {
            let span = lexer.span_of($value.len());
            lexer.push(MK_TOKEN!($kind, String::from($value), span));
            lexer.advance_n($value.len());
            Ok(())
        }
    };
}

/// Builds a `RegexPattern` from a pattern literal and a handler.
///
/// Patterns are compile-time constants, so a pattern that fails to compile
/// is a bug in the lexer table itself.
#[macro_export]
macro_rules! MK_PATTERN {
    ($regex:literal, $handler:expr) => {
        RegexPattern {
            regex: Regex::new($regex).expect("lexer pattern must be a valid regex"),
            handler: $handler,
        }
    };
}
