/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Identifiers
/// - expressions: Expressions, literals, operators and checker annotations
/// - statements: Statements, function declarations and the program root
/// - types: The Foc type system and its equivalence relation
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
