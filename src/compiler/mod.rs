//! Code generation module for the compiler.
//!
//! This module turns a checked program into NASM assembly for x86-64 Linux.
//! It handles:
//!
//! - Frame layout and the stack-based calling convention
//! - Compilation of expressions and statements onto one operand stack
//! - Lvalue addressing for assignment and `&`
//! - The macro prelude and the `_start` entry point

pub mod compiler;
pub mod expr;
pub mod stdlib;
pub mod stmt;
