//! Main code generator module.
//!
//! This module contains the core CodeGenerator structure and drives the
//! translation from a checked AST to NASM assembly for x86-64 Linux. It
//! owns the output buffer, the frame-relative symbol tables and the label
//! counter shared by conditionals, loops and call sites.
//!
//! Every value lives on one operand stack. `rsp` always points at the next
//! free word, and a value of `n` words pushed in order occupies
//! `[A - 8(n - 1), A]`, where `A`, the address of the value, is its highest
//! word.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    ast::{
        ast::Identifier,
        expressions::Expr,
        statements::{FunDecl, Program},
        types::{Type, WORD},
    },
    errors::errors::CodegenError,
};

use super::{
    stdlib::{entry_point, PRELUDE},
    stmt::gen_block,
};

/// A local or argument, addressed as `rbp - start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbol {
    pub start: i64,
    pub size: usize,
}

/// Layout of the function being generated.
#[derive(Debug, Clone)]
pub struct FunctionFrame {
    pub return_type: Type,
    pub return_size: usize,
    /// Distance from `rbp` to the address the result is copied to.
    pub return_offset: i64,
}

/// The main code generator structure.
///
/// Holds everything needed while emitting a program:
/// - The assembly produced so far
/// - A stack of symbol tables, one per nested block
/// - The set of function names, for taking function addresses
/// - The labels of the enclosing loops
pub struct CodeGenerator {
    output: String,
    symbols: Vec<HashMap<Identifier, Symbol>>,
    functions: HashSet<String>,
    loop_labels: Vec<usize>,
    label_counter: usize,
    /// Bytes of locals currently live below `rbp`.
    level: i64,
    frame: Option<FunctionFrame>,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        CodeGenerator {
            output: String::new(),
            symbols: vec![],
            functions: HashSet::new(),
            loop_labels: vec![],
            // 0 is taken by the call in `_start`.
            label_counter: 1,
            level: 0,
            frame: None,
        }
    }

    /// Appends one indented instruction.
    pub fn emit(&mut self, instruction: impl AsRef<str>) {
        self.output.push_str("    ");
        self.output.push_str(instruction.as_ref());
        self.output.push('\n');
    }

    pub fn emit_label(&mut self, label: impl AsRef<str>) {
        self.output.push_str(label.as_ref());
        self.output.push_str(":\n");
    }

    pub fn next_label(&mut self) -> usize {
        let label = self.label_counter;
        self.label_counter += 1;
        label
    }

    pub fn level(&self) -> i64 {
        self.level
    }

    pub fn set_level(&mut self, level: i64) {
        self.level = level;
    }

    /// Moves `rsp` back to just below the live locals.
    pub fn reset_stack(&mut self) {
        let instruction = format!("lea rsp, {}", frame_address(self.level));
        self.emit(instruction);
    }

    pub fn push_symbols(&mut self) {
        self.symbols.push(HashMap::new());
    }

    pub fn pop_symbols(&mut self) {
        self.symbols.pop();
    }

    pub fn declare(&mut self, id: &Identifier, symbol: Symbol) {
        debug!(
            "`{}` at {} ({} bytes)",
            id,
            frame_address(symbol.start),
            symbol.size
        );
        if let Some(frame) = self.symbols.last_mut() {
            frame.insert(id.clone(), symbol);
        }
    }

    pub fn find_symbol(&self, id: &Identifier) -> Option<Symbol> {
        self.symbols
            .iter()
            .rev()
            .find_map(|frame| frame.get(id).copied())
    }

    pub fn is_function(&self, id: &Identifier) -> bool {
        self.functions.contains(&id.name)
    }

    pub fn enter_loop(&mut self, label: usize) {
        self.loop_labels.push(label);
    }

    pub fn exit_loop(&mut self) {
        self.loop_labels.pop();
    }

    pub fn current_loop(&self) -> Option<usize> {
        self.loop_labels.last().copied()
    }

    pub fn frame(&self) -> Option<&FunctionFrame> {
        self.frame.as_ref()
    }

    /// Generates the complete assembly listing for `program`.
    pub fn generate(mut self, program: &Program) -> Result<String, CodegenError> {
        let main = program
            .decls
            .iter()
            .find(|decl| decl.id.name == "main")
            .ok_or(CodegenError::MissingMain)?;

        if !main.args.is_empty() {
            return Err(CodegenError::MainSignature);
        }
        let main_size = stack_size(&main.return_type)?;

        self.functions = program
            .decls
            .iter()
            .map(|decl| decl.id.name.clone())
            .collect();

        self.output.push_str(PRELUDE);
        self.output.push_str(&entry_point(main_size));

        for decl in &program.decls {
            self.gen_function(decl)?;
        }

        Ok(self.output)
    }

    fn gen_function(&mut self, decl: &FunDecl) -> Result<(), CodegenError> {
        let return_size = stack_size(&decl.return_type)?;

        let mut arg_sizes = vec![];
        for arg in &decl.args {
            arg_sizes.push(stack_size(&arg.ty)?);
        }
        let args_size: usize = arg_sizes.iter().sum();

        // Room for a result larger than the arguments it replaces.
        let offset = return_size.saturating_sub(args_size);
        let base = (2 * WORD + offset) as i64;

        debug!(
            "generating `{}`: {} bytes of arguments, {} bytes of result",
            decl.id, args_size, return_size
        );

        self.emit_label(function_label(&decl.id.name));
        self.emit(format!("fun_init {}", offset));

        self.level = 0;
        self.loop_labels.clear();
        self.frame = Some(FunctionFrame {
            return_type: decl.return_type.clone(),
            return_size,
            return_offset: base + args_size as i64,
        });

        self.push_symbols();
        let mut cumulative = 0;
        for (arg, size) in decl.args.iter().zip(arg_sizes) {
            cumulative += size as i64;
            self.declare(
                &arg.id,
                Symbol {
                    start: -(base + cumulative),
                    size,
                },
            );
        }

        let result = gen_block(self, &decl.body);
        self.pop_symbols();
        result?;

        // Falling off the end returns zeroes.
        self.emit(format!("zero_block {}", return_size / WORD));
        self.emit_label(".fun_end");
        if let Some(frame) = self.frame.take() {
            self.emit(format!(
                "ret_val {}, {}",
                frame.return_offset, frame.return_size
            ));
        }
        self.emit("ret_");
        self.output.push('\n');
        Ok(())
    }
}

/// Generates NASM assembly for a checked program.
pub fn generate(program: &Program) -> Result<String, CodegenError> {
    CodeGenerator::new().generate(program)
}

/// Assembly label of a Foc function.
pub fn function_label(name: &str) -> String {
    format!("foc_{}", name)
}

/// `[rbp - start]`, with the sign folded in.
pub fn frame_address(start: i64) -> String {
    if start >= 0 {
        format!("[rbp - {}]", start)
    } else {
        format!("[rbp + {}]", -start)
    }
}

/// Bytes a value of `ty` takes on the operand stack. A function value is
/// its code address.
pub fn stack_size(ty: &Type) -> Result<usize, CodegenError> {
    match ty {
        Type::Function(_, _) => Ok(WORD),
        _ => ty.byte_size().ok_or_else(|| CodegenError::UnsizedType {
            type_: ty.to_string(),
        }),
    }
}

/// The checked type of `expr`, completed with whatever `expected` knows.
pub fn shape_of(expr: &Expr, expected: Option<&Type>) -> Result<Type, CodegenError> {
    let annotated = expr
        .get_type()
        .ok_or(CodegenError::UncheckedExpression {
            position: expr.span.start.0,
        })?;

    Ok(match expected {
        Some(expected) => annotated.merge(expected),
        None => annotated.clone(),
    })
}
