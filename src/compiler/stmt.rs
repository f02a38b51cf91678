use crate::{
    ast::{
        statements::{Block, Control, Flow, Stmt, VarDecl},
        types::{Type, WORD},
    },
    errors::errors::CodegenError,
};

use super::{
    compiler::{shape_of, stack_size, CodeGenerator, Symbol},
    expr::{gen_address, gen_expression},
};

/// Generates the statements of `body` in the current symbol scope.
pub fn gen_block(generator: &mut CodeGenerator, body: &Block) -> Result<(), CodegenError> {
    for stmt in body {
        gen_statement(generator, stmt)?;
    }
    Ok(())
}

/// Generates `body` in its own scope and releases its locals afterwards.
fn gen_scoped_block(generator: &mut CodeGenerator, body: &Block) -> Result<(), CodegenError> {
    let level = generator.level();

    generator.push_symbols();
    let result = gen_block(generator, body);
    generator.pop_symbols();

    generator.set_level(level);
    generator.reset_stack();
    result
}

pub fn gen_statement(generator: &mut CodeGenerator, stmt: &Stmt) -> Result<(), CodegenError> {
    match stmt {
        Stmt::VarDecl(decl) => gen_var_decl(generator, decl),
        Stmt::Assign(assign) => {
            let target = shape_of(&assign.target, None)?;
            let ty = target.merge(&shape_of(&assign.value, None)?);
            let size = stack_size(&ty)?;

            gen_expression(generator, &assign.value, Some(&ty))?;
            gen_address(generator, &assign.target)?;

            generator.emit("pop_ rax");
            generator.emit(format!("lea rbx, [rsp + {}]", size));
            generator.emit(format!("mov rcx, {}", size / WORD));
            generator.emit("copy_block");
            generator.reset_stack();
            Ok(())
        }
        Stmt::Flow(Flow::Cond(cond)) => {
            let id = generator.next_label();
            let count = cond.branches.len();

            for (k, branch) in cond.branches.iter().enumerate() {
                if k > 0 {
                    generator.emit_label(format!(".next{}_{}", id, k));
                }
                gen_expression(generator, &branch.condition, Some(&Type::Bool))?;
                generator.emit("pop_ rbx");
                generator.emit("cmp rbx, 0");
                generator.emit(format!("je .next{}_{}", id, k + 1));

                gen_scoped_block(generator, &branch.body)?;
                generator.emit(format!("jmp .end_if{}", id));
            }

            generator.emit_label(format!(".next{}_{}", id, count));
            if let Some(otherwise) = &cond.otherwise {
                gen_scoped_block(generator, otherwise)?;
            }
            generator.emit_label(format!(".end_if{}", id));
            Ok(())
        }
        Stmt::Flow(Flow::Loop(lp)) => {
            let id = generator.next_label();

            generator.emit_label(format!(".loop{}", id));
            generator.reset_stack();
            gen_expression(generator, &lp.condition, Some(&Type::Bool))?;
            generator.emit("pop_ rbx");
            generator.emit("cmp rbx, 0");
            generator.emit(format!("je .loop_end{}", id));

            generator.enter_loop(id);
            let result = gen_scoped_block(generator, &lp.body);
            generator.exit_loop();
            result?;

            generator.emit(format!("jmp .loop{}", id));
            generator.emit_label(format!(".loop_end{}", id));
            generator.reset_stack();
            Ok(())
        }
        Stmt::Flow(Flow::Control(control)) => gen_control(generator, control),
        Stmt::Expr(expr) => {
            gen_expression(generator, expr, None)?;
            generator.reset_stack();
            Ok(())
        }
        Stmt::Print(expr) => {
            let shape = gen_expression(generator, expr, None)?;
            let bytes = if shape == Type::Char { 1 } else { WORD };
            generator.emit(format!("print_ {}", bytes));
            Ok(())
        }
    }
}

/// The initializer is generated in place and its block becomes the storage
/// of the declared names.
fn gen_var_decl(generator: &mut CodeGenerator, decl: &VarDecl) -> Result<(), CodegenError> {
    let ty = match (&decl.ty, &decl.value) {
        (Some(declared), _) => declared.clone(),
        (None, Some(value)) => shape_of(value, None)?,
        (None, None) => {
            return Err(CodegenError::UncheckedExpression {
                position: decl.span.start.0,
            })
        }
    };
    let size = stack_size(&ty)?;

    match &decl.value {
        Some(value) => {
            gen_expression(generator, value, Some(&ty))?;
        }
        None => generator.emit(format!("sub rsp, {}", size)),
    }

    let start = generator.level();
    match decl.ids.as_deref().unwrap_or(&[]) {
        [] => {}
        [id] => generator.declare(id, Symbol { start, size }),
        ids => {
            let members: Vec<Type> = match &ty {
                Type::Array(element, _) => vec![(**element).clone(); ids.len()],
                Type::Tuple(members) => members.clone(),
                _ => {
                    return Err(CodegenError::UncheckedExpression {
                        position: decl.span.start.0,
                    })
                }
            };

            let mut offset = 0;
            for (id, member) in ids.iter().zip(&members) {
                let member_size = stack_size(member)?;
                generator.declare(
                    id,
                    Symbol {
                        start: start + offset as i64,
                        size: member_size,
                    },
                );
                offset += member_size;
            }
        }
    }

    generator.set_level(start + size as i64);
    Ok(())
}

fn gen_control(generator: &mut CodeGenerator, control: &Control) -> Result<(), CodegenError> {
    match control {
        Control::Continue(_) => {
            let id = generator
                .current_loop()
                .ok_or(CodegenError::ControlOutsideLoop)?;
            generator.emit(format!("jmp .loop{}", id));
        }
        Control::Break(_) => {
            let id = generator
                .current_loop()
                .ok_or(CodegenError::ControlOutsideLoop)?;
            generator.emit(format!("jmp .loop_end{}", id));
        }
        Control::Return(value, span) => {
            let (return_type, return_size) = match generator.frame() {
                Some(frame) => (frame.return_type.clone(), frame.return_size),
                None => {
                    return Err(CodegenError::ReturnOutsideFunction {
                        position: span.start.0,
                    })
                }
            };

            match value {
                Some(value) => {
                    gen_expression(generator, value, Some(&return_type))?;
                }
                None => generator.emit(format!("zero_block {}", return_size / WORD)),
            }
            generator.emit("jmp .fun_end");
        }
    }

    Ok(())
}
