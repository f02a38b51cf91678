use crate::{
    ast::{
        expressions::{Expr, ExprKind, Literal, OptLiteral, Operator, PtrLiteral},
        types::{Type, WORD},
    },
    errors::errors::CodegenError,
};

use super::compiler::{frame_address, function_label, shape_of, stack_size, CodeGenerator};

/// Generates `expr` onto the operand stack and returns the shape it was
/// generated with. Afterwards `rax` holds the address of the value.
pub fn gen_expression(
    generator: &mut CodeGenerator,
    expr: &Expr,
    expected: Option<&Type>,
) -> Result<Type, CodegenError> {
    let shape = shape_of(expr, expected)?;

    match &expr.kind {
        ExprKind::Binary(operator, left, right) => {
            gen_binary(generator, *operator, left, right)?;
        }
        ExprKind::ArrayIndex { array, index } => {
            let length = match array.get_type() {
                Some(Type::Array(_, length)) => *length,
                _ => {
                    return Err(CodegenError::UncheckedExpression {
                        position: array.span.start.0,
                    })
                }
            };
            let array_shape = Type::Array(Box::new(shape.clone()), length);
            gen_expression(generator, array, Some(&array_shape))?;
            gen_expression(generator, index, Some(&Type::Int))?;

            let element_size = stack_size(&shape)?;
            generator.emit("pop_ rcx");
            generator.emit(format!("lea rax, [rsp + {}]", element_size * length));
            generator.emit(format!("imul rcx, rcx, {}", element_size));
            generator.emit("mov rbx, rax");
            generator.emit("sub rbx, rcx");
            generator.emit(format!("mov rcx, {}", element_size / WORD));
            generator.emit("move_block");
        }
        ExprKind::TupleIndex { tuple, index } => {
            let position = index.fold_constant().and_then(|value| usize::try_from(value).ok());
            let (members, position) = match (tuple.get_type(), position) {
                (Some(Type::Tuple(members)), Some(position)) if position < members.len() => {
                    (members.clone(), position)
                }
                _ => {
                    return Err(CodegenError::NonConstantTupleIndex {
                        position: index.span.start.0,
                    })
                }
            };

            let mut tuple_shape = members;
            tuple_shape[position] = tuple_shape[position].merge(&shape);
            gen_expression(generator, tuple, Some(&Type::Tuple(tuple_shape.clone())))?;

            let tuple_size = stack_size(&Type::Tuple(tuple_shape.clone()))?;
            let offset = member_offset(&tuple_shape, position)?;
            let member_size = stack_size(&shape)?;

            generator.emit(format!("lea rax, [rsp + {}]", tuple_size));
            generator.emit(format!("lea rbx, [rsp + {}]", tuple_size - offset));
            generator.emit(format!("mov rcx, {}", member_size / WORD));
            generator.emit("move_block");
        }
        ExprKind::Call { callee, args } => {
            let params = match callee.get_type() {
                Some(Type::Function(params, _)) => params.clone(),
                _ => {
                    return Err(CodegenError::UncheckedExpression {
                        position: callee.span.start.0,
                    })
                }
            };

            // The first argument ends up lowest, right above the return label.
            let args: Vec<&Expr> = args.iter().flatten().collect();
            for (arg, param) in args.iter().zip(&params).rev() {
                gen_expression(generator, arg, Some(param))?;
            }
            gen_expression(generator, callee, None)?;

            let label = generator.next_label();
            generator.emit("pop_ rax");
            generator.emit(format!("call_ {}", label));
        }
        ExprKind::Identifier(id) => {
            if let Some(symbol) = generator.find_symbol(id) {
                generator.emit("mov rax, rsp");
                generator.emit(format!("lea rbx, {}", frame_address(symbol.start)));
                generator.emit(format!("mov rcx, {}", stack_size(&shape)? / WORD));
                generator.emit("move_block");
            } else if generator.is_function(id) {
                generator.emit(format!("lea rbx, [rel {}]", function_label(&id.name)));
                generator.emit("push_ rbx");
            } else {
                return Err(CodegenError::UnknownSymbol {
                    name: id.name.clone(),
                });
            }
        }
        ExprKind::Literal(literal) => gen_literal(generator, literal, &shape, expr)?,
    }

    if expr.negate {
        match shape {
            Type::Bool => generator.emit("not_bool"),
            _ => generator.emit("neg_int"),
        }
    }

    generator.emit(format!("lea rax, [rsp + {}]", stack_size(&shape)?));
    Ok(shape)
}

fn gen_binary(
    generator: &mut CodeGenerator,
    operator: Operator,
    left: &Expr,
    right: &Expr,
) -> Result<(), CodegenError> {
    let operand = if operator.is_equality() {
        shape_of(left, None)?.merge(&shape_of(right, None)?)
    } else if operator.is_logical() {
        Type::Bool
    } else {
        Type::Int
    };

    gen_expression(generator, left, Some(&operand))?;
    gen_expression(generator, right, Some(&operand))?;

    let instruction = match operator {
        Operator::Add => String::from("add_op"),
        Operator::Sub => String::from("sub_op"),
        Operator::Mul => String::from("mul_op"),
        Operator::Div => String::from("div_op"),
        Operator::And => String::from("and_op"),
        Operator::Or => String::from("or_op"),
        Operator::Less => String::from("less_op"),
        Operator::Greater => String::from("greater_op"),
        Operator::LessEqual => String::from("leq_op"),
        Operator::GreaterEqual => String::from("geq_op"),
        Operator::Equal => format!("equal_block {}", stack_size(&operand)?),
        Operator::NotEqual => format!("not_equal_block {}", stack_size(&operand)?),
    };
    generator.emit(instruction);

    Ok(())
}

fn gen_literal(
    generator: &mut CodeGenerator,
    literal: &Literal,
    shape: &Type,
    expr: &Expr,
) -> Result<(), CodegenError> {
    match literal {
        Literal::Int(value) => {
            generator.emit(format!("mov rbx, {}", value));
            generator.emit("push_ rbx");
        }
        Literal::Char(value) => generator.emit(format!("push_ {}", *value as u32)),
        Literal::Bool(value) => generator.emit(format!("push_ {}", *value as u8)),
        Literal::Str(value) => {
            for ch in value.chars() {
                generator.emit(format!("push_ {}", ch as u32));
            }
        }
        Literal::Ptr(PtrLiteral::Ref(inner)) => gen_address(generator, inner)?,
        Literal::Ptr(PtrLiteral::Deref(inner)) => {
            let pointer = Type::Ptr(Box::new(shape.clone()));
            gen_expression(generator, inner, Some(&pointer))?;

            generator.emit("pop_ rbx");
            generator.emit("mov rax, rsp");
            generator.emit(format!("mov rcx, {}", stack_size(shape)? / WORD));
            generator.emit("move_block");
        }
        Literal::Ptr(PtrLiteral::Null) => generator.emit("push_ 0"),
        Literal::Optional(OptLiteral::Unwrap(inner)) => gen_unwrap(generator, inner, shape)?,
        Literal::Optional(option) => {
            let payload = match shape {
                Type::Optional(payload) => (**payload).clone(),
                _ => {
                    return Err(CodegenError::UncheckedExpression {
                        position: expr.span.start.0,
                    })
                }
            };

            match option {
                OptLiteral::Wrap(inner) => {
                    generator.emit("push_ 1");
                    gen_expression(generator, inner, Some(&payload))?;
                }
                OptLiteral::Empty => {
                    let size = stack_size(&payload)?;
                    generator.emit("push_ 0");
                    generator.emit(format!("zero_block {}", size / WORD));
                }
                OptLiteral::Unwrap(_) => {}
            }
        }
        Literal::Tuple(members) => {
            let member_shapes = match shape {
                Type::Tuple(member_shapes) => member_shapes,
                _ => {
                    return Err(CodegenError::UncheckedExpression {
                        position: expr.span.start.0,
                    })
                }
            };
            for (member, member_shape) in members.iter().zip(member_shapes) {
                gen_expression(generator, member, Some(member_shape))?;
            }
        }
        Literal::Array(elements) => {
            let element_shape = match shape {
                Type::Array(element_shape, _) => element_shape,
                _ => {
                    return Err(CodegenError::UncheckedExpression {
                        position: expr.span.start.0,
                    })
                }
            };
            for element in elements {
                gen_expression(generator, element, Some(element_shape))?;
            }
        }
    }

    Ok(())
}

/// `~inner`: the payload sits one word below the presence flag and is moved
/// up over it.
fn gen_unwrap(
    generator: &mut CodeGenerator,
    inner: &Expr,
    payload: &Type,
) -> Result<(), CodegenError> {
    let optional = Type::Optional(Box::new(payload.clone()));
    gen_expression(generator, inner, Some(&optional))?;

    let optional_size = stack_size(&optional)?;
    generator.emit(format!("lea rax, [rsp + {}]", optional_size));
    generator.emit(format!("lea rbx, [rsp + {}]", optional_size - WORD));
    generator.emit(format!("mov rcx, {}", stack_size(payload)? / WORD));
    generator.emit("move_block");

    Ok(())
}

/// Pushes the address of the storage `expr` designates.
pub fn gen_address(generator: &mut CodeGenerator, expr: &Expr) -> Result<(), CodegenError> {
    let not_addressable = CodegenError::NotAddressable {
        position: expr.span.start.0,
    };
    if expr.negate {
        return Err(not_addressable);
    }

    match &expr.kind {
        ExprKind::Identifier(id) => {
            let symbol = match generator.find_symbol(id) {
                Some(symbol) => symbol,
                None if generator.is_function(id) => return Err(not_addressable),
                None => {
                    return Err(CodegenError::UnknownSymbol {
                        name: id.name.clone(),
                    })
                }
            };
            generator.emit(format!("lea rbx, {}", frame_address(symbol.start)));
            generator.emit("push_ rbx");
        }
        ExprKind::ArrayIndex { array, index } => {
            let element = match array.get_type() {
                Some(Type::Array(element, _)) => (**element).clone(),
                _ => return Err(not_addressable),
            };
            let element = element.merge(&shape_of(expr, None)?);

            gen_address(generator, array)?;
            gen_expression(generator, index, Some(&Type::Int))?;

            generator.emit("pop_ rcx");
            generator.emit(format!("imul rcx, rcx, {}", stack_size(&element)?));
            generator.emit("sub [rsp + 8], rcx");
        }
        ExprKind::TupleIndex { tuple, index } => {
            let position = index.fold_constant().and_then(|value| usize::try_from(value).ok());
            let (members, position) = match (tuple.get_type(), position) {
                (Some(Type::Tuple(members)), Some(position)) if position < members.len() => {
                    (members, position)
                }
                _ => {
                    return Err(CodegenError::NonConstantTupleIndex {
                        position: index.span.start.0,
                    })
                }
            };
            let offset = member_offset(members, position)?;

            gen_address(generator, tuple)?;
            generator.emit(format!("sub qword [rsp + 8], {}", offset));
        }
        ExprKind::Literal(Literal::Ptr(PtrLiteral::Deref(inner))) => {
            let pointee = shape_of(expr, None)?;
            gen_expression(generator, inner, Some(&Type::Ptr(Box::new(pointee))))?;
        }
        _ => return Err(not_addressable),
    }

    Ok(())
}

/// Bytes between the address of a tuple and the address of member `index`.
fn member_offset(members: &[Type], index: usize) -> Result<usize, CodegenError> {
    let mut offset = 0;
    for member in &members[..index] {
        offset += stack_size(member)?;
    }
    Ok(offset)
}
