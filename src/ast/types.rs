//! Type representations for Foc.
//!
//! Types are structural. Two relations compare them:
//!
//! - `==` is strict structural equality
//! - `is_equivalent` treats `Unknown` as matching anything and is what the
//!   checker uses for every compatibility test
//!
//! `Unknown` only ever comes from the placeholder literals (bare `&` and
//! bare `?`) and from dereferencing or unwrapping them.

use std::fmt::Display;

/// Size of one machine word in bytes. Every primitive occupies one word.
pub const WORD: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Unit,
    Int,
    Char,
    Bool,
    Ptr(Box<Type>),
    Optional(Box<Type>),
    Tuple(Vec<Type>),
    Array(Box<Type>, usize),
    Function(Vec<Type>, Box<Type>),
    Unknown,
}

impl Type {
    /// Number of bytes a value of this type occupies on the stack.
    ///
    /// Pointers are one word whatever they point to. An optional is a
    /// presence word followed by its payload. Functions, `Unknown` and
    /// types too large to address have no storage size.
    pub fn byte_size(&self) -> Option<usize> {
        match self {
            Type::Unit | Type::Int | Type::Char | Type::Bool | Type::Ptr(_) => Some(WORD),
            Type::Optional(payload) => payload.byte_size()?.checked_add(WORD),
            Type::Tuple(members) => members
                .iter()
                .try_fold(0usize, |total, member| total.checked_add(member.byte_size()?)),
            Type::Array(element, length) => element.byte_size()?.checked_mul(*length),
            Type::Function(_, _) | Type::Unknown => None,
        }
    }

    /// True when no `Unknown` appears anywhere inside the type.
    pub fn is_full_type(&self) -> bool {
        match self {
            Type::Unknown => false,
            Type::Unit | Type::Int | Type::Char | Type::Bool => true,
            Type::Ptr(inner) | Type::Optional(inner) | Type::Array(inner, _) => {
                inner.is_full_type()
            }
            Type::Tuple(members) => members.iter().all(Type::is_full_type),
            Type::Function(args, ret) => {
                args.iter().all(Type::is_full_type) && ret.is_full_type()
            }
        }
    }

    /// Compatibility relation used for every assignability check.
    ///
    /// Reflexive and symmetric. Not transitive: `int ~ _` and `_ ~ bool`
    /// while `int` and `bool` are unrelated.
    pub fn is_equivalent(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Unknown, _) | (_, Type::Unknown) => true,
            (Type::Unit, Type::Unit)
            | (Type::Int, Type::Int)
            | (Type::Char, Type::Char)
            | (Type::Bool, Type::Bool) => true,
            (Type::Ptr(a), Type::Ptr(b)) | (Type::Optional(a), Type::Optional(b)) => {
                a.is_equivalent(b)
            }
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.is_equivalent(b))
            }
            (Type::Array(a, n), Type::Array(b, m)) => n == m && a.is_equivalent(b),
            (Type::Function(a_args, a_ret), Type::Function(b_args, b_ret)) => {
                a_args.len() == b_args.len()
                    && a_args.iter().zip(b_args).all(|(a, b)| a.is_equivalent(b))
                    && a_ret.is_equivalent(b_ret)
            }
            _ => false,
        }
    }

    /// Fills every `Unknown` in one type with the matching part of the other.
    ///
    /// Only meaningful for equivalent types; where the shapes disagree the
    /// left-hand side wins.
    pub fn merge(&self, other: &Type) -> Type {
        match (self, other) {
            (Type::Unknown, _) => other.clone(),
            (_, Type::Unknown) => self.clone(),
            (Type::Ptr(a), Type::Ptr(b)) => Type::Ptr(Box::new(a.merge(b))),
            (Type::Optional(a), Type::Optional(b)) => Type::Optional(Box::new(a.merge(b))),
            (Type::Tuple(a), Type::Tuple(b)) if a.len() == b.len() => {
                Type::Tuple(a.iter().zip(b).map(|(a, b)| a.merge(b)).collect())
            }
            (Type::Array(a, n), Type::Array(b, m)) if n == m => {
                Type::Array(Box::new(a.merge(b)), *n)
            }
            (Type::Function(a_args, a_ret), Type::Function(b_args, b_ret))
                if a_args.len() == b_args.len() =>
            {
                Type::Function(
                    a_args.iter().zip(b_args).map(|(a, b)| a.merge(b)).collect(),
                    Box::new(a_ret.merge(b_ret)),
                )
            }
            _ => self.clone(),
        }
    }

    /// Whether values of this type fit in exactly one machine word.
    pub fn is_word(&self) -> bool {
        self.byte_size() == Some(WORD)
    }
}

fn write_list(f: &mut std::fmt::Formatter<'_>, types: &[Type]) -> std::fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Unit => write!(f, "void"),
            Type::Int => write!(f, "int"),
            Type::Char => write!(f, "char"),
            Type::Bool => write!(f, "bool"),
            Type::Ptr(inner) => write!(f, "*{}", inner),
            Type::Optional(inner) => write!(f, "?{}", inner),
            Type::Tuple(members) => {
                write!(f, "<")?;
                write_list(f, members)?;
                write!(f, ">")
            }
            Type::Array(element, length) => write!(f, "[{}; {}]", element, length),
            Type::Function(args, ret) => {
                write!(f, "fn(")?;
                write_list(f, args)?;
                write!(f, ") -> {}", ret)
            }
            Type::Unknown => write!(f, "_"),
        }
    }
}
