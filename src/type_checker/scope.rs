use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    ast::{ast::Identifier, types::Type},
    errors::errors::{ErrorImpl, Warning},
};

/// Lexical scopes, innermost last. Frame 0 holds the functions.
#[derive(Debug)]
pub struct ScopeChain {
    frames: Vec<HashMap<Identifier, Type>>,
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeChain {
    pub fn new() -> Self {
        ScopeChain {
            frames: vec![HashMap::new()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Drops the innermost frame. The global frame is never dropped.
    pub fn pop(&mut self) {
        if self.frames.len() <= 1 {
            return;
        }

        if let Some(frame) = self.frames.pop() {
            let mut bindings: Vec<String> = frame
                .iter()
                .map(|(id, ty)| format!("{}: {}", id, ty))
                .collect();
            bindings.sort();
            debug!(depth = self.frames.len(), "leaving scope {{ {} }}", bindings.join(", "));
        }
    }

    pub fn find_type(&self, id: &Identifier) -> Option<&Type> {
        self.frames.iter().rev().find_map(|frame| frame.get(id))
    }

    pub fn is_declared(&self, id: &Identifier) -> bool {
        self.find_type(id).is_some()
    }

    /// Binds `id` in the innermost frame, replacing any visible binding.
    pub fn add(&mut self, id: &Identifier, ty: Type) -> Option<Warning> {
        let warning = if self.is_declared(id) {
            warn!("`{}` shadows an earlier declaration", id);
            Some(Warning::Shadowing {
                variable: id.name.clone(),
                position: id.span.start.clone(),
            })
        } else {
            None
        };

        if let Some(frame) = self.frames.last_mut() {
            frame.insert(id.clone(), ty);
        }

        warning
    }

    /// Destructures an array or tuple across `ids`. Nothing is bound unless
    /// the shape fits.
    pub fn add_tied(&mut self, ids: &[Identifier], ty: &Type) -> Result<Vec<Warning>, ErrorImpl> {
        let members: Vec<Type> = match ty {
            Type::Array(element, length) if *length == ids.len() => {
                vec![(**element).clone(); ids.len()]
            }
            Type::Tuple(members) if members.len() == ids.len() => members.clone(),
            _ => {
                return Err(ErrorImpl::TieError {
                    type_: ty.to_string(),
                    ids: ids.len(),
                })
            }
        };

        Ok(ids
            .iter()
            .zip(members)
            .filter_map(|(id, member)| self.add(id, member))
            .collect())
    }

    /// Binds the identifiers of a declaration to its type.
    ///
    /// No identifiers only fit an empty array or tuple, one identifier takes
    /// the whole value, and more destructure it.
    pub fn bind_declaration(
        &mut self,
        ids: Option<&[Identifier]>,
        ty: &Type,
    ) -> Result<Vec<Warning>, ErrorImpl> {
        match ids.unwrap_or(&[]) {
            [] => match ty {
                Type::Array(_, 0) => Ok(vec![]),
                Type::Tuple(members) if members.is_empty() => Ok(vec![]),
                _ => Err(ErrorImpl::TieError {
                    type_: ty.to_string(),
                    ids: 0,
                }),
            },
            [id] => Ok(self.add(id, ty.clone()).into_iter().collect()),
            ids => self.add_tied(ids, ty),
        }
    }
}
