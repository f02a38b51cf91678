use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::Span;

/// A name in the source program.
///
/// Equality and hashing only look at the name, so identifiers taken from
/// different places in the source can be used interchangeably as map keys.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Identifier {
            name: name.into(),
            span,
        }
    }

    /// An identifier with no source location, for lookups and tests.
    pub fn bare(name: impl Into<String>) -> Self {
        Identifier::new(name, Span::null())
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
