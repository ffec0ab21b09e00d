use std::fmt;

use serde::{Deserialize, Serialize};

/// Nombre cualificado `Owner.name` de una historia o de un paso. Es la forma
/// en que los diagnósticos identifican al culpable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    pub owner: String,
    pub name: String,
}

impl QualifiedName {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: owner.into(),
               name: name.into() }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}
