use std::fmt;

use serde::Serialize;

use crate::parser::module::{ExternalKind, Import};

/// One entry of a module's import section, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImportDescriptor {
    pub module: String,
    pub name: String,
    pub kind: ExternalKind,
}

impl From<&Import> for ImportDescriptor {
    fn from(import: &Import) -> Self {
        ImportDescriptor {
            module: import.module.clone(),
            name: import.name.clone(),
            kind: import.kind(),
        }
    }
}

impl fmt::Display for ImportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} <- \"{}\".\"{}\"", self.kind, self.module, self.name)
    }
}
