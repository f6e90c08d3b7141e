//! Export descriptors and their resolution against a module's index spaces.

use std::fmt;

use log::trace;
use serde::Serialize;

use crate::parser::error::ParseError;
use crate::parser::module::{ExternalKind, IndexTables, RawExport};

/// One entry of a module's export section.
///
/// Descriptors handed out by queries are owned values; changing one has no effect on
/// the module it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExportDescriptor {
    pub name: String,
    pub kind: ExternalKind,
    pub index: u32,
}

impl fmt::Display for ExportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}] -> \"{}\"", self.kind, self.index, self.name)
    }
}

/// Resolved exports in export-section order.
///
/// Names are not required to be unique, and one entity may be exported under
/// several names; every entry is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportTable {
    exports: Vec<ExportDescriptor>,
}

impl ExportTable {
    /// Checks each raw entry's kind byte and index against `tables`, in file order.
    /// The first bad entry aborts resolution. Entries produced by the parser have
    /// already passed these checks.
    pub fn resolve(raw: &[RawExport], tables: &IndexTables) -> Result<ExportTable, ParseError> {
        let mut exports = Vec::with_capacity(raw.len());

        for entry in raw {
            let (kind, index) = entry.resolve(tables)?;
            trace!("export \"{}\" -> {}[{}]", entry.name, kind, index);
            exports.push(ExportDescriptor {
                name: entry.name.clone(),
                kind,
                index,
            });
        }

        Ok(ExportTable { exports })
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExportDescriptor> {
        self.exports.iter()
    }

    /// First export with this name, if any.
    pub fn find(&self, name: &str) -> Option<&ExportDescriptor> {
        self.exports.iter().find(|e| e.name == name)
    }

    /// A newly allocated copy of every descriptor.
    pub fn snapshot(&self) -> Vec<ExportDescriptor> {
        self.exports.clone()
    }
}

impl<'a> IntoIterator for &'a ExportTable {
    type Item = &'a ExportDescriptor;
    type IntoIter = std::slice::Iter<'a, ExportDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.exports.iter()
    }
}
