//! Compiled module handles and the typed query entrypoints.
//!
//! A [`ModuleHandle`] only exists once compilation has succeeded; there is no
//! half-built or closed state to observe. Queries never touch the handle's state and
//! always return newly allocated values, so a handle can be shared across threads
//! without locking.

use std::sync::Arc;

use log::debug;

use crate::config::ParseConfig;
use crate::error::Error;
use crate::exports::{ExportDescriptor, ExportTable};
use crate::imports::ImportDescriptor;
use crate::parser::{self, module::CustomSection, module::ExternalKind, module::IndexTables};

#[derive(Debug)]
struct CompiledModule {
    exports: ExportTable,
    imports: Vec<ImportDescriptor>,
    custom: Vec<CustomSection>,
    index_tables: IndexTables,
}

/// An immutable compiled module.
///
/// Cloning a handle is cheap and yields another handle to the same compiled module.
/// Compiling the same bytes twice yields two distinct modules.
#[derive(Debug, Clone)]
pub struct ModuleHandle {
    inner: Arc<CompiledModule>,
}

impl ModuleHandle {
    /// Compiles `bytes` with the default decode limits.
    pub fn compile(bytes: &[u8]) -> Result<ModuleHandle, Error> {
        Self::compile_with(bytes, &ParseConfig::default())
    }

    pub fn compile_with(bytes: &[u8], config: &ParseConfig) -> Result<ModuleHandle, Error> {
        let module = parser::parse(bytes, config)?;
        let index_tables = module.index_tables();
        let exports = ExportTable::resolve(&module.exports, &index_tables)?;

        debug!(
            "compiled module: {} bytes, {} imports, {} exports, {} custom sections",
            bytes.len(),
            module.imports.len(),
            exports.len(),
            module.custom.len()
        );

        Ok(ModuleHandle {
            inner: Arc::new(CompiledModule {
                exports,
                imports: module.imports.iter().map(ImportDescriptor::from).collect(),
                custom: module.custom,
                index_tables,
            }),
        })
    }

    /// See [`exports`].
    pub fn exports(&self) -> Vec<ExportDescriptor> {
        self.inner.exports.snapshot()
    }

    /// Fresh descriptors of the exports of one kind, in declaration order.
    pub fn exports_of_kind(&self, kind: ExternalKind) -> Vec<ExportDescriptor> {
        self.inner
            .exports
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// See [`imports`].
    pub fn imports(&self) -> Vec<ImportDescriptor> {
        self.inner.imports.clone()
    }

    /// See [`custom_sections`].
    pub fn custom_sections(&self, name: &str) -> Vec<Vec<u8>> {
        self.inner
            .custom
            .iter()
            .filter(|section| section.name == name)
            .map(|section| section.data.clone())
            .collect()
    }

    /// Read-only view of the per-kind index spaces the exports were resolved against.
    pub fn index_tables(&self) -> &IndexTables {
        &self.inner.index_tables
    }

    /// Whether both handles refer to the same compiled module.
    pub fn ptr_eq(a: &ModuleHandle, b: &ModuleHandle) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

/// The module's exports in declaration order.
///
/// Every call allocates a new vector of new descriptors; nothing is cached or shared
/// between calls.
pub fn exports(handle: &ModuleHandle) -> Vec<ExportDescriptor> {
    handle.exports()
}

/// The module's imports in declaration order, freshly allocated per call.
pub fn imports(handle: &ModuleHandle) -> Vec<ImportDescriptor> {
    handle.imports()
}

/// Copies of the payloads of every custom section called `name`, in file order.
pub fn custom_sections(handle: &ModuleHandle, name: &str) -> Vec<Vec<u8>> {
    handle.custom_sections(name)
}
