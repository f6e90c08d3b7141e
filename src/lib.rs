//! Export reflection for WebAssembly modules.
//!
//! A module binary is decoded once into an immutable [`ModuleHandle`]; the handle
//! then answers queries about what the module exports (and imports) without ever
//! handing out its own state.
//!
//! # Modules
//!
//! - [`parser`] -- Binary format decoder. Reads `.wasm` bytes into a [`parser::module::Module`].
//! - [`exports`] -- Resolves raw export entries into [`ExportDescriptor`]s.
//! - [`handle`] -- [`ModuleHandle`] and the query entrypoints.
//! - [`host`] -- Query entrypoints for dynamically typed embedders.
//! - [`encoder`] -- Binary encoder and [`encoder::ModuleBuilder`].
//! - [`config`] -- Decode limits.
//!
//! # Example
//!
//! ```
//! use wasm_reflect::encoder::ModuleBuilder;
//! use wasm_reflect::parser::module::ValueType;
//! use wasm_reflect::{exports, ExternalKind, ModuleHandle};
//!
//! let mut builder = ModuleBuilder::new();
//! let sig = builder.add_type(&[ValueType::I32], &[]);
//! let f = builder.add_function(sig);
//! let mem = builder.add_memory(1, None, false);
//! builder.add_export("run", ExternalKind::Function, f);
//! builder.add_export("memory", ExternalKind::Memory, mem);
//!
//! let handle = ModuleHandle::compile(&builder.to_bytes()).unwrap();
//! let names: Vec<String> = exports(&handle).into_iter().map(|e| e.name).collect();
//! assert_eq!(names, ["run", "memory"]);
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod exports;
pub mod handle;
pub mod host;
pub mod imports;
pub mod parser;

pub use error::Error;
pub use exports::{ExportDescriptor, ExportTable};
pub use handle::{custom_sections, exports, imports, ModuleHandle};
pub use imports::ImportDescriptor;
pub use parser::module::ExternalKind;
