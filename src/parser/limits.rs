//! Implementation limits for module decoding.
//!
//! These limits are aligned with V8's limits from src/wasm/wasm-limits.h.
//! They prevent OOM attacks from malformed input claiming unrealistic counts.
//! Each one is the default for the matching [`crate::config::ParseConfig`] field.

/// Maximum number of type definitions in a module
pub const MAX_TYPES: u32 = 1_000_000;

/// Maximum number of defined functions in a module
pub const MAX_FUNCTIONS: u32 = 1_000_000;

/// Maximum number of imports in a module
pub const MAX_IMPORTS: u32 = 1_000_000;

/// Maximum number of exports in a module
pub const MAX_EXPORTS: u32 = 1_000_000;

/// Maximum number of globals in a module
pub const MAX_GLOBALS: u32 = 1_000_000;

/// Maximum number of tables in a module
pub const MAX_TABLES: u32 = 100_000;

/// Maximum number of memories in a module (multi-memory)
pub const MAX_MEMORIES: u32 = 100_000;

/// Maximum number of parameters or results in a function type
pub const MAX_FUNCTION_PARAMS: u32 = 1_000;

/// Maximum number of custom sections retained per module
pub const MAX_CUSTOM_SECTIONS: u32 = 100_000;
