//! Decode limits, with defaults from [`crate::parser::limits`].
//!
//! A config can be loaded from JSON; missing fields keep their defaults:
//!
//! ```
//! use wasm_reflect::config::ParseConfig;
//!
//! let config = ParseConfig::from_json_str(r#"{ "max_exports": 2 }"#).unwrap();
//! assert_eq!(config.max_exports, 2);
//! assert_eq!(config.max_types, ParseConfig::default().max_types);
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::parser::limits;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseConfig {
    pub max_types: u32,
    pub max_functions: u32,
    pub max_imports: u32,
    pub max_exports: u32,
    pub max_globals: u32,
    pub max_tables: u32,
    pub max_memories: u32,
    pub max_function_params: u32,
    pub max_custom_sections: u32,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            max_types: limits::MAX_TYPES,
            max_functions: limits::MAX_FUNCTIONS,
            max_imports: limits::MAX_IMPORTS,
            max_exports: limits::MAX_EXPORTS,
            max_globals: limits::MAX_GLOBALS,
            max_tables: limits::MAX_TABLES,
            max_memories: limits::MAX_MEMORIES,
            max_function_params: limits::MAX_FUNCTION_PARAMS,
            max_custom_sections: limits::MAX_CUSTOM_SECTIONS,
        }
    }
}

impl ParseConfig {
    pub fn from_json_str(json: &str) -> Result<ParseConfig, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<ParseConfig, Error> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(ParseConfig::from_json_str("{}").unwrap(), ParseConfig::default());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = ParseConfig::from_json_str(r#"{ "max_exprots": 1 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("max_exprots")));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = ParseConfig::from_file("/nonexistent/wasm-reflect.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
