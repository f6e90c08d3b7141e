//! Embedding boundary for dynamically typed callers.
//!
//! A scripting host hands the query entrypoints an argument list of arbitrary
//! values. Only a compiled module is accepted as the first argument; anything else,
//! including the module constructor and its prototype, is rejected with
//! [`Error::InvalidArgument`]. Arguments past those an entrypoint reads are ignored.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;
use crate::exports::ExportDescriptor;
use crate::handle::{self, ModuleHandle};
use crate::imports::ImportDescriptor;

/// A value as seen by the embedding host.
#[derive(Debug, Clone)]
pub enum HostValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Symbol(Option<String>),
    Object(BTreeMap<String, HostValue>),
    /// The module constructor itself.
    ModuleConstructor,
    /// The constructor's prototype object.
    ModulePrototype,
    Module(ModuleHandle),
}

impl HostValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Boolean(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Symbol(_) => "symbol",
            HostValue::Object(_) => "object",
            HostValue::ModuleConstructor => "function",
            HostValue::ModulePrototype => "object",
            HostValue::Module(_) => "module",
        }
    }

    pub fn as_module(&self) -> Option<&ModuleHandle> {
        match self {
            HostValue::Module(handle) => Some(handle),
            _ => None,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HostValue::Undefined => write!(f, "undefined"),
            HostValue::Null => write!(f, "null"),
            HostValue::Boolean(b) => write!(f, "{}", b),
            HostValue::Number(n) => write!(f, "{}", n),
            HostValue::String(s) => write!(f, "{:?}", s),
            HostValue::Symbol(Some(desc)) => write!(f, "Symbol({})", desc),
            HostValue::Symbol(None) => write!(f, "Symbol()"),
            HostValue::Object(_) => write!(f, "[object Object]"),
            HostValue::ModuleConstructor => write!(f, "Module"),
            HostValue::ModulePrototype => write!(f, "Module.prototype"),
            HostValue::Module(_) => write!(f, "[object Module]"),
        }
    }
}

impl From<ModuleHandle> for HostValue {
    fn from(handle: ModuleHandle) -> Self {
        HostValue::Module(handle)
    }
}

fn module_arg<'a>(args: &'a [HostValue], what: &str) -> Result<&'a ModuleHandle, Error> {
    match args.first() {
        Some(HostValue::Module(handle)) => Ok(handle),
        Some(other) => Err(Error::InvalidArgument(format!(
            "{}: argument 0 must be a module, got {} {}",
            what,
            other.type_name(),
            other
        ))),
        None => Err(Error::InvalidArgument(format!(
            "{}: argument 0 must be a module, got nothing",
            what
        ))),
    }
}

/// `exports(module)`: fresh descriptors of the module's exports, in declaration order.
pub fn query_exports(args: &[HostValue]) -> Result<Vec<ExportDescriptor>, Error> {
    let handle = module_arg(args, "exports")?;
    Ok(handle::exports(handle))
}

/// `imports(module)`.
pub fn query_imports(args: &[HostValue]) -> Result<Vec<ImportDescriptor>, Error> {
    let handle = module_arg(args, "imports")?;
    Ok(handle::imports(handle))
}

/// `customSections(module, name)`. Both arguments are required; a non-string name
/// is stringified the way the host would.
pub fn query_custom_sections(args: &[HostValue]) -> Result<Vec<Vec<u8>>, Error> {
    let handle = module_arg(args, "customSections")?;
    let name = match args.get(1) {
        Some(HostValue::String(name)) => name.clone(),
        Some(HostValue::Symbol(_)) => {
            return Err(Error::InvalidArgument(
                "customSections: cannot convert a symbol to a string".to_string(),
            ))
        }
        Some(other) => other.to_string(),
        None => {
            return Err(Error::InvalidArgument(
                "customSections: argument 1 (section name) is required".to_string(),
            ))
        }
    };
    Ok(handle::custom_sections(handle, &name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ModuleBuilder;
    use crate::parser::module::ExternalKind;

    fn module_with_export() -> ModuleHandle {
        let mut builder = ModuleBuilder::new();
        let sig = builder.add_type(&[], &[]);
        let f = builder.add_function(sig);
        builder.add_export("fn", ExternalKind::Function, f);
        builder.add_custom_section("undefined", &[7]);
        ModuleHandle::compile(&builder.to_bytes()).unwrap()
    }

    #[test]
    fn non_module_first_argument_is_rejected() {
        let values = vec![
            HostValue::Undefined,
            HostValue::Null,
            HostValue::Boolean(true),
            HostValue::String("".to_string()),
            HostValue::Symbol(None),
            HostValue::Number(1.0),
            HostValue::Object(BTreeMap::new()),
            HostValue::ModuleConstructor,
            HostValue::ModulePrototype,
        ];
        for value in values {
            let err = query_exports(&[value.clone()]).unwrap_err();
            assert!(err.is_invalid_argument(), "{} accepted", value);
            assert!(query_imports(&[value.clone()]).unwrap_err().is_invalid_argument());
            assert!(query_custom_sections(&[value, HostValue::String("x".into())])
                .unwrap_err()
                .is_invalid_argument());
        }
    }

    #[test]
    fn missing_argument_is_rejected() {
        let err = query_exports(&[]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("exports: argument 0 must be a module, got nothing".to_string())
        );
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let handle = module_with_export();
        let plain = query_exports(&[handle.clone().into()]).unwrap();
        let stray = query_exports(&[handle.into(), HostValue::Object(BTreeMap::new())]).unwrap();
        assert_eq!(plain, stray);
        assert_eq!(plain.len(), 1);
    }

    #[test]
    fn custom_section_name_is_required() {
        let handle = module_with_export();
        let err = query_custom_sections(&[handle.into()]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument("customSections: argument 1 (section name) is required".to_string())
        );
    }

    #[test]
    fn custom_section_name_is_stringified() {
        let handle = module_with_export();
        assert_eq!(
            query_custom_sections(&[handle.clone().into(), HostValue::Undefined]).unwrap(),
            vec![vec![7]]
        );
        assert!(query_custom_sections(&[handle.clone().into(), HostValue::Null])
            .unwrap()
            .is_empty());
        let err = query_custom_sections(&[handle.into(), HostValue::Symbol(Some("s".into()))]).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
