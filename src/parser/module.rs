use std::fmt;

use serde::Serialize;

use super::encoding::{
    DESC_FUNC, DESC_GLOBAL, DESC_MEMORY, DESC_TABLE, REF_EXTERN, REF_FUNC, VAL_F32, VAL_F64, VAL_I32, VAL_I64,
    VAL_V128,
};
use super::error::{ParseError, ParseErrorKind};

/// A decoded module binary: every section this crate reflects over, in declaration order.
///
/// Exports are kept as `(name, kind byte, index)` entries here. The parser checks each
/// one against the index spaces as it is read; [`crate::exports::ExportTable::resolve`]
/// turns them into descriptors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub version: u32,

    pub types: Vec<FunctionType>,
    pub imports: Vec<Import>,
    pub functions: Vec<Function>,
    pub tables: Vec<TableType>,
    pub memories: Vec<MemoryType>,
    pub globals: Vec<Global>,
    pub exports: Vec<RawExport>,
    pub start: Option<u32>,
    pub data_count: Option<u32>,
    pub code_count: Option<u32>,
    pub data_segments: Option<u32>,
    pub custom: Vec<CustomSection>,
}

impl Module {
    pub fn new() -> Module {
        Module::default()
    }

    /// Builds the per-kind index spaces: imported entities first, then local definitions.
    pub fn index_tables(&self) -> IndexTables {
        let mut tables = IndexTables::default();

        for import in &self.imports {
            match &import.desc {
                ImportDesc::Function(type_index) => tables.functions.push(*type_index),
                ImportDesc::Table(table_type) => tables.tables.push(*table_type),
                ImportDesc::Memory(memory_type) => tables.memories.push(*memory_type),
                ImportDesc::Global(global_type) => tables.globals.push(*global_type),
            }
        }

        tables.functions.extend(self.functions.iter().map(|f| f.ftype_index));
        tables.tables.extend(self.tables.iter().copied());
        tables.memories.extend(self.memories.iter().copied());
        tables.globals.extend(self.globals.iter().map(|g| g.global_type));

        tables
    }
}

/// Declaration order → entity metadata, one list per external kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexTables {
    /// Signature (type section) index of each function.
    pub functions: Vec<u32>,
    pub tables: Vec<TableType>,
    pub memories: Vec<MemoryType>,
    pub globals: Vec<GlobalType>,
}

impl IndexTables {
    pub fn len(&self, kind: ExternalKind) -> usize {
        match kind {
            ExternalKind::Function => self.functions.len(),
            ExternalKind::Table => self.tables.len(),
            ExternalKind::Memory => self.memories.len(),
            ExternalKind::Global => self.globals.len(),
        }
    }

    pub fn contains(&self, kind: ExternalKind, index: u32) -> bool {
        (index as usize) < self.len(kind)
    }
}

/// The category of an imported or exported entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalKind {
    Function,
    Table,
    Memory,
    Global,
}

impl ExternalKind {
    pub fn decode(byte: u8) -> Option<ExternalKind> {
        match byte {
            DESC_FUNC => Some(ExternalKind::Function),
            DESC_TABLE => Some(ExternalKind::Table),
            DESC_MEMORY => Some(ExternalKind::Memory),
            DESC_GLOBAL => Some(ExternalKind::Global),
            _ => None,
        }
    }

    pub fn wire_byte(&self) -> u8 {
        match self {
            ExternalKind::Function => DESC_FUNC,
            ExternalKind::Table => DESC_TABLE,
            ExternalKind::Memory => DESC_MEMORY,
            ExternalKind::Global => DESC_GLOBAL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalKind::Function => "function",
            ExternalKind::Table => "table",
            ExternalKind::Memory => "memory",
            ExternalKind::Global => "global",
        }
    }
}

impl fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub parameters: Vec<ValueType>,
    pub return_types: Vec<ValueType>,
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let join = |types: &[ValueType]| {
            types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        };
        write!(f, "({}) -> ", join(&self.parameters))?;
        match self.return_types.len() {
            0 => write!(f, "nil"),
            1 => write!(f, "{}", self.return_types[0]),
            _ => write!(f, "({})", join(&self.return_types)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub module: String,
    pub name: String,
    pub desc: ImportDesc,
}

impl Import {
    pub fn kind(&self) -> ExternalKind {
        match self.desc {
            ImportDesc::Function(_) => ExternalKind::Function,
            ImportDesc::Table(_) => ExternalKind::Table,
            ImportDesc::Memory(_) => ExternalKind::Memory,
            ImportDesc::Global(_) => ExternalKind::Global,
        }
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{} {}", self.module, self.name, self.desc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportDesc {
    Function(u32), // typeidx
    Table(TableType),
    Memory(MemoryType),
    Global(GlobalType),
}

impl fmt::Display for ImportDesc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportDesc::Function(typeidx) => write!(f, "Function(sig={})", typeidx),
            ImportDesc::Table(table_type) => write!(f, "Table({})", table_type),
            ImportDesc::Memory(memory_type) => write!(f, "Memory({})", memory_type),
            ImportDesc::Global(global_type) => write!(f, "Global({})", global_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Function {
    pub ftype_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min: u32,
    pub max: Option<u32>,
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "initial={} max={}", self.min, max),
            None => write!(f, "initial={}", self.min),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefType {
    FuncRef,
    ExternRef,
}

impl RefType {
    pub fn decode(byte: u8) -> Option<RefType> {
        match byte {
            REF_FUNC => Some(RefType::FuncRef),
            REF_EXTERN => Some(RefType::ExternRef),
            _ => None,
        }
    }

    pub fn wire_byte(&self) -> u8 {
        match self {
            RefType::FuncRef => REF_FUNC,
            RefType::ExternRef => REF_EXTERN,
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RefType::FuncRef => write!(f, "funcref"),
            RefType::ExternRef => write!(f, "externref"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableType {
    pub ref_type: RefType,
    pub limits: Limits,
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "type={} {}", self.ref_type, self.limits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryType {
    pub limits: Limits,
    pub shared: bool,
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "pages: {}{}", self.limits, if self.shared { " shared" } else { "" })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalType {
    pub value_type: ValueType,
    pub mutable: bool, // const or var
}

impl fmt::Display for GlobalType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.value_type, if self.mutable { "var" } else { "const" })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub global_type: GlobalType,
    pub init: ConstExpr,
}

/// The instructions allowed in a constant expression, without the trailing `end`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstExpr(pub Vec<ConstInstruction>);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstInstruction {
    I32Const(i32),
    I64Const(i64),
    F32Const(f32),
    F64Const(f64),
    GlobalGet(u32),
    RefNull(RefType),
    RefFunc(u32),
    I32Add,
    I32Sub,
    I32Mul,
    I64Add,
    I64Sub,
    I64Mul,
}

/// An export entry exactly as it appears in the export section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExport {
    pub name: String,
    pub kind: u8,
    pub index: u32,
    /// Absolute offset of the entry, for error reporting.
    pub offset: usize,
}

impl RawExport {
    /// Decodes the descriptor byte and checks the index against `tables`. Errors are
    /// reported at the start of the entry.
    pub fn resolve(&self, tables: &IndexTables) -> Result<(ExternalKind, u32), ParseError> {
        let kind = ExternalKind::decode(self.kind)
            .ok_or_else(|| ParseError::new(ParseErrorKind::MalformedExportKind(self.kind), self.offset))?;
        if !tables.contains(kind, self.index) {
            return Err(ParseError::new(
                ParseErrorKind::UnknownIndex {
                    kind,
                    index: self.index,
                },
                self.offset,
            ));
        }
        Ok((kind, self.index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSection {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ValueType {
    // Number types
    I32,
    I64,
    F32,
    F64,
    // Vector types
    V128,
    // Reference types
    FuncRef,
    ExternRef,
}

impl ValueType {
    pub fn decode(byte: u8) -> Option<Self> {
        match byte {
            VAL_I32 => Some(ValueType::I32),
            VAL_I64 => Some(ValueType::I64),
            VAL_F32 => Some(ValueType::F32),
            VAL_F64 => Some(ValueType::F64),
            VAL_V128 => Some(ValueType::V128),
            REF_FUNC => Some(ValueType::FuncRef),
            REF_EXTERN => Some(ValueType::ExternRef),
            _ => None,
        }
    }

    pub fn wire_byte(&self) -> u8 {
        match self {
            ValueType::I32 => VAL_I32,
            ValueType::I64 => VAL_I64,
            ValueType::F32 => VAL_F32,
            ValueType::F64 => VAL_F64,
            ValueType::V128 => VAL_V128,
            ValueType::FuncRef => REF_FUNC,
            ValueType::ExternRef => REF_EXTERN,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ValueType::I32 => "i32",
                ValueType::I64 => "i64",
                ValueType::F64 => "f64",
                ValueType::F32 => "f32",
                ValueType::V128 => "v128",
                ValueType::FuncRef => "funcref",
                ValueType::ExternRef => "externref",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(min: u32, max: Option<u32>) -> Limits {
        Limits { min, max }
    }

    #[test]
    fn index_tables_place_imports_first() {
        let mut module = Module::new();
        module.types.push(FunctionType {
            parameters: vec![],
            return_types: vec![],
        });
        module.imports.push(Import {
            module: "env".to_string(),
            name: "f".to_string(),
            desc: ImportDesc::Function(0),
        });
        module.imports.push(Import {
            module: "env".to_string(),
            name: "g".to_string(),
            desc: ImportDesc::Global(GlobalType {
                value_type: ValueType::I64,
                mutable: false,
            }),
        });
        module.functions.push(Function { ftype_index: 0 });
        module.memories.push(MemoryType {
            limits: limits(1, None),
            shared: false,
        });
        module.globals.push(Global {
            global_type: GlobalType {
                value_type: ValueType::F64,
                mutable: true,
            },
            init: ConstExpr(vec![ConstInstruction::F64Const(1.2)]),
        });

        let tables = module.index_tables();
        assert_eq!(tables.functions, vec![0, 0]);
        assert_eq!(tables.len(ExternalKind::Table), 0);
        assert_eq!(tables.len(ExternalKind::Memory), 1);
        assert_eq!(tables.globals[0].value_type, ValueType::I64);
        assert_eq!(tables.globals[1].value_type, ValueType::F64);
        assert!(tables.contains(ExternalKind::Global, 1));
        assert!(!tables.contains(ExternalKind::Global, 2));
    }

    #[test]
    fn kind_round_trips_through_wire_byte() {
        for kind in [
            ExternalKind::Function,
            ExternalKind::Table,
            ExternalKind::Memory,
            ExternalKind::Global,
        ] {
            assert_eq!(ExternalKind::decode(kind.wire_byte()), Some(kind));
        }
        assert_eq!(ExternalKind::decode(0x04), None);
    }

    #[test]
    fn display_formats() {
        assert_eq!(ExternalKind::Memory.to_string(), "memory");
        let ft = FunctionType {
            parameters: vec![ValueType::I64],
            return_types: vec![ValueType::I64],
        };
        assert_eq!(ft.to_string(), "(i64) -> i64");
        let mem = MemoryType {
            limits: limits(0, Some(256)),
            shared: true,
        };
        assert_eq!(mem.to_string(), "pages: initial=0 max=256 shared");
    }
}
