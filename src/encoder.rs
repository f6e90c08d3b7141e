//! Encodes a [`Module`] to WebAssembly binary format (`.wasm`), and builds
//! modules entity by entity.
//!
//! This is the conceptual inverse of [`crate::parser::parse`]. Sections are emitted
//! in canonical order and only when non-empty; every local function receives an
//! empty body.
//!
//! # Example
//!
//! ```
//! use wasm_reflect::encoder::ModuleBuilder;
//! use wasm_reflect::parser::module::{ExternalKind, ValueType};
//! use wasm_reflect::ModuleHandle;
//!
//! let mut builder = ModuleBuilder::new();
//! let sig = builder.add_type(&[ValueType::I64], &[ValueType::I64]);
//! let id = builder.add_function(sig);
//! builder.add_export("id", ExternalKind::Function, id);
//!
//! let bytes = builder.to_bytes();
//! assert_eq!(&bytes[0..4], b"\0asm");
//!
//! let handle = ModuleHandle::compile(&bytes).unwrap();
//! assert_eq!(handle.exports()[0].name, "id");
//! ```

use crate::parser::encoding::*;
use crate::parser::module::{
    ConstExpr, ConstInstruction, CustomSection, ExternalKind, Function, FunctionType, Global, GlobalType, Import,
    ImportDesc, Limits, MemoryType, Module, RawExport, RefType, TableType, ValueType,
};

// ===========================================================================
// Public API
// ===========================================================================

/// Encodes a module to binary format. Raw export kind bytes are written as given.
pub fn encode(module: &Module) -> Vec<u8> {
    let mut buf = Vec::new();

    write_u32(&mut buf, MAGIC);
    write_u32(&mut buf, VERSION);

    encode_type_section(&mut buf, module);
    encode_import_section(&mut buf, module);
    encode_function_section(&mut buf, module);
    encode_table_section(&mut buf, module);
    encode_memory_section(&mut buf, module);
    encode_global_section(&mut buf, module);
    encode_export_section(&mut buf, module);
    encode_start_section(&mut buf, module);
    encode_code_section(&mut buf, module);
    encode_custom_sections(&mut buf, module);

    buf
}

/// Incrementally assembles a module. Each `add_*` returns the new entity's index in
/// its index space, counting imports of the same kind first.
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new() -> ModuleBuilder {
        ModuleBuilder::default()
    }

    pub fn add_type(&mut self, parameters: &[ValueType], return_types: &[ValueType]) -> u32 {
        self.module.types.push(FunctionType {
            parameters: parameters.to_vec(),
            return_types: return_types.to_vec(),
        });
        self.module.types.len() as u32 - 1
    }

    pub fn add_import(&mut self, module: &str, name: &str, desc: ImportDesc) -> u32 {
        let import = Import {
            module: module.to_string(),
            name: name.to_string(),
            desc,
        };
        let kind = import.kind();
        self.module.imports.push(import);
        self.count(kind) - 1
    }

    pub fn add_function(&mut self, ftype_index: u32) -> u32 {
        self.module.functions.push(Function { ftype_index });
        self.count(ExternalKind::Function) - 1
    }

    pub fn add_table(&mut self, ref_type: RefType, min: u32, max: Option<u32>) -> u32 {
        self.module.tables.push(TableType {
            ref_type,
            limits: Limits { min, max },
        });
        self.count(ExternalKind::Table) - 1
    }

    pub fn add_memory(&mut self, min: u32, max: Option<u32>, shared: bool) -> u32 {
        self.module.memories.push(MemoryType {
            limits: Limits { min, max },
            shared,
        });
        self.count(ExternalKind::Memory) - 1
    }

    pub fn add_global(&mut self, value_type: ValueType, mutable: bool, init: ConstInstruction) -> u32 {
        self.module.globals.push(Global {
            global_type: GlobalType { value_type, mutable },
            init: ConstExpr(vec![init]),
        });
        self.count(ExternalKind::Global) - 1
    }

    pub fn add_export(&mut self, name: &str, kind: ExternalKind, index: u32) -> &mut Self {
        self.add_raw_export(name, kind.wire_byte(), index)
    }

    /// Adds an export entry with an arbitrary descriptor byte, unchecked.
    pub fn add_raw_export(&mut self, name: &str, kind: u8, index: u32) -> &mut Self {
        self.module.exports.push(RawExport {
            name: name.to_string(),
            kind,
            index,
            offset: 0,
        });
        self
    }

    pub fn set_start(&mut self, function_index: u32) -> &mut Self {
        self.module.start = Some(function_index);
        self
    }

    pub fn add_custom_section(&mut self, name: &str, data: &[u8]) -> &mut Self {
        self.module.custom.push(CustomSection {
            name: name.to_string(),
            data: data.to_vec(),
        });
        self
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode(&self.module)
    }

    fn count(&self, kind: ExternalKind) -> u32 {
        let imported = self.module.imports.iter().filter(|i| i.kind() == kind).count();
        let local = match kind {
            ExternalKind::Function => self.module.functions.len(),
            ExternalKind::Table => self.module.tables.len(),
            ExternalKind::Memory => self.module.memories.len(),
            ExternalKind::Global => self.module.globals.len(),
        };
        (imported + local) as u32
    }
}

// ===========================================================================
// Section encoders (in wire order)
// ===========================================================================

/// ```text
/// typesec ::= section_1(vec(functype))
/// functype ::= 0x60 vec(valtype) vec(valtype)
/// ```
fn encode_type_section(buf: &mut Vec<u8>, module: &Module) {
    let types = &module.types;
    if types.is_empty() {
        return;
    }

    let mut contents = Vec::new();
    write_vu32(&mut contents, types.len() as u32);
    for ft in types {
        contents.push(TYPE_FUNC);
        write_vu32(&mut contents, ft.parameters.len() as u32);
        contents.extend(ft.parameters.iter().map(ValueType::wire_byte));
        write_vu32(&mut contents, ft.return_types.len() as u32);
        contents.extend(ft.return_types.iter().map(ValueType::wire_byte));
    }
    emit_section(buf, SECTION_TYPE, &contents);
}

/// ```text
/// importsec ::= section_2(vec(import))
/// import    ::= module:name name:name importdesc
/// importdesc ::= 0x00 typeidx | 0x01 tabletype | 0x02 memtype | 0x03 globaltype
/// ```
fn encode_import_section(buf: &mut Vec<u8>, module: &Module) {
    let imports = &module.imports;
    if imports.is_empty() {
        return;
    }

    let mut contents = Vec::new();
    write_vu32(&mut contents, imports.len() as u32);
    for imp in imports {
        write_name(&mut contents, &imp.module);
        write_name(&mut contents, &imp.name);
        contents.push(imp.kind().wire_byte());
        match &imp.desc {
            ImportDesc::Function(type_idx) => write_vu32(&mut contents, *type_idx),
            ImportDesc::Table(table_type) => emit_table_type(&mut contents, table_type),
            ImportDesc::Memory(memory_type) => emit_memory_type(&mut contents, memory_type),
            ImportDesc::Global(global_type) => emit_global_type(&mut contents, global_type),
        }
    }
    emit_section(buf, SECTION_IMPORT, &contents);
}

/// ```text
/// funcsec ::= section_3(vec(typeidx))
/// ```
fn encode_function_section(buf: &mut Vec<u8>, module: &Module) {
    let functions = &module.functions;
    if functions.is_empty() {
        return;
    }

    let mut contents = Vec::new();
    write_vu32(&mut contents, functions.len() as u32);
    for func in functions {
        write_vu32(&mut contents, func.ftype_index);
    }
    emit_section(buf, SECTION_FUNCTION, &contents);
}

fn encode_table_section(buf: &mut Vec<u8>, module: &Module) {
    let tables = &module.tables;
    if tables.is_empty() {
        return;
    }

    let mut contents = Vec::new();
    write_vu32(&mut contents, tables.len() as u32);
    for table in tables {
        emit_table_type(&mut contents, table);
    }
    emit_section(buf, SECTION_TABLE, &contents);
}

fn encode_memory_section(buf: &mut Vec<u8>, module: &Module) {
    let memories = &module.memories;
    if memories.is_empty() {
        return;
    }

    let mut contents = Vec::new();
    write_vu32(&mut contents, memories.len() as u32);
    for mem in memories {
        emit_memory_type(&mut contents, mem);
    }
    emit_section(buf, SECTION_MEMORY, &contents);
}

/// ```text
/// globalsec  ::= section_6(vec(global))
/// global     ::= globaltype expr
/// ```
fn encode_global_section(buf: &mut Vec<u8>, module: &Module) {
    let globals = &module.globals;
    if globals.is_empty() {
        return;
    }

    let mut contents = Vec::new();
    write_vu32(&mut contents, globals.len() as u32);
    for global in globals {
        emit_global_type(&mut contents, &global.global_type);
        emit_const_expr(&mut contents, &global.init);
    }
    emit_section(buf, SECTION_GLOBAL, &contents);
}

/// ```text
/// exportsec  ::= section_7(vec(export))
/// export     ::= name exportdesc
/// exportdesc ::= 0x00 funcidx | 0x01 tableidx | 0x02 memidx | 0x03 globalidx
/// ```
fn encode_export_section(buf: &mut Vec<u8>, module: &Module) {
    let exports = &module.exports;
    if exports.is_empty() {
        return;
    }

    let mut contents = Vec::new();
    write_vu32(&mut contents, exports.len() as u32);
    for export in exports {
        write_name(&mut contents, &export.name);
        contents.push(export.kind);
        write_vu32(&mut contents, export.index);
    }
    emit_section(buf, SECTION_EXPORT, &contents);
}

fn encode_start_section(buf: &mut Vec<u8>, module: &Module) {
    if let Some(start) = module.start {
        let mut contents = Vec::new();
        write_vu32(&mut contents, start);
        emit_section(buf, SECTION_START, &contents);
    }
}

/// Every local function gets the body `0 locals, end`.
fn encode_code_section(buf: &mut Vec<u8>, module: &Module) {
    let functions = &module.functions;
    if functions.is_empty() {
        return;
    }

    let mut contents = Vec::new();
    write_vu32(&mut contents, functions.len() as u32);
    for _ in functions {
        let body = [0x00, OP_END];
        write_vu32(&mut contents, body.len() as u32);
        contents.extend_from_slice(&body);
    }
    emit_section(buf, SECTION_CODE, &contents);
}

fn encode_custom_sections(buf: &mut Vec<u8>, module: &Module) {
    for section in &module.custom {
        let mut contents = Vec::new();
        write_name(&mut contents, &section.name);
        contents.extend_from_slice(&section.data);
        emit_section(buf, SECTION_CUSTOM, &contents);
    }
}

// ===========================================================================
// Helpers
// ===========================================================================

fn emit_section(buf: &mut Vec<u8>, id: u8, contents: &[u8]) {
    buf.push(id);
    write_vu32(buf, contents.len() as u32);
    buf.extend_from_slice(contents);
}

fn emit_table_type(buf: &mut Vec<u8>, table_type: &TableType) {
    buf.push(table_type.ref_type.wire_byte());
    match table_type.limits.max {
        Some(max) => {
            buf.push(LIMITS_MIN_MAX);
            write_vu32(buf, table_type.limits.min);
            write_vu32(buf, max);
        }
        None => {
            buf.push(LIMITS_MIN);
            write_vu32(buf, table_type.limits.min);
        }
    }
}

/// A shared memory without a maximum is written with flag 0x02, which the parser rejects.
fn emit_memory_type(buf: &mut Vec<u8>, memory_type: &MemoryType) {
    let flags = match (memory_type.shared, memory_type.limits.max) {
        (false, None) => LIMITS_MIN,
        (false, Some(_)) => LIMITS_MIN_MAX,
        (true, None) => LIMITS_SHARED_MIN,
        (true, Some(_)) => LIMITS_SHARED_MIN_MAX,
    };
    buf.push(flags);
    write_vu32(buf, memory_type.limits.min);
    if let Some(max) = memory_type.limits.max {
        write_vu32(buf, max);
    }
}

fn emit_global_type(buf: &mut Vec<u8>, global_type: &GlobalType) {
    buf.push(global_type.value_type.wire_byte());
    buf.push(if global_type.mutable { MUT_VAR } else { MUT_CONST });
}

fn emit_const_expr(buf: &mut Vec<u8>, expr: &ConstExpr) {
    for instruction in &expr.0 {
        match *instruction {
            ConstInstruction::I32Const(v) => {
                buf.push(OP_I32_CONST);
                write_vs32(buf, v);
            }
            ConstInstruction::I64Const(v) => {
                buf.push(OP_I64_CONST);
                write_vs64(buf, v);
            }
            ConstInstruction::F32Const(v) => {
                buf.push(OP_F32_CONST);
                write_f32(buf, v);
            }
            ConstInstruction::F64Const(v) => {
                buf.push(OP_F64_CONST);
                write_f64(buf, v);
            }
            ConstInstruction::GlobalGet(idx) => {
                buf.push(OP_GLOBAL_GET);
                write_vu32(buf, idx);
            }
            ConstInstruction::RefNull(rt) => {
                buf.push(OP_REF_NULL);
                buf.push(rt.wire_byte());
            }
            ConstInstruction::RefFunc(idx) => {
                buf.push(OP_REF_FUNC);
                write_vu32(buf, idx);
            }
            ConstInstruction::I32Add => buf.push(OP_I32_ADD),
            ConstInstruction::I32Sub => buf.push(OP_I32_SUB),
            ConstInstruction::I32Mul => buf.push(OP_I32_MUL),
            ConstInstruction::I64Add => buf.push(OP_I64_ADD),
            ConstInstruction::I64Sub => buf.push(OP_I64_SUB),
            ConstInstruction::I64Mul => buf.push(OP_I64_MUL),
        }
    }
    buf.push(OP_END);
}
