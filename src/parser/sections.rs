//! Per-section decoders.
//!
//! Each reader receives a [`Reader`] bounded to the section body; the caller checks
//! that the body was consumed exactly.

use log::trace;

use super::encoding::*;
use super::error::{ParseError, ParseErrorKind};
use super::module::{
    ConstExpr, ConstInstruction, CustomSection, Function, FunctionType, Global, GlobalType, Import, ImportDesc,
    Limits, MemoryType, Module, RawExport, RefType, TableType, ValueType,
};
use super::reader::Reader;
use crate::config::ParseConfig;

/* HELPERS ********************************************************/

/// Reads a vector length and checks it against `limit`.
fn read_count(bytes: &mut Reader, limit: u32, what: &'static str) -> Result<u32, ParseError> {
    let offset = bytes.offset();
    let count = bytes.read_vu32()?;
    if count > limit {
        return Err(ParseError::new(
            ParseErrorKind::LimitExceeded { what, count, limit },
            offset,
        ));
    }
    Ok(count)
}

fn read_value_type(bytes: &mut Reader) -> Result<ValueType, ParseError> {
    let offset = bytes.offset();
    let byte = bytes.read_byte()?;
    ValueType::decode(byte).ok_or_else(|| ParseError::new(ParseErrorKind::MalformedValueType(byte), offset))
}

fn read_result_types(bytes: &mut Reader, config: &ParseConfig) -> Result<Vec<ValueType>, ParseError> {
    let count = read_count(bytes, config.max_function_params, "parameters or results")?;
    (0..count).map(|_| read_value_type(bytes)).collect()
}

fn read_ref_type(bytes: &mut Reader) -> Result<RefType, ParseError> {
    let offset = bytes.offset();
    let byte = bytes.read_byte()?;
    RefType::decode(byte).ok_or_else(|| ParseError::new(ParseErrorKind::MalformedRefType(byte), offset))
}

/// ```text
/// limits ::= 0x00 min:u32 | 0x01 min:u32 max:u32
/// ```
fn read_table_limits(bytes: &mut Reader) -> Result<Limits, ParseError> {
    let offset = bytes.offset();
    match bytes.read_byte()? {
        LIMITS_MIN => Ok(Limits {
            min: bytes.read_vu32()?,
            max: None,
        }),
        LIMITS_MIN_MAX => Ok(Limits {
            min: bytes.read_vu32()?,
            max: Some(bytes.read_vu32()?),
        }),
        flags => Err(ParseError::new(ParseErrorKind::MalformedLimitsFlags(flags), offset)),
    }
}

fn read_table_type(bytes: &mut Reader) -> Result<TableType, ParseError> {
    let ref_type = read_ref_type(bytes)?;
    let limits = read_table_limits(bytes)?;
    Ok(TableType { ref_type, limits })
}

/// Memory limits additionally accept the threads proposal's shared flag, which
/// requires a maximum.
fn read_memory_type(bytes: &mut Reader) -> Result<MemoryType, ParseError> {
    let offset = bytes.offset();
    let flags = bytes.read_byte()?;
    let (shared, has_max) = match flags {
        LIMITS_MIN => (false, false),
        LIMITS_MIN_MAX => (false, true),
        LIMITS_SHARED_MIN_MAX => (true, true),
        LIMITS_SHARED_MIN => {
            return Err(ParseError::new(ParseErrorKind::SharedMemoryWithoutMaximum, offset));
        }
        _ => return Err(ParseError::new(ParseErrorKind::MalformedLimitsFlags(flags), offset)),
    };
    let min = bytes.read_vu32()?;
    let max = if has_max { Some(bytes.read_vu32()?) } else { None };
    Ok(MemoryType {
        limits: Limits { min, max },
        shared,
    })
}

fn read_global_type(bytes: &mut Reader) -> Result<GlobalType, ParseError> {
    let value_type = read_value_type(bytes)?;
    let offset = bytes.offset();
    let mutable = match bytes.read_byte()? {
        MUT_CONST => false,
        MUT_VAR => true,
        byte => return Err(ParseError::new(ParseErrorKind::MalformedMutability(byte), offset)),
    };
    Ok(GlobalType { value_type, mutable })
}

fn read_type_index(bytes: &mut Reader, module: &Module) -> Result<u32, ParseError> {
    let offset = bytes.offset();
    let index = bytes.read_vu32()?;
    if index as usize >= module.types.len() {
        return Err(ParseError::new(ParseErrorKind::UnknownType { index }, offset));
    }
    Ok(index)
}

/// Reads instructions up to and including `end`. Only the constant instructions are
/// decoded; anything else is malformed here.
fn read_const_expr(bytes: &mut Reader) -> Result<ConstExpr, ParseError> {
    let mut instructions = Vec::new();
    loop {
        let offset = bytes.offset();
        let instruction = match bytes.read_byte()? {
            OP_END => break,
            OP_I32_CONST => ConstInstruction::I32Const(bytes.read_vs32()?),
            OP_I64_CONST => ConstInstruction::I64Const(bytes.read_vs64()?),
            OP_F32_CONST => ConstInstruction::F32Const(bytes.read_f32()?),
            OP_F64_CONST => ConstInstruction::F64Const(bytes.read_f64()?),
            OP_GLOBAL_GET => ConstInstruction::GlobalGet(bytes.read_vu32()?),
            OP_REF_NULL => ConstInstruction::RefNull(read_ref_type(bytes)?),
            OP_REF_FUNC => ConstInstruction::RefFunc(bytes.read_vu32()?),
            OP_I32_ADD => ConstInstruction::I32Add,
            OP_I32_SUB => ConstInstruction::I32Sub,
            OP_I32_MUL => ConstInstruction::I32Mul,
            OP_I64_ADD => ConstInstruction::I64Add,
            OP_I64_SUB => ConstInstruction::I64Sub,
            OP_I64_MUL => ConstInstruction::I64Mul,
            op => return Err(ParseError::new(ParseErrorKind::IllegalConstOpcode(op), offset)),
        };
        instructions.push(instruction);
    }
    Ok(ConstExpr(instructions))
}

/* SECTION READERS ************************************************/

/// ```text
/// typesec  ::= section_1(vec(functype))
/// functype ::= 0x60 vec(valtype) vec(valtype)
/// ```
pub fn read_section_type(bytes: &mut Reader, module: &mut Module, config: &ParseConfig) -> Result<(), ParseError> {
    let count = read_count(bytes, config.max_types, "types")?;

    for _ in 0..count {
        let offset = bytes.offset();
        let form = bytes.read_byte()?;
        if form != TYPE_FUNC {
            return Err(ParseError::new(ParseErrorKind::MalformedFunctionType(form), offset));
        }
        let parameters = read_result_types(bytes, config)?;
        let return_types = read_result_types(bytes, config)?;
        module.types.push(FunctionType {
            parameters,
            return_types,
        });
    }

    Ok(())
}

/// ```text
/// importsec  ::= section_2(vec(import))
/// import     ::= module:name name:name importdesc
/// importdesc ::= 0x00 typeidx | 0x01 tabletype | 0x02 memtype | 0x03 globaltype
/// ```
pub fn read_section_import(bytes: &mut Reader, module: &mut Module, config: &ParseConfig) -> Result<(), ParseError> {
    let count = read_count(bytes, config.max_imports, "imports")?;

    for _ in 0..count {
        let module_name = bytes.read_name()?;
        let name = bytes.read_name()?;
        let offset = bytes.offset();
        let desc = match bytes.read_byte()? {
            DESC_FUNC => ImportDesc::Function(read_type_index(bytes, module)?),
            DESC_TABLE => ImportDesc::Table(read_table_type(bytes)?),
            DESC_MEMORY => ImportDesc::Memory(read_memory_type(bytes)?),
            DESC_GLOBAL => ImportDesc::Global(read_global_type(bytes)?),
            kind => return Err(ParseError::new(ParseErrorKind::MalformedImportKind(kind), offset)),
        };
        trace!("import {}.{} {}", module_name, name, desc);
        module.imports.push(Import {
            module: module_name,
            name,
            desc,
        });
    }

    Ok(())
}

/// ```text
/// funcsec ::= section_3(vec(typeidx))
/// ```
pub fn read_section_function(
    bytes: &mut Reader,
    module: &mut Module,
    config: &ParseConfig,
) -> Result<(), ParseError> {
    let count = read_count(bytes, config.max_functions, "functions")?;

    for _ in 0..count {
        let ftype_index = read_type_index(bytes, module)?;
        module.functions.push(Function { ftype_index });
    }

    Ok(())
}

/// ```text
/// tablesec ::= section_4(vec(tabletype))
/// ```
pub fn read_section_table(bytes: &mut Reader, module: &mut Module, config: &ParseConfig) -> Result<(), ParseError> {
    let count = read_count(bytes, config.max_tables, "tables")?;

    for _ in 0..count {
        module.tables.push(read_table_type(bytes)?);
    }

    Ok(())
}

/// ```text
/// memsec ::= section_5(vec(memtype))
/// ```
pub fn read_section_memory(bytes: &mut Reader, module: &mut Module, config: &ParseConfig) -> Result<(), ParseError> {
    let count = read_count(bytes, config.max_memories, "memories")?;

    for _ in 0..count {
        module.memories.push(read_memory_type(bytes)?);
    }

    Ok(())
}

/// ```text
/// globalsec ::= section_6(vec(global))
/// global    ::= globaltype expr
/// ```
pub fn read_section_global(bytes: &mut Reader, module: &mut Module, config: &ParseConfig) -> Result<(), ParseError> {
    let count = read_count(bytes, config.max_globals, "globals")?;

    for _ in 0..count {
        let global_type = read_global_type(bytes)?;
        let init = read_const_expr(bytes)?;
        module.globals.push(Global { global_type, init });
    }

    Ok(())
}

/// ```text
/// exportsec ::= section_7(vec(export))
/// export    ::= nm:name d:byte i:u32
/// ```
///
/// Every section contributing to an index space precedes this one, so each entry's
/// kind and index are checked as soon as it is read.
pub fn read_section_export(bytes: &mut Reader, module: &mut Module, config: &ParseConfig) -> Result<(), ParseError> {
    let count = read_count(bytes, config.max_exports, "exports")?;
    let tables = module.index_tables();

    for _ in 0..count {
        let offset = bytes.offset();
        let name = bytes.read_name()?;
        let kind = bytes.read_byte()?;
        let index = bytes.read_vu32()?;
        let entry = RawExport {
            name,
            kind,
            index,
            offset,
        };
        entry.resolve(&tables)?;
        module.exports.push(entry);
    }

    Ok(())
}

pub fn read_section_start(bytes: &mut Reader, module: &mut Module) -> Result<(), ParseError> {
    module.start = Some(bytes.read_vu32()?);
    Ok(())
}

pub fn read_section_data_count(bytes: &mut Reader, module: &mut Module) -> Result<(), ParseError> {
    module.data_count = Some(bytes.read_vu32()?);
    Ok(())
}

/// ```text
/// codesec ::= section_10(vec(code))
/// code    ::= size:u32 func
/// ```
///
/// Bodies are skipped; only the entry count and the body sizes are checked.
pub fn read_section_code(bytes: &mut Reader, module: &mut Module, config: &ParseConfig) -> Result<(), ParseError> {
    let count = read_count(bytes, config.max_functions, "function bodies")?;

    for _ in 0..count {
        let size = bytes.read_vu32()?;
        bytes.read_bytes(size as usize)?;
    }

    module.code_count = Some(count);
    Ok(())
}

/// Segments are skipped; the count is kept to check against the data count section.
pub fn read_section_data(bytes: &mut Reader, module: &mut Module) -> Result<(), ParseError> {
    module.data_segments = Some(bytes.read_vu32()?);
    skip_rest(bytes)
}

pub fn skip_rest(bytes: &mut Reader) -> Result<(), ParseError> {
    bytes.read_bytes(bytes.remaining())?;
    Ok(())
}

/// ```text
/// customsec ::= section_0(name byte*)
/// ```
pub fn read_section_custom(bytes: &mut Reader, module: &mut Module, config: &ParseConfig) -> Result<(), ParseError> {
    let offset = bytes.offset();
    let count = module.custom.len() as u32 + 1;
    if count > config.max_custom_sections {
        return Err(ParseError::new(
            ParseErrorKind::LimitExceeded {
                what: "custom sections",
                count,
                limit: config.max_custom_sections,
            },
            offset,
        ));
    }

    let name = bytes.read_name()?;
    let data = bytes.read_bytes(bytes.remaining())?.to_vec();
    module.custom.push(CustomSection { name, data });
    Ok(())
}
