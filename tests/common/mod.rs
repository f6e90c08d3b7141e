//! Common test utilities shared between integration tests

#![allow(dead_code)]

use wasm_reflect::encoder::ModuleBuilder;
use wasm_reflect::parser::module::{ConstInstruction, RefType, ValueType};
use wasm_reflect::ExternalKind;

/// Decodes a hex fixture; spaces and newlines are ignored.
pub fn wasm(fixture: &str) -> Vec<u8> {
    let text: String = fixture.split_whitespace().collect();
    hex::decode(text).unwrap_or_else(|e| panic!("bad hex fixture {fixture:?}: {e}"))
}

/// Preamble followed by the given section bytes (hex).
pub fn module_hex(sections: &str) -> Vec<u8> {
    wasm(&format!("0061736d 01000000 {sections}"))
}

/// Two zero-argument functions, a one-element funcref table, mutable globals
/// `i32 = 7` and `f64 = 1.2`, and a shared memory (0..256 pages), exported as
/// fn, fn2, table, global, global2, memory.
pub fn mixed_exports_module() -> Vec<u8> {
    let mut builder = ModuleBuilder::new();
    let sig = builder.add_type(&[], &[]);
    let f0 = builder.add_function(sig);
    let f1 = builder.add_function(sig);
    let table = builder.add_table(RefType::FuncRef, 1, None);
    let memory = builder.add_memory(0, Some(256), true);
    let g0 = builder.add_global(ValueType::I32, true, ConstInstruction::I32Const(7));
    let g1 = builder.add_global(ValueType::F64, true, ConstInstruction::F64Const(1.2));

    builder
        .add_export("fn", ExternalKind::Function, f0)
        .add_export("fn2", ExternalKind::Function, f1)
        .add_export("table", ExternalKind::Table, table)
        .add_export("global", ExternalKind::Global, g0)
        .add_export("global2", ExternalKind::Global, g1)
        .add_export("memory", ExternalKind::Memory, memory);

    builder.to_bytes()
}
