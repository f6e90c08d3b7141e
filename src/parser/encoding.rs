//! Binary format constants and encoding primitives.
//!
//! The writers append directly into a caller-provided `&mut Vec<u8>`; they are the
//! inverse of the corresponding [`super::reader::Reader`] methods.

use byteorder::{ByteOrder, LittleEndian};

// ---------------------------------------------------------------------------
// WebAssembly binary format constants (core format, chapter 5)
// ---------------------------------------------------------------------------

// Preamble (§5.5.16)
pub const MAGIC: u32 = 0x6d736100; // '\0asm'
pub const VERSION: u32 = 1;

// Section IDs (§5.5.2)
pub const SECTION_CUSTOM: u8 = 0;
pub const SECTION_TYPE: u8 = 1;
pub const SECTION_IMPORT: u8 = 2;
pub const SECTION_FUNCTION: u8 = 3;
pub const SECTION_TABLE: u8 = 4;
pub const SECTION_MEMORY: u8 = 5;
pub const SECTION_GLOBAL: u8 = 6;
pub const SECTION_EXPORT: u8 = 7;
pub const SECTION_START: u8 = 8;
pub const SECTION_ELEMENT: u8 = 9;
pub const SECTION_CODE: u8 = 10;
pub const SECTION_DATA: u8 = 11;
pub const SECTION_DATA_COUNT: u8 = 12;

// Type constructors (§5.3.6)
pub const TYPE_FUNC: u8 = 0x60;

// Value types (§5.3.1 - §5.3.3)
pub const VAL_I32: u8 = 0x7f;
pub const VAL_I64: u8 = 0x7e;
pub const VAL_F32: u8 = 0x7d;
pub const VAL_F64: u8 = 0x7c;
pub const VAL_V128: u8 = 0x7b;
pub const REF_FUNC: u8 = 0x70;
pub const REF_EXTERN: u8 = 0x6f;

// Import/export descriptor kinds (§5.5.5, §5.5.10)
pub const DESC_FUNC: u8 = 0x00;
pub const DESC_TABLE: u8 = 0x01;
pub const DESC_MEMORY: u8 = 0x02;
pub const DESC_GLOBAL: u8 = 0x03;

// Limits flags (§5.3.7, threads proposal for the shared bit)
pub const LIMITS_MIN: u8 = 0x00;
pub const LIMITS_MIN_MAX: u8 = 0x01;
pub const LIMITS_SHARED_MIN: u8 = 0x02;
pub const LIMITS_SHARED_MIN_MAX: u8 = 0x03;

// Global mutability (§5.3.10)
pub const MUT_CONST: u8 = 0x00;
pub const MUT_VAR: u8 = 0x01;

// Opcodes allowed in constant expressions (§5.4)
pub const OP_END: u8 = 0x0b;
pub const OP_GLOBAL_GET: u8 = 0x23;
pub const OP_I32_CONST: u8 = 0x41;
pub const OP_I64_CONST: u8 = 0x42;
pub const OP_F32_CONST: u8 = 0x43;
pub const OP_F64_CONST: u8 = 0x44;
pub const OP_I32_ADD: u8 = 0x6a;
pub const OP_I32_SUB: u8 = 0x6b;
pub const OP_I32_MUL: u8 = 0x6c;
pub const OP_I64_ADD: u8 = 0x7c;
pub const OP_I64_SUB: u8 = 0x7d;
pub const OP_I64_MUL: u8 = 0x7e;
pub const OP_REF_NULL: u8 = 0xd0;
pub const OP_REF_FUNC: u8 = 0xd2;

// ---------------------------------------------------------------------------
// LEB128
// ---------------------------------------------------------------------------

/// Appends the unsigned LEB128 encoding of a u32 value to `buf`.
pub fn write_vu32(buf: &mut Vec<u8>, v: u32) {
    let mut value = v;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

fn write_vs(buf: &mut Vec<u8>, mut value: i64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if (value == 0 && (byte & 0x40) == 0) || (value == -1 && (byte & 0x40) != 0) {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

pub fn write_vs32(buf: &mut Vec<u8>, v: i32) {
    write_vs(buf, v as i64);
}

pub fn write_vs64(buf: &mut Vec<u8>, v: i64) {
    write_vs(buf, v);
}

// ---------------------------------------------------------------------------
// Fixed width
// ---------------------------------------------------------------------------

pub fn write_u32(buf: &mut Vec<u8>, v: u32) {
    let mut bytes = [0u8; 4];
    LittleEndian::write_u32(&mut bytes, v);
    buf.extend_from_slice(&bytes);
}

pub fn write_f32(buf: &mut Vec<u8>, v: f32) {
    let mut bytes = [0u8; 4];
    LittleEndian::write_f32(&mut bytes, v);
    buf.extend_from_slice(&bytes);
}

pub fn write_f64(buf: &mut Vec<u8>, v: f64) {
    let mut bytes = [0u8; 8];
    LittleEndian::write_f64(&mut bytes, v);
    buf.extend_from_slice(&bytes);
}

/// Appends a UTF-8 name as a length-prefixed byte vector.
pub fn write_name(buf: &mut Vec<u8>, name: &str) {
    write_vu32(buf, name.len() as u32);
    buf.extend_from_slice(name.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::reader::Reader;

    fn encode_vu32(v: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vu32(&mut buf, v);
        buf
    }

    fn encode_vs32(v: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vs32(&mut buf, v);
        buf
    }

    #[test]
    fn test_write_vu32() {
        assert_eq!(encode_vu32(0), vec![0]);
        assert_eq!(encode_vu32(624485), vec![0b11100101, 0b10001110, 0b00100110]);
        assert_eq!(encode_vu32(16256), vec![0x80, 0x7f]);
        assert_eq!(encode_vu32(0xffffffff), vec![0xff, 0xff, 0xff, 0xff, 0xf]);
        assert_eq!(encode_vu32(0x80000000), vec![128, 128, 128, 128, 8]);
    }

    #[test]
    fn test_write_vs32() {
        assert_eq!(encode_vs32(-1), vec![0x7f]);
        assert_eq!(encode_vs32(-128), vec![0x80, 0x7f]);
        assert_eq!(encode_vs32(-624485), vec![0b10011011, 0b11110001, 0b01011001]);
        assert_eq!(encode_vs32(i32::MIN), vec![128, 128, 128, 128, 120]);
    }

    #[test]
    fn test_writers_agree_with_reader() {
        let mut buf = Vec::new();
        write_vu32(&mut buf, u32::MAX);
        write_vs32(&mut buf, i32::MIN);
        write_vs64(&mut buf, i64::MIN);
        write_u32(&mut buf, MAGIC);
        write_f64(&mut buf, 1.2);
        write_name(&mut buf, "global2");

        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_vu32().unwrap(), u32::MAX);
        assert_eq!(reader.read_vs32().unwrap(), i32::MIN);
        assert_eq!(reader.read_vs64().unwrap(), i64::MIN);
        assert_eq!(reader.read_u32().unwrap(), MAGIC);
        assert_eq!(reader.read_f64().unwrap(), 1.2);
        assert_eq!(reader.read_name().unwrap(), "global2");
        assert!(reader.is_empty());
    }
}
