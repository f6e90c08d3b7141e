//! Decode errors raised while reading a module binary.
//!
//! Messages follow the wording of the WebAssembly reference interpreter so that
//! assertions written against `assert_malformed` texts can match on them.

use super::module::ExternalKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected end")]
    UnexpectedEnd,

    #[error("integer representation too long")]
    IntegerTooLong,

    #[error("integer too large")]
    IntegerTooLarge,

    #[error("malformed UTF-8 encoding")]
    InvalidUtf8,

    #[error("magic header not detected")]
    BadMagic,

    #[error("unknown binary version: {0}")]
    UnknownVersion(u32),

    #[error("malformed section id: {0}")]
    MalformedSectionId(u8),

    #[error("duplicate section: {0}")]
    DuplicateSection(u8),

    #[error("section out of order: {0}")]
    SectionOutOfOrder(u8),

    #[error("section size mismatch: {0} bytes left over")]
    SectionSizeMismatch(usize),

    #[error("malformed function type: 0x{0:02x}")]
    MalformedFunctionType(u8),

    #[error("malformed value type: 0x{0:02x}")]
    MalformedValueType(u8),

    #[error("malformed reference type: 0x{0:02x}")]
    MalformedRefType(u8),

    #[error("malformed limits flags: 0x{0:02x}")]
    MalformedLimitsFlags(u8),

    #[error("shared memory must have maximum")]
    SharedMemoryWithoutMaximum,

    #[error("malformed mutability: 0x{0:02x}")]
    MalformedMutability(u8),

    #[error("malformed import kind: 0x{0:02x}")]
    MalformedImportKind(u8),

    #[error("malformed export kind: 0x{0:02x}")]
    MalformedExportKind(u8),

    #[error("illegal opcode in constant expression: 0x{0:02x}")]
    IllegalConstOpcode(u8),

    #[error("unknown type {index}")]
    UnknownType { index: u32 },

    #[error("unknown {kind} {index}")]
    UnknownIndex { kind: ExternalKind, index: u32 },

    #[error("function and code section have inconsistent lengths")]
    FunctionCodeMismatch,

    #[error("data count and data section have inconsistent lengths")]
    DataCountMismatch,

    #[error("too many {what}: {count} exceeds limit of {limit}")]
    LimitExceeded { what: &'static str, count: u32, limit: u32 },
}

/// A decode failure and the absolute byte offset it was detected at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at offset 0x{offset:x}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize) -> ParseError {
        ParseError { kind, offset }
    }
}
