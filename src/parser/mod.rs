//! Binary format decoder.
//!
//! [`parse`] walks the preamble and the section sequence of a module binary and
//! returns the decoded [`module::Module`]. The walk enforces the structural rules of
//! the binary format:
//!
//! - every section body lies within the buffer and is consumed exactly;
//! - non-custom sections appear at most once and in canonical order;
//! - the function and code sections, and the data count and data sections, agree.
//!
//! Absent sections leave their index spaces empty.

pub mod encoding;
pub mod error;
pub mod limits;
pub mod module;
pub mod reader;
mod sections;

use log::debug;

use crate::config::ParseConfig;
use encoding::*;
use error::{ParseError, ParseErrorKind};
use module::Module;
use reader::Reader;

pub fn parse(bytes: &[u8], config: &ParseConfig) -> Result<Module, ParseError> {
    let mut reader = Reader::new(bytes);
    let mut module = Module::new();

    read_header(&mut reader, &mut module)?;

    let mut last_order = 0u8;
    let mut seen = [false; SECTION_DATA_COUNT as usize + 1];

    while !reader.is_empty() {
        let id_offset = reader.offset();
        let sec_id = reader.read_byte()?;
        let sec_len = reader.read_vu32()?;

        if sec_id != SECTION_CUSTOM {
            let order = section_order(sec_id)
                .ok_or_else(|| ParseError::new(ParseErrorKind::MalformedSectionId(sec_id), id_offset))?;
            if seen[sec_id as usize] {
                return Err(ParseError::new(ParseErrorKind::DuplicateSection(sec_id), id_offset));
            }
            if order < last_order {
                return Err(ParseError::new(ParseErrorKind::SectionOutOfOrder(sec_id), id_offset));
            }
            seen[sec_id as usize] = true;
            last_order = order;
        }

        let mut section = reader.sub_reader(sec_len as usize)?;
        debug!(
            "section #{} '{}' at 0x{:x}, len = {}",
            sec_id,
            section_name(sec_id),
            id_offset,
            sec_len
        );

        read_section(sec_id, &mut section, &mut module, config)?;

        if !section.is_empty() {
            return Err(section.err(ParseErrorKind::SectionSizeMismatch(section.remaining())));
        }
    }

    check_counts(&module, reader.offset())?;

    Ok(module)
}

fn read_header(bytes: &mut Reader, module: &mut Module) -> Result<(), ParseError> {
    let magic = bytes.read_u32()?;
    if magic != MAGIC {
        return Err(ParseError::new(ParseErrorKind::BadMagic, 0));
    }

    let offset = bytes.offset();
    let version = bytes.read_u32()?;
    if version != VERSION {
        return Err(ParseError::new(ParseErrorKind::UnknownVersion(version), offset));
    }
    module.version = version;
    Ok(())
}

fn read_section(
    sec_id: u8,
    bytes: &mut Reader,
    module: &mut Module,
    config: &ParseConfig,
) -> Result<(), ParseError> {
    match sec_id {
        SECTION_CUSTOM => sections::read_section_custom(bytes, module, config),
        SECTION_TYPE => sections::read_section_type(bytes, module, config),
        SECTION_IMPORT => sections::read_section_import(bytes, module, config),
        SECTION_FUNCTION => sections::read_section_function(bytes, module, config),
        SECTION_TABLE => sections::read_section_table(bytes, module, config),
        SECTION_MEMORY => sections::read_section_memory(bytes, module, config),
        SECTION_GLOBAL => sections::read_section_global(bytes, module, config),
        SECTION_EXPORT => sections::read_section_export(bytes, module, config),
        SECTION_START => sections::read_section_start(bytes, module),
        SECTION_ELEMENT => sections::skip_rest(bytes),
        SECTION_CODE => sections::read_section_code(bytes, module, config),
        SECTION_DATA => sections::read_section_data(bytes, module),
        SECTION_DATA_COUNT => sections::read_section_data_count(bytes, module),
        _ => Err(bytes.err(ParseErrorKind::MalformedSectionId(sec_id))),
    }
}

/// Position of a non-custom section in the canonical order. The data count section
/// (id 12) sits between element and code.
fn section_order(sec_id: u8) -> Option<u8> {
    match sec_id {
        SECTION_TYPE..=SECTION_ELEMENT => Some(sec_id),
        SECTION_DATA_COUNT => Some(10),
        SECTION_CODE => Some(11),
        SECTION_DATA => Some(12),
        _ => None,
    }
}

fn section_name(sec_id: u8) -> &'static str {
    match sec_id {
        SECTION_CUSTOM => "custom",
        SECTION_TYPE => "type",
        SECTION_IMPORT => "import",
        SECTION_FUNCTION => "function",
        SECTION_TABLE => "table",
        SECTION_MEMORY => "memory",
        SECTION_GLOBAL => "global",
        SECTION_EXPORT => "export",
        SECTION_START => "start",
        SECTION_ELEMENT => "element",
        SECTION_CODE => "code",
        SECTION_DATA => "data",
        SECTION_DATA_COUNT => "data count",
        _ => "unknown",
    }
}

fn check_counts(module: &Module, end: usize) -> Result<(), ParseError> {
    if module.functions.len() as u32 != module.code_count.unwrap_or(0) {
        return Err(ParseError::new(ParseErrorKind::FunctionCodeMismatch, end));
    }
    if let Some(data_count) = module.data_count {
        if data_count != module.data_segments.unwrap_or(0) {
            return Err(ParseError::new(ParseErrorKind::DataCountMismatch, end));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREAMBLE: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

    fn with_preamble(sections: &[u8]) -> Vec<u8> {
        let mut bytes = PREAMBLE.to_vec();
        bytes.extend_from_slice(sections);
        bytes
    }

    fn parse_err(bytes: &[u8]) -> ParseError {
        parse(bytes, &ParseConfig::default()).expect_err("expected a decode error")
    }

    #[test]
    fn empty_module() {
        let module = parse(&PREAMBLE, &ParseConfig::default()).unwrap();
        assert_eq!(module.version, 1);
        assert!(module.exports.is_empty());
        assert_eq!(module.index_tables(), module::IndexTables::default());
    }

    #[test]
    fn preamble_errors() {
        assert_eq!(parse_err(&[]).kind, ParseErrorKind::UnexpectedEnd);
        let err = parse_err(&[0x00, 0x61, 0x73]);
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEnd);
        assert_eq!(err.offset, 0);
        assert_eq!(parse_err(b"\0wasm\x01\0\0\0").kind, ParseErrorKind::BadMagic);
        let err = parse_err(&[0x00, 0x61, 0x73, 0x6d, 0x02, 0x00, 0x00, 0x00]);
        assert_eq!(err.kind, ParseErrorKind::UnknownVersion(2));
        assert_eq!(err.offset, 4);
        assert_eq!(
            parse_err(&[0x00, 0x61, 0x73, 0x6d, 0x01]).kind,
            ParseErrorKind::UnexpectedEnd
        );
    }

    #[test]
    fn section_id_errors() {
        let err = parse_err(&with_preamble(&[0x0d, 0x00]));
        assert_eq!(err.kind, ParseErrorKind::MalformedSectionId(0x0d));
        assert_eq!(err.offset, 8);
    }

    #[test]
    fn duplicate_and_out_of_order_sections() {
        // two empty type sections
        assert_eq!(
            parse_err(&with_preamble(&[0x01, 0x01, 0x00, 0x01, 0x01, 0x00])).kind,
            ParseErrorKind::DuplicateSection(SECTION_TYPE)
        );
        // export before table
        assert_eq!(
            parse_err(&with_preamble(&[0x07, 0x01, 0x00, 0x04, 0x01, 0x00])).kind,
            ParseErrorKind::SectionOutOfOrder(SECTION_TABLE)
        );
        // data count goes before code
        assert_eq!(
            parse_err(&with_preamble(&[0x0a, 0x01, 0x00, 0x0c, 0x01, 0x00])).kind,
            ParseErrorKind::SectionOutOfOrder(SECTION_DATA_COUNT)
        );
    }

    #[test]
    fn custom_sections_may_repeat_anywhere() {
        let bytes = with_preamble(&[
            0x00, 0x02, 0x01, b'a', // custom "a"
            0x01, 0x01, 0x00, // empty type section
            0x00, 0x03, 0x01, b'a', 0xff, // custom "a" with one byte
        ]);
        let module = parse(&bytes, &ParseConfig::default()).unwrap();
        assert_eq!(module.custom.len(), 2);
        assert_eq!(module.custom[1].data, vec![0xff]);
    }

    #[test]
    fn section_size_mismatch() {
        // type section claims 2 bytes but its vector is empty
        let err = parse_err(&with_preamble(&[0x01, 0x02, 0x00, 0x00]));
        assert_eq!(err.kind, ParseErrorKind::SectionSizeMismatch(1));
        assert_eq!(err.offset, 11);

        // section body runs past the end of the buffer
        assert_eq!(
            parse_err(&with_preamble(&[0x01, 0x05, 0x00])).kind,
            ParseErrorKind::UnexpectedEnd
        );

        // vector runs past the end of its section
        assert_eq!(
            parse_err(&with_preamble(&[0x01, 0x01, 0x01, 0x60])).kind,
            ParseErrorKind::UnexpectedEnd
        );
    }

    #[test]
    fn function_without_code() {
        let bytes = with_preamble(&[
            0x01, 0x04, 0x01, 0x60, 0x00, 0x00, // type () -> ()
            0x03, 0x02, 0x01, 0x00, // one function
        ]);
        assert_eq!(parse_err(&bytes).kind, ParseErrorKind::FunctionCodeMismatch);
    }

    #[test]
    fn data_count_mismatch() {
        let bytes = with_preamble(&[0x0c, 0x01, 0x01]);
        assert_eq!(parse_err(&bytes).kind, ParseErrorKind::DataCountMismatch);
    }
}
