//! Malformed binaries: every decode failure surfaces as `MalformedBinary` and no
//! handle is produced.

mod common;

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use wasm_reflect::{Error, ModuleHandle};

    use crate::common::{module_hex, wasm};

    fn compile_err(bytes: &[u8]) -> Error {
        match ModuleHandle::compile(bytes) {
            Ok(_) => panic!("expected {} bytes to be rejected", bytes.len()),
            Err(e) => e,
        }
    }

    #[rstest]
    #[case::empty("", "unexpected end")]
    #[case::short_magic("0061", "unexpected end")]
    #[case::three_magic_bytes("006173", "unexpected end")]
    #[case::wrong_magic("0061736e 01000000", "magic header not detected")]
    #[case::no_version("0061736d", "unexpected end")]
    #[case::version_2("0061736d 02000000", "unknown binary version: 2")]
    fn bad_preamble(#[case] fixture: &str, #[case] message: &str) {
        let err = compile_err(&wasm(fixture));
        assert!(err.is_malformed_binary());
        assert!(err.to_string().contains(message), "{err}");
    }

    #[rstest]
    #[case::unknown_section_id("0d 00", "malformed section id: 13")]
    #[case::duplicate_section("01 01 00 01 01 00", "duplicate section: 1")]
    #[case::out_of_order("07 01 00 04 01 00", "section out of order: 4")]
    #[case::section_past_end("01 05 00", "unexpected end")]
    #[case::section_too_long("01 02 00 00", "section size mismatch: 1 bytes left over")]
    #[case::leb_too_long("01 06 80 80 80 80 80 00", "integer representation too long")]
    #[case::leb_too_large("01 05 ff ff ff ff 7f", "integer too large")]
    #[case::bad_func_type("01 04 01 61 00 00", "malformed function type: 0x61")]
    #[case::bad_value_type("01 04 01 60 01 00", "malformed value type: 0x00")]
    #[case::bad_import_kind("02 06 01 01 61 01 62 04", "malformed import kind: 0x04")]
    #[case::import_unknown_type("02 07 01 01 61 01 62 00 00", "unknown type 0")]
    #[case::function_unknown_type("03 02 01 00", "unknown type 0")]
    #[case::bad_ref_type("04 04 01 7f 00 00", "malformed reference type: 0x7f")]
    #[case::bad_table_limits("04 04 01 70 02 00", "malformed limits flags: 0x02")]
    #[case::shared_without_max("05 03 01 02 00", "shared memory must have maximum")]
    #[case::bad_memory_limits("05 03 01 04 00", "malformed limits flags: 0x04")]
    #[case::bad_mutability("06 06 01 7f 02 41 00 0b", "malformed mutability: 0x02")]
    #[case::illegal_const_op("06 06 01 7f 00 20 00 0b", "illegal opcode in constant expression: 0x20")]
    #[case::function_without_code("01 04 01 60 00 00 03 02 01 00", "function and code section have inconsistent lengths")]
    #[case::code_without_function("0a 04 01 02 00 0b", "function and code section have inconsistent lengths")]
    #[case::data_count_mismatch("0c 01 01", "data count and data section have inconsistent lengths")]
    #[case::bad_utf8_name("07 05 01 01 ff 00 00", "malformed UTF-8 encoding")]
    #[case::bad_export_kind("07 05 01 01 78 04 00", "malformed export kind: 0x04")]
    #[case::unknown_function("07 05 01 01 78 00 00", "unknown function 0")]
    #[case::unknown_table("07 05 01 01 78 01 00", "unknown table 0")]
    #[case::unknown_memory("07 05 01 01 78 02 00", "unknown memory 0")]
    #[case::unknown_global("07 05 01 01 78 03 00", "unknown global 0")]
    #[case::bad_custom_name("00 02 01 ff", "malformed UTF-8 encoding")]
    fn bad_sections(#[case] sections: &str, #[case] message: &str) {
        let err = compile_err(&module_hex(sections));
        assert!(err.is_malformed_binary());
        assert!(err.to_string().contains(message), "{err}");
    }

    #[test]
    fn error_carries_offset() {
        // export entry starts right after the section header and count
        let err = compile_err(&module_hex("07 05 01 01 78 04 00"));
        assert_eq!(err.to_string(), "malformed binary: malformed export kind: 0x04 at offset 0xb");
    }

    #[test]
    fn empty_input_ends_at_offset_zero() {
        let err = compile_err(&[]);
        assert_eq!(err.to_string(), "malformed binary: unexpected end at offset 0x0");
    }

    #[rstest]
    #[case::bad_export_kind("07 05 01 01 78 04 00 01 01 00", "malformed export kind: 0x04 at offset 0xb")]
    #[case::unknown_export_index("07 05 01 01 78 00 00 01 01 00", "unknown function 0 at offset 0xb")]
    #[case::export_then_bad_section_id("07 05 01 01 78 03 00 0d 00", "unknown global 0 at offset 0xb")]
    fn export_errors_win_over_later_sections(#[case] sections: &str, #[case] message: &str) {
        let err = compile_err(&module_hex(sections));
        assert!(err.to_string().ends_with(message), "{err}");
    }

    #[test]
    fn first_error_wins() {
        // bad export name, then an out-of-order section
        let err = compile_err(&module_hex("07 05 01 01 ff 00 00 01 01 00"));
        assert!(err.to_string().contains("malformed UTF-8 encoding"), "{err}");
    }
}
