//! Tests for the fixture's exported symbol table

use super::*;
use bridge_abi::{FutureCategory, FutureOp, SymbolNames};
use std::collections::HashSet;

#[test]
fn test_lifecycle_symbols_follow_naming_convention() {
    let names = SymbolNames::new("fixture");
    let exported: HashSet<&str> = exported_symbols().into_iter().map(|(name, _)| name).collect();

    let mut expected = vec![
        names.rustbuffer_alloc(),
        names.rustbuffer_from_bytes(),
        names.rustbuffer_free(),
        names.rustbuffer_reserve(),
        names.contract_version(),
        names.callback_vtable("logger"),
    ];
    for category in FutureCategory::ALL {
        for op in [FutureOp::Poll, FutureOp::Cancel, FutureOp::Complete, FutureOp::Free] {
            expected.push(names.rust_future(op, category));
        }
    }
    for name in &expected {
        assert!(exported.contains(name.as_str()), "missing {}", name);
    }
}

#[test]
fn test_every_function_has_entry_point_and_checksum() {
    let names = SymbolNames::new("fixture");
    let exported: HashSet<&str> = exported_symbols().into_iter().map(|(name, _)| name).collect();
    for (function, _) in CHECKSUMS {
        assert!(exported.contains(names.func(function).as_str()), "no entry point for {}", function);
        assert!(exported.contains(names.checksum_func(function).as_str()), "no checksum for {}", function);
    }
}

#[test]
fn test_symbol_table_has_no_duplicates_or_nulls() {
    let table = exported_symbols();
    let unique: HashSet<&str> = table.iter().map(|(name, _)| *name).collect();
    assert_eq!(unique.len(), table.len());
    assert!(table.iter().all(|(_, address)| !address.is_null()));
    // 4 buffer + 1 contract + 17 functions + 1 vtable + 13 * 4 future + 17 checksums
    assert_eq!(table.len(), 4 + 1 + 17 + 1 + 52 + 17);
}

#[test]
fn test_exported_checksums_match_table() {
    assert_eq!(uniffi_fixture_checksum_func_greet(), signature_checksum("greet(string)->string"));
    let unique: HashSet<u16> = CHECKSUMS.iter().map(|(_, checksum)| *checksum).collect();
    assert_eq!(unique.len(), CHECKSUMS.len(), "checksum collision between fixture functions");
    assert_eq!(ffi_fixture_uniffi_contract_version(), CONTRACT_VERSION);
}
