//! Load-time compatibility markers.
//!
//! The bindings and the native library each compute a 16-bit checksum per exported function
//! from a canonical signature string, e.g. `greet(string)->string` or
//! `async fetch(u64)->record!error`. The host compares them once at load time together with
//! [`CONTRACT_VERSION`]; any difference means the two were built from different interface
//! definitions.

/// Revision of the scaffolding contract (buffer, status and future ABI).
pub const CONTRACT_VERSION: u32 = 26;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a.
pub const fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Folds the signature hash into 16 bits.
pub const fn signature_checksum(signature: &str) -> u16 {
    let hash = fnv1a64(signature.as_bytes());
    (hash ^ (hash >> 16) ^ (hash >> 32) ^ (hash >> 48)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a64_reference_values() {
        assert_eq!(fnv1a64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a64(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_checksum_is_const_and_stable() {
        const ADD: u16 = signature_checksum("add(u32,u32)->u32");
        assert_eq!(ADD, signature_checksum("add(u32,u32)->u32"));
    }

    #[test]
    fn test_checksum_changes_with_signature() {
        let a = signature_checksum("add(u32,u32)->u32");
        let b = signature_checksum("add(u32,u64)->u32");
        let c = signature_checksum("add(u32,u32)->u32!error");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
