//! Domain types crossing the fixture's boundary.

use bridge_abi::{ffi_converter_enum, ffi_converter_record};
use thiserror::Error;

/// A wallet activity entry, the fixture's compound record.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: String,
    pub amount_sats: u64,
    pub fee_sats: Option<u64>,
    pub tags: Vec<String>,
    pub confirmed: bool,
}

ffi_converter_record!(Activity {
    id: String,
    amount_sats: u64,
    fee_sats: Option<u64>,
    tags: Vec<String>,
    confirmed: bool,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Bitcoin,
    Testnet,
    Signet,
    Regtest,
}

ffi_converter_enum!(Network {
    1 => Bitcoin,
    2 => Testnet,
    3 => Signet,
    4 => Regtest,
});

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentState {
    Pending,
    Succeeded {
        preimage: String,
        settled_at: u64,
    },
    Failed {
        reason: String,
    },
}

ffi_converter_enum!(PaymentState {
    1 => Pending,
    2 => Succeeded { preimage: String, settled_at: u64 },
    3 => Failed { reason: String },
});

/// Errors the fixture's fallible functions declare.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FixtureError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Key not found: {key}")]
    NotFound {
        key: String,
    },

    #[error("Logger rejected a message: {reason}")]
    Rejected {
        reason: String,
    },
}

ffi_converter_enum!(FixtureError {
    1 => DivisionByZero,
    2 => NotFound { key: String },
    3 => Rejected { reason: String },
});

/// Errors a host logger may report back.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogError {
    #[error("Rejected: {reason}")]
    Rejected {
        reason: String,
    },
}

ffi_converter_enum!(LogError {
    1 => Rejected { reason: String },
});
