use thiserror::Error;

use crate::hm::inverter::{Serial, MAX_NAME_LENGTH};
use crate::hm::layout::FieldId;

/// Errors reported by the protocol core. None of these are fatal, the caller
/// decides what to do with them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unknown inverter type {0:?}")]
    UnknownInverterType(String),

    #[error("{field} ch{channel} needs {num} bytes at offset {start} but payload is only {len} bytes")]
    Truncated {
        field: FieldId,
        channel: u8,
        start: usize,
        num: usize,
        len: usize,
    },

    #[error("{field} ch{channel}: unsupported field width of {num} bytes")]
    UnsupportedWidth { field: FieldId, channel: u8, num: usize },

    #[error("{field} ch{channel}: value {value} does not fit in {num} bytes")]
    ValueOutOfRange {
        field: FieldId,
        channel: u8,
        value: f64,
        num: usize,
    },

    #[error("frame too short: got {len} bytes, need at least {min}")]
    FrameTooShort { len: usize, min: usize },

    #[error("checksum mismatch - got {actual:#04x}, expected {expected:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("inverter name {0:?} is longer than {max} bytes", max = MAX_NAME_LENGTH)]
    NameTooLong(String),

    #[error("registry is full ({0} inverters)")]
    RegistryFull(usize),

    #[error("inverter with serial {0} is already registered")]
    DuplicateSerial(Serial),
}
