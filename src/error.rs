use std::io;
use thiserror::Error;

use crate::types::Tag;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset:#x}")]
    UnexpectedEof { offset: u64 },

    #[error("unrecognized signature {0}")]
    UnrecognizedSignature(Tag),

    #[error("wrong {field} version: expected {expected:#x}, found {actual:#x}")]
    VersionMismatch {
        field: &'static str,
        expected: i32,
        actual: i32,
    },

    #[error("wrong supplement signature {0} (expected SS3D)")]
    BadSupplementSignature(Tag),

    #[error("wrong world {axis} size: expected {expected}, found {actual}")]
    InvalidDimensions {
        axis: &'static str,
        expected: i32,
        actual: i32,
    },

    #[error("negative {what} count: {count}")]
    NegativeCount { what: &'static str, count: i64 },

    #[error("{what} count {count} exceeds the limit of {limit}")]
    CountTooLarge {
        what: &'static str,
        count: i64,
        limit: usize,
    },

    #[error("face {face} slot {slot}: {kind} index {index} is out of range (count {count})")]
    IndexOutOfRange {
        face: usize,
        slot: usize,
        kind: &'static str,
        index: i32,
        count: usize,
    },

    #[error("supplement {what} count {supplement} does not match section count {section}")]
    SupplementMismatch {
        what: &'static str,
        section: usize,
        supplement: i32,
    },

    #[error("an i/o error occurred: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
