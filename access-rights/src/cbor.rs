// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encode and decode rights records in [CBOR] format for storage next to the resource they
//! protect.
//!
//! Decoding checks the same invariants as building a record in memory, a stored record with blank
//! principal names or unknown access levels is rejected.
//!
//! [CBOR]: https://cbor.io/
use std::io::Read;

use ciborium::de::Error as DeserializeError;
use ciborium::ser::Error as SerializeError;
use thiserror::Error;

use crate::rights::RightsRecord;

/// Encode a rights record for storage.
pub fn encode_cbor(record: &RightsRecord) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(record, &mut bytes)?;
    Ok(bytes)
}

/// Load a stored rights record, checking its principal names on the way.
pub fn decode_cbor(reader: impl Read) -> Result<RightsRecord, DecodeError> {
    Ok(ciborium::from_reader(reader)?)
}

/// Failure to write a rights record as CBOR.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("could not write rights record: {0}")]
    Io(std::io::Error),

    #[error("could not serialize rights record: {0}")]
    Value(String),
}

impl From<SerializeError<std::io::Error>> for EncodeError {
    fn from(value: SerializeError<std::io::Error>) -> Self {
        match value {
            SerializeError::Io(err) => Self::Io(err),
            SerializeError::Value(description) => Self::Value(description),
        }
    }
}

/// Failure to read a stored rights record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not read rights record: {0}")]
    Io(std::io::Error),

    /// Malformed CBOR at the given byte offset.
    #[error("malformed rights record at byte {0}")]
    Syntax(usize),

    /// Well-formed CBOR which is not a valid rights record, e.g. with a blank principal name.
    #[error("invalid rights record: {1}")]
    Semantic(Option<usize>, String),

    #[error("rights record is nested too deeply")]
    RecursionLimitExceeded,
}

impl From<DeserializeError<std::io::Error>> for DecodeError {
    fn from(value: DeserializeError<std::io::Error>) -> Self {
        match value {
            DeserializeError::Io(err) => Self::Io(err),
            DeserializeError::Syntax(offset) => Self::Syntax(offset),
            DeserializeError::Semantic(offset, description) => Self::Semantic(offset, description),
            DeserializeError::RecursionLimitExceeded => Self::RecursionLimitExceeded,
        }
    }
}
