// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Validation errors raised while building permissions or applying change requests.
///
/// None of these leave a rights record partially updated: validation always happens before the
/// first mutation.
#[derive(Debug, Error, PartialEq)]
pub enum RightsError {
    #[error("unknown principal type: \"{0}\"")]
    UnknownPrincipalType(String),

    #[error("unknown access level: \"{0}\"")]
    UnknownAccessLevel(String),

    #[error("principal name must not be empty")]
    EmptyPrincipalName,

    #[error("invalid permission request {key} in field \"{field}\": {source}")]
    InvalidRequest {
        key: String,
        field: &'static str,
        #[source]
        source: Box<RightsError>,
    },

    #[error("invalid embargo release date \"{value}\": {source}")]
    InvalidEmbargoDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl RightsError {
    /// Name of the request field which failed validation, if this error stems from a request.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            RightsError::InvalidRequest { field, .. } => Some(field),
            _ => None,
        }
    }
}
