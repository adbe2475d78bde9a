use std::fmt;

use crate::core::record::Record;

/// Caller-facing error taxonomy shared by every provider.
#[derive(Debug)]
pub enum Error {
    /// Credential exchange or token validation failed.
    Auth(String),
    /// The request never produced an HTTP response.
    Transport(String),
    /// The provider rejected the request (4xx/5xx).
    Api { status: u16, message: String },
    /// The provider returned a record shape we do not understand.
    Decode(String),
    /// The caller supplied a record this provider cannot represent.
    Encode(String),
    /// The zone string could not be reduced to a registrable domain.
    InvalidZone(String),
    /// A per-record batch failed partway. `done` holds the records already
    /// processed before `source` stopped the run; nothing is rolled back.
    Partial { done: Vec<Record>, source: Box<Error> },
    Other(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Auth(msg) => write!(f, "Auth error: {msg}"),
            Error::Transport(msg) => write!(f, "Transport error: {msg}"),
            Error::Api { status, message } => write!(f, "API error {status}: {message}"),
            Error::Decode(msg) => write!(f, "Decode error: {msg}"),
            Error::Encode(msg) => write!(f, "Encode error: {msg}"),
            Error::InvalidZone(msg) => write!(f, "Invalid zone: {msg}"),
            Error::Partial { done, source } => {
                write!(f, "Partial failure after {} record(s): {source}", done.len())
            }
            Error::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}
