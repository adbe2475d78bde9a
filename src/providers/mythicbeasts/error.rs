use thiserror::Error;

use crate::error::Error;

/// Everything that can go wrong talking to the Mythic Beasts API, before
/// translation into the crate-level [`Error`] taxonomy.
#[derive(Error, Debug)]
pub enum MythicBeastsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("login failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("login: received unexpected token type: {0}")]
    TokenType(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("error parsing response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown record type: {0}")]
    UnknownRecordType(String),

    #[error("malformed SRV host: {0}")]
    MalformedSrvHost(String),

    #[error("malformed SSHFP data: {0}")]
    MalformedSshfp(String),

    #[error("unsupported record type: {0}")]
    UnsupportedRecordType(String),

    #[error("record conversion failed: {0}")]
    Convert(String),

    #[error("invalid zone: {0}")]
    InvalidZone(String),
}

pub(crate) fn map_error(e: MythicBeastsError) -> Error {
    use MythicBeastsError::*;
    match e {
        Http(err) => Error::Transport(err.to_string()),
        Auth { status, message } => Error::Auth(format!("{status}: {message}")),
        TokenType(t) => Error::Auth(format!("unexpected token type: {t}")),
        Api { status, message } => Error::Api { status, message },
        Parse(err) => Error::Decode(err.to_string()),
        UnknownRecordType(t) => Error::Decode(format!("unknown record type: {t}")),
        MalformedSrvHost(h) => Error::Decode(format!("malformed SRV host: {h}")),
        MalformedSshfp(d) => Error::Encode(format!("malformed SSHFP data: {d}")),
        UnsupportedRecordType(t) => Error::Encode(format!("unsupported record type: {t}")),
        Convert(msg) => Error::Decode(msg),
        InvalidZone(zone) => Error::InvalidZone(zone),
    }
}
