use std::io;

use thiserror::Error;

use crate::message::header::CodeValue;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeValueError {
    #[error("class value {0} does not fit in 3 bits")]
    ClassOutOfRange(u8),
    #[error("detail value {0} does not fit in 5 bits")]
    DetailOutOfRange(u8),
    #[error("malformed code string {0:?}, expected c.dd")]
    Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token of {0} octets exceeds the 8 octet maximum")]
    TooLong(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("option {number}: delta {delta} exceeds the extended delta range")]
    OptionDeltaTooLarge { number: u32, delta: u32 },
    #[error("option {number}: value of {length} octets exceeds the extended length range")]
    OptionValueTooLong { number: u32, length: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message of {0} octets is shorter than the fixed header")]
    MessageTooShort(usize),
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),
    #[error("invalid message type {0}")]
    InvalidMessageType(u8),
    #[error("invalid token length {0}")]
    InvalidTokenLength(u8),
    #[error("token needs {expected} octets, {available} available")]
    TruncatedToken { expected: usize, available: usize },
    #[error("reserved option delta nibble")]
    InvalidOptionDelta,
    #[error("reserved option length nibble")]
    InvalidOptionLength,
    #[error("option ends beyond the end of the message")]
    TruncatedOption,
    #[error("option number overflows")]
    OptionNumberOverflow,
    #[error("payload marker followed by an empty payload")]
    EmptyPayload,
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("code {0} does not map to an HTTP method")]
    NotARequest(CodeValue),
    #[error("option {option} cannot be rendered as an HTTP header value")]
    InvalidHeaderValue { option: &'static str },
    #[error("http error: {0}")]
    Http(#[from] http::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("request target contains {0} query delimiters")]
    MultipleQueryDelimiters(usize),
    #[error("url error: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("url has no host")]
    MissingHost,
    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),
}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

impl From<EncodeError> for io::Error {
    fn from(err: EncodeError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}
