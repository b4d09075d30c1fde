use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::CodeValueError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub enum MessageType {
    #[default]
    Confirmable,
    NonConfirmable,
    Acknowledgement,
    Reset,
}

impl MessageType {
    pub fn as_short_str(&self) -> &'static str {
        match *self {
            MessageType::Confirmable => "CON",
            MessageType::NonConfirmable => "NON",
            MessageType::Acknowledgement => "ACK",
            MessageType::Reset => "RST",
        }
    }

    /// Parses `CON`, `NON`, `ACK` or `RST`, ignoring case.
    pub fn from_short_str(s: &str) -> Option<MessageType> {
        [
            MessageType::Confirmable,
            MessageType::NonConfirmable,
            MessageType::Acknowledgement,
            MessageType::Reset,
        ]
        .into_iter()
        .find(|t| t.as_short_str().eq_ignore_ascii_case(s.trim()))
    }

    #[inline]
    pub(crate) fn to_bits(self) -> u8 {
        match self {
            MessageType::Confirmable => 0,
            MessageType::NonConfirmable => 1,
            MessageType::Acknowledgement => 2,
            MessageType::Reset => 3,
        }
    }

    #[inline]
    pub(crate) fn from_bits(bits: u8) -> Option<MessageType> {
        match bits {
            0 => Some(MessageType::Confirmable),
            1 => Some(MessageType::NonConfirmable),
            2 => Some(MessageType::Acknowledgement),
            3 => Some(MessageType::Reset),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_short_str())
    }
}

/// A message code in `class.detail` form, e.g. `2.05` for Content.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct CodeValue {
    class: u8,
    detail: u8,
}

impl CodeValue {
    pub const EMPTY: CodeValue = CodeValue {
        class: 0,
        detail: 0,
    };

    /// Fails if `class > 7` or `detail > 31`.
    pub fn new(class: u8, detail: u8) -> Result<CodeValue, CodeValueError> {
        if class > 0b111 {
            return Err(CodeValueError::ClassOutOfRange(class));
        }
        if detail > 0b11111 {
            return Err(CodeValueError::DetailOutOfRange(detail));
        }
        Ok(CodeValue { class, detail })
    }

    #[inline]
    pub const fn from_raw(raw: u8) -> CodeValue {
        CodeValue {
            class: raw >> 5,
            detail: raw & 0x1F,
        }
    }

    #[inline]
    pub const fn to_raw(&self) -> u8 {
        self.class << 5 | self.detail
    }

    pub fn class(&self) -> u8 {
        self.class
    }

    pub fn detail(&self) -> u8 {
        self.detail
    }

    pub fn is_empty(&self) -> bool {
        *self == CodeValue::EMPTY
    }

    pub fn is_request(&self) -> bool {
        self.class == 0 && self.detail != 0
    }

    pub fn is_response(&self) -> bool {
        (2..=5).contains(&self.class)
    }

    pub fn code_sample(&self) -> Option<CodeSample> {
        CodeSample::from_code_value(*self)
    }

    /// The HTTP-style method verb for the four request codes.
    pub fn request_string(&self) -> Option<&'static str> {
        match self.code_sample()? {
            CodeSample::Get => Some("GET"),
            CodeSample::Post => Some("POST"),
            CodeSample::Put => Some("PUT"),
            CodeSample::Delete => Some("DELETE"),
            _ => None,
        }
    }
}

impl From<u8> for CodeValue {
    fn from(raw: u8) -> Self {
        CodeValue::from_raw(raw)
    }
}

impl From<CodeValue> for u8 {
    fn from(code: CodeValue) -> Self {
        code.to_raw()
    }
}

impl fmt::Display for CodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.class, self.detail)
    }
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d)\.(\d{1,2})$").unwrap())
}

impl FromStr for CodeValue {
    type Err = CodeValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = code_pattern()
            .captures(s.trim())
            .ok_or_else(|| CodeValueError::Malformed(s.to_string()))?;
        let class = captures[1]
            .parse::<u8>()
            .map_err(|_| CodeValueError::Malformed(s.to_string()))?;
        let detail = captures[2]
            .parse::<u8>()
            .map_err(|_| CodeValueError::Malformed(s.to_string()))?;
        CodeValue::new(class, detail)
    }
}

/// Well-known codes, with the raw code octet as discriminant.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum CodeSample {
    Empty = 0x00,
    Get = 0x01,
    Post = 0x02,
    Put = 0x03,
    Delete = 0x04,

    Created = 0x41,
    Deleted = 0x42,
    Valid = 0x43,
    Changed = 0x44,
    Content = 0x45,
    Continue = 0x5F,

    BadRequest = 0x80,
    Unauthorized = 0x81,
    BadOption = 0x82,
    Forbidden = 0x83,
    NotFound = 0x84,
    MethodNotAllowed = 0x85,
    NotAcceptable = 0x86,
    RequestEntityIncomplete = 0x88,
    PreconditionFailed = 0x8C,
    RequestEntityTooLarge = 0x8D,
    UnsupportedContentFormat = 0x8F,

    InternalServerError = 0xA0,
    NotImplemented = 0xA1,
    BadGateway = 0xA2,
    ServiceUnavailable = 0xA3,
    GatewayTimeout = 0xA4,
    ProxyingNotSupported = 0xA5,
}

impl CodeSample {
    pub const ALL: [CodeSample; 28] = [
        CodeSample::Empty,
        CodeSample::Get,
        CodeSample::Post,
        CodeSample::Put,
        CodeSample::Delete,
        CodeSample::Created,
        CodeSample::Deleted,
        CodeSample::Valid,
        CodeSample::Changed,
        CodeSample::Content,
        CodeSample::Continue,
        CodeSample::BadRequest,
        CodeSample::Unauthorized,
        CodeSample::BadOption,
        CodeSample::Forbidden,
        CodeSample::NotFound,
        CodeSample::MethodNotAllowed,
        CodeSample::NotAcceptable,
        CodeSample::RequestEntityIncomplete,
        CodeSample::PreconditionFailed,
        CodeSample::RequestEntityTooLarge,
        CodeSample::UnsupportedContentFormat,
        CodeSample::InternalServerError,
        CodeSample::NotImplemented,
        CodeSample::BadGateway,
        CodeSample::ServiceUnavailable,
        CodeSample::GatewayTimeout,
        CodeSample::ProxyingNotSupported,
    ];

    pub const fn code_value(self) -> CodeValue {
        CodeValue::from_raw(self as u8)
    }

    pub fn from_code_value(code: CodeValue) -> Option<CodeSample> {
        CodeSample::ALL
            .into_iter()
            .find(|sample| *sample as u8 == code.to_raw())
    }

    pub fn name(self) -> &'static str {
        match self {
            CodeSample::Empty => "Empty",
            CodeSample::Get => "Get",
            CodeSample::Post => "Post",
            CodeSample::Put => "Put",
            CodeSample::Delete => "Delete",
            CodeSample::Created => "Created",
            CodeSample::Deleted => "Deleted",
            CodeSample::Valid => "Valid",
            CodeSample::Changed => "Changed",
            CodeSample::Content => "Content",
            CodeSample::Continue => "Continue",
            CodeSample::BadRequest => "Bad Request",
            CodeSample::Unauthorized => "Unauthorized",
            CodeSample::BadOption => "Bad Option",
            CodeSample::Forbidden => "Forbidden",
            CodeSample::NotFound => "Not Found",
            CodeSample::MethodNotAllowed => "Method Not Allowed",
            CodeSample::NotAcceptable => "Not Acceptable",
            CodeSample::RequestEntityIncomplete => "Request Entity Incomplete",
            CodeSample::PreconditionFailed => "Precondition Failed",
            CodeSample::RequestEntityTooLarge => "Request Entity Too Large",
            CodeSample::UnsupportedContentFormat => "Unsupported Content Format",
            CodeSample::InternalServerError => "Internal Server Error",
            CodeSample::NotImplemented => "Not Implemented",
            CodeSample::BadGateway => "Bad Gateway",
            CodeSample::ServiceUnavailable => "Service Unavailable",
            CodeSample::GatewayTimeout => "Gateway Timeout",
            CodeSample::ProxyingNotSupported => "Proxying Not Supported",
        }
    }
}

impl From<CodeSample> for CodeValue {
    fn from(sample: CodeSample) -> Self {
        sample.code_value()
    }
}
