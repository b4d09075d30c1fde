use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use log::debug;

use super::content_format::ContentFormat;
use super::header::{CodeValue, MessageType};
use super::options::{decode_uint, encode_uint, CoapOption};
use crate::config::{DecodeConfig, COAP_VERSION};
use crate::error::{DecodeError, EncodeError, TokenError};

const HEADER_LEN: usize = 4;
const PAYLOAD_MARKER: u8 = 0xFF;

const ONE_BYTE_EXTENDED: u8 = 13;
const TWO_BYTES_EXTENDED: u8 = 14;
const RESERVED_NIBBLE: u8 = 15;
const ONE_BYTE_OFFSET: u32 = 13;
const TWO_BYTES_OFFSET: u32 = 269;

/// Largest option delta or value length the extension scheme can carry.
pub const MAX_EXTENDED_VALUE: u32 = TWO_BYTES_OFFSET + u16::MAX as u32;

/// Request/response correlator of up to 8 octets, kept as an integer.
///
/// Its wire form is the shortest big-endian encoding of the value, so
/// leading zero octets of a received token are not preserved.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord)]
pub struct Token(u64);

impl Token {
    pub const MAX_LEN: usize = 8;

    pub const fn new(value: u64) -> Token {
        Token(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Number of octets the token occupies on the wire.
    pub fn len(&self) -> usize {
        ((u64::BITS - self.0.leading_zeros() + 7) / 8) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_be_bytes()[Self::MAX_LEN - self.len()..].to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Token, TokenError> {
        if bytes.len() > Self::MAX_LEN {
            return Err(TokenError::TooLong(bytes.len()));
        }
        Ok(Token(
            bytes.iter().fold(0u64, |acc, b| acc << 8 | u64::from(*b)),
        ))
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token(value)
    }
}

impl TryFrom<&[u8]> for Token {
    type Error = TokenError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Token::from_bytes(bytes)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A single CoAP message.
///
/// `host_name`, `port` and `timestamp` describe where and when the message
/// was received; they are never part of the wire format and are ignored by
/// `==`. An absent message id is sent as 0, so it compares equal to `Some(0)`.
#[derive(Clone, Debug, Default)]
pub struct Message {
    pub message_type: MessageType,
    pub code: CodeValue,
    pub message_id: Option<u16>,
    pub token: Token,
    options: BTreeMap<u32, Vec<Vec<u8>>>,
    pub payload: Option<Vec<u8>>,
    pub host_name: Option<String>,
    pub port: Option<u16>,
    pub timestamp: Option<SystemTime>,
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.message_type == other.message_type
            && self.code == other.code
            && self.message_id.unwrap_or(0) == other.message_id.unwrap_or(0)
            && self.token == other.token
            && self.options == other.options
            && self.payload == other.payload
    }
}

impl Eq for Message {}

impl Message {
    /// An empty (0.00) confirmable message.
    pub fn new() -> Message {
        Message::default()
    }

    pub fn with(code: CodeValue, message_type: MessageType, payload: Option<Vec<u8>>) -> Message {
        Message {
            code,
            message_type,
            payload,
            ..Message::default()
        }
    }

    /// Appends a value; repeated calls for the same option keep their order.
    pub fn add_option(&mut self, option: CoapOption, value: Vec<u8>) {
        self.options.entry(option.number()).or_default().push(value);
    }

    /// Replaces every value of the option.
    pub fn set_option(&mut self, option: CoapOption, values: Vec<Vec<u8>>) {
        if values.is_empty() {
            self.options.remove(&option.number());
        } else {
            self.options.insert(option.number(), values);
        }
    }

    pub fn get_option(&self, option: CoapOption) -> Option<&[Vec<u8>]> {
        self.options.get(&option.number()).map(Vec::as_slice)
    }

    pub fn get_first_option(&self, option: CoapOption) -> Option<&[u8]> {
        self.get_option(option)
            .and_then(|values| values.first())
            .map(Vec::as_slice)
    }

    pub fn clear_option(&mut self, option: CoapOption) {
        self.options.remove(&option.number());
    }

    /// All options keyed by number, in ascending order.
    pub fn options(&self) -> &BTreeMap<u32, Vec<Vec<u8>>> {
        &self.options
    }

    pub fn set_content_format(&mut self, content_format: ContentFormat) {
        self.set_option(
            CoapOption::ContentFormat,
            vec![encode_uint(u64::from(content_format.id()))],
        );
    }

    /// The registered content format, if the option is present and known.
    pub fn content_format(&self) -> Option<ContentFormat> {
        self.get_first_option(CoapOption::ContentFormat)
            .and_then(decode_uint)
            .and_then(|id| u16::try_from(id).ok())
            .and_then(ContentFormat::from_id)
    }

    /// The content format, falling back to plain text.
    pub fn inferred_content_format(&self) -> ContentFormat {
        self.content_format().unwrap_or(ContentFormat::Plain)
    }

    pub fn set_max_age(&mut self, seconds: u32) {
        self.set_option(CoapOption::MaxAge, vec![encode_uint(u64::from(seconds))]);
    }

    pub fn max_age(&self) -> Option<u64> {
        self.get_first_option(CoapOption::MaxAge)
            .and_then(decode_uint)
    }

    /// The payload as text, or as hex for binary content formats.
    pub fn payload_representation(&self) -> String {
        match &self.payload {
            Some(payload) => self.inferred_content_format().represent(payload),
            None => String::new(),
        }
    }

    /// Decodes a byte slice into the equivalent Message.
    pub fn from_bytes(buf: &[u8]) -> Result<Message, DecodeError> {
        Self::from_bytes_with(buf, &DecodeConfig::default())
    }

    pub fn from_bytes_with(buf: &[u8], config: &DecodeConfig) -> Result<Message, DecodeError> {
        parse(buf, config).map_err(|err| {
            debug!("rejecting {} octet message: {}", buf.len(), err);
            err
        })
    }

    /// Returns the wire representation of the Message.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let token = self.token.to_bytes();
        let payload_len = self.payload.as_ref().map_or(0, |p| p.len() + 1);
        let mut buf = Vec::with_capacity(HEADER_LEN + token.len() + payload_len);

        buf.push(COAP_VERSION << 6 | self.message_type.to_bits() << 4 | token.len() as u8);
        buf.push(self.code.to_raw());
        buf.extend_from_slice(&self.message_id.unwrap_or(0).to_be_bytes());
        buf.extend_from_slice(&token);

        let mut previous_number = 0;
        for (&number, values) in &self.options {
            for value in values {
                let delta = number - previous_number;
                previous_number = number;

                let (delta_nibble, delta_ext) = split_extended(delta)
                    .ok_or(EncodeError::OptionDeltaTooLarge { number, delta })?;
                let (length_nibble, length_ext) = u32::try_from(value.len())
                    .ok()
                    .and_then(split_extended)
                    .ok_or(EncodeError::OptionValueTooLong {
                        number,
                        length: value.len(),
                    })?;

                buf.push(delta_nibble << 4 | length_nibble);
                delta_ext.write_to(&mut buf);
                length_ext.write_to(&mut buf);
                buf.extend_from_slice(value);
            }
        }

        if let Some(ref payload) = self.payload {
            buf.push(PAYLOAD_MARKER);
            buf.extend_from_slice(payload);
        }
        Ok(buf)
    }
}

enum Extended {
    None,
    OneByte(u8),
    TwoBytes(u16),
}

impl Extended {
    fn write_to(&self, buf: &mut Vec<u8>) {
        match *self {
            Extended::None => {}
            Extended::OneByte(b) => buf.push(b),
            Extended::TwoBytes(v) => buf.extend_from_slice(&v.to_be_bytes()),
        }
    }
}

/// Splits a delta or length into its 4-bit nibble and extension octets.
fn split_extended(value: u32) -> Option<(u8, Extended)> {
    match value {
        0..=12 => Some((value as u8, Extended::None)),
        13..=268 => Some((
            ONE_BYTE_EXTENDED,
            Extended::OneByte((value - ONE_BYTE_OFFSET) as u8),
        )),
        269..=MAX_EXTENDED_VALUE => Some((
            TWO_BYTES_EXTENDED,
            Extended::TwoBytes((value - TWO_BYTES_OFFSET) as u16),
        )),
        _ => None,
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let b = *self.buf.get(self.pos).ok_or(DecodeError::TruncatedOption)?;
        self.pos += 1;
        Ok(b)
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or(DecodeError::TruncatedOption)?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_extended(&mut self, nibble: u8, reserved: DecodeError) -> Result<u32, DecodeError> {
        match nibble {
            ONE_BYTE_EXTENDED => Ok(u32::from(self.read_u8()?) + ONE_BYTE_OFFSET),
            TWO_BYTES_EXTENDED => {
                let b = self.read_slice(2)?;
                Ok(u32::from(u16::from_be_bytes([b[0], b[1]])) + TWO_BYTES_OFFSET)
            }
            RESERVED_NIBBLE => Err(reserved),
            n => Ok(u32::from(n)),
        }
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos.min(self.buf.len())..];
        self.pos = self.buf.len();
        rest
    }
}

fn parse(buf: &[u8], config: &DecodeConfig) -> Result<Message, DecodeError> {
    if buf.len() < HEADER_LEN {
        return Err(DecodeError::MessageTooShort(buf.len()));
    }

    let first = buf[0];
    let version = first >> 6;
    if version != COAP_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let token_length = first & 0x0F;
    if usize::from(token_length) > Token::MAX_LEN {
        return Err(DecodeError::InvalidTokenLength(token_length));
    }
    let type_bits = first >> 4 & 0b11;
    let message_type =
        MessageType::from_bits(type_bits).ok_or(DecodeError::InvalidMessageType(type_bits))?;

    let options_start = HEADER_LEN + usize::from(token_length);
    if options_start > buf.len() {
        return Err(DecodeError::TruncatedToken {
            expected: usize::from(token_length),
            available: buf.len() - HEADER_LEN,
        });
    }
    let token = Token::from_bytes(&buf[HEADER_LEN..options_start])
        .map_err(|_| DecodeError::InvalidTokenLength(token_length))?;

    let mut message = Message {
        message_type,
        code: CodeValue::from_raw(buf[1]),
        message_id: Some(u16::from_be_bytes([buf[2], buf[3]])),
        token,
        ..Message::default()
    };

    let mut reader = Reader {
        buf,
        pos: options_start,
    };
    let mut option_number: u32 = 0;
    while !reader.is_empty() {
        let byte = reader.read_u8()?;
        if byte == PAYLOAD_MARKER {
            let payload = reader.rest();
            if payload.is_empty() {
                if config.reject_empty_payload {
                    return Err(DecodeError::EmptyPayload);
                }
                debug!("accepting payload marker without payload");
            }
            message.payload = Some(payload.to_vec());
            break;
        }

        let delta = reader.read_extended(byte >> 4, DecodeError::InvalidOptionDelta)?;
        let length = reader.read_extended(byte & 0x0F, DecodeError::InvalidOptionLength)?;
        option_number = option_number
            .checked_add(delta)
            .ok_or(DecodeError::OptionNumberOverflow)?;

        let value = reader.read_slice(length as usize)?;
        message
            .options
            .entry(option_number)
            .or_default()
            .push(value.to_vec());
    }

    Ok(message)
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.message_type, self.code)?;
        if let Some(sample) = self.code.code_sample() {
            write!(f, " ({})", sample.name())?;
        }
        write!(f, " mid={}", self.message_id.unwrap_or(0))?;
        if !self.token.is_empty() {
            write!(f, " token={}", self.token)?;
        }
        for (&number, values) in &self.options {
            let option = CoapOption::from(number);
            for value in values {
                write!(f, " <{}:{}>", option, hex::encode(value))?;
            }
        }
        if self.payload.is_some() {
            write!(f, " payload={:?}", self.payload_representation())?;
        }
        Ok(())
    }
}
