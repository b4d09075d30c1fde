//! The message layer of the [CoAP Protocol][spec].
//!
//! This library provides the building blocks a CoAP client, server or proxy
//! puts on top of its transport:
//!
//! - the binary wire codec for a single `Message`
//! - the option, code and content-format catalog
//! - cache-key equivalence and Max-Age freshness
//! - the mapping between CoAP messages and `http` requests/responses
//! - a resource model with a handler contract
//! - a `tokio_util` codec for framing datagrams
//!
//! Sockets, retransmission, observe and block-wise transfer are left to the
//! transport.
//!
//! # Installation
//!
//! First add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! coap-message = "0.1"
//! ```
//!
//! # Example
//!
//! ```
//! use coap_message::{CodeSample, CoapOption, Message, MessageType, Token};
//!
//! let mut request = Message::with(CodeSample::Get.code_value(), MessageType::Confirmable, None);
//! request.message_id = Some(0x84A2);
//! request.token = Token::new(0x2A);
//! request.set_uri_path("sensors/temp");
//!
//! let bytes = request.to_bytes().unwrap();
//! let decoded = Message::from_bytes(&bytes).unwrap();
//! assert_eq!(decoded, request);
//! assert_eq!(decoded.complete_uri_path(), "sensors/temp");
//! assert!(decoded.get_option(CoapOption::UriQuery).is_none());
//! ```
//!
//! [spec]: https://tools.ietf.org/html/rfc7252

#[cfg(test)]
extern crate quickcheck;

pub use self::bridge::{from_http_response, to_http_request};
pub use self::cache::{cache_equivalent, is_fresh, is_fresh_at};
pub use self::config::{DecodeConfig, TransmissionParameters};
pub use self::error::{BridgeError, CodeValueError, DecodeError, EncodeError, TokenError, UriError};
pub use self::message::content_format::ContentFormat;
pub use self::message::header::{CodeSample, CodeValue, MessageType};
pub use self::message::options::{CoapOption, OptionFormat};
pub use self::message::packet::{Message, Token};
pub use self::message::request::RequestBuilder;
pub use self::message::MessageCodec;
pub use self::resource::{respond, AllowedMethods, HandlerResponse, Resource, ResourceHandler};
pub use self::uri::split_path_and_query;

pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod message;
pub mod resource;
pub mod uri;
