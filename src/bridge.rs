//! Mapping between CoAP messages and `http` requests/responses for proxies.
//!
//! Outgoing requests carry each registered option as a header named after
//! the option, uppercased (`URI_PATH`, `MAX_AGE`, ...). Responses coming back
//! from the HTTP side are expected to use the `HTTP_` prefixed form of the
//! same names, plus a `COAP_TYPE` header holding the short message type.

use std::str;

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request, Response};
use log::{debug, trace};

use crate::config::PROXY_COAP_TYPE_HEADER;
use crate::error::BridgeError;
use crate::message::header::{CodeValue, MessageType};
use crate::message::options::{decode_uint, CoapOption, OptionFormat, REGISTERED_OPTIONS};
use crate::message::packet::Message;

/// Opaque values always travel as `0x` prefixed hex.
const HEX_PREFIX: &str = "0x";
const RESPONSE_HEADER_PREFIX: &str = "HTTP_";

/// Builds the HTTP request a proxy forwards for `message` to `uri`.
pub fn to_http_request(message: &Message, uri: &str) -> Result<Request<Vec<u8>>, BridgeError> {
    let method = message
        .code
        .request_string()
        .ok_or(BridgeError::NotARequest(message.code))?;
    let method = Method::from_bytes(method.as_bytes()).map_err(http::Error::from)?;

    let mut headers = HeaderMap::new();
    for (&number, values) in message.options() {
        let option = CoapOption::from(number);
        let Some(name) = option.name() else {
            trace!("skipping unregistered option {} for http request", number);
            continue;
        };
        let header_name =
            HeaderName::from_bytes(name.to_uppercase().as_bytes()).map_err(http::Error::from)?;
        for value in values {
            let header_value = header_value(option, value)
                .ok_or(BridgeError::InvalidHeaderValue { option: name })?;
            headers.append(header_name.clone(), header_value);
        }
    }

    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .body(message.payload.clone().unwrap_or_default())?;
    *request.headers_mut() = headers;
    Ok(request)
}

fn header_value(option: CoapOption, value: &[u8]) -> Option<HeaderValue> {
    match option.format() {
        OptionFormat::Empty => Some(HeaderValue::from_static("")),
        // text that is not UTF-8 is sent as an empty value
        OptionFormat::String => match str::from_utf8(value) {
            Ok(text) => HeaderValue::from_bytes(text.as_bytes()).ok(),
            Err(_) => Some(HeaderValue::from_static("")),
        },
        OptionFormat::UInt => {
            let number = decode_uint(value)?;
            Some(HeaderValue::from(number))
        }
        OptionFormat::Opaque => {
            HeaderValue::from_str(&format!("{}{}", HEX_PREFIX, hex::encode(value))).ok()
        }
    }
}

/// Turns the HTTP side's answer back into a CoAP message.
///
/// The low octet of the status becomes the code. A missing or unknown
/// `COAP_TYPE` header leaves the message confirmable.
pub fn from_http_response(response: &Response<Vec<u8>>) -> Message {
    let code = CodeValue::from_raw((response.status().as_u16() & 0xFF) as u8);
    let message_type = response
        .headers()
        .get(PROXY_COAP_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(MessageType::from_short_str)
        .unwrap_or_default();

    let body = response.body();
    let payload = if body.is_empty() { None } else { Some(body.clone()) };
    let mut message = Message::with(code, message_type, payload);

    for option in REGISTERED_OPTIONS {
        let Some(name) = option.name() else { continue };
        let header = format!("{}{}", RESPONSE_HEADER_PREFIX, name.to_uppercase());
        if let Some(value) = response.headers().get(header.as_str()) {
            message.set_option(option, vec![option_value(option, value)]);
        }
    }
    debug!("mapped http {} to {}", response.status(), message);
    message
}

// Opaque headers that are not hex are taken as raw bytes; any other value
// that does not parse becomes an empty option.
fn option_value(option: CoapOption, value: &HeaderValue) -> Vec<u8> {
    let parsed = str::from_utf8(value.as_bytes())
        .ok()
        .and_then(|text| option.value_from_str(text));
    match (parsed, option.format()) {
        (Some(bytes), _) => bytes,
        (None, OptionFormat::Opaque) => value.as_bytes().to_vec(),
        (None, _) => vec![],
    }
}
