//! Server-side resource description and the contract for answering requests
//! against it.
//!
//! The routing table that picks a resource for a request lives outside this
//! crate. Given the resource and its handler, [`respond`] produces the
//! piggybacked response message.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;

use blake2::digest::typenum::U8;
use blake2::{Blake2b, Digest};
use log::{debug, warn};

use crate::message::content_format::ContentFormat;
use crate::message::header::{CodeSample, CodeValue};
use crate::message::options::CoapOption;
use crate::message::packet::Message;
use crate::uri::split_path_and_query;

/// Set of request methods a resource accepts.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct AllowedMethods(u8);

impl AllowedMethods {
    pub const NONE: AllowedMethods = AllowedMethods(0);
    pub const GET: AllowedMethods = AllowedMethods(1);
    pub const POST: AllowedMethods = AllowedMethods(1 << 1);
    pub const PUT: AllowedMethods = AllowedMethods(1 << 2);
    pub const DELETE: AllowedMethods = AllowedMethods(1 << 3);
    pub const ALL: AllowedMethods = AllowedMethods(0b1111);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: AllowedMethods) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// The method flag for a request code, `None` for non-request codes.
    pub fn for_code(code: CodeValue) -> Option<AllowedMethods> {
        match code.code_sample()? {
            CodeSample::Get => Some(AllowedMethods::GET),
            CodeSample::Post => Some(AllowedMethods::POST),
            CodeSample::Put => Some(AllowedMethods::PUT),
            CodeSample::Delete => Some(AllowedMethods::DELETE),
            _ => None,
        }
    }
}

impl BitOr for AllowedMethods {
    type Output = AllowedMethods;

    fn bitor(self, rhs: AllowedMethods) -> AllowedMethods {
        AllowedMethods(self.0 | rhs.0)
    }
}

/// A resource as a value. Changing the representation yields a new value
/// whose entity tag is derived from the new content.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Resource {
    name: String,
    allowed: AllowedMethods,
    representation: Option<Vec<u8>>,
    etag: Option<Vec<u8>>,
    max_age: Option<u32>,
    observable: bool,
}

impl Resource {
    pub fn new(name: impl Into<String>, allowed: AllowedMethods) -> Resource {
        Resource {
            name: name.into(),
            allowed,
            representation: None,
            etag: None,
            max_age: None,
            observable: false,
        }
    }

    pub fn with_representation(self, representation: Option<Vec<u8>>) -> Resource {
        let etag = representation.as_deref().map(entity_tag);
        Resource {
            representation,
            etag,
            ..self
        }
    }

    pub fn with_max_age(self, max_age: Option<u32>) -> Resource {
        Resource { max_age, ..self }
    }

    pub fn with_observable(self, observable: bool) -> Resource {
        Resource { observable, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allowed(&self) -> AllowedMethods {
        self.allowed
    }

    pub fn allows(&self, code: CodeValue) -> bool {
        AllowedMethods::for_code(code).map_or(false, |method| self.allowed.contains(method))
    }

    pub fn representation(&self) -> Option<&[u8]> {
        self.representation.as_deref()
    }

    pub fn etag(&self) -> Option<&[u8]> {
        self.etag.as_deref()
    }

    pub fn max_age(&self) -> Option<u32> {
        self.max_age
    }

    pub fn is_observable(&self) -> bool {
        self.observable
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name)
    }
}

/// 64 bit BLAKE2b digest of a representation.
pub fn entity_tag(representation: &[u8]) -> Vec<u8> {
    Blake2b::<U8>::digest(representation).to_vec()
}

/// What a handler answers with.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HandlerResponse {
    pub status: CodeValue,
    pub payload: Option<Vec<u8>>,
    pub content_format: Option<ContentFormat>,
    /// `path?query` of a created or moved resource, for POST and PUT.
    pub location: Option<String>,
}

impl HandlerResponse {
    pub fn new(status: impl Into<CodeValue>) -> HandlerResponse {
        HandlerResponse {
            status: status.into(),
            payload: None,
            content_format: None,
            location: None,
        }
    }

    pub fn payload(mut self, payload: Vec<u8>, content_format: Option<ContentFormat>) -> Self {
        self.payload = Some(payload);
        self.content_format = content_format;
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Request handling for one resource. Returning `None` means the method is
/// not supported and is answered with 4.05.
pub trait ResourceHandler: Send + Sync {
    fn get(&self, _query: &HashMap<String, String>, _request: &Message) -> Option<HandlerResponse> {
        None
    }

    fn post(&self, _query: &HashMap<String, String>, _request: &Message) -> Option<HandlerResponse> {
        None
    }

    fn put(&self, _query: &HashMap<String, String>, _request: &Message) -> Option<HandlerResponse> {
        None
    }

    fn delete(&self, _query: &HashMap<String, String>, _request: &Message) -> Option<HandlerResponse> {
        None
    }
}

/// Answers `request` against `resource`. Returns `None` when the request is
/// an ACK or RST and so takes no response.
pub fn respond<H>(request: &Message, resource: &Resource, handler: &H) -> Option<Message>
where
    H: ResourceHandler + ?Sized,
{
    let mut response = Message::new_response(request)?;
    let method = AllowedMethods::for_code(request.code);

    let answer = match method {
        Some(method) if resource.allows(request.code) => {
            let query = request.uri_query_map();
            match method {
                AllowedMethods::GET => handler.get(&query, request),
                AllowedMethods::POST => handler.post(&query, request),
                AllowedMethods::PUT => handler.put(&query, request),
                _ => handler.delete(&query, request),
            }
        }
        _ => None,
    };

    let Some(answer) = answer else {
        debug!("{} {} not allowed on {}", request.code, request.message_type, resource);
        response.set_status(CodeSample::MethodNotAllowed);
        return Some(response);
    };

    response.code = answer.status;
    response.payload = answer.payload;
    if let Some(content_format) = answer.content_format {
        response.set_content_format(content_format);
    }
    if let Some(location) = answer.location.as_deref() {
        set_location(&mut response, location);
    }
    if let Some(max_age) = resource.max_age() {
        response.set_max_age(max_age);
    }
    if method == Some(AllowedMethods::GET) {
        if let Some(etag) = resource.etag() {
            response.add_option(CoapOption::ETag, etag.to_vec());
        }
    }
    debug!("{} answered {}", resource, response.code);
    Some(response)
}

fn set_location(response: &mut Message, location: &str) {
    let target = match split_path_and_query(location) {
        Ok(target) => target,
        Err(e) => {
            warn!("dropping location {:?}: {}", location, e);
            return;
        }
    };
    for segment in target.path.into_iter().filter(|s| !s.is_empty()) {
        response.add_option(CoapOption::LocationPath, segment);
    }
    for entry in target.query.into_iter().filter(|s| !s.is_empty()) {
        response.add_option(CoapOption::LocationQuery, entry);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::header::MessageType;
    use crate::message::packet::Token;

    struct Sensor;

    impl ResourceHandler for Sensor {
        fn get(&self, query: &HashMap<String, String>, _request: &Message) -> Option<HandlerResponse> {
            let unit = query.get("unit").map(String::as_str).unwrap_or("c");
            Some(
                HandlerResponse::new(CodeSample::Content)
                    .payload(format!("22.5{}", unit).into_bytes(), Some(ContentFormat::Plain)),
            )
        }

        fn post(&self, _query: &HashMap<String, String>, _request: &Message) -> Option<HandlerResponse> {
            Some(HandlerResponse::new(CodeSample::Created).location("sensors/7?rev=2"))
        }
    }

    fn request(code: CodeSample, message_type: MessageType) -> Message {
        let mut message = Message::with(code.code_value(), message_type, None);
        message.message_id = Some(7);
        message.token = Token::new(0xABCD);
        message.set_uri_path("temp");
        message
    }

    fn resource() -> Resource {
        Resource::new("temp", AllowedMethods::GET | AllowedMethods::POST | AllowedMethods::PUT)
            .with_representation(Some(b"22.5".to_vec()))
            .with_max_age(Some(30))
    }

    #[test]
    fn test_allowed_methods() {
        let allowed = AllowedMethods::GET | AllowedMethods::DELETE;
        assert_eq!(allowed.bits(), 9);
        assert!(allowed.contains(AllowedMethods::GET));
        assert!(!allowed.contains(AllowedMethods::PUT));
        assert!(!allowed.contains(AllowedMethods::NONE));
        assert!(AllowedMethods::ALL.contains(allowed));
        assert_eq!(
            AllowedMethods::for_code(CodeSample::Put.code_value()),
            Some(AllowedMethods::PUT)
        );
        assert_eq!(AllowedMethods::for_code(CodeSample::Content.code_value()), None);
    }

    #[test]
    fn test_representation_derives_etag() {
        let empty = Resource::new("temp", AllowedMethods::GET);
        assert_eq!(empty.etag(), None);

        let first = empty.clone().with_representation(Some(b"22.5".to_vec()));
        let again = empty.clone().with_representation(Some(b"22.5".to_vec()));
        let second = first.clone().with_representation(Some(b"23.0".to_vec()));
        assert_eq!(first.etag().unwrap().len(), 8);
        assert_eq!(first.etag(), again.etag());
        assert_ne!(first.etag(), second.etag());
        assert_eq!(second.representation(), Some(&b"23.0"[..]));
        assert_eq!(second.with_representation(None).etag(), None);

        let observed = first.with_observable(true);
        assert!(observed.is_observable());
        assert_eq!(observed.name(), "temp");
        assert_eq!(observed.allowed(), AllowedMethods::GET);
    }

    #[test]
    fn test_respond_get() {
        let mut req = request(CodeSample::Get, MessageType::Confirmable);
        req.add_option(CoapOption::UriQuery, b"unit=f".to_vec());
        let response = respond(&req, &resource(), &Sensor).unwrap();
        assert_eq!(response.message_type, MessageType::Acknowledgement);
        assert_eq!(response.message_id, Some(7));
        assert_eq!(response.token, Token::new(0xABCD));
        assert_eq!(response.status(), Some(CodeSample::Content));
        assert_eq!(response.payload, Some(b"22.5f".to_vec()));
        assert_eq!(response.content_format(), Some(ContentFormat::Plain));
        assert_eq!(response.max_age(), Some(30));
        assert_eq!(
            response.get_first_option(CoapOption::ETag),
            resource().etag()
        );
    }

    #[test]
    fn test_respond_post_sets_location() {
        let req = request(CodeSample::Post, MessageType::NonConfirmable);
        let response = respond(&req, &resource(), &Sensor).unwrap();
        assert_eq!(response.message_type, MessageType::NonConfirmable);
        assert_eq!(response.status(), Some(CodeSample::Created));
        assert_eq!(
            response.get_option(CoapOption::LocationPath).unwrap(),
            &[b"sensors".to_vec(), b"7".to_vec()][..]
        );
        assert_eq!(
            response.get_first_option(CoapOption::LocationQuery).unwrap(),
            b"rev=2"
        );
        assert!(response.get_option(CoapOption::ETag).is_none());
    }

    #[test]
    fn test_respond_method_not_allowed() {
        // DELETE is not in the allowed set
        let req = request(CodeSample::Delete, MessageType::Confirmable);
        let response = respond(&req, &resource(), &Sensor).unwrap();
        assert_eq!(response.status(), Some(CodeSample::MethodNotAllowed));

        // PUT is allowed but the handler has nothing for it
        let req = request(CodeSample::Put, MessageType::Confirmable);
        let response = respond(&req, &resource(), &Sensor).unwrap();
        assert_eq!(response.status(), Some(CodeSample::MethodNotAllowed));
        assert!(response.options().is_empty());
    }

    #[test]
    fn test_respond_ignores_ack() {
        let req = request(CodeSample::Get, MessageType::Acknowledgement);
        assert!(respond(&req, &resource(), &Sensor).is_none());
    }
}
