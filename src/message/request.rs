use rand::Rng;

use super::header::{CodeSample, MessageType};
use super::options::{encode_uint, CoapOption};
use super::packet::{Message, Token};
use crate::config::DEFAULT_PORT;
use crate::error::UriError;
use crate::uri::parse_coap_url;

/// A random message id, for transports that do not keep a counter.
pub fn generate_message_id() -> u16 {
    rand::thread_rng().gen()
}

/// A random 4 octet token.
pub fn generate_token() -> Token {
    Token::new(u64::from(rand::thread_rng().gen::<u32>()))
}

/// A builder for request messages
pub struct RequestBuilder<'a> {
    path: &'a str,
    method: CodeSample,
    data: Option<Vec<u8>>,
    queries: Vec<String>,
    domain: String,
    port: Option<u16>,
    confirmable: bool,
    token: Option<Token>,
    message_id: Option<u16>,
    options: Vec<(CoapOption, Vec<u8>)>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(path: &'a str, method: CodeSample) -> Self {
        Self {
            path,
            method,
            data: None,
            queries: vec![],
            domain: "".to_string(),
            port: None,
            confirmable: true,
            token: None,
            message_id: None,
            options: vec![],
        }
    }

    /// Start from a `coap://host:port/path?query` url. Uri-Port is only
    /// added when the port differs from the default.
    pub fn from_url(url: &'a str, method: CodeSample) -> Result<Self, UriError> {
        let parsed = parse_coap_url(url)?;
        let mut builder = Self::new("", method).domain(parsed.host);
        builder.path = url_path(url);
        if parsed.port != DEFAULT_PORT {
            builder.port = Some(parsed.port);
        }
        if let Some(query) = parsed.query {
            builder.queries = query.split('&').map(str::to_string).collect();
        }
        Ok(builder)
    }

    /// Set the payload of the request.
    pub fn data(mut self, data: Option<Vec<u8>>) -> Self {
        self.data = data;
        self
    }
    /// add a Uri-Query entry.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.queries.push(query.into());
        self
    }
    /// set the domain of the request.
    pub fn domain(mut self, domain: String) -> Self {
        self.domain = domain;
        self
    }
    /// set whether the request is confirmable.
    pub fn confirmable(mut self, confirmable: bool) -> Self {
        self.confirmable = confirmable;
        self
    }
    /// set the token of the request
    pub fn token(mut self, token: Option<Token>) -> Self {
        self.token = token;
        self
    }
    pub fn message_id(mut self, message_id: Option<u16>) -> Self {
        self.message_id = message_id;
        self
    }
    /// set the options of the request
    pub fn options(mut self, options: Vec<(CoapOption, Vec<u8>)>) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Message {
        let message_type = match self.confirmable {
            true => MessageType::Confirmable,
            false => MessageType::NonConfirmable,
        };
        let mut request = Message::with(self.method.code_value(), message_type, self.data);
        if !self.domain.is_empty() {
            request.add_option(CoapOption::UriHost, self.domain.into_bytes());
        }
        if let Some(port) = self.port {
            request.add_option(CoapOption::UriPort, encode_uint(u64::from(port)));
        }
        request.set_uri_path(self.path);
        for query in self.queries.into_iter().filter(|q| !q.is_empty()) {
            request.add_option(CoapOption::UriQuery, query.into_bytes());
        }
        for (option, value) in self.options {
            request.add_option(option, value);
        }
        if let Some(token) = self.token {
            request.token = token;
        }
        request.message_id = self.message_id;
        request
    }
}

// the path component of a url without its query or fragment
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.find('/').map_or("", |start| &rest[start..]);
    path.split(['?', '#']).next().unwrap_or("")
}
