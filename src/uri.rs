use std::collections::HashMap;
use std::str;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::config::{DEFAULT_PORT, DEFAULT_SECURE_PORT};
use crate::error::UriError;
use crate::message::options::CoapOption;
use crate::message::packet::Message;

/// Path segments and query entries of a request target, as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathAndQuery {
    pub path: Vec<Vec<u8>>,
    pub query: Vec<Vec<u8>>,
}

/// Splits `path?query` into `/`-separated path segments and `&`-separated
/// query entries. Segments are kept as written, including empty ones.
pub fn split_path_and_query(target: &str) -> Result<PathAndQuery, UriError> {
    let parts: Vec<&str> = target.split('?').collect();
    if parts.len() > 2 {
        return Err(UriError::MultipleQueryDelimiters(parts.len() - 1));
    }
    let split = |s: &str, separator: char| -> Vec<Vec<u8>> {
        s.split(separator).map(|p| p.as_bytes().to_vec()).collect()
    };
    Ok(PathAndQuery {
        path: split(parts[0], '/'),
        query: parts.get(1).map_or_else(Vec::new, |q| split(q, '&')),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Option<String>,
}

fn bracketed_host() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\[(.*?)]$").unwrap())
}

pub fn parse_coap_url(url: &str) -> Result<CoapUrl, UriError> {
    let url_params = Url::parse(url)?;

    let scheme = url_params.scheme().to_string();
    let default_port = match scheme.as_str() {
        "coap" => DEFAULT_PORT,
        "coaps" => DEFAULT_SECURE_PORT,
        _ => return Err(UriError::UnsupportedScheme(scheme)),
    };

    let host = match url_params.host_str() {
        Some("") | None => return Err(UriError::MissingHost),
        Some(h) => h,
    };
    let host = bracketed_host().replace(host, "$1").to_string();

    Ok(CoapUrl {
        scheme,
        host,
        port: url_params.port().unwrap_or(default_port),
        path: url_params.path().to_string(),
        query: url_params.query().map(str::to_string),
    })
}

impl Message {
    /// Replaces the Uri-Path options with the non-empty segments of `path`.
    pub fn set_uri_path(&mut self, path: &str) {
        self.clear_option(CoapOption::UriPath);
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            self.add_option(CoapOption::UriPath, segment.as_bytes().to_vec());
        }
    }

    /// The Uri-Path segments joined with `/`; segments that are not UTF-8
    /// are left out.
    pub fn complete_uri_path(&self) -> String {
        match self.get_option(CoapOption::UriPath) {
            Some(segments) => segments
                .iter()
                .filter_map(|s| str::from_utf8(s).ok())
                .collect::<Vec<_>>()
                .join("/"),
            None => String::new(),
        }
    }

    /// `key=value` Uri-Query entries as a map. Entries that do not split
    /// into exactly two parts are skipped.
    pub fn uri_query_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for entry in self.get_option(CoapOption::UriQuery).unwrap_or_default() {
            let Ok(entry) = str::from_utf8(entry) else {
                continue;
            };
            let parts: Vec<&str> = entry.split('=').collect();
            if let [key, value] = parts.as_slice() {
                map.insert(key.to_string(), value.to_string());
            }
        }
        map
    }
}
