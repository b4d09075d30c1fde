use std::fmt;

/// How the value of an option is interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum OptionFormat {
    Empty,
    Opaque,
    UInt,
    String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum CoapOption {
    IfMatch,
    UriHost,
    ETag,
    IfNoneMatch,
    Observe,
    UriPort,
    LocationPath,
    UriPath,
    ContentFormat,
    MaxAge,
    UriQuery,
    Accept,
    LocationQuery,
    Block2,
    Block1,
    Size2,
    ProxyUri,
    ProxyScheme,
    Size1,
    Unknown(u32),
}

/// Every registered option, in ascending number order.
pub const REGISTERED_OPTIONS: [CoapOption; 19] = [
    CoapOption::IfMatch,
    CoapOption::UriHost,
    CoapOption::ETag,
    CoapOption::IfNoneMatch,
    CoapOption::Observe,
    CoapOption::UriPort,
    CoapOption::LocationPath,
    CoapOption::UriPath,
    CoapOption::ContentFormat,
    CoapOption::MaxAge,
    CoapOption::UriQuery,
    CoapOption::Accept,
    CoapOption::LocationQuery,
    CoapOption::Block2,
    CoapOption::Block1,
    CoapOption::Size2,
    CoapOption::ProxyUri,
    CoapOption::ProxyScheme,
    CoapOption::Size1,
];

impl CoapOption {
    pub fn number(self) -> u32 {
        match self {
            CoapOption::IfMatch => 1,
            CoapOption::UriHost => 3,
            CoapOption::ETag => 4,
            CoapOption::IfNoneMatch => 5,
            CoapOption::Observe => 6,
            CoapOption::UriPort => 7,
            CoapOption::LocationPath => 8,
            CoapOption::UriPath => 11,
            CoapOption::ContentFormat => 12,
            CoapOption::MaxAge => 14,
            CoapOption::UriQuery => 15,
            CoapOption::Accept => 17,
            CoapOption::LocationQuery => 20,
            CoapOption::Block2 => 23,
            CoapOption::Block1 => 27,
            CoapOption::Size2 => 28,
            CoapOption::ProxyUri => 35,
            CoapOption::ProxyScheme => 39,
            CoapOption::Size1 => 60,
            CoapOption::Unknown(number) => number,
        }
    }

    /// Display name, `None` for unregistered numbers.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            CoapOption::IfMatch => "If_Match",
            CoapOption::UriHost => "URI_Host",
            CoapOption::ETag => "ETAG",
            CoapOption::IfNoneMatch => "If_None_Match",
            CoapOption::Observe => "Observe",
            CoapOption::UriPort => "URI_Port",
            CoapOption::LocationPath => "Location_Path",
            CoapOption::UriPath => "URI_Path",
            CoapOption::ContentFormat => "Content_Format",
            CoapOption::MaxAge => "Max_Age",
            CoapOption::UriQuery => "URI_Query",
            CoapOption::Accept => "Accept",
            CoapOption::LocationQuery => "Location_Query",
            CoapOption::Block2 => "Block2",
            CoapOption::Block1 => "Block1",
            CoapOption::Size2 => "Size2",
            CoapOption::ProxyUri => "Proxy_URI",
            CoapOption::ProxyScheme => "Proxy_Scheme",
            CoapOption::Size1 => "Size1",
            CoapOption::Unknown(_) => return None,
        };
        Some(name)
    }

    pub fn format(self) -> OptionFormat {
        match self {
            CoapOption::IfNoneMatch => OptionFormat::Empty,
            CoapOption::IfMatch | CoapOption::ETag => OptionFormat::Opaque,
            CoapOption::UriHost
            | CoapOption::LocationPath
            | CoapOption::UriPath
            | CoapOption::UriQuery
            | CoapOption::LocationQuery
            | CoapOption::ProxyUri
            | CoapOption::ProxyScheme => OptionFormat::String,
            // unregistered values are carried as opaque bytes
            CoapOption::Unknown(_) => OptionFormat::Opaque,
            _ => OptionFormat::UInt,
        }
    }

    /// Looks up a registered option by its display name, ignoring case.
    pub fn from_name(name: &str) -> Option<CoapOption> {
        REGISTERED_OPTIONS
            .into_iter()
            .find(|option| option.name().map_or(false, |n| n.eq_ignore_ascii_case(name)))
    }

    /// Parses a textual value into option bytes according to the format.
    ///
    /// Empty options take no bytes; opaque values are hex, with or without a
    /// `0x` prefix; uint values are decimal. Returns `None` when the text
    /// does not fit the format.
    pub fn value_from_str(self, value: &str) -> Option<Vec<u8>> {
        match self.format() {
            OptionFormat::Empty => Some(vec![]),
            OptionFormat::String => Some(value.as_bytes().to_vec()),
            OptionFormat::UInt => value.trim().parse::<u64>().ok().map(encode_uint),
            OptionFormat::Opaque => {
                let digits = value.strip_prefix("0x").unwrap_or(value);
                if digits.len() % 2 == 1 {
                    hex::decode(format!("0{}", digits)).ok()
                } else {
                    hex::decode(digits).ok()
                }
            }
        }
    }

    pub fn is_registered(self) -> bool {
        !matches!(self, CoapOption::Unknown(_))
    }

    pub fn is_critical(self) -> bool {
        is_critical(self.number())
    }

    pub fn is_unsafe(self) -> bool {
        is_unsafe(self.number())
    }

    pub fn is_no_cache_key(self) -> bool {
        is_no_cache_key(self.number())
    }

    pub fn is_repeatable(self) -> bool {
        is_repeatable(self.number())
    }
}

impl From<u32> for CoapOption {
    fn from(number: u32) -> Self {
        REGISTERED_OPTIONS
            .into_iter()
            .find(|option| option.number() == number)
            .unwrap_or(CoapOption::Unknown(number))
    }
}

impl From<CoapOption> for u32 {
    fn from(option: CoapOption) -> Self {
        option.number()
    }
}

impl fmt::Display for CoapOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown({})", self.number()),
        }
    }
}

#[inline]
pub fn is_critical(number: u32) -> bool {
    number & 1 == 1
}

#[inline]
pub fn is_unsafe(number: u32) -> bool {
    number & 0b10 == 0b10
}

#[inline]
pub fn is_no_cache_key(number: u32) -> bool {
    number & 0b11110 == 0b11100
}

pub fn is_repeatable(number: u32) -> bool {
    matches!(
        CoapOption::from(number),
        CoapOption::IfMatch
            | CoapOption::ETag
            | CoapOption::LocationPath
            | CoapOption::UriPath
            | CoapOption::UriQuery
            | CoapOption::LocationQuery
    )
}

/// Minimal big-endian encoding of an unsigned option value; zero is empty.
pub fn encode_uint(value: u64) -> Vec<u8> {
    let len = ((u64::BITS - value.leading_zeros() + 7) / 8) as usize;
    value.to_be_bytes()[8 - len..].to_vec()
}

/// Reads a big-endian unsigned option value, `None` if it is wider than 64 bits.
pub fn decode_uint(bytes: &[u8]) -> Option<u64> {
    if bytes.len() > 8 {
        return None;
    }
    Some(bytes.iter().fold(0u64, |acc, b| acc << 8 | u64::from(*b)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_number_round_trip() {
        for option in REGISTERED_OPTIONS {
            assert_eq!(CoapOption::from(option.number()), option);
            assert!(option.name().is_some());
        }
        assert_eq!(CoapOption::from(258), CoapOption::Unknown(258));
        assert_eq!(CoapOption::Unknown(258).name(), None);
        assert_eq!(CoapOption::Unknown(258).format(), OptionFormat::Opaque);
        assert_eq!(CoapOption::Unknown(9).to_string(), "Unknown(9)");
    }

    #[test]
    fn test_bit_predicates() {
        assert!(CoapOption::IfMatch.is_critical());
        assert!(CoapOption::UriHost.is_critical());
        assert!(!CoapOption::ETag.is_critical());
        assert!(CoapOption::UriHost.is_unsafe());
        assert!(CoapOption::Observe.is_unsafe());
        assert!(!CoapOption::ContentFormat.is_unsafe());
        assert!(CoapOption::Size1.is_no_cache_key());
        assert!(CoapOption::Size2.is_no_cache_key());
        assert!(!CoapOption::MaxAge.is_no_cache_key());
        assert!(is_no_cache_key(0b11100));
        assert!(is_no_cache_key(0b11101));
        assert!(!is_no_cache_key(0b11000));
    }

    #[test]
    fn test_repeatable() {
        let repeatable: Vec<u32> = REGISTERED_OPTIONS
            .into_iter()
            .filter(|o| o.is_repeatable())
            .map(u32::from)
            .collect();
        assert_eq!(repeatable, vec![1, 4, 8, 11, 15, 20]);
        assert!(!is_repeatable(1000));
    }

    #[test]
    fn test_formats() {
        assert_eq!(CoapOption::IfNoneMatch.format(), OptionFormat::Empty);
        assert_eq!(CoapOption::ETag.format(), OptionFormat::Opaque);
        assert_eq!(CoapOption::ProxyScheme.format(), OptionFormat::String);
        assert_eq!(CoapOption::MaxAge.format(), OptionFormat::UInt);
        assert_eq!(CoapOption::Block2.format(), OptionFormat::UInt);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(CoapOption::from_name("URI_Path"), Some(CoapOption::UriPath));
        assert_eq!(CoapOption::from_name("max_age"), Some(CoapOption::MaxAge));
        assert_eq!(CoapOption::from_name("ETAG"), Some(CoapOption::ETag));
        assert_eq!(CoapOption::from_name("Unknown(9)"), None);
    }

    #[test]
    fn test_value_from_str() {
        assert_eq!(CoapOption::IfNoneMatch.value_from_str("ignored"), Some(vec![]));
        assert_eq!(CoapOption::UriPath.value_from_str("temp"), Some(b"temp".to_vec()));
        assert_eq!(CoapOption::MaxAge.value_from_str("300"), Some(vec![0x01, 0x2C]));
        assert_eq!(CoapOption::MaxAge.value_from_str("0"), Some(vec![]));
        assert_eq!(CoapOption::MaxAge.value_from_str("-1"), None);
        assert_eq!(CoapOption::MaxAge.value_from_str("ten"), None);
        assert_eq!(CoapOption::ETag.value_from_str("0x0a0b"), Some(vec![0x0A, 0x0B]));
        assert_eq!(CoapOption::ETag.value_from_str("a0b"), Some(vec![0x0A, 0x0B]));
        assert_eq!(CoapOption::ETag.value_from_str("0x"), Some(vec![]));
        assert_eq!(CoapOption::IfMatch.value_from_str("plain"), None);
        assert_eq!(CoapOption::Unknown(65000).value_from_str("ff"), Some(vec![0xFF]));
    }

    #[test]
    fn test_uint_values() {
        assert_eq!(encode_uint(0), Vec::<u8>::new());
        assert_eq!(encode_uint(255), vec![0xFF]);
        assert_eq!(encode_uint(256), vec![0x01, 0x00]);
        assert_eq!(encode_uint(u64::MAX), vec![0xFF; 8]);
        assert_eq!(decode_uint(&[]), Some(0));
        assert_eq!(decode_uint(&[0x01, 0x00]), Some(256));
        assert_eq!(decode_uint(&[0x01; 9]), None);
    }
}
