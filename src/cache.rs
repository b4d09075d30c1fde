//! Cache-key equivalence and freshness (RFC 7252 section 5.6).

use std::time::{Duration, SystemTime};

use crate::config::DEFAULT_MAX_AGE;
use crate::message::packet::Message;
use crate::message::options::is_no_cache_key;

/// Whether `second` may be answered from a cached response to `first`.
///
/// Code, host name and port must match. Options flagged no-cache-key are
/// ignored; every other option must be present in both messages with the
/// same values in the same order.
pub fn cache_equivalent(first: &Message, second: &Message) -> bool {
    if first.code != second.code || first.host_name != second.host_name || first.port != second.port {
        return false;
    }

    let (a, b) = (first.options(), second.options());
    let only_in_one = a
        .keys()
        .filter(|n| !b.contains_key(n))
        .chain(b.keys().filter(|n| !a.contains_key(n)));
    if only_in_one.into_iter().any(|&n| !is_no_cache_key(n)) {
        return false;
    }

    a.iter()
        .filter_map(|(n, values)| b.get(n).map(|other| (*n, values, other)))
        .all(|(n, values, other)| is_no_cache_key(n) || values == other)
}

/// Max-Age of the message, or the 60 second default. A Max-Age value that
/// cannot be read as an unsigned integer counts as absent.
pub fn effective_max_age(message: &Message) -> Duration {
    message
        .max_age()
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_MAX_AGE)
}

pub fn is_fresh(message: &Message) -> bool {
    is_fresh_at(message, SystemTime::now())
}

/// Fresh until `timestamp + max_age`, inclusive. A message that was never
/// stamped is never fresh.
pub fn is_fresh_at(message: &Message, now: SystemTime) -> bool {
    let Some(timestamp) = message.timestamp else {
        return false;
    };
    match timestamp.checked_add(effective_max_age(message)) {
        Some(expiry) => now <= expiry,
        None => true,
    }
}

impl Message {
    pub fn is_cache_equivalent(&self, other: &Message) -> bool {
        cache_equivalent(self, other)
    }

    pub fn is_fresh(&self) -> bool {
        is_fresh(self)
    }

    /// Records the receive time used by the freshness check.
    pub fn mark_received(&mut self) {
        self.timestamp = Some(SystemTime::now());
    }
}
