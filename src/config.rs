use std::time::Duration;

/// Protocol version carried in the two most significant header bits.
pub const COAP_VERSION: u8 = 0b01;

/// Freshness lifetime assumed when a message carries no Max-Age option.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60);

/// Header used by the HTTP bridge to carry the CoAP message type.
pub const PROXY_COAP_TYPE_HEADER: &str = "COAP_TYPE";

pub const DEFAULT_PORT: u16 = 5683;
pub const DEFAULT_SECURE_PORT: u16 = 5684;

/// Transmission parameters (RFC 7252 section 4.8) for the layer that
/// schedules retransmissions of confirmable messages.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionParameters {
    pub ack_timeout: Duration,
    pub ack_random_factor: f64,
    pub max_retransmit: u32,
    pub max_transmit_wait: Duration,
}

impl Default for TransmissionParameters {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_secs(2),
            ack_random_factor: 1.5,
            max_retransmit: 4,
            max_transmit_wait: Duration::from_secs(93),
        }
    }
}

impl TransmissionParameters {
    /// Upper bound of the randomized initial retransmission timeout.
    pub fn max_initial_timeout(&self) -> Duration {
        self.ack_timeout.mul_f64(self.ack_random_factor)
    }

    /// Timeout before the given retransmission attempt (0 = initial send),
    /// doubling each time starting from `initial`.
    pub fn timeout_for_attempt(&self, initial: Duration, attempt: u32) -> Option<Duration> {
        if attempt > self.max_retransmit {
            return None;
        }
        1u32
            .checked_shl(attempt)
            .and_then(|factor| initial.checked_mul(factor))
    }
}

/// Knobs for the wire decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeConfig {
    /// Reject a payload marker that is followed by no payload octets.
    /// RFC 7252 treats that as a format error; the default accepts it and
    /// yields an empty payload.
    pub reject_empty_payload: bool,
}

impl DecodeConfig {
    pub fn strict() -> Self {
        Self {
            reject_empty_payload: true,
        }
    }
}
