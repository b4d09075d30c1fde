pub mod content_format;
pub mod header;
pub mod options;
pub mod packet;
pub mod request;
pub mod response;

use bytes::BytesMut;
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::config::DecodeConfig;
use packet::Message;

/// Datagram codec: every buffer handed to the decoder is one whole message.
#[derive(Debug, Clone, Default)]
pub struct MessageCodec {
    config: DecodeConfig,
}

impl MessageCodec {
    pub fn new() -> MessageCodec {
        MessageCodec::default()
    }

    pub fn with_config(config: DecodeConfig) -> MessageCodec {
        MessageCodec { config }
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Message>, io::Error> {
        if buf.is_empty() {
            return Ok(None);
        }
        let datagram = buf.split_to(buf.len());
        Ok(Some(Message::from_bytes_with(&datagram, &self.config)?))
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = io::Error;

    fn encode(&mut self, message: Message, buf: &mut BytesMut) -> Result<(), io::Error> {
        buf.extend_from_slice(&message.to_bytes()?);
        Ok(())
    }
}

impl Encoder<&Message> for MessageCodec {
    type Error = io::Error;

    fn encode(&mut self, message: &Message, buf: &mut BytesMut) -> Result<(), io::Error> {
        buf.extend_from_slice(&message.to_bytes()?);
        Ok(())
    }
}
