use futures::{SinkExt, StreamExt};
use tokio_util::codec::{FramedRead, FramedWrite};

use coap_message::config::DecodeConfig;
use coap_message::{CodeSample, Message, MessageCodec, MessageType, RequestBuilder, Token};

const ACK_CONTENT: [u8; 11] = [0x64, 0x45, 0x13, 0xFD, 0xD0, 0xE2, 0x4D, 0xAC, 0xFF, 0x48, 0x69];

#[tokio::test]
async fn test_read_datagrams() {
    let reset = [0x70, 0x00, 0x00, 0x07];
    let mock = tokio_test::io::Builder::new()
        .read(&ACK_CONTENT)
        .read(&reset)
        .build();
    let mut frames = FramedRead::new(mock, MessageCodec::new());

    let first = frames.next().await.unwrap().unwrap();
    assert_eq!(first.message_type, MessageType::Acknowledgement);
    assert_eq!(first.status(), Some(CodeSample::Content));
    assert_eq!(first.token, Token::new(0xD0E24DAC));
    assert_eq!(first.payload_representation(), "Hi");

    let second = frames.next().await.unwrap().unwrap();
    assert_eq!(second.message_type, MessageType::Reset);
    assert_eq!(second.message_id, Some(7));

    assert!(frames.next().await.is_none());
}

#[tokio::test]
async fn test_read_rejects_malformed_datagram() {
    let mock = tokio_test::io::Builder::new()
        .read(&[0x40, 0x01, 0x00, 0x01, 0xFF])
        .build();
    let mut frames = FramedRead::new(mock, MessageCodec::with_config(DecodeConfig::strict()));
    let err = frames.next().await.unwrap().unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[tokio::test]
async fn test_write_request() {
    let request = RequestBuilder::new("/a", CodeSample::Get)
        .confirmable(false)
        .message_id(Some(1))
        .build();
    let mock = tokio_test::io::Builder::new()
        .write(&[0x50, 0x01, 0x00, 0x01, 0xB1, b'a'])
        .build();
    let mut frames = FramedWrite::new(mock, MessageCodec::new());
    frames.send(request).await.unwrap();
}

#[tokio::test]
async fn test_write_then_read_back() {
    let mut response = Message::with(
        CodeSample::Content.code_value(),
        MessageType::Acknowledgement,
        Some(b"Hi".to_vec()),
    );
    response.message_id = Some(5117);
    response.token = Token::new(0xD0E24DAC);

    let mock = tokio_test::io::Builder::new().write(&ACK_CONTENT).build();
    let mut writer = FramedWrite::new(mock, MessageCodec::new());
    writer.send(&response).await.unwrap();

    let mock = tokio_test::io::Builder::new().read(&ACK_CONTENT).build();
    let mut reader = FramedRead::new(mock, MessageCodec::new());
    assert_eq!(reader.next().await.unwrap().unwrap(), response);
}
