use coap_message::{CoapOption, CodeValue, Message, MessageType, Token};
use quickcheck::{Arbitrary, Gen, QuickCheck};

#[derive(Clone, Debug)]
struct AnyMessage(Message);

impl Arbitrary for AnyMessage {
    fn arbitrary(g: &mut Gen) -> Self {
        let message_type = *g
            .choose(&[
                MessageType::Confirmable,
                MessageType::NonConfirmable,
                MessageType::Acknowledgement,
                MessageType::Reset,
            ])
            .unwrap();
        let mut message = Message::with(
            CodeValue::from_raw(u8::arbitrary(g)),
            message_type,
            Option::<Vec<u8>>::arbitrary(g),
        );
        message.message_id = Option::<u16>::arbitrary(g);
        message.token = Token::new(u64::arbitrary(g));
        for (number, value) in Vec::<(u16, Vec<u8>)>::arbitrary(g) {
            message.add_option(CoapOption::from(u32::from(number)), value);
        }
        AnyMessage(message)
    }
}

#[test]
fn decode_inverts_encode() {
    fn prop(message: AnyMessage) -> bool {
        let bytes = message.0.to_bytes().unwrap();
        Message::from_bytes(&bytes).unwrap() == message.0
    }
    QuickCheck::new()
        .tests(2000)
        .quickcheck(prop as fn(AnyMessage) -> bool)
}

#[test]
fn repeated_options_keep_arrival_order() {
    let mut message = Message::with(
        CodeValue::from_raw(0x01),
        MessageType::NonConfirmable,
        None,
    );
    for segment in ["c", "a", "b"] {
        message.add_option(CoapOption::UriPath, segment.as_bytes().to_vec());
    }
    message.add_option(CoapOption::Unknown(2048), vec![0x01]);
    let decoded = Message::from_bytes(&message.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.complete_uri_path(), "c/a/b");
    assert_eq!(
        decoded.get_first_option(CoapOption::Unknown(2048)),
        Some(&[0x01u8][..])
    );
    assert_eq!(decoded, message);
}
