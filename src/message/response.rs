use super::header::{CodeSample, MessageType};
use super::packet::Message;

impl Message {
    /// The piggybacked response skeleton for a request: ACK for CON, NON for
    /// NON, same message id and token, 2.05 Content. ACK and RST messages get
    /// no response.
    pub fn new_response(request: &Message) -> Option<Message> {
        let response_type = match request.message_type {
            MessageType::Confirmable => MessageType::Acknowledgement,
            MessageType::NonConfirmable => MessageType::NonConfirmable,
            _ => return None,
        };
        let mut response = Message::with(CodeSample::Content.code_value(), response_type, None);
        response.message_id = request.message_id;
        response.token = request.token;
        response.host_name = request.host_name.clone();
        response.port = request.port;
        Some(response)
    }

    pub fn set_status(&mut self, status: CodeSample) {
        self.code = status.code_value();
    }

    /// The well-known code of the message, if any.
    pub fn status(&self) -> Option<CodeSample> {
        self.code.code_sample()
    }
}
