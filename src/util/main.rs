use std::error::Error;

use log::{debug, info};
use simplelog::{ColorChoice, LevelFilter, SimpleLogger, TermLogger, TerminalMode};
use structopt::StructOpt;

use coap_message::{CoapOption, CodeValue, Message, MessageType, RequestBuilder, Token};

/// A simple utility for inspecting and building CoAP datagrams
#[derive(PartialEq, Clone, Debug, StructOpt)]
pub struct Options {
    #[structopt(subcommand)]
    pub command: Command,

    #[structopt(long = "log-level", default_value = "info")]
    /// Configure app logging levels (warn, info, debug, trace)
    pub log_level: LevelFilter,
}

#[derive(PartialEq, Clone, Debug, StructOpt)]
pub enum Command {
    /// Decode a datagram given as hex and print it
    Decode {
        #[structopt()]
        /// Datagram octets as hex, e.g. 40011234
        hex: String,
    },
    /// Build a message and print its datagram as hex
    Encode(EncodeOptions),
}

#[derive(PartialEq, Clone, Debug, StructOpt)]
pub struct EncodeOptions {
    #[structopt(long = "type", default_value = "CON", parse(try_from_str = parse_type))]
    /// Message type (CON, NON, ACK, RST)
    pub message_type: MessageType,

    #[structopt(long, default_value = "0.01")]
    /// Code as class.detail
    pub code: CodeValue,

    #[structopt(long = "message-id", default_value = "0")]
    pub message_id: u16,

    #[structopt(long, parse(try_from_str = parse_token))]
    /// Token as hex, at most 8 octets
    pub token: Option<Token>,

    #[structopt(long)]
    /// Request path, or a coap:// url to take host, port, path and query from
    pub path: Option<String>,

    #[structopt(long = "option", parse(try_from_str = parse_option))]
    /// Extra option as NAME=VALUE, e.g. Max_Age=60 or ETAG=0x0a0b; repeatable
    pub options: Vec<(CoapOption, Vec<u8>)>,

    #[structopt(long)]
    /// Payload as UTF-8 text
    pub payload: Option<String>,
}

fn parse_type(s: &str) -> Result<MessageType, String> {
    MessageType::from_short_str(s).ok_or_else(|| format!("unknown message type {:?}", s))
}

fn parse_token(s: &str) -> Result<Token, String> {
    let bytes = hex::decode(s.trim_start_matches("0x")).map_err(|e| e.to_string())?;
    Token::from_bytes(&bytes).map_err(|e| e.to_string())
}

fn parse_option(s: &str) -> Result<(CoapOption, Vec<u8>), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", s))?;
    let option = CoapOption::from_name(name.trim())
        .ok_or_else(|| format!("unknown option {:?}", name))?;
    let bytes = option
        .value_from_str(value)
        .ok_or_else(|| format!("{:?} is not a valid {} value", value, option))?;
    Ok((option, bytes))
}

fn build(opts: &EncodeOptions) -> Result<Message, Box<dyn Error>> {
    let path = opts.path.as_deref().unwrap_or("");
    let mut message = if path.contains("://") {
        let method = opts.code.code_sample().ok_or("--code must be a request code with a url")?;
        RequestBuilder::from_url(path, method)?.build()
    } else {
        let mut message = Message::with(opts.code, opts.message_type, None);
        message.set_uri_path(path);
        message
    };
    message.message_type = opts.message_type;
    message.message_id = Some(opts.message_id);
    message.token = opts.token.unwrap_or_default();
    for (option, value) in &opts.options {
        message.add_option(*option, value.clone());
    }
    message.payload = opts.payload.clone().map(String::into_bytes);
    Ok(message)
}

fn main() -> Result<(), Box<dyn Error>> {
    // Load options
    let opts = Options::from_args();

    // Initialise logging
    let log_config = simplelog::ConfigBuilder::new().build();
    if let Err(_e) = TermLogger::init(
        opts.log_level,
        log_config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        SimpleLogger::init(opts.log_level, log_config)?;
    }

    match &opts.command {
        Command::Decode { hex: datagram } => {
            let bytes = hex::decode(datagram.trim_start_matches("0x"))?;
            debug!("decoding {} octets", bytes.len());
            let message = Message::from_bytes(&bytes)?;
            info!("Decoded: {}", message);
            println!("{}", message);
            if message.payload.is_some() {
                println!("{}", message.payload_representation());
            }
        }
        Command::Encode(encode) => {
            let message = build(encode)?;
            info!("Encoding: {}", message);
            println!("{}", hex::encode(message.to_bytes()?));
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_option() {
        assert_eq!(
            parse_option("Max_Age=60"),
            Ok((CoapOption::MaxAge, vec![60]))
        );
        assert_eq!(
            parse_option("etag=0x0a0b"),
            Ok((CoapOption::ETag, vec![0x0A, 0x0B]))
        );
        assert!(parse_option("Max_Age").is_err());
        assert!(parse_option("Nope=1").is_err());
        assert!(parse_option("Max_Age=soon").is_err());
    }

    #[test]
    fn test_build_with_options() {
        let opts = EncodeOptions::from_iter(&[
            "encode",
            "--path",
            "sensors/temp",
            "--option",
            "URI_Query=unit=c",
            "--option",
            "Accept=50",
        ]);
        let message = build(&opts).unwrap();
        assert_eq!(message.complete_uri_path(), "sensors/temp");
        assert_eq!(message.get_first_option(CoapOption::UriQuery).unwrap(), b"unit=c");
        assert_eq!(message.get_first_option(CoapOption::Accept).unwrap(), &[50u8]);
        assert_eq!(message.message_id, Some(0));
    }
}
