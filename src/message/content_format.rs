use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u16)]
pub enum ContentFormat {
    Plain = 0,
    LinkFormat = 40,
    Xml = 41,
    OctetStream = 42,
    Exi = 47,
    Json = 50,
    Cbor = 60,
}

impl ContentFormat {
    pub const ALL: [ContentFormat; 7] = [
        ContentFormat::Plain,
        ContentFormat::LinkFormat,
        ContentFormat::Xml,
        ContentFormat::OctetStream,
        ContentFormat::Exi,
        ContentFormat::Json,
        ContentFormat::Cbor,
    ];

    /// Looks up a registered content format, `None` for other identifiers.
    pub fn from_id(id: u16) -> Option<ContentFormat> {
        ContentFormat::ALL.into_iter().find(|cf| cf.id() == id)
    }

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            ContentFormat::Plain => "Plain",
            ContentFormat::LinkFormat => "Link Format",
            ContentFormat::Xml => "XML",
            ContentFormat::OctetStream => "Octet Stream",
            ContentFormat::Exi => "EXI",
            ContentFormat::Json => "JSON",
            ContentFormat::Cbor => "CBOR",
        }
    }

    /// Whether a payload of this format is UTF-8 text.
    pub fn needs_text_decoding(self) -> bool {
        !matches!(
            self,
            ContentFormat::OctetStream | ContentFormat::Exi | ContentFormat::Cbor
        )
    }

    /// Renders a payload as text, or as `0x`-prefixed hex for binary formats.
    pub fn represent(self, payload: &[u8]) -> String {
        if self.needs_text_decoding() {
            return std::str::from_utf8(payload)
                .map(str::to_string)
                .unwrap_or_else(|_| "Format Error".to_string());
        }
        format!("0x{}", hex::encode(payload))
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup() {
        for cf in ContentFormat::ALL {
            assert_eq!(ContentFormat::from_id(cf.id()), Some(cf));
        }
        assert_eq!(ContentFormat::from_id(50), Some(ContentFormat::Json));
        assert_eq!(ContentFormat::from_id(1), None);
        assert_eq!(ContentFormat::from_id(110), None);
        assert_eq!(ContentFormat::LinkFormat.to_string(), "Link Format");
    }

    #[test]
    fn test_needs_text_decoding() {
        let binary: Vec<ContentFormat> = ContentFormat::ALL
            .into_iter()
            .filter(|cf| !cf.needs_text_decoding())
            .collect();
        assert_eq!(
            binary,
            vec![
                ContentFormat::OctetStream,
                ContentFormat::Exi,
                ContentFormat::Cbor
            ]
        );
    }

    #[test]
    fn test_represent() {
        assert_eq!(ContentFormat::Json.represent(b"{}"), "{}");
        assert_eq!(ContentFormat::Plain.represent(&[0xFF, 0xFE]), "Format Error");
        assert_eq!(ContentFormat::Cbor.represent(&[0xA1, 0x01]), "0xa101");
    }
}
