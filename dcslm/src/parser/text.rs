//! Reading and writing configuration files as text.
//!
//! Livery configuration files are usually UTF-8, but files saved by older
//! editors are often Latin-1. Bytes that are not valid UTF-8 are decoded one
//! byte per character, which maps every byte value to a distinct `char`;
//! encoding back with the same [`TextEncoding`] reproduces the original bytes.

use std::fs;
use std::io;
use std::path::Path;

/// How a configuration file's bytes map to text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// One byte per character (ISO-8859-1).
    Latin1,
}

impl TextEncoding {
    /// Encode text back to bytes.
    ///
    /// Fails with the first character the encoding cannot represent.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, char> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| c))
                .collect(),
        }
    }
}

/// Decoded content of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigText {
    pub text: String,
    pub encoding: TextEncoding,
}

impl ConfigText {
    /// Decode raw bytes, preferring UTF-8.
    pub fn decode(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self {
                text,
                encoding: TextEncoding::Utf8,
            },
            Err(e) => Self {
                text: e.as_bytes().iter().map(|&b| char::from(b)).collect(),
                encoding: TextEncoding::Latin1,
            },
        }
    }

    /// Read and decode a file.
    pub fn read(path: &Path) -> io::Result<Self> {
        fs::read(path).map(Self::decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_is_kept() {
        let decoded = ConfigText::decode("name = \"Grün\"".as_bytes().to_vec());
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
        assert_eq!(decoded.text, "name = \"Grün\"");
    }

    #[test]
    fn test_invalid_utf8_decodes_as_latin1() {
        let bytes = b"name = \"Gr\xfcn\"\r\n".to_vec();
        let decoded = ConfigText::decode(bytes.clone());
        assert_eq!(decoded.encoding, TextEncoding::Latin1);
        assert_eq!(decoded.text, "name = \"Grün\"\r\n");
        assert_eq!(decoded.encoding.encode(&decoded.text).unwrap(), bytes);
    }

    #[test]
    fn test_every_byte_survives_latin1() {
        let bytes: Vec<u8> = (0..=255).collect();
        let decoded = ConfigText::decode(bytes.clone());
        assert_eq!(decoded.encoding, TextEncoding::Latin1);
        assert_eq!(decoded.encoding.encode(&decoded.text).unwrap(), bytes);
    }

    #[test]
    fn test_latin1_rejects_wide_characters() {
        assert_eq!(TextEncoding::Latin1.encode("a\u{0141}b"), Err('\u{0141}'));
    }

    #[test]
    fn test_utf8_byte_order_mark_is_kept() {
        let bytes = b"\xef\xbb\xbfname = 1\n".to_vec();
        let decoded = ConfigText::decode(bytes.clone());
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
        assert!(decoded.text.starts_with('\u{FEFF}'));
        assert_eq!(decoded.encoding.encode(&decoded.text).unwrap(), bytes);
    }
}
