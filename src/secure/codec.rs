//! Text encodings used on the vault wire format.
//!
//! Secrets travel to the vault as a raw blob whose byte length the
//! vault records verbatim. The blob is either UTF-16LE (`Unicode`,
//! two bytes per code unit) or single-byte ASCII (`Ansi`). Target,
//! username and comment are always UTF-16 on the native side and go
//! through `decode_wide`.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::{CredentialError, Result};

/// An encoded secret blob. Wiped when dropped.
pub type NativeBuffer = Zeroizing<Vec<u8>>;

/// Replacement for characters the Ansi codec cannot represent.
const ANSI_REPLACEMENT: u8 = b'?';

/// The encoding of a credential's secret blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// UTF-16LE, two bytes per code unit.
    #[default]
    Unicode,
    /// One byte per character, ASCII only.
    Ansi,
}

impl TextFormat {
    /// Encode `text` into a buffer the caller owns. No terminator is added.
    pub fn encode(self, text: &str) -> NativeBuffer {
        let mut buffer = Zeroizing::new(Vec::with_capacity(self.byte_length(text)));
        match self {
            TextFormat::Unicode => {
                for unit in text.encode_utf16() {
                    buffer.extend_from_slice(&unit.to_le_bytes());
                }
            }
            TextFormat::Ansi => {
                buffer.extend(text.chars().map(|c| {
                    if c.is_ascii() {
                        c as u8
                    } else {
                        ANSI_REPLACEMENT
                    }
                }));
            }
        }
        buffer
    }

    /// Number of bytes `encode` produces for `text`.
    pub fn byte_length(self, text: &str) -> usize {
        match self {
            TextFormat::Unicode => text.encode_utf16().count() * 2,
            TextFormat::Ansi => text.chars().count(),
        }
    }

    /// Decode a secret blob of `buffer.len()` bytes.
    ///
    /// For `Unicode` the byte size is halved to get the number of code
    /// units; a dangling odd byte is ignored and unpaired surrogates
    /// become U+FFFD. An empty buffer is `""`. Never fails: vaults hold
    /// binary blobs written by other applications.
    pub fn decode(self, buffer: &[u8]) -> Zeroizing<String> {
        match self {
            TextFormat::Unicode => {
                let unit_count = buffer.len() / 2;
                let units: Zeroizing<Vec<u16>> = Zeroizing::new(
                    buffer[..unit_count * 2]
                        .chunks_exact(2)
                        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                        .collect(),
                );
                decode_secret_units(&units)
            }
            TextFormat::Ansi => {
                let mut text = Zeroizing::new(String::with_capacity(buffer.len()));
                text.extend(buffer.iter().map(|&b| {
                    if b.is_ascii() {
                        b as char
                    } else {
                        ANSI_REPLACEMENT as char
                    }
                }));
                text
            }
        }
    }
}

/// Decode UTF-16 code units into a zeroizing string.
///
/// Capacity is reserved for the worst case so the string never
/// reallocates (and never leaves a partial copy behind).
fn decode_secret_units(units: &[u16]) -> Zeroizing<String> {
    let mut text = Zeroizing::new(String::with_capacity(units.len() * 3));
    text.extend(
        char::decode_utf16(units.iter().copied())
            .map(|decoded| decoded.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
    text
}

/// Decode a UTF-16 name field (target, username, comment).
pub fn decode_wide(field: &'static str, units: &[u16]) -> Result<String> {
    String::from_utf16(units).map_err(|e| CredentialError::Decode {
        field,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_uses_two_bytes_per_unit() {
        assert_eq!(TextFormat::Unicode.byte_length("password"), 16);
        assert_eq!(TextFormat::Unicode.encode("password").len(), 16);
        assert_eq!(TextFormat::Unicode.byte_length("\u{1F512}"), 4);
    }

    #[test]
    fn unicode_encoding_is_little_endian() {
        let buffer = TextFormat::Unicode.encode("A\u{00e9}");
        assert_eq!(buffer.as_slice(), &[0x41, 0x00, 0xe9, 0x00]);
    }

    #[test]
    fn ansi_uses_one_byte_per_char() {
        assert_eq!(TextFormat::Ansi.byte_length("password"), 8);
        assert_eq!(TextFormat::Ansi.encode("password").as_slice(), b"password");
    }

    #[test]
    fn ansi_replaces_non_ascii() {
        assert_eq!(TextFormat::Ansi.encode("caf\u{00e9}").as_slice(), b"caf?");
        assert_eq!(TextFormat::Ansi.decode(&[b'o', 0xff, b'k']).as_str(), "o?k");
    }

    #[test]
    fn unicode_decode_halves_the_byte_size() {
        let buffer = TextFormat::Unicode.encode("secret");
        let decoded = TextFormat::Unicode.decode(&buffer);
        // Reading buffer.len() units instead of buffer.len() / 2 would
        // produce twelve characters here.
        assert_eq!(decoded.as_str(), "secret");
        assert_eq!(decoded.chars().count(), 6);
    }

    #[test]
    fn unicode_decode_handles_surrogate_pairs() {
        let buffer = TextFormat::Unicode.encode("key\u{1F512}");
        assert_eq!(TextFormat::Unicode.decode(&buffer).as_str(), "key\u{1F512}");
    }

    #[test]
    fn zero_bytes_decode_to_empty() {
        assert_eq!(TextFormat::Unicode.decode(&[]).as_str(), "");
        assert_eq!(TextFormat::Ansi.decode(&[]).as_str(), "");
    }

    #[test]
    fn odd_trailing_byte_is_ignored() {
        let decoded = TextFormat::Unicode.decode(&[0x68, 0x00, 0x69]);
        assert_eq!(decoded.as_str(), "h");
    }

    #[test]
    fn unpaired_surrogates_become_replacement_chars() {
        let decoded = TextFormat::Unicode.decode(&[0x61, 0x00, 0x00, 0xd8]);
        assert_eq!(decoded.as_str(), "a\u{FFFD}");

        let decoded = TextFormat::Unicode.decode(&[0x12, 0xdc, 0x34, 0x56]);
        assert_eq!(decoded.as_str(), "\u{FFFD}\u{5634}");
    }

    #[test]
    fn decode_wide_reports_field() {
        let units: Vec<u16> = "target".encode_utf16().collect();
        assert_eq!(decode_wide("target", &units).unwrap(), "target");

        let err = decode_wide("username", &[0xdc00]).unwrap_err();
        assert!(matches!(err, CredentialError::Decode { field: "username", .. }));
    }

    #[test]
    fn text_format_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: TextFormat,
        }
        let parsed: Wrapper = toml::from_str("format = \"ansi\"").unwrap();
        assert_eq!(parsed.format, TextFormat::Ansi);
    }
}
