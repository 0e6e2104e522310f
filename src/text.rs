//! Code pages for null-terminated strings stored in game data.
//!
//! The game keeps two kinds of text:
//!
//! * **Identifiers** (variable names, asset ids, sound effect names) are always
//!   stored in Shift-JIS, the internal double-byte Japanese code page.
//! * **Display text** (names, titles, descriptions) is stored in a code page
//!   chosen by whoever produced the data. Retail data uses Shift-JIS; fan
//!   localizations swap in a single-byte page such as Latin-1.
//!
//! The display code page is never a global setting. It travels with each call
//! as a [`Codepage`] value or inside a [`TextConfig`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use encoding_rs::{Encoding, SHIFT_JIS, WINDOWS_1252};

use crate::{Error, Result};

/// A byte encoding for game text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Codepage {
    /// Shift-JIS as extended by Microsoft (CP932).
    #[default]
    ShiftJis,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    /// Windows-1252.
    Windows1252,
}

impl Codepage {
    /// Look up a code page by one of its common labels.
    ///
    /// Matching is case-insensitive and treats `-` and `_` alike.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase().replace('-', "_");
        match label.as_str() {
            "shift_jis" | "shiftjis" | "sjis" | "mskanji" | "ms_kanji" | "cp932"
            | "windows_31j" => Some(Self::ShiftJis),
            "latin_1" | "latin1" | "iso_8859_1" | "iso8859_1" | "l1" => Some(Self::Latin1),
            "cp1252" | "windows_1252" | "windows1252" => Some(Self::Windows1252),
            _ => None,
        }
    }

    /// Canonical name of this code page.
    pub fn name(self) -> &'static str {
        match self {
            Self::ShiftJis => "Shift_JIS",
            Self::Latin1 => "ISO-8859-1",
            Self::Windows1252 => "windows-1252",
        }
    }

    fn encoding(self) -> Option<&'static Encoding> {
        match self {
            Self::ShiftJis => Some(SHIFT_JIS),
            Self::Windows1252 => Some(WINDOWS_1252),
            // encoding_rs folds ISO-8859-1 into windows-1252, which remaps
            // 0x80..=0x9F. Latin-1 is handled directly instead.
            Self::Latin1 => None,
        }
    }

    /// Decode `bytes` (without terminator).
    ///
    /// `offset` is only used to locate the failure in the returned error.
    pub fn decode<'a>(self, bytes: &'a [u8], offset: usize) -> Result<Cow<'a, str>> {
        let err = Error::Encoding {
            codepage: self,
            offset,
        };
        match self.encoding() {
            Some(enc) => enc
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or(err),
            None => Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
        }
    }

    /// Encode `text` and append a null terminator.
    ///
    /// Fails if `text` contains a NUL or a character this code page cannot
    /// represent.
    pub fn encode_terminated(self, text: &str) -> Result<Vec<u8>> {
        let err = || Error::Encoding {
            codepage: self,
            offset: 0,
        };
        if text.contains('\0') {
            return Err(err());
        }
        let mut out = match self.encoding() {
            Some(enc) => {
                let (bytes, _, had_errors) = enc.encode(text);
                if had_errors {
                    return Err(err());
                }
                bytes.into_owned()
            }
            None => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| err()))
                .collect::<Result<Vec<u8>>>()?,
        };
        out.push(0);
        Ok(out)
    }
}

impl fmt::Display for Codepage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codepage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or(Error::Format("unknown code page label"))
    }
}

/// Which code page a string belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Internal names; always Shift-JIS.
    Identifier,
    /// User-visible text; uses [`TextConfig::display`].
    Display,
}

/// Per-call text settings for schema layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextConfig {
    /// Code page of display strings.
    pub display: Codepage,
}

impl TextConfig {
    /// Settings that store display text in `display`.
    pub fn with_display(display: Codepage) -> Self {
        Self { display }
    }

    /// The code page used for strings of `kind`.
    pub fn codepage(&self, kind: TextKind) -> Codepage {
        match kind {
            TextKind::Identifier => Codepage::ShiftJis,
            TextKind::Display => self.display,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(Codepage::from_label("mskanji"), Some(Codepage::ShiftJis));
        assert_eq!(Codepage::from_label("Shift-JIS"), Some(Codepage::ShiftJis));
        assert_eq!(Codepage::from_label("latin_1"), Some(Codepage::Latin1));
        assert_eq!("CP1252".parse::<Codepage>().unwrap(), Codepage::Windows1252);
        assert!("ebcdic".parse::<Codepage>().is_err());
    }

    #[test]
    fn shift_jis_round_trip() {
        let bytes = Codepage::ShiftJis.encode_terminated("ナナ_01").unwrap();
        assert_eq!(&bytes[..4], &[0x83, 0x69, 0x83, 0x69]);
        assert_eq!(bytes.last(), Some(&0));
        let text = Codepage::ShiftJis
            .decode(&bytes[..bytes.len() - 1], 0)
            .unwrap();
        assert_eq!(text, "ナナ_01");
    }

    #[test]
    fn latin1_is_byte_identity() {
        let bytes = Codepage::Latin1.encode_terminated("ação").unwrap();
        assert_eq!(bytes, [b'a', 0xE7, 0xE3, b'o', 0]);
        let all: Vec<u8> = (1..=255).collect();
        let text = Codepage::Latin1.decode(&all, 0).unwrap();
        assert_eq!(text.chars().count(), 255);
        let mut back = Codepage::Latin1.encode_terminated(&text).unwrap();
        back.pop();
        assert_eq!(back, all);
    }

    #[test]
    fn unrepresentable_text_is_rejected() {
        assert!(Codepage::Latin1.encode_terminated("ナ").is_err());
        assert!(Codepage::ShiftJis.encode_terminated("\u{1F600}").is_err());
        assert!(Codepage::ShiftJis.encode_terminated("a\0b").is_err());
    }

    #[test]
    fn malformed_shift_jis_is_rejected() {
        match Codepage::ShiftJis.decode(&[0x83], 0x40) {
            Err(Error::Encoding { codepage, offset }) => {
                assert_eq!(codepage, Codepage::ShiftJis);
                assert_eq!(offset, 0x40);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn identifiers_ignore_display_setting() {
        let config = TextConfig::with_display(Codepage::Latin1);
        assert_eq!(config.codepage(TextKind::Identifier), Codepage::ShiftJis);
        assert_eq!(config.codepage(TextKind::Display), Codepage::Latin1);
        assert_eq!(TextConfig::default().display, Codepage::ShiftJis);
    }
}
