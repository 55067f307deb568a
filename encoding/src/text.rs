//! This module contains reusable components for validating and decoding
//! text in the restricted string types.
//!
//! Each restricted string type pins its contents to a character
//! repertoire, and the codec rejects violations in both directions:
//!
//! | Type | Permitted contents |
//! |------------------|-----------------------------------------------|
//! | NumericString | digits and space |
//! | PrintableString | letters, digits, and `' ( ) + , - . / : = ?` and space |
//! | VisibleString | `0x20`-`0x7E` |
//! | GraphicString | `0x20`-`0x7E` (deprecated alias policy) |
//! | IA5String | `0x00`-`0x7F` |
//! | GeneralString | `0x00`-`0x7F` |
//! | UTF8String | RFC 3629 UTF-8 |
//! | UniversalString | UTF-32, big-endian |
//! | BMPString | UTF-16, big-endian |

use byteordered::byteorder::{BigEndian, ByteOrder};
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};

/// An error type for repertoire violations while encoding or decoding
/// restricted string contents.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// An octet outside the repertoire appeared in encoded contents.
    #[snafu(display("forbidden octet {:#04X} at position {}", value, position))]
    ForbiddenOctet {
        /// The position of the octet within the contents.
        position: usize,
        /// The offending octet.
        value: u8,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A code unit did not form a valid character.
    #[snafu(display("invalid code unit {:#06X} at position {}", value, position))]
    InvalidCodeUnit {
        /// The position of the code unit, in units, within the contents.
        position: usize,
        /// The offending code unit.
        value: u32,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The contents length is not a whole number of code units.
    #[snafu(display("contents length {} is not a multiple of {}", len, unit))]
    UnevenLength {
        /// The contents length in octets.
        len: usize,
        /// The code unit width in octets.
        unit: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The contents are not valid UTF-8.
    #[snafu(display("contents are not valid UTF-8"))]
    InvalidUtf8 {
        /// The underlying validation error.
        source: std::str::Utf8Error,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A character outside the repertoire appeared in a value to encode.
    #[snafu(display("character {:?} is outside the {} repertoire", value, repertoire))]
    ForbiddenCharacter {
        /// The offending character.
        value: char,
        /// The repertoire name.
        repertoire: &'static str,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
}

/// Type alias for a result from this module.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The character repertoire of a restricted string type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    /// Digits and space.
    Numeric,
    /// The PrintableString repertoire of X.680.
    Printable,
    /// The visible (printing) ISO 646 characters.
    Visible,
    /// Same octet policy as `Visible`; kept distinct for diagnostics.
    Graphic,
    /// The full ISO 646 set, controls included.
    Ia5,
    /// Same octet policy as `Ia5`; kept distinct for diagnostics.
    General,
    /// RFC 3629 UTF-8.
    Utf8,
    /// UTF-32, big-endian.
    Universal,
    /// UTF-16, big-endian.
    Bmp,
}

impl StringKind {
    /// The display name of the repertoire.
    pub fn name(self) -> &'static str {
        match self {
            StringKind::Numeric => "NumericString",
            StringKind::Printable => "PrintableString",
            StringKind::Visible => "VisibleString",
            StringKind::Graphic => "GraphicString",
            StringKind::Ia5 => "IA5String",
            StringKind::General => "GeneralString",
            StringKind::Utf8 => "UTF8String",
            StringKind::Universal => "UniversalString",
            StringKind::Bmp => "BMPString",
        }
    }

    /// Decode contents octets into text, rejecting anything outside the
    /// repertoire.
    pub fn decode(self, contents: &[u8]) -> Result<String> {
        match self {
            StringKind::Numeric
            | StringKind::Printable
            | StringKind::Visible
            | StringKind::Graphic
            | StringKind::Ia5
            | StringKind::General => {
                for (position, &value) in contents.iter().enumerate() {
                    ensure!(
                        byte_permitted(self, value),
                        ForbiddenOctetSnafu { position, value }
                    );
                }
                // the repertoires above are all ASCII subsets
                std::str::from_utf8(contents)
                    .context(InvalidUtf8Snafu)
                    .map(str::to_owned)
            }
            StringKind::Utf8 => std::str::from_utf8(contents)
                .context(InvalidUtf8Snafu)
                .map(str::to_owned),
            StringKind::Universal => {
                ensure!(
                    contents.len() % 4 == 0,
                    UnevenLengthSnafu {
                        len: contents.len(),
                        unit: 4usize,
                    }
                );
                contents
                    .chunks_exact(4)
                    .enumerate()
                    .map(|(position, chunk)| {
                        let value = BigEndian::read_u32(chunk);
                        char::from_u32(value).context(InvalidCodeUnitSnafu { position, value })
                    })
                    .collect()
            }
            StringKind::Bmp => {
                ensure!(
                    contents.len() % 2 == 0,
                    UnevenLengthSnafu {
                        len: contents.len(),
                        unit: 2usize,
                    }
                );
                let units: Vec<u16> = contents.chunks_exact(2).map(BigEndian::read_u16).collect();
                char::decode_utf16(units.iter().copied())
                    .enumerate()
                    .map(|(position, decoded)| {
                        decoded.map_err(|e| {
                            InvalidCodeUnitSnafu {
                                position,
                                value: u32::from(e.unpaired_surrogate()),
                            }
                            .build()
                        })
                    })
                    .collect()
            }
        }
    }

    /// Encode text into contents octets, rejecting characters outside the
    /// repertoire.
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            StringKind::Numeric
            | StringKind::Printable
            | StringKind::Visible
            | StringKind::Graphic
            | StringKind::Ia5
            | StringKind::General => {
                for value in text.chars() {
                    let permitted =
                        u8::try_from(value).map_or(false, |octet| byte_permitted(self, octet));
                    ensure!(
                        permitted,
                        ForbiddenCharacterSnafu {
                            value,
                            repertoire: self.name(),
                        }
                    );
                }
                Ok(text.as_bytes().to_vec())
            }
            StringKind::Utf8 => Ok(text.as_bytes().to_vec()),
            StringKind::Universal => {
                let mut out = Vec::with_capacity(text.chars().count() * 4);
                for value in text.chars() {
                    let mut unit = [0u8; 4];
                    BigEndian::write_u32(&mut unit, u32::from(value));
                    out.extend_from_slice(&unit);
                }
                Ok(out)
            }
            StringKind::Bmp => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for code_unit in text.encode_utf16() {
                    let mut unit = [0u8; 2];
                    BigEndian::write_u16(&mut unit, code_unit);
                    out.extend_from_slice(&unit);
                }
                Ok(out)
            }
        }
    }
}

/// Whether a single octet belongs to the given ASCII-subset repertoire.
fn byte_permitted(kind: StringKind, octet: u8) -> bool {
    match kind {
        StringKind::Numeric => octet.is_ascii_digit() || octet == b' ',
        StringKind::Printable => {
            octet.is_ascii_alphanumeric()
                || matches!(
                    octet,
                    b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'='
                        | b'?'
                )
        }
        StringKind::Visible | StringKind::Graphic => (0x20..=0x7E).contains(&octet),
        StringKind::Ia5 | StringKind::General => octet <= 0x7F,
        // the multi-octet repertoires do not go through this check
        _ => false,
    }
}
