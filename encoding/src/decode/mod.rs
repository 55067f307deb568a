//! This module contains the element framing logic shared by the three
//! decoders: reading tags, lengths and contents octets out of encoded
//! input.
//!
//! The variant-specific decoder types live in the [`ber`], [`cer`] and
//! [`der`] submodules; the parsing routines here are parameterized by the
//! rule set and report every failure through the module-level [`Error`],
//! with the byte offset at which it was detected.

use snafu::{ensure, Backtrace, OptionExt, Snafu};
use x690_core::{
    Construction, ElementHeader, EncodingRules, Header, Length, Tag, TagClass,
};

use crate::element::Element;

pub mod ber;
pub mod cer;
pub mod der;

pub use self::ber::BerDecoder;
pub use self::cer::CerDecoder;
pub use self::der::DerDecoder;

/// The default cap on nesting depth when materializing indefinite-length
/// values.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Module-level error type:
/// for errors which may occur while framing encoded input.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The input ended before a field could be read in full.
    #[snafu(display("input ended at offset {} while reading {}", offset, expected))]
    Truncated {
        /// The offset of the first missing octet.
        offset: usize,
        /// The field being read.
        expected: &'static str,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A long-form tag number began with the padding octet `0x80`.
    #[snafu(display("long-form tag number at offset {} starts with a padding octet", offset))]
    TagPadding {
        /// The offset of the offending octet.
        offset: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A tag number does not fit the supported 64-bit range.
    #[snafu(display("tag number at offset {} overflows the supported range", offset))]
    TagOverflow {
        /// The offset of the octet on which the overflow was detected.
        offset: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A definite length does not fit the supported 64-bit range,
    /// or exceeds what this process can address.
    #[snafu(display("definite length at offset {} overflows the supported range", offset))]
    LengthOverflow {
        /// The offset of the first length octet.
        offset: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The reserved initial length octet `0xFF` was encountered.
    #[snafu(display("reserved length octet 0xFF at offset {}", offset))]
    LengthUndefined {
        /// The offset of the offending octet.
        offset: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A definite length was not encoded in its shortest form.
    #[snafu(display("length at offset {} is not in its shortest form", offset))]
    LengthNonMinimal {
        /// The offset of the first length octet.
        offset: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The indefinite length form was announced on a primitive element.
    #[snafu(display("indefinite length at offset {} on a primitive element", offset))]
    PrimitiveIndefinite {
        /// The offset of the length octet.
        offset: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The indefinite length form is not allowed under the active rules.
    #[snafu(display("indefinite length at offset {} is not allowed under {}", offset, rules))]
    IndefiniteForbidden {
        /// The offset of the length octet.
        offset: usize,
        /// The rule set in effect.
        rules: EncodingRules,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// An end-of-contents marker appeared where an element was expected,
    /// or carried a nonzero length.
    #[snafu(display("unexpected end-of-contents marker at offset {}", offset))]
    UnexpectedEndOfContents {
        /// The offset of the marker.
        offset: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// Indefinite-length nesting exceeded the configured depth limit.
    #[snafu(display("nesting depth exceeded the configured limit of {}", limit))]
    RecursionLimit {
        /// The configured limit.
        limit: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
}

/// Type alias for a result from this module.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Common interface of the three variant decoders.
///
/// All input is consumed from byte slices; the returned octet counts let
/// callers advance through a buffer holding several elements in sequence.
pub trait Decode {
    /// Retrieve the rule set this decoder applies.
    fn rules(&self) -> EncodingRules;

    /// Retrieve the cap on indefinite-length nesting depth.
    fn max_depth(&self) -> usize;

    /// Decode one element header (tag and length octets) from the
    /// beginning of `input`, returning the header and the number of
    /// octets read.
    fn decode_header(&self, input: &[u8]) -> Result<(ElementHeader, usize)> {
        decode_header_at(self.rules(), input, 0)
    }

    /// Decode one complete element from the beginning of `input`,
    /// returning the element and the number of octets read.
    ///
    /// For the indefinite length form, the contents octets run up to the
    /// matching end-of-contents marker; nested indefinite-length values
    /// are traversed up to the configured depth limit.
    fn decode_one(&self, input: &[u8]) -> Result<(Element, usize)> {
        decode_element_at(self.rules(), input, 0, self.max_depth())
    }
}

/// Read the identifier octets of an element starting at `offset`.
/// Returns the tag, the construction bit and the octet count.
fn decode_tag_at(input: &[u8], offset: usize) -> Result<(Tag, Construction, usize)> {
    let first = *input.get(offset).context(TruncatedSnafu {
        offset,
        expected: "an identifier octet",
    })?;
    let class = TagClass::from_binary(first);
    let construction = Construction::from_binary(first);
    let mut consumed = 1;

    let number = if first & 0x1F != 0x1F {
        u64::from(first & 0x1F)
    } else {
        // long form: base-128 big-endian,
        // the high bit of each octet marks continuation
        let mut number: u64 = 0;
        let mut leading = true;
        loop {
            let position = offset + consumed;
            let octet = *input.get(position).context(TruncatedSnafu {
                offset: position,
                expected: "a tag number octet",
            })?;
            consumed += 1;
            if leading {
                ensure!(octet != 0x80, TagPaddingSnafu { offset: position });
                leading = false;
            }
            ensure!(number >> 57 == 0, TagOverflowSnafu { offset: position });
            number = (number << 7) | u64::from(octet & 0x7F);
            if octet & 0x80 == 0 {
                break;
            }
        }
        number
    };

    Ok((Tag::new(class, number), construction, consumed))
}

/// Read the length octets of an element starting at `offset`.
/// Returns the announced length and the octet count.
fn decode_length_at(
    rules: EncodingRules,
    input: &[u8],
    offset: usize,
    construction: Construction,
) -> Result<(Length, usize)> {
    let first = *input.get(offset).context(TruncatedSnafu {
        offset,
        expected: "a length octet",
    })?;
    if first & 0x80 == 0 {
        // short form
        return Ok((Length(u64::from(first)), 1));
    }

    let count = usize::from(first & 0x7F);
    if count == 0 {
        // indefinite form
        ensure!(
            construction == Construction::Constructed,
            PrimitiveIndefiniteSnafu { offset }
        );
        ensure!(
            rules.allows_indefinite(),
            IndefiniteForbiddenSnafu { offset, rules }
        );
        return Ok((Length::INDEFINITE, 1));
    }
    ensure!(count != 0x7F, LengthUndefinedSnafu { offset });

    let octets = input
        .get(offset + 1..offset + 1 + count)
        .context(TruncatedSnafu {
            offset: input.len(),
            expected: "length octets",
        })?;

    if rules.requires_minimal_length() {
        ensure!(octets[0] != 0x00, LengthNonMinimalSnafu { offset });
        ensure!(
            count > 1 || octets[0] >= 0x80,
            LengthNonMinimalSnafu { offset }
        );
    }

    let mut length: u64 = 0;
    for (i, octet) in octets.iter().enumerate() {
        ensure!(
            length >> 56 == 0,
            LengthOverflowSnafu {
                offset: offset + 1 + i,
            }
        );
        length = (length << 8) | u64::from(*octet);
    }
    // the all-ones value is reserved as the indefinite sentinel
    ensure!(length != u64::MAX, LengthOverflowSnafu { offset });

    Ok((Length(length), 1 + count))
}

/// Read one element header starting at `offset`.
pub(crate) fn decode_header_at(
    rules: EncodingRules,
    input: &[u8],
    offset: usize,
) -> Result<(ElementHeader, usize)> {
    let (tag, construction, tag_len) = decode_tag_at(input, offset)?;
    let (length, length_len) = decode_length_at(rules, input, offset + tag_len, construction)?;
    Ok((
        ElementHeader::new(tag, construction, length),
        tag_len + length_len,
    ))
}

/// Compute the total encoded length of the element starting at `offset`,
/// without materializing it. `depth` is the remaining nesting budget for
/// indefinite-length traversal.
fn measure_element_at(
    rules: EncodingRules,
    input: &[u8],
    offset: usize,
    depth: usize,
    limit: usize,
) -> Result<usize> {
    let (header, header_len) = decode_header_at(rules, input, offset)?;
    ensure!(
        !header.is_end_of_contents(),
        UnexpectedEndOfContentsSnafu { offset }
    );

    match header.length.get() {
        Some(len) => {
            let len = usize::try_from(len)
                .ok()
                .context(LengthOverflowSnafu { offset })?;
            let end = offset
                .checked_add(header_len)
                .and_then(|v| v.checked_add(len))
                .context(LengthOverflowSnafu { offset })?;
            ensure!(
                end <= input.len(),
                TruncatedSnafu {
                    offset: input.len(),
                    expected: "contents octets",
                }
            );
            Ok(header_len + len)
        }
        None => {
            ensure!(depth > 0, RecursionLimitSnafu { limit });
            let mut consumed = header_len;
            loop {
                let position = offset + consumed;
                let (child, child_header_len) = decode_header_at(rules, input, position)?;
                if child.tag == Tag::END_OF_CONTENTS {
                    ensure!(
                        child.is_end_of_contents(),
                        UnexpectedEndOfContentsSnafu { offset: position }
                    );
                    consumed += child_header_len;
                    break;
                }
                consumed += measure_element_at(rules, input, position, depth - 1, limit)?;
            }
            Ok(consumed)
        }
    }
}

/// Decode one complete element starting at `offset`.
///
/// Indefinite-length contents are materialized as the raw octets between
/// the header and the matching end-of-contents marker, which is exactly
/// the concatenation of the child element encodings.
pub(crate) fn decode_element_at(
    rules: EncodingRules,
    input: &[u8],
    offset: usize,
    max_depth: usize,
) -> Result<(Element, usize)> {
    let (header, header_len) = decode_header_at(rules, input, offset)?;
    ensure!(
        !header.is_end_of_contents(),
        UnexpectedEndOfContentsSnafu { offset }
    );

    let (value, consumed) = match header.length.get() {
        Some(len) => {
            let len = usize::try_from(len)
                .ok()
                .context(LengthOverflowSnafu { offset })?;
            let start = offset + header_len;
            let end = start
                .checked_add(len)
                .context(LengthOverflowSnafu { offset })?;
            ensure!(
                end <= input.len(),
                TruncatedSnafu {
                    offset: input.len(),
                    expected: "contents octets",
                }
            );
            (input[start..end].to_vec(), header_len + len)
        }
        None => {
            let total = measure_element_at(rules, input, offset, max_depth, max_depth)?;
            // strip the trailing end-of-contents marker from the contents
            let start = offset + header_len;
            let end = offset + total - 2;
            (input[start..end].to_vec(), total)
        }
    };

    let mut element = Element::from_parts_owned(rules, header.tag, header.construction, value);
    element.set_max_depth(max_depth);
    Ok((element, consumed))
}
