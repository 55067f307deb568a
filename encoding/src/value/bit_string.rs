//! BIT STRING codec.
//!
//! The first contents octet counts the unused low bits of the final
//! octet. Under CER and DER those padding bits must be zero; under CER,
//! contents above 1000 octets are carried as a sequence of segments, each
//! a complete BIT STRING encoding, of which only the last may end
//! mid-octet.

use snafu::{ensure, ResultExt};
use x690_core::{BitString, Construction, EncodingRules, Tag};

use super::{
    Result, UnexpectedTagSnafu, ValueInvalidSnafu, ValuePaddingSnafu, ValueSizeSnafu,
    WrongConstructionSnafu,
};
use crate::decode;
use crate::element::Element;
use crate::encode;

pub(crate) fn decode_bit_string(
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
    max_depth: usize,
) -> Result<BitString> {
    decode_bit_string_impl(rules, construction, contents, max_depth, max_depth)
}

fn decode_bit_string_impl(
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
    depth: usize,
    limit: usize,
) -> Result<BitString> {
    match construction {
        Construction::Primitive => decode_primitive_bits(rules, contents),
        Construction::Constructed => {
            ensure!(
                rules.allows_constructed_strings(),
                WrongConstructionSnafu {
                    typ: "BIT STRING",
                    expected: Construction::Primitive,
                    got: Construction::Constructed,
                }
            );
            ensure!(depth > 0, super::RecursionSnafu { limit });
            let mut out = BitString::new();
            let mut offset = 0;
            while offset < contents.len() {
                let (segment, read) = decode::decode_element_at(rules, contents, offset, depth)
                    .context(super::NestedSnafu { typ: "BIT STRING" })?;
                offset += read;
                ensure!(
                    segment.tag() == Tag::BIT_STRING,
                    UnexpectedTagSnafu {
                        typ: "BIT STRING",
                        got: segment.tag(),
                    }
                );
                // a segment ending mid-octet can only be the last one
                ensure!(
                    out.len() % 8 == 0,
                    ValueInvalidSnafu {
                        typ: "BIT STRING",
                        reason: "only the final segment may have unused bits",
                    }
                );
                let bits = decode_bit_string_impl(
                    rules,
                    segment.construction(),
                    segment.value(),
                    depth - 1,
                    limit,
                )?;
                out.extend_from_bitslice(&bits);
            }
            Ok(out)
        }
    }
}

fn decode_primitive_bits(rules: EncodingRules, contents: &[u8]) -> Result<BitString> {
    ensure!(
        !contents.is_empty(),
        ValueSizeSnafu {
            typ: "BIT STRING",
            got: 0usize,
        }
    );
    if let Some(limit) = rules.max_primitive_string_length() {
        ensure!(
            contents.len() <= limit,
            ValueInvalidSnafu {
                typ: "BIT STRING",
                reason: "primitive contents above the segmentation threshold",
            }
        );
    }
    let unused = contents[0];
    ensure!(
        unused <= 7,
        ValueInvalidSnafu {
            typ: "BIT STRING",
            reason: "unused bit count above 7",
        }
    );
    ensure!(
        !(unused > 0 && contents.len() == 1),
        ValueInvalidSnafu {
            typ: "BIT STRING",
            reason: "unused bits announced without contents octets",
        }
    );
    if rules.is_canonical() && unused > 0 {
        let mask = (1u8 << unused) - 1;
        let last = contents[contents.len() - 1];
        ensure!(
            last & mask == 0,
            ValuePaddingSnafu {
                typ: "BIT STRING",
                position: contents.len() - 1,
            }
        );
    }

    let mut bits = BitString::from_slice(&contents[1..]);
    bits.truncate(bits.len() - usize::from(unused));
    Ok(bits)
}

/// Serialize a bit sequence into primitive BIT STRING contents: the
/// unused-bit count followed by the packed bits, padding bits zero.
fn encode_primitive_bits(bits: &BitString) -> Vec<u8> {
    let data_len = (bits.len() + 7) / 8;
    let unused = data_len * 8 - bits.len();
    let mut out = vec![0u8; 1 + data_len];
    out[0] = unused as u8;
    for (i, bit) in bits.iter().by_vals().enumerate() {
        if bit {
            out[1 + i / 8] |= 0x80 >> (i % 8);
        }
    }
    out
}

pub(crate) fn encode_bit_string(
    rules: EncodingRules,
    bits: &BitString,
) -> (Construction, Vec<u8>) {
    let contents = encode_primitive_bits(bits);
    match rules.max_primitive_string_length() {
        Some(limit) if contents.len() > limit => {
            // segment the packed data octets; every chunk gets its own
            // unused-bit prefix and only the last may carry padding
            let data = &contents[1..];
            let mut out = Vec::new();
            let chunks: Vec<&[u8]> = data.chunks(limit - 1).collect();
            for (index, chunk) in chunks.iter().enumerate() {
                let mut segment_contents = Vec::with_capacity(chunk.len() + 1);
                let last = index + 1 == chunks.len();
                segment_contents.push(if last { contents[0] } else { 0 });
                segment_contents.extend_from_slice(chunk);
                let segment = Element::from_parts_owned(
                    rules,
                    Tag::BIT_STRING,
                    Construction::Primitive,
                    segment_contents,
                );
                encode::encode_element(rules, &segment, &mut out);
            }
            (Construction::Constructed, out)
        }
        _ => (Construction::Primitive, contents),
    }
}

impl Element {
    /// Read the contents as a BIT STRING.
    ///
    /// Under BER the padding bits may hold any value and are discarded;
    /// under CER and DER they must be zero.
    pub fn to_bit_string(&self) -> Result<BitString> {
        decode_bit_string(
            self.rules(),
            self.construction(),
            self.value(),
            self.max_depth(),
        )
    }

    /// Replace the contents with a BIT STRING value, segmenting at 1000
    /// octets under CER.
    pub fn set_bit_string(&mut self, bits: &BitString) {
        let (construction, contents) = encode_bit_string(self.rules(), bits);
        self.replace(construction, contents);
    }
}
