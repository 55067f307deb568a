//! This module contains the element framing logic for the encoding
//! direction: writing identifier octets, length octets and contents.
//!
//! Serialization of valid in-memory elements cannot fail, so the writers
//! here return their output directly. The variant-specific encoder types
//! live in the [`ber`], [`cer`] and [`der`] submodules.

use x690_core::{Construction, EncodingRules, Tag};

use crate::element::Element;

pub mod ber;
pub mod cer;
pub mod der;

pub use self::ber::BerEncoder;
pub use self::cer::CerEncoder;
pub use self::der::DerEncoder;

/// Common interface of the three variant encoders.
pub trait Encode {
    /// Retrieve the rule set this encoder applies.
    fn rules(&self) -> EncodingRules;

    /// Serialize the complete tag-length-value encoding of `element`,
    /// appending it to `out`.
    fn encode_into(&self, element: &Element, out: &mut Vec<u8>) {
        encode_element(self.rules(), element, out);
    }

    /// Serialize the complete tag-length-value encoding of `element`.
    fn encode(&self, element: &Element) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(element, &mut out);
        out
    }
}

impl Element {
    /// Serialize this element's complete tag-length-value encoding under
    /// its own rule variant.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode_element(self.rules(), self, &mut out);
        out
    }
}

/// Append the identifier octets for the given tag and construction.
pub(crate) fn encode_tag(tag: Tag, construction: Construction, out: &mut Vec<u8>) {
    let leading = (tag.class.to_binary() << 6) | (construction.to_binary() << 5);
    if tag.number < 31 {
        out.push(leading | (tag.number as u8));
    } else {
        out.push(leading | 0x1F);
        encode_base128(tag.number, out);
    }
}

/// Append a number in base 128, big-endian, the high bit of each octet
/// marking continuation. Used for long-form tag numbers and object
/// identifier nodes.
pub(crate) fn encode_base128(number: u64, out: &mut Vec<u8>) {
    let mut started = false;
    for group in (0..10).rev() {
        let septet = ((number >> (group * 7)) & 0x7F) as u8;
        if septet != 0 || started || group == 0 {
            started = true;
            out.push(if group > 0 { 0x80 | septet } else { septet });
        }
    }
}

/// Append a definite length in its shortest form.
pub(crate) fn encode_definite_length(length: usize, out: &mut Vec<u8>) {
    if length < 0x80 {
        out.push(length as u8);
    } else {
        let octets = (length as u64).to_be_bytes();
        let skip = octets.iter().take_while(|o| **o == 0).count();
        out.push(0x80 | (8 - skip) as u8);
        out.extend_from_slice(&octets[skip..]);
    }
}

/// Whether a tag names one of the string types that CER segments at
/// 1000 octets.
fn is_string_tag(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::BIT_STRING
            | Tag::OCTET_STRING
            | Tag::UTF8_STRING
            | Tag::NUMERIC_STRING
            | Tag::PRINTABLE_STRING
            | Tag::TELETEX_STRING
            | Tag::VIDEOTEX_STRING
            | Tag::IA5_STRING
            | Tag::GRAPHIC_STRING
            | Tag::VISIBLE_STRING
            | Tag::GENERAL_STRING
            | Tag::UNIVERSAL_STRING
            | Tag::BMP_STRING
            | Tag::OBJECT_DESCRIPTOR
    )
}

/// Append the complete tag-length-value encoding of `element` under the
/// given rule set.
///
/// CER writes segmented strings in the constructed indefinite form,
/// terminated by an end-of-contents marker, and everything else with
/// the shortest definite form, exactly like the other variants.
pub(crate) fn encode_element(rules: EncodingRules, element: &Element, out: &mut Vec<u8>) {
    encode_tag(element.tag(), element.construction(), out);
    let contents = element.value();
    if rules == EncodingRules::Cer
        && element.construction() == Construction::Constructed
        && is_string_tag(element.tag())
    {
        out.push(0x80);
        out.extend_from_slice(contents);
        out.extend_from_slice(&[0x00, 0x00]);
    } else {
        encode_definite_length(contents.len(), out);
        out.extend_from_slice(contents);
    }
}
