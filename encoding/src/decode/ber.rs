//! Basic Encoding Rules decoder.

use x690_core::EncodingRules;

use super::{Decode, DEFAULT_MAX_DEPTH};

/// A decoder for the Basic Encoding Rules, the permissive parent syntax:
/// any well-formed length form is accepted, including the indefinite
/// form, and string types may arrive in the constructed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BerDecoder {
    max_depth: usize,
}

impl BerDecoder {
    /// Create a decoder with the default nesting limit.
    pub fn new() -> BerDecoder {
        BerDecoder {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a decoder with a custom cap on indefinite-length nesting.
    pub fn with_max_depth(max_depth: usize) -> BerDecoder {
        BerDecoder { max_depth }
    }
}

impl Default for BerDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decode for BerDecoder {
    fn rules(&self) -> EncodingRules {
        EncodingRules::Ber
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::BerDecoder;
    use crate::decode::{Decode, Error};
    use x690_core::{Construction, Length, Tag};

    // manually crafting a BER octet string with a long-form length
    //  Tag: UNIVERSAL 4 (OCTET STRING), primitive
    //  Length: long form, one octet, value 5
    //  Value: "hello"
    const LONG_FORM: &[u8] = &[0x04, 0x81, 0x05, b'h', b'e', b'l', b'l', b'o'];

    #[test]
    fn accepts_redundant_long_form_length() {
        let dec = BerDecoder::new();
        let (header, read) = dec.decode_header(LONG_FORM).expect("should read a header");
        assert_eq!(header.tag, Tag::OCTET_STRING);
        assert_eq!(header.length, Length(5));
        assert_eq!(read, 3);

        let (elem, read) = dec.decode_one(LONG_FORM).expect("should read an element");
        assert_eq!(read, LONG_FORM.len());
        assert_eq!(elem.value(), b"hello");
    }

    // manually crafting an indefinite-length sequence
    //  Tag: UNIVERSAL 16 (SEQUENCE), constructed
    //  Length: indefinite
    //  -- BOOLEAN TRUE
    //  -- INTEGER 27
    //  End-of-contents
    const INDEFINITE: &[u8] = &[
        0x30, 0x80, 0x01, 0x01, 0xFF, 0x02, 0x01, 0x1B, 0x00, 0x00,
    ];

    #[test]
    fn materializes_indefinite_contents() {
        let dec = BerDecoder::new();
        let (elem, read) = dec.decode_one(INDEFINITE).expect("should read an element");
        assert_eq!(read, INDEFINITE.len());
        assert_eq!(elem.tag(), Tag::SEQUENCE);
        assert_eq!(elem.construction(), Construction::Constructed);
        // the contents are the child encodings without the final marker
        assert_eq!(elem.value(), &INDEFINITE[2..8]);
    }

    #[test]
    fn nested_indefinite_values() {
        // a sequence holding a sequence holding a boolean, all indefinite
        let input = [
            0x30, 0x80, 0x30, 0x80, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let dec = BerDecoder::new();
        let (elem, read) = dec.decode_one(&input).expect("should read an element");
        assert_eq!(read, input.len());
        assert_eq!(elem.value(), &input[2..9]);
    }

    #[test]
    fn depth_limit_is_enforced() {
        // 20 nested indefinite sequences exceed the default limit of 16
        let mut input = Vec::new();
        for _ in 0..20 {
            input.extend_from_slice(&[0x30, 0x80]);
        }
        input.extend_from_slice(&[0x01, 0x01, 0xFF]);
        for _ in 0..20 {
            input.extend_from_slice(&[0x00, 0x00]);
        }

        let dec = BerDecoder::new();
        assert!(matches!(
            dec.decode_one(&input),
            Err(Error::RecursionLimit { limit: 16, .. })
        ));

        // a roomier decoder handles the same input
        let dec = BerDecoder::with_max_depth(32);
        let (_, read) = dec.decode_one(&input).expect("should read an element");
        assert_eq!(read, input.len());
    }

    #[test]
    fn rejects_indefinite_primitive() {
        // OCTET STRING, primitive, indefinite length
        assert!(matches!(
            BerDecoder::new().decode_one(&[0x04, 0x80, 0x00, 0x00]),
            Err(Error::PrimitiveIndefinite { offset: 1, .. })
        ));
    }

    #[test]
    fn rejects_unterminated_indefinite() {
        // constructed, indefinite, but no end-of-contents marker
        assert!(matches!(
            BerDecoder::new().decode_one(&[0x30, 0x80, 0x01, 0x01, 0xFF]),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn rejects_bare_end_of_contents() {
        assert!(matches!(
            BerDecoder::new().decode_one(&[0x00, 0x00]),
            Err(Error::UnexpectedEndOfContents { offset: 0, .. })
        ));
    }
}
