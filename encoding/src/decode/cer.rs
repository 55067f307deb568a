//! Canonical Encoding Rules decoder.

use x690_core::EncodingRules;

use super::{Decode, DEFAULT_MAX_DEPTH};

/// A decoder for the Canonical Encoding Rules: definite lengths must be
/// minimal, the indefinite form is accepted for constructed values, and
/// string contents above 1000 octets must arrive segmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CerDecoder {
    max_depth: usize,
}

impl CerDecoder {
    /// Create a decoder with the default nesting limit.
    pub fn new() -> CerDecoder {
        CerDecoder {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a decoder with a custom cap on indefinite-length nesting.
    pub fn with_max_depth(max_depth: usize) -> CerDecoder {
        CerDecoder { max_depth }
    }
}

impl Default for CerDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decode for CerDecoder {
    fn rules(&self) -> EncodingRules {
        EncodingRules::Cer
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::CerDecoder;
    use crate::decode::{Decode, Error};
    use x690_core::Tag;

    #[test]
    fn accepts_indefinite_constructed() {
        // SET, constructed, indefinite, holding one NULL
        let input = [0x31, 0x80, 0x05, 0x00, 0x00, 0x00];
        let (elem, read) = CerDecoder::new()
            .decode_one(&input)
            .expect("should read an element");
        assert_eq!(read, input.len());
        assert_eq!(elem.tag(), Tag::SET);
        assert_eq!(elem.value(), &input[2..4]);
    }

    #[test]
    fn rejects_indefinite_primitive() {
        assert!(matches!(
            CerDecoder::new().decode_one(&[0x04, 0x80, 0x00, 0x00]),
            Err(Error::PrimitiveIndefinite { .. })
        ));
    }

    #[test]
    fn demands_minimal_definite_lengths() {
        // long form where the short form fits
        assert!(matches!(
            CerDecoder::new().decode_one(&[0x04, 0x81, 0x05, 0, 0, 0, 0, 0]),
            Err(Error::LengthNonMinimal { offset: 1, .. })
        ));
        // leading zero in the long form
        assert!(matches!(
            CerDecoder::new().decode_one(&[0x04, 0x82, 0x00, 0xFF]),
            Err(Error::LengthNonMinimal { offset: 1, .. })
        ));
    }
}
