//! BOOLEAN and NULL codecs.

use snafu::ensure;
use x690_core::{Construction, EncodingRules};

use super::{expect_primitive, Result, ValueInvalidSnafu, ValueSizeSnafu};
use crate::element::Element;

pub(crate) fn decode_boolean(
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
) -> Result<bool> {
    expect_primitive("BOOLEAN", construction)?;
    ensure!(
        contents.len() == 1,
        ValueSizeSnafu {
            typ: "BOOLEAN",
            got: contents.len(),
        }
    );
    match contents[0] {
        0x00 => Ok(false),
        0xFF => Ok(true),
        _ => {
            ensure!(
                !rules.requires_canonical_boolean(),
                ValueInvalidSnafu {
                    typ: "BOOLEAN",
                    reason: "truth value is neither 0x00 nor 0xFF",
                }
            );
            Ok(true)
        }
    }
}

pub(crate) fn decode_null(construction: Construction, contents: &[u8]) -> Result<()> {
    expect_primitive("NULL", construction)?;
    ensure!(
        contents.is_empty(),
        ValueSizeSnafu {
            typ: "NULL",
            got: contents.len(),
        }
    );
    Ok(())
}

impl Element {
    /// Read the contents as a BOOLEAN.
    ///
    /// Under BER any nonzero contents octet is true; under CER and DER
    /// only `0xFF` and `0x00` are accepted.
    pub fn to_bool(&self) -> Result<bool> {
        decode_boolean(self.rules(), self.construction(), self.value())
    }

    /// Replace the contents with a BOOLEAN value, `0xFF` for true and
    /// `0x00` for false.
    pub fn set_bool(&mut self, value: bool) {
        self.replace(
            Construction::Primitive,
            vec![if value { 0xFF } else { 0x00 }],
        );
    }

    /// Check that the contents are a well-formed NULL: primitive and
    /// empty.
    pub fn to_null(&self) -> Result<()> {
        decode_null(self.construction(), self.value())
    }

    /// Replace the contents with a NULL value (no octets).
    pub fn set_null(&mut self) {
        self.replace(Construction::Primitive, Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Error;
    use x690_core::EncodingRules::{Ber, Cer, Der};
    use x690_core::Tag;

    #[test]
    fn canonical_truth_values() {
        for rules in [Ber, Cer, Der] {
            let mut elem = Element::new(rules, Tag::BOOLEAN);
            elem.set_bool(true);
            assert_eq!(elem.value(), &[0xFF]);
            assert_eq!(elem.to_bool().unwrap(), true);
            elem.set_bool(false);
            assert_eq!(elem.value(), &[0x00]);
            assert_eq!(elem.to_bool().unwrap(), false);
        }
    }

    #[test]
    fn sloppy_truth_value_is_ber_only() {
        let elem = Element::from_parts(
            Ber,
            Tag::BOOLEAN,
            Construction::Primitive,
            &[0x01],
        );
        assert_eq!(elem.to_bool().unwrap(), true);

        for rules in [Cer, Der] {
            let elem = Element::from_parts(
                rules,
                Tag::BOOLEAN,
                Construction::Primitive,
                &[0x01],
            );
            assert!(matches!(
                elem.to_bool(),
                Err(Error::ValueInvalid { typ: "BOOLEAN", .. })
            ));
        }
    }

    #[test]
    fn boolean_length_must_be_one() {
        let empty = Element::new(Ber, Tag::BOOLEAN);
        assert!(matches!(
            empty.to_bool(),
            Err(Error::ValueSize { got: 0, .. })
        ));
        let wide = Element::from_parts(
            Ber,
            Tag::BOOLEAN,
            Construction::Primitive,
            &[0x00, 0xFF],
        );
        assert!(matches!(
            wide.to_bool(),
            Err(Error::ValueSize { got: 2, .. })
        ));
    }

    #[test]
    fn boolean_must_be_primitive() {
        let elem = Element::from_parts(
            Ber,
            Tag::BOOLEAN,
            Construction::Constructed,
            &[0x01, 0x01, 0xFF],
        );
        assert!(matches!(
            elem.to_bool(),
            Err(Error::WrongConstruction { typ: "BOOLEAN", .. })
        ));
    }

    #[test]
    fn null_is_empty_primitive() {
        let mut elem = Element::new(Der, Tag::NULL);
        elem.set_null();
        assert!(elem.to_null().is_ok());
        assert!(elem.value().is_empty());

        let bad = Element::from_parts(Der, Tag::NULL, Construction::Primitive, &[0x00]);
        assert!(matches!(bad.to_null(), Err(Error::ValueSize { got: 1, .. })));
    }
}
