//! SEQUENCE, SET, SEQUENCE OF and SET OF codecs.
//!
//! The contents of a constructed element are a concatenation of complete
//! child encodings. Under CER and DER the components of a SET value must
//! appear in the ascending order of their encodings (which subsumes the
//! tag order of SET and the value order of SET OF, since the leading
//! identifier octets dominate the comparison).

use itertools::Itertools;
use snafu::{ensure, ResultExt};
use x690_core::{Construction, EncodingRules, Tag};

use super::{expect_constructed, Result, ValueInvalidSnafu};
use crate::decode;
use crate::element::Element;
use crate::encode;

/// Frame the child elements across the contents octets. Children
/// inherit `max_depth`, so a raised cap keeps applying downwards.
pub(crate) fn decode_children(
    typ: &'static str,
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
    max_depth: usize,
) -> Result<Vec<Element>> {
    expect_constructed(typ, construction)?;
    let mut children = Vec::new();
    let mut offset = 0;
    while offset < contents.len() {
        let (child, read) = decode::decode_element_at(rules, contents, offset, max_depth)
            .context(super::NestedSnafu { typ })?;
        offset += read;
        children.push(child);
    }
    Ok(children)
}

/// Concatenate child encodings into contents octets, framing each child
/// under the given rules.
pub(crate) fn encode_children(rules: EncodingRules, children: &[Element]) -> Vec<u8> {
    let mut out = Vec::new();
    for child in children {
        encode::encode_element(rules, child, &mut out);
    }
    out
}

impl Element {
    /// Frame the child elements of this constructed value.
    ///
    /// When the element is a SET under the canonical rule sets, the
    /// children are additionally verified to be in ascending encoding
    /// order.
    pub fn to_elements(&self) -> Result<Vec<Element>> {
        let children = decode_children(
            "constructed value",
            self.rules(),
            self.construction(),
            self.value(),
            self.max_depth(),
        )?;
        if self.tag() == Tag::SET && self.rules().requires_sorted_set() {
            let ordered = children
                .iter()
                .map(Element::to_bytes)
                .tuple_windows()
                .all(|(a, b)| a <= b);
            ensure!(
                ordered,
                ValueInvalidSnafu {
                    typ: "SET",
                    reason: "components out of canonical order",
                }
            );
        }
        Ok(children)
    }

    /// Replace the contents with a concatenation of child elements,
    /// marking this element constructed.
    ///
    /// When the element is a SET under the canonical rule sets, the
    /// children are sorted by their complete encodings first.
    pub fn set_elements(&mut self, children: &[Element]) {
        let contents = if self.tag() == Tag::SET && self.rules().requires_sorted_set() {
            let mut encoded: Vec<Vec<u8>> =
                children.iter().map(|c| {
                    let mut out = Vec::new();
                    encode::encode_element(self.rules(), c, &mut out);
                    out
                })
                .collect();
            encoded.sort();
            encoded.concat()
        } else {
            encode_children(self.rules(), children)
        };
        self.replace(Construction::Constructed, contents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Error;
    use x690_core::EncodingRules::{Ber, Cer, Der};

    fn int_elem(rules: EncodingRules, value: i64) -> Element {
        let mut elem = Element::new(rules, Tag::INTEGER);
        elem.set_int(value);
        elem
    }

    #[test]
    fn sequence_round_trip() {
        for rules in [Ber, Cer, Der] {
            let mut seq = Element::new(rules, Tag::SEQUENCE);
            seq.set_elements(&[int_elem(rules, 300), int_elem(rules, 2)]);
            assert_eq!(seq.construction(), Construction::Constructed);

            let children = seq.to_elements().unwrap();
            assert_eq!(children.len(), 2);
            assert_eq!(children[0].to_int::<i64>().unwrap(), 300);
            assert_eq!(children[1].to_int::<i64>().unwrap(), 2);
        }
    }

    #[test]
    fn sequence_preserves_order() {
        let mut seq = Element::new(Der, Tag::SEQUENCE);
        seq.set_elements(&[int_elem(Der, 3), int_elem(Der, 1), int_elem(Der, 2)]);
        let values: Vec<i64> = seq
            .to_elements()
            .unwrap()
            .iter()
            .map(|c| c.to_int().unwrap())
            .collect();
        assert_eq!(values, [3, 1, 2]);
    }

    #[test]
    fn canonical_set_is_sorted_on_write() {
        let mut set = Element::new(Der, Tag::SET);
        set.set_elements(&[int_elem(Der, 3), int_elem(Der, 1), int_elem(Der, 2)]);
        let values: Vec<i64> = set
            .to_elements()
            .unwrap()
            .iter()
            .map(|c| c.to_int().unwrap())
            .collect();
        assert_eq!(values, [1, 2, 3]);
    }

    #[test]
    fn ber_set_keeps_caller_order() {
        let mut set = Element::new(Ber, Tag::SET);
        set.set_elements(&[int_elem(Ber, 3), int_elem(Ber, 1)]);
        let values: Vec<i64> = set
            .to_elements()
            .unwrap()
            .iter()
            .map(|c| c.to_int().unwrap())
            .collect();
        assert_eq!(values, [3, 1]);
    }

    #[test]
    fn canonical_set_order_is_verified_on_read() {
        // SET { INTEGER 2, INTEGER 1 } is fine under BER
        let contents = [0x02, 0x01, 0x02, 0x02, 0x01, 0x01];
        let ber = Element::from_parts(Ber, Tag::SET, Construction::Constructed, &contents);
        assert_eq!(ber.to_elements().unwrap().len(), 2);

        for rules in [Cer, Der] {
            let set = Element::from_parts(rules, Tag::SET, Construction::Constructed, &contents);
            assert!(matches!(
                set.to_elements(),
                Err(Error::ValueInvalid { typ: "SET", .. })
            ));
        }
    }

    #[test]
    fn shorter_encoding_sorts_first() {
        // INTEGER 1 (3 octets) against OCTET STRING "" (2 octets):
        // the sort compares complete encodings
        let mut os = Element::new(Der, Tag::OCTET_STRING);
        os.set_octet_string(b"");
        let mut set = Element::new(Der, Tag::SET);
        set.set_elements(&[int_elem(Der, 1), os]);
        let children = set.to_elements().unwrap();
        assert_eq!(children[0].tag(), Tag::INTEGER);
        assert_eq!(children[1].tag(), Tag::OCTET_STRING);
    }

    #[test]
    fn children_inherit_the_depth_cap() {
        let mut seq = Element::new(Ber, Tag::SEQUENCE);
        seq.set_elements(&[int_elem(Ber, 1)]);
        seq.set_max_depth(40);
        let children = seq.to_elements().unwrap();
        assert_eq!(children[0].max_depth(), 40);
    }

    #[test]
    fn primitive_elements_have_no_children() {
        let elem = int_elem(Ber, 5);
        assert!(matches!(
            elem.to_elements(),
            Err(Error::WrongConstruction { .. })
        ));
    }

    #[test]
    fn cer_nested_sequences_stay_definite() {
        let mut inner = Element::new(Cer, Tag::SEQUENCE);
        inner.set_elements(&[int_elem(Cer, 1)]);
        let mut outer = Element::new(Cer, Tag::SEQUENCE);
        outer.set_elements(&[inner]);

        // only segmented strings take the indefinite form under CER
        assert_eq!(outer.value(), &[0x30, 0x03, 0x02, 0x01, 0x01]);

        let children = outer.to_elements().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].to_elements().unwrap()[0].to_int::<i64>().unwrap(), 1);
    }
}
