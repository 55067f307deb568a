//! OBJECT IDENTIFIER and RELATIVE-OID codecs.
//!
//! Nodes are serialized in base 128, big-endian, the high bit of each
//! octet marking continuation. For a full object identifier the first
//! two nodes share the leading subidentifier as `40 * node0 + node1`.

use snafu::{ensure, ResultExt};
use x690_core::{Construction, Oid, RelativeOid};

use super::{
    expect_primitive, Result, ValueInvalidSnafu, ValueOverflowSnafu, ValuePaddingSnafu,
    ValueSizeSnafu,
};
use crate::element::Element;
use crate::encode;

/// Parse the contents as a sequence of base-128 subidentifier groups.
fn decode_subidentifiers(typ: &'static str, contents: &[u8]) -> Result<Vec<u64>> {
    let mut groups = Vec::new();
    let mut position = 0;
    while position < contents.len() {
        ensure!(
            contents[position] != 0x80,
            ValuePaddingSnafu { typ, position }
        );
        let mut value: u64 = 0;
        loop {
            let octet = match contents.get(position) {
                Some(&octet) => octet,
                None => {
                    // the final group never ends on a continuation octet
                    return ValueInvalidSnafu {
                        typ,
                        reason: "truncated subidentifier group",
                    }
                    .fail();
                }
            };
            position += 1;
            ensure!(value >> 57 == 0, ValueOverflowSnafu { typ });
            value = (value << 7) | u64::from(octet & 0x7F);
            if octet & 0x80 == 0 {
                break;
            }
        }
        groups.push(value);
    }
    Ok(groups)
}

pub(crate) fn decode_oid(construction: Construction, contents: &[u8]) -> Result<Oid> {
    expect_primitive("OBJECT IDENTIFIER", construction)?;
    ensure!(
        !contents.is_empty(),
        ValueSizeSnafu {
            typ: "OBJECT IDENTIFIER",
            got: 0usize,
        }
    );
    let groups = decode_subidentifiers("OBJECT IDENTIFIER", contents)?;

    // the leading group folds the first two nodes together
    let mut nodes = Vec::with_capacity(groups.len() + 1);
    let leading = groups[0];
    if leading < 40 {
        nodes.push(0);
        nodes.push(leading);
    } else if leading < 80 {
        nodes.push(1);
        nodes.push(leading - 40);
    } else {
        nodes.push(2);
        nodes.push(leading - 80);
    }
    nodes.extend_from_slice(&groups[1..]);

    Oid::new(nodes).context(super::InvalidOidSnafu)
}

pub(crate) fn encode_oid(oid: &Oid) -> Result<Vec<u8>> {
    let nodes = oid.nodes();
    let mut out = Vec::with_capacity(nodes.len() + 1);
    // the Oid constructor has already pinned node 0 to 0..=2 and node 1
    // below 40 under roots 0 and 1; only root 2 can overflow the fold
    let leading = (nodes[0] * 40)
        .checked_add(nodes[1])
        .ok_or_else(|| {
            ValueOverflowSnafu {
                typ: "OBJECT IDENTIFIER",
            }
            .build()
        })?;
    encode::encode_base128(leading, &mut out);
    for &node in &nodes[2..] {
        encode::encode_base128(node, &mut out);
    }
    Ok(out)
}

pub(crate) fn decode_relative_oid(
    construction: Construction,
    contents: &[u8],
) -> Result<RelativeOid> {
    expect_primitive("RELATIVE-OID", construction)?;
    ensure!(
        !contents.is_empty(),
        ValueSizeSnafu {
            typ: "RELATIVE-OID",
            got: 0usize,
        }
    );
    let groups = decode_subidentifiers("RELATIVE-OID", contents)?;
    RelativeOid::new(groups).context(super::InvalidOidSnafu)
}

pub(crate) fn encode_relative_oid(roid: &RelativeOid) -> Vec<u8> {
    let mut out = Vec::with_capacity(roid.len());
    for &node in roid.nodes() {
        encode::encode_base128(node, &mut out);
    }
    out
}

impl Element {
    /// Read the contents as an OBJECT IDENTIFIER.
    pub fn to_oid(&self) -> Result<Oid> {
        decode_oid(self.construction(), self.value())
    }

    /// Replace the contents with an OBJECT IDENTIFIER value.
    ///
    /// Fails with a value overflow if the second node is too large for
    /// the folded leading subidentifier.
    pub fn set_oid(&mut self, oid: &Oid) -> Result<()> {
        let contents = encode_oid(oid)?;
        self.replace(Construction::Primitive, contents);
        Ok(())
    }

    /// Read the contents as a RELATIVE-OID.
    pub fn to_relative_oid(&self) -> Result<RelativeOid> {
        decode_relative_oid(self.construction(), self.value())
    }

    /// Replace the contents with a RELATIVE-OID value.
    pub fn set_relative_oid(&mut self, roid: &RelativeOid) {
        let contents = encode_relative_oid(roid);
        self.replace(Construction::Primitive, contents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Error;
    use x690_core::EncodingRules::{Ber, Der};
    use x690_core::Tag;

    fn oid_elem(contents: &[u8]) -> Element {
        Element::from_parts(
            Ber,
            Tag::OBJECT_IDENTIFIER,
            Construction::Primitive,
            contents,
        )
    }

    #[test]
    fn known_encodings() {
        let cases: &[(&str, &[u8])] = &[
            ("1.3.6.4.1", &[0x2B, 0x06, 0x04, 0x01]),
            ("1.3.6.1.5.5.7.48.1", &[0x2B, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, 0x01]),
            ("2.5.4.3", &[0x55, 0x04, 0x03]),
            ("2.999.1", &[0x88, 0x37, 0x01]),
            ("0.0", &[0x00]),
        ];
        for &(text, contents) in cases {
            let oid: Oid = text.parse().unwrap();
            let mut elem = Element::new(Der, Tag::OBJECT_IDENTIFIER);
            elem.set_oid(&oid).unwrap();
            assert_eq!(elem.value(), contents, "encoding {}", text);
            assert_eq!(elem.to_oid().unwrap(), oid, "decoding {}", text);
        }
    }

    #[test]
    fn rejects_padded_subidentifier() {
        // {1,3,6,4,1} with a padded group in the middle
        let elem = oid_elem(&[0x2B, 0x06, 0x04, 0x80, 0x01]);
        assert!(matches!(
            elem.to_oid(),
            Err(Error::ValuePadding { position: 3, .. })
        ));
    }

    #[test]
    fn rejects_truncated_group() {
        // the final octet still has its continuation bit set
        let elem = oid_elem(&[0x2B, 0x86]);
        assert!(matches!(elem.to_oid(), Err(Error::ValueInvalid { .. })));
    }

    #[test]
    fn rejects_empty_contents() {
        assert!(matches!(
            oid_elem(&[]).to_oid(),
            Err(Error::ValueSize { got: 0, .. })
        ));
    }

    #[test]
    fn rejects_group_overflow() {
        // ten continuation octets exceed 64 bits
        let elem = oid_elem(&[0x2B, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        assert!(matches!(elem.to_oid(), Err(Error::ValueOverflow { .. })));
    }

    #[test]
    fn relative_round_trip() {
        let roid: RelativeOid = "8571.3.2".parse().unwrap();
        let mut elem = Element::new(Der, Tag::RELATIVE_OID);
        elem.set_relative_oid(&roid);
        assert_eq!(elem.value(), &[0xC2, 0x7B, 0x03, 0x02]);
        assert_eq!(elem.to_relative_oid().unwrap(), roid);
    }
}
