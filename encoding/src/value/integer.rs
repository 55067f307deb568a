//! INTEGER and ENUMERATED codecs.
//!
//! Contents are two's-complement, big-endian, and minimal under the
//! canonical rule sets. Values of unbounded width go through
//! [`num_bigint::BigInt`]; bounded accessors are generic over the
//! primitive integer types.

use num_bigint::BigInt;
use num_traits::{NumCast, PrimInt};
use snafu::{ensure, OptionExt};
use x690_core::{Construction, EncodingRules};

use super::{expect_primitive, Result, ValueOverflowSnafu, ValuePaddingSnafu, ValueSizeSnafu};
use crate::element::Element;

/// Validate the common INTEGER contents invariants: primitive
/// construction, at least one octet, and no redundant leading octets
/// under the canonical rule sets.
pub(crate) fn check_integer_contents(
    typ: &'static str,
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
) -> Result<()> {
    expect_primitive(typ, construction)?;
    ensure!(
        !contents.is_empty(),
        ValueSizeSnafu {
            typ,
            got: contents.len(),
        }
    );
    if rules.requires_minimal_integers() && contents.len() >= 2 {
        let redundant = (contents[0] == 0x00 && contents[1] & 0x80 == 0)
            || (contents[0] == 0xFF && contents[1] & 0x80 != 0);
        ensure!(!redundant, ValuePaddingSnafu { typ, position: 0usize });
    }
    Ok(())
}

/// Strip two's-complement sign padding. The result denotes the same
/// value; it may still be up to the full contents.
fn strip_sign_padding(contents: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < contents.len()
        && ((contents[start] == 0x00 && contents[start + 1] & 0x80 == 0)
            || (contents[start] == 0xFF && contents[start + 1] & 0x80 != 0))
    {
        start += 1;
    }
    &contents[start..]
}

pub(crate) fn decode_int<T>(
    typ: &'static str,
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
) -> Result<T>
where
    T: PrimInt,
{
    check_integer_contents(typ, rules, construction, contents)?;
    let octets = strip_sign_padding(contents);
    ensure!(octets.len() <= 16, ValueOverflowSnafu { typ });

    let mut raw: u128 = 0;
    for &octet in octets {
        raw = (raw << 8) | <u128 as From<u8>>::from(octet);
    }
    // sign-extend from the decoded width
    let shift = 128 - 8 * octets.len() as u32;
    let value = ((raw << shift) as i128) >> shift;

    NumCast::from(value).context(ValueOverflowSnafu { typ })
}

pub(crate) fn decode_big_int(
    typ: &'static str,
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
) -> Result<BigInt> {
    check_integer_contents(typ, rules, construction, contents)?;
    Ok(BigInt::from_signed_bytes_be(contents))
}

/// Serialize a value into minimal two's-complement contents octets.
/// The sign indicator octet is present exactly when the value's top bit
/// would otherwise misstate the sign.
pub(crate) fn encode_big_int(value: &BigInt) -> Vec<u8> {
    value.to_signed_bytes_be()
}

impl Element {
    /// Read the contents as an INTEGER, converted into any primitive
    /// integer type.
    ///
    /// Fails with a value overflow if the decoded value does not fit the
    /// requested target, including negative values requested as unsigned
    /// targets.
    pub fn to_int<T>(&self) -> Result<T>
    where
        T: PrimInt,
    {
        decode_int("INTEGER", self.rules(), self.construction(), self.value())
    }

    /// Replace the contents with an INTEGER value in minimal
    /// two's-complement form.
    pub fn set_int<T>(&mut self, value: T)
    where
        T: PrimInt,
        BigInt: From<T>,
    {
        self.replace(
            Construction::Primitive,
            encode_big_int(&BigInt::from(value)),
        );
    }

    /// Read the contents as an INTEGER of unbounded width.
    pub fn to_big_int(&self) -> Result<BigInt> {
        decode_big_int("INTEGER", self.rules(), self.construction(), self.value())
    }

    /// Replace the contents with an INTEGER of unbounded width, in
    /// minimal two's-complement form.
    pub fn set_big_int(&mut self, value: &BigInt) {
        self.replace(Construction::Primitive, encode_big_int(value));
    }

    /// Read the contents as an ENUMERATED value.
    ///
    /// The contents invariants are those of INTEGER.
    pub fn to_enumerated<T>(&self) -> Result<T>
    where
        T: PrimInt,
    {
        decode_int("ENUMERATED", self.rules(), self.construction(), self.value())
    }

    /// Replace the contents with an ENUMERATED value in minimal
    /// two's-complement form.
    pub fn set_enumerated<T>(&mut self, value: T)
    where
        T: PrimInt,
        BigInt: From<T>,
    {
        self.set_int(value);
    }
}
