//! REAL codec.
//!
//! Three disjoint content forms are selected by the top two bits of the
//! first contents octet: binary (`1X`), character (`00`, ISO 6093) and
//! special values (`01`). Empty contents denote plus zero. The encoder
//! always produces the canonical shape: special values where they apply,
//! otherwise the binary form in base 2 with the mantissa shifted odd and
//! a minimal two's-complement exponent.

use snafu::{ensure, OptionExt};
use x690_core::{Construction, EncodingRules};

use super::{
    expect_primitive, Result, ValueInvalidSnafu, ValueOverflowSnafu, ValuePaddingSnafu,
    ValueSizeSnafu,
};
use crate::element::Element;

const PLUS_INFINITY: u8 = 0x40;
const MINUS_INFINITY: u8 = 0x41;
const NOT_A_NUMBER: u8 = 0x42;
const MINUS_ZERO: u8 = 0x43;

pub(crate) fn decode_real(
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
) -> Result<f64> {
    expect_primitive("REAL", construction)?;
    if contents.is_empty() {
        return Ok(0.0);
    }
    match contents[0] & 0xC0 {
        0x40 => decode_special(contents),
        0x00 => decode_character(rules, contents),
        _ => decode_binary(rules, contents),
    }
}

fn decode_special(contents: &[u8]) -> Result<f64> {
    ensure!(
        contents.len() == 1,
        ValueSizeSnafu {
            typ: "REAL",
            got: contents.len(),
        }
    );
    match contents[0] {
        PLUS_INFINITY => Ok(f64::INFINITY),
        MINUS_INFINITY => Ok(f64::NEG_INFINITY),
        NOT_A_NUMBER => Ok(f64::NAN),
        MINUS_ZERO => Ok(-0.0),
        _ => ValueInvalidSnafu {
            typ: "REAL",
            reason: "unknown special value octet",
        }
        .fail(),
    }
}

fn decode_binary(rules: EncodingRules, contents: &[u8]) -> Result<f64> {
    let first = contents[0];
    let sign = if first & 0x40 != 0 { -1.0 } else { 1.0 };
    let base: u32 = match (first >> 4) & 0x03 {
        0 => 2,
        1 => 8,
        2 => 16,
        _ => {
            return ValueInvalidSnafu {
                typ: "REAL",
                reason: "reserved base bits",
            }
            .fail()
        }
    };
    let scale = (first >> 2) & 0x03;

    if rules.requires_canonical_real() {
        ensure!(
            base == 2,
            ValueInvalidSnafu {
                typ: "REAL",
                reason: "canonical binary form requires base 2",
            }
        );
        ensure!(
            scale == 0,
            ValueInvalidSnafu {
                typ: "REAL",
                reason: "canonical binary form requires a zero scale factor",
            }
        );
    }

    // exponent length code: 0..=2 inline, 3 carries an explicit count
    let (exponent_octets, mantissa_start) = match first & 0x03 {
        3 => {
            let count = *contents.get(1).context(ValueSizeSnafu {
                typ: "REAL",
                got: contents.len(),
            })?;
            ensure!(
                count >= 1,
                ValueInvalidSnafu {
                    typ: "REAL",
                    reason: "long-form exponent with a zero length",
                }
            );
            if rules.requires_canonical_real() {
                ensure!(
                    count > 3,
                    ValueInvalidSnafu {
                        typ: "REAL",
                        reason: "long-form exponent length where the short form fits",
                    }
                );
            }
            (usize::from(count), 2 + usize::from(count))
        }
        code => (usize::from(code) + 1, 1 + usize::from(code) + 1),
    };
    ensure!(
        contents.len() >= mantissa_start,
        ValueSizeSnafu {
            typ: "REAL",
            got: contents.len(),
        }
    );
    let exponent_bytes = &contents[mantissa_start - exponent_octets..mantissa_start];
    let mantissa_bytes = &contents[mantissa_start..];

    if rules.requires_canonical_real() && exponent_bytes.len() >= 2 {
        let redundant = (exponent_bytes[0] == 0x00 && exponent_bytes[1] & 0x80 == 0)
            || (exponent_bytes[0] == 0xFF && exponent_bytes[1] & 0x80 != 0);
        ensure!(
            !redundant,
            ValuePaddingSnafu {
                typ: "REAL",
                position: mantissa_start - exponent_octets,
            }
        );
    }

    // strip sign padding so that oversize BER exponents of small values
    // still decode
    let mut start = 0;
    while start + 1 < exponent_bytes.len()
        && ((exponent_bytes[start] == 0x00 && exponent_bytes[start + 1] & 0x80 == 0)
            || (exponent_bytes[start] == 0xFF && exponent_bytes[start + 1] & 0x80 != 0))
    {
        start += 1;
    }
    let exponent_bytes = &exponent_bytes[start..];
    ensure!(
        exponent_bytes.len() <= 8,
        ValueOverflowSnafu { typ: "REAL" }
    );
    let mut raw: u64 = 0;
    for &octet in exponent_bytes {
        raw = (raw << 8) | u64::from(octet);
    }
    let shift = 64 - 8 * exponent_bytes.len() as u32;
    let exponent = ((raw << shift) as i64) >> shift;

    let mantissa_is_zero = mantissa_bytes.iter().all(|&o| o == 0);
    if rules.requires_canonical_real() {
        ensure!(
            mantissa_is_zero || mantissa_bytes.last().map_or(false, |o| o & 1 == 1),
            ValuePaddingSnafu {
                typ: "REAL",
                position: contents.len().saturating_sub(1),
            }
        );
    }

    let mut mantissa = 0.0f64;
    for &octet in mantissa_bytes {
        mantissa = mantissa * 256.0 + f64::from(octet);
    }

    let exponent = i32::try_from(exponent).unwrap_or(if exponent < 0 {
        i32::MIN
    } else {
        i32::MAX
    });
    let value =
        sign * mantissa * 2f64.powi(i32::from(scale)) * f64::from(base).powi(exponent);
    Ok(value)
}

/// The ISO 6093 numeric representation named by the low bits of the
/// first contents octet.
fn decode_character(rules: EncodingRules, contents: &[u8]) -> Result<f64> {
    let form = contents[0] & 0x3F;
    ensure!(
        (1..=3).contains(&form),
        ValueInvalidSnafu {
            typ: "REAL",
            reason: "unknown character representation form",
        }
    );
    let text = &contents[1..];
    ensure!(
        !text.is_empty(),
        ValueSizeSnafu {
            typ: "REAL",
            got: contents.len(),
        }
    );
    for &octet in text {
        ensure!(
            octet.is_ascii_digit()
                || matches!(octet, b'+' | b'-' | b'.' | b',' | b'e' | b'E' | b' '),
            ValueInvalidSnafu {
                typ: "REAL",
                reason: "forbidden octet in numeric character form",
            }
        );
    }

    if rules.requires_canonical_real() {
        ensure!(
            form == 3,
            ValueInvalidSnafu {
                typ: "REAL",
                reason: "canonical character form must be NR3",
            }
        );
        check_canonical_nr3(text)?;
    }

    // the repertoire above is pure ASCII
    let text = std::str::from_utf8(text).map_err(|_| {
        ValueInvalidSnafu {
            typ: "REAL",
            reason: "numeric character form is not ASCII",
        }
        .build()
    })?;
    let normalized = text.trim_start_matches(' ').replace(',', ".");

    // light structural conformance per form
    let has_point = normalized.contains('.');
    let has_exponent = normalized.contains(['e', 'E']);
    let conforming = match form {
        1 => !has_point && !has_exponent,
        2 => has_point && !has_exponent,
        _ => has_exponent,
    };
    ensure!(
        conforming,
        ValueInvalidSnafu {
            typ: "REAL",
            reason: "contents do not match the named representation form",
        }
    );

    normalized.parse::<f64>().ok().context(ValueInvalidSnafu {
        typ: "REAL",
        reason: "malformed numeric character form",
    })
}

/// The canonical NR3 restrictions: no spaces, no leading zeros on the
/// mantissa or exponent, no trailing fractional zeros, the decimal point
/// immediately followed by the exponent mark, and a `+` sign only in the
/// `E+0` exponent.
fn check_canonical_nr3(text: &[u8]) -> Result<()> {
    fn bad(reason: &'static str) -> super::Error {
        ValueInvalidSnafu { typ: "REAL", reason }.build()
    }

    let point = text
        .iter()
        .position(|&o| o == b'.')
        .ok_or_else(|| bad("canonical NR3 requires a decimal point"))?;
    let mark = point + 1;
    ensure!(
        text.get(mark) == Some(&b'E'),
        ValueInvalidSnafu {
            typ: "REAL",
            reason: "decimal point must be followed immediately by the exponent mark",
        }
    );

    let mantissa = &text[..point];
    let digits = mantissa.strip_prefix(b"-").unwrap_or(mantissa);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(bad("canonical NR3 mantissa must be a digit run"));
    }
    if digits.len() > 1 && digits[0] == b'0' {
        return Err(bad("leading zero on the mantissa"));
    }
    // trailing zeros belong in the exponent instead
    if digits.len() > 1 && digits[digits.len() - 1] == b'0' {
        return Err(bad("trailing zero on the mantissa"));
    }

    let exponent = &text[mark + 1..];
    if exponent == b"+0" {
        return Ok(());
    }
    let digits = exponent.strip_prefix(b"-").unwrap_or(exponent);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(bad("canonical NR3 exponent must be a digit run"));
    }
    if digits[0] == b'0' {
        return Err(bad("leading zero on the exponent"));
    }
    Ok(())
}

pub(crate) fn encode_real(value: f64) -> Vec<u8> {
    if value.is_nan() {
        return vec![NOT_A_NUMBER];
    }
    if value.is_infinite() {
        return vec![if value > 0.0 { PLUS_INFINITY } else { MINUS_INFINITY }];
    }
    if value == 0.0 {
        return if value.is_sign_negative() {
            vec![MINUS_ZERO]
        } else {
            Vec::new()
        };
    }

    let bits = value.to_bits();
    let sign = (bits >> 63) != 0;
    let biased = ((bits >> 52) & 0x7FF) as i32;
    let fraction = bits & 0x000F_FFFF_FFFF_FFFF;
    let (mut mantissa, mut exponent) = if biased == 0 {
        // subnormal
        (fraction, -1074i32)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };
    while mantissa & 1 == 0 {
        mantissa >>= 1;
        exponent += 1;
    }

    let mantissa_octets = mantissa.to_be_bytes();
    let skip = mantissa_octets.iter().take_while(|o| **o == 0).count();

    let mut out = Vec::with_capacity(11);
    let exponent_octets = if (-128..=127).contains(&exponent) {
        out.push(0x80 | if sign { 0x40 } else { 0x00 });
        vec![exponent as u8]
    } else {
        out.push(0x80 | if sign { 0x40 } else { 0x00 } | 0x01);
        (exponent as i16).to_be_bytes().to_vec()
    };
    out.extend_from_slice(&exponent_octets);
    out.extend_from_slice(&mantissa_octets[skip..]);
    out
}

impl Element {
    /// Read the contents as a REAL value.
    ///
    /// All three content forms are understood. Binary mantissas wider
    /// than an IEEE 754 double round in the usual way.
    pub fn to_real(&self) -> Result<f64> {
        decode_real(self.rules(), self.construction(), self.value())
    }

    /// Replace the contents with a REAL value in the canonical shape:
    /// empty contents for plus zero, a special-value octet for minus
    /// zero, the infinities and NaN, and otherwise the base-2 binary
    /// form with an odd mantissa and a minimal exponent.
    pub fn set_real(&mut self, value: f64) {
        self.replace(Construction::Primitive, encode_real(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Error;
    use x690_core::EncodingRules::{Ber, Cer, Der};
    use x690_core::Tag;

    fn real(rules: EncodingRules, contents: &[u8]) -> Element {
        Element::from_parts(rules, Tag::REAL, Construction::Primitive, contents)
    }

    #[test]
    fn binary_form() {
        // +0.15625: base 2, exponent -5, mantissa 5
        for rules in [Ber, Cer, Der] {
            assert_eq!(real(rules, &[0x80, 0xFB, 0x05]).to_real().unwrap(), 0.15625);
        }
        // negative sign bit
        assert_eq!(real(Ber, &[0xC0, 0xFB, 0x05]).to_real().unwrap(), -0.15625);
        // base 8: 5 * 8^-1
        assert_eq!(real(Ber, &[0x90, 0xFF, 0x05]).to_real().unwrap(), 0.625);
        // base 16: 2 * 16^1
        assert_eq!(real(Ber, &[0xA0, 0x01, 0x02]).to_real().unwrap(), 32.0);
        // scale factor 2: 1 * 2^2 * 2^0
        assert_eq!(real(Ber, &[0x88, 0x00, 0x01]).to_real().unwrap(), 4.0);
        // two-octet exponent
        assert_eq!(real(Ber, &[0x81, 0x01, 0x00, 0x01]).to_real().unwrap(), (2f64).powi(256));
    }

    #[test]
    fn set_real_produces_canonical_binary() {
        let mut elem = Element::new(Der, Tag::REAL);
        elem.set_real(0.15625);
        assert_eq!(elem.value(), &[0x80, 0xFB, 0x05]);
        assert_eq!(elem.to_real().unwrap(), 0.15625);

        elem.set_real(-0.15625);
        assert_eq!(elem.value(), &[0xC0, 0xFB, 0x05]);

        elem.set_real(1.0);
        assert_eq!(elem.value(), &[0x80, 0x00, 0x01]);

        // an exponent below -128 takes two octets
        elem.set_real((2f64).powi(-200));
        assert_eq!(elem.value(), &[0x81, 0xFF, 0x38, 0x01]);
        assert_eq!(elem.to_real().unwrap(), (2f64).powi(-200));
    }

    #[test]
    fn zero_and_specials() {
        let mut elem = Element::new(Der, Tag::REAL);
        elem.set_real(0.0);
        assert!(elem.value().is_empty());
        assert_eq!(elem.to_real().unwrap(), 0.0);

        elem.set_real(-0.0);
        assert_eq!(elem.value(), &[0x43]);
        assert!(elem.to_real().unwrap().is_sign_negative());

        elem.set_real(f64::INFINITY);
        assert_eq!(elem.value(), &[0x40]);
        assert_eq!(elem.to_real().unwrap(), f64::INFINITY);

        elem.set_real(f64::NEG_INFINITY);
        assert_eq!(elem.value(), &[0x41]);

        elem.set_real(f64::NAN);
        assert_eq!(elem.value(), &[0x42]);
        assert!(elem.to_real().unwrap().is_nan());

        assert!(matches!(
            real(Ber, &[0x44]).to_real(),
            Err(Error::ValueInvalid { .. })
        ));
    }

    #[test]
    fn canonical_rules_reject_non_base_2() {
        for contents in [
            [0x90u8, 0xFF, 0x05], // base 8
            [0xA0, 0x01, 0x02],   // base 16
            [0x88, 0x00, 0x01],   // nonzero scale factor
        ] {
            assert!(real(Ber, &contents).to_real().is_ok());
            for rules in [Cer, Der] {
                assert!(matches!(
                    real(rules, &contents).to_real(),
                    Err(Error::ValueInvalid { .. })
                ));
            }
        }
    }

    #[test]
    fn canonical_rules_reject_even_mantissa() {
        // 10 * 2^-6 denotes the same value as 5 * 2^-5
        let contents = [0x80, 0xFA, 0x0A];
        assert_eq!(real(Ber, &contents).to_real().unwrap(), 0.15625);
        for rules in [Cer, Der] {
            assert!(matches!(
                real(rules, &contents).to_real(),
                Err(Error::ValuePadding { .. })
            ));
        }
    }

    #[test]
    fn canonical_rules_reject_padded_exponent() {
        // exponent -5 padded to two octets
        let contents = [0x81, 0xFF, 0xFB, 0x05];
        assert_eq!(real(Ber, &contents).to_real().unwrap(), 0.15625);
        assert!(matches!(
            real(Der, &contents).to_real(),
            Err(Error::ValuePadding { .. })
        ));
    }

    #[test]
    fn character_forms() {
        // NR1
        let mut contents = vec![0x01];
        contents.extend_from_slice(b"  27");
        assert_eq!(real(Ber, &contents).to_real().unwrap(), 27.0);

        // NR2 with a comma decimal mark
        let mut contents = vec![0x02];
        contents.extend_from_slice(b"3,14");
        assert_eq!(real(Ber, &contents).to_real().unwrap(), 3.14);

        // NR3
        let mut contents = vec![0x03];
        contents.extend_from_slice(b"15625.E-5");
        assert_eq!(real(Ber, &contents).to_real().unwrap(), 0.15625);

        // a form/content mismatch
        let mut contents = vec![0x01];
        contents.extend_from_slice(b"3.14");
        assert!(real(Ber, &contents).to_real().is_err());
    }

    #[test]
    fn canonical_character_form_is_nr3_only() {
        let mut nr1 = vec![0x01];
        nr1.extend_from_slice(b"27");
        assert!(matches!(
            real(Der, &nr1).to_real(),
            Err(Error::ValueInvalid { .. })
        ));

        let mut good = vec![0x03];
        good.extend_from_slice(b"15625.E-5");
        assert_eq!(real(Der, &good).to_real().unwrap(), 0.15625);

        let mut integral = vec![0x03];
        integral.extend_from_slice(b"1.E+0");
        assert_eq!(real(Der, &integral).to_real().unwrap(), 1.0);

        for bad in [
            &b" 15625.E-5"[..], // whitespace
            b"015625.E-5",      // leading zero on the mantissa
            b"15625.E-05",      // leading zero on the exponent
            b"156250.E-6",      // trailing zero on the mantissa
            b"1562.5E-4",       // fractional digits instead of exponent folding
            b"15625.E+5",       // plus sign outside E+0
        ] {
            let mut contents = vec![0x03];
            contents.extend_from_slice(bad);
            assert!(
                real(Der, &contents).to_real().is_err(),
                "expected rejection of {:?}",
                std::str::from_utf8(bad).unwrap()
            );
        }
    }

    #[test]
    fn empty_contents_are_plus_zero() {
        for rules in [Ber, Cer, Der] {
            let value = real(rules, &[]).to_real().unwrap();
            assert_eq!(value, 0.0);
            assert!(value.is_sign_positive());
        }
    }
}
