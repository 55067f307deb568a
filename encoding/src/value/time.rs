//! UTCTime and GeneralizedTime codecs.
//!
//! Both types are carried as restricted character strings; this codec
//! pins them to the shapes the canonical rule sets prescribe and maps
//! them onto `chrono` UTC instants. Fractional seconds in
//! GeneralizedTime are kept to nanosecond resolution; digits beyond the
//! ninth are accepted on decode and truncated toward zero.

use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use snafu::{ensure, OptionExt};
use x690_core::Construction;

use super::{expect_primitive, Result, ValueInvalidSnafu, ValueSizeSnafu};
use crate::element::Element;

/// Read a run of ASCII digits as a number.
fn read_number(typ: &'static str, text: &[u8]) -> Result<u32> {
    let mut value: u32 = 0;
    for &octet in text {
        ensure!(
            octet.is_ascii_digit(),
            ValueInvalidSnafu {
                typ,
                reason: "non-digit where a digit is required",
            }
        );
        value = value * 10 + u32::from(octet - b'0');
    }
    Ok(value)
}

fn date_time_from_parts(
    typ: &'static str,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
) -> Result<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, day).context(ValueInvalidSnafu {
        typ,
        reason: "invalid calendar date",
    })?;
    let instant = date
        .and_hms_nano_opt(hour, minute, second, nanos)
        .context(ValueInvalidSnafu {
            typ,
            reason: "invalid time of day",
        })?;
    Ok(Utc.from_utc_datetime(&instant))
}

pub(crate) fn decode_utc_time(
    construction: Construction,
    contents: &[u8],
) -> Result<DateTime<Utc>> {
    const TYP: &str = "UTCTime";
    expect_primitive(TYP, construction)?;
    // exactly YYMMDDhhmmssZ
    ensure!(
        contents.len() == 13,
        ValueSizeSnafu {
            typ: TYP,
            got: contents.len(),
        }
    );
    ensure!(
        contents[12] == b'Z',
        ValueInvalidSnafu {
            typ: TYP,
            reason: "must end with Z",
        }
    );
    let year = read_number(TYP, &contents[0..2])?;
    let year = if year < 50 { 2000 + year } else { 1900 + year };
    let month = read_number(TYP, &contents[2..4])?;
    let day = read_number(TYP, &contents[4..6])?;
    let hour = read_number(TYP, &contents[6..8])?;
    let minute = read_number(TYP, &contents[8..10])?;
    let second = read_number(TYP, &contents[10..12])?;
    date_time_from_parts(
        TYP,
        year as i32,
        month,
        day,
        hour,
        minute,
        second,
        0,
    )
}

pub(crate) fn encode_utc_time(instant: DateTime<Utc>) -> Vec<u8> {
    instant.format("%y%m%d%H%M%SZ").to_string().into_bytes()
}

pub(crate) fn decode_generalized_time(
    construction: Construction,
    contents: &[u8],
) -> Result<DateTime<Utc>> {
    const TYP: &str = "GeneralizedTime";
    expect_primitive(TYP, construction)?;
    // at least YYYYMMDDhhmmssZ
    ensure!(
        contents.len() >= 15,
        ValueSizeSnafu {
            typ: TYP,
            got: contents.len(),
        }
    );
    // 16 octets would leave a decimal point with no digits
    ensure!(
        contents.len() != 16,
        ValueInvalidSnafu {
            typ: TYP,
            reason: "impossible length: a decimal point with no fraction digits",
        }
    );
    ensure!(
        contents[contents.len() - 1] == b'Z',
        ValueInvalidSnafu {
            typ: TYP,
            reason: "must end with Z",
        }
    );

    let year = read_number(TYP, &contents[0..4])?;
    let month = read_number(TYP, &contents[4..6])?;
    let day = read_number(TYP, &contents[6..8])?;
    let hour = read_number(TYP, &contents[8..10])?;
    let minute = read_number(TYP, &contents[10..12])?;
    let second = read_number(TYP, &contents[12..14])?;

    let nanos = if contents.len() > 15 {
        ensure!(
            contents[14] != b',',
            ValueInvalidSnafu {
                typ: TYP,
                reason: "comma is not an acceptable decimal separator",
            }
        );
        ensure!(
            contents[14] == b'.',
            ValueInvalidSnafu {
                typ: TYP,
                reason: "fraction must start with a decimal point at position 14",
            }
        );
        let digits = &contents[15..contents.len() - 1];
        ensure!(
            digits.last() != Some(&b'0'),
            ValueInvalidSnafu {
                typ: TYP,
                reason: "trailing zeros in the fraction",
            }
        );
        for &octet in digits {
            ensure!(
                octet.is_ascii_digit(),
                ValueInvalidSnafu {
                    typ: TYP,
                    reason: "non-digit in the fraction",
                }
            );
        }
        // clamp to nanosecond resolution, truncating toward zero
        let kept = &digits[..digits.len().min(9)];
        let mut nanos = read_number(TYP, kept)?;
        for _ in kept.len()..9 {
            nanos *= 10;
        }
        nanos
    } else {
        0
    };

    date_time_from_parts(
        TYP,
        year as i32,
        month,
        day,
        hour,
        minute,
        second,
        nanos,
    )
}

pub(crate) fn encode_generalized_time(instant: DateTime<Utc>) -> Vec<u8> {
    let mut out = instant.format("%Y%m%d%H%M%S").to_string().into_bytes();
    let nanos = instant.nanosecond() % 1_000_000_000;
    if nanos > 0 {
        let mut fraction = format!("{:09}", nanos);
        while fraction.ends_with('0') {
            fraction.pop();
        }
        out.push(b'.');
        out.extend_from_slice(fraction.as_bytes());
    }
    out.push(b'Z');
    out
}

impl Element {
    /// Read the contents as a UTCTime instant.
    ///
    /// Only the full `YYMMDDhhmmssZ` shape is accepted; two-digit years
    /// below 50 land in 2000-2049 and the rest in 1950-1999.
    pub fn to_utc_time(&self) -> Result<DateTime<Utc>> {
        decode_utc_time(self.construction(), self.value())
    }

    /// Replace the contents with a UTCTime value.
    ///
    /// The year is reduced modulo the two-digit pivot described in
    /// [`Element::to_utc_time`].
    pub fn set_utc_time(&mut self, instant: DateTime<Utc>) {
        self.replace(Construction::Primitive, encode_utc_time(instant));
    }

    /// Read the contents as a GeneralizedTime instant.
    ///
    /// Fraction digits beyond nanosecond resolution are accepted and
    /// truncated toward zero.
    pub fn to_generalized_time(&self) -> Result<DateTime<Utc>> {
        decode_generalized_time(self.construction(), self.value())
    }

    /// Replace the contents with a GeneralizedTime value: the 14-digit
    /// stem, then the nanosecond fraction with trailing zeros stripped,
    /// then `Z`.
    pub fn set_generalized_time(&mut self, instant: DateTime<Utc>) {
        self.replace(Construction::Primitive, encode_generalized_time(instant));
    }
}
