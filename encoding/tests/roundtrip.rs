//! Round-trip laws: for every type and every value in its abstract
//! domain, decoding an encoding of the value yields the value again,
//! under each of the three rule variants.

use chrono::{TimeZone, Utc};
use num_bigint::BigInt;
use x690_encoding::decode::{BerDecoder, CerDecoder, Decode, DerDecoder};
use x690_encoding::{BitString, Element, EncodingRules, Oid, RelativeOid, Tag};

const ALL_RULES: [EncodingRules; 3] = [
    EncodingRules::Ber,
    EncodingRules::Cer,
    EncodingRules::Der,
];

/// Serialize the element and read it back through the matching decoder.
fn reparse(elem: &Element) -> Element {
    let encoded = elem.to_bytes();
    let (decoded, read) = match elem.rules() {
        EncodingRules::Ber => BerDecoder::new().decode_one(&encoded),
        EncodingRules::Cer => CerDecoder::new().decode_one(&encoded),
        EncodingRules::Der => DerDecoder::new().decode_one(&encoded),
    }
    .expect("the codec's own output should decode");
    assert_eq!(read, encoded.len(), "the whole encoding should be consumed");
    decoded
}

#[test]
fn boolean_round_trip() {
    for rules in ALL_RULES {
        for value in [true, false] {
            let mut elem = Element::new(rules, Tag::BOOLEAN);
            elem.set_bool(value);
            assert_eq!(reparse(&elem).to_bool().unwrap(), value);
        }
    }
}

#[test]
fn integer_round_trip() {
    let values: [i64; 9] = [0, 1, -1, 127, 128, -128, -129, i64::MAX, i64::MIN];
    for rules in ALL_RULES {
        for value in values {
            let mut elem = Element::new(rules, Tag::INTEGER);
            elem.set_int(value);
            assert_eq!(reparse(&elem).to_int::<i64>().unwrap(), value);
        }
    }
}

#[test]
fn big_integer_round_trip() {
    let values = [
        BigInt::from(0),
        BigInt::from(1) << 200u32,
        -(BigInt::from(1) << 200u32),
        BigInt::parse_bytes(b"-99999999999999999999999999999999999999", 10).unwrap(),
    ];
    for rules in ALL_RULES {
        for value in &values {
            let mut elem = Element::new(rules, Tag::INTEGER);
            elem.set_big_int(value);
            assert_eq!(reparse(&elem).to_big_int().unwrap(), *value);
        }
    }
}

#[test]
fn bit_string_round_trip() {
    let patterns: [&[u8]; 4] = [&[], &[1], &[1, 0, 1, 1, 0, 1, 0, 0, 1], &[0; 17]];
    for rules in ALL_RULES {
        for pattern in patterns {
            let bits: BitString = pattern.iter().map(|&b| b != 0).collect();
            let mut elem = Element::new(rules, Tag::BIT_STRING);
            elem.set_bit_string(&bits);
            assert_eq!(reparse(&elem).to_bit_string().unwrap(), bits);
        }
    }
}

#[test]
fn octet_string_round_trip() {
    for rules in ALL_RULES {
        for len in [0usize, 1, 999, 1000, 1001, 2500] {
            let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let mut elem = Element::new(rules, Tag::OCTET_STRING);
            elem.set_octet_string(&data);
            assert_eq!(reparse(&elem).to_octet_string().unwrap(), data);
        }
    }
}

#[test]
fn null_round_trip() {
    for rules in ALL_RULES {
        let mut elem = Element::new(rules, Tag::NULL);
        elem.set_null();
        assert!(reparse(&elem).to_null().is_ok());
    }
}

#[test]
fn oid_round_trip() {
    let oids = ["0.0", "1.3.6.4.1", "2.999.1", "1.3.6.1.4.1.311.21.20"];
    for rules in ALL_RULES {
        for text in oids {
            let oid: Oid = text.parse().unwrap();
            let mut elem = Element::new(rules, Tag::OBJECT_IDENTIFIER);
            elem.set_oid(&oid).unwrap();
            assert_eq!(reparse(&elem).to_oid().unwrap(), oid);
        }
    }
}

#[test]
fn relative_oid_round_trip() {
    for rules in ALL_RULES {
        let roid: RelativeOid = "8571.3.2".parse().unwrap();
        let mut elem = Element::new(rules, Tag::RELATIVE_OID);
        elem.set_relative_oid(&roid);
        assert_eq!(reparse(&elem).to_relative_oid().unwrap(), roid);
    }
}

#[test]
fn real_round_trip() {
    let values = [
        0.0,
        -0.0,
        0.15625,
        -0.15625,
        1.0,
        (2f64).powi(-200),
        1.0e300,
        f64::MIN_POSITIVE,
        f64::INFINITY,
        f64::NEG_INFINITY,
        std::f64::consts::PI,
    ];
    for rules in ALL_RULES {
        for value in values {
            let mut elem = Element::new(rules, Tag::REAL);
            elem.set_real(value);
            let decoded = reparse(&elem).to_real().unwrap();
            assert_eq!(decoded, value, "round-tripping {}", value);
            assert_eq!(decoded.is_sign_negative(), value.is_sign_negative());
        }

        let mut elem = Element::new(rules, Tag::REAL);
        elem.set_real(f64::NAN);
        assert!(reparse(&elem).to_real().unwrap().is_nan());
    }
}

#[test]
fn string_round_trips() {
    for rules in ALL_RULES {
        let mut elem = Element::new(rules, Tag::UTF8_STRING);
        elem.set_utf8_string("Fahrvergnügen 🚗").unwrap();
        assert_eq!(reparse(&elem).to_utf8_string().unwrap(), "Fahrvergnügen 🚗");

        let mut elem = Element::new(rules, Tag::PRINTABLE_STRING);
        elem.set_printable_string("Test User 1").unwrap();
        assert_eq!(reparse(&elem).to_printable_string().unwrap(), "Test User 1");

        let mut elem = Element::new(rules, Tag::NUMERIC_STRING);
        elem.set_numeric_string("867 5309").unwrap();
        assert_eq!(reparse(&elem).to_numeric_string().unwrap(), "867 5309");

        let mut elem = Element::new(rules, Tag::IA5_STRING);
        elem.set_ia5_string("user@example.com").unwrap();
        assert_eq!(reparse(&elem).to_ia5_string().unwrap(), "user@example.com");

        let mut elem = Element::new(rules, Tag::BMP_STRING);
        elem.set_bmp_string("λόγος 𝄞").unwrap();
        assert_eq!(reparse(&elem).to_bmp_string().unwrap(), "λόγος 𝄞");

        let mut elem = Element::new(rules, Tag::UNIVERSAL_STRING);
        elem.set_universal_string("λόγος").unwrap();
        assert_eq!(reparse(&elem).to_universal_string().unwrap(), "λόγος");

        let mut elem = Element::new(rules, Tag::TELETEX_STRING);
        elem.set_teletex_string(&[0x01, 0x9F, 0xFF]);
        assert_eq!(
            reparse(&elem).to_teletex_string().unwrap(),
            &[0x01, 0x9F, 0xFF]
        );
    }
}

#[test]
fn long_string_round_trip_across_variants() {
    let text = "segmented ".repeat(250); // 2500 octets
    for rules in ALL_RULES {
        let mut elem = Element::new(rules, Tag::UTF8_STRING);
        elem.set_utf8_string(&text).unwrap();
        assert_eq!(reparse(&elem).to_utf8_string().unwrap(), text);
    }
}

#[test]
fn time_round_trips() {
    for rules in ALL_RULES {
        let instant = Utc.with_ymd_and_hms(2017, 8, 31, 13, 45, 0).unwrap();

        let mut elem = Element::new(rules, Tag::UTC_TIME);
        elem.set_utc_time(instant);
        assert_eq!(reparse(&elem).to_utc_time().unwrap(), instant);

        let mut elem = Element::new(rules, Tag::GENERALIZED_TIME);
        elem.set_generalized_time(instant);
        assert_eq!(reparse(&elem).to_generalized_time().unwrap(), instant);
    }
}

#[test]
fn sequence_round_trip() {
    for rules in ALL_RULES {
        let mut first = Element::new(rules, Tag::INTEGER);
        first.set_int(300);
        let mut second = Element::new(rules, Tag::UTF8_STRING);
        second.set_utf8_string("nested").unwrap();
        let mut inner = Element::new(rules, Tag::SEQUENCE);
        inner.set_elements(&[second]);

        let mut outer = Element::new(rules, Tag::SEQUENCE);
        outer.set_elements(&[first, inner]);

        let decoded = reparse(&outer);
        let children = decoded.to_elements().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].to_int::<i64>().unwrap(), 300);
        let nested = children[1].to_elements().unwrap();
        assert_eq!(nested[0].to_utf8_string().unwrap(), "nested");
    }
}

#[test]
fn set_round_trip() {
    for rules in ALL_RULES {
        let mut a = Element::new(rules, Tag::INTEGER);
        a.set_int(3);
        let mut b = Element::new(rules, Tag::INTEGER);
        b.set_int(1);
        let mut set = Element::new(rules, Tag::SET);
        set.set_elements(&[a, b]);

        let values: Vec<i64> = reparse(&set)
            .to_elements()
            .unwrap()
            .iter()
            .map(|c| c.to_int().unwrap())
            .collect();
        if rules.requires_sorted_set() {
            assert_eq!(values, [1, 3]);
        } else {
            assert_eq!(values, [3, 1]);
        }
    }
}

#[test]
fn enumerated_round_trip() {
    for rules in ALL_RULES {
        let mut elem = Element::new(rules, Tag::ENUMERATED);
        elem.set_enumerated(-4i32);
        assert_eq!(reparse(&elem).to_enumerated::<i32>().unwrap(), -4);
    }
}
