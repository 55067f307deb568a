//! Accessors for the restricted string types.
//!
//! Every accessor reassembles the constructed form where the rules allow
//! it, then applies the repertoire policy from [`crate::text`] in both
//! directions. TeletexString and VideotexString carry no repertoire
//! policy (their ISO 2022 designations are long obsolete) and are
//! exposed octet-transparently.

use snafu::ResultExt;

use super::octets::{gather_string_octets, segment_string_octets};
use super::{Result, ValueCharactersSnafu};
use crate::element::Element;
use crate::text::StringKind;

fn decode_text(elem: &Element, kind: StringKind) -> Result<String> {
    let octets = gather_string_octets(
        kind.name(),
        elem.rules(),
        elem.tag(),
        elem.construction(),
        elem.value(),
        elem.max_depth(),
    )?;
    kind.decode(&octets)
        .context(ValueCharactersSnafu { typ: kind.name() })
}

fn encode_text(elem: &mut Element, kind: StringKind, text: &str) -> Result<()> {
    let octets = kind
        .encode(text)
        .context(ValueCharactersSnafu { typ: kind.name() })?;
    let (construction, contents) = segment_string_octets(elem.rules(), &octets);
    elem.replace(construction, contents);
    Ok(())
}

impl Element {
    /// Read the contents as a UTF8String.
    pub fn to_utf8_string(&self) -> Result<String> {
        decode_text(self, StringKind::Utf8)
    }

    /// Replace the contents with a UTF8String value.
    pub fn set_utf8_string(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::Utf8, text)
    }

    /// Read the contents as a NumericString: digits and space only.
    pub fn to_numeric_string(&self) -> Result<String> {
        decode_text(self, StringKind::Numeric)
    }

    /// Replace the contents with a NumericString value,
    /// rejecting characters outside the repertoire.
    pub fn set_numeric_string(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::Numeric, text)
    }

    /// Read the contents as a PrintableString.
    pub fn to_printable_string(&self) -> Result<String> {
        decode_text(self, StringKind::Printable)
    }

    /// Replace the contents with a PrintableString value,
    /// rejecting characters outside the repertoire.
    pub fn set_printable_string(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::Printable, text)
    }

    /// Read the contents as a VisibleString: the printing ISO 646
    /// characters and space.
    pub fn to_visible_string(&self) -> Result<String> {
        decode_text(self, StringKind::Visible)
    }

    /// Replace the contents with a VisibleString value.
    pub fn set_visible_string(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::Visible, text)
    }

    /// Read the contents as a GraphicString. The octet policy matches
    /// VisibleString; the type is kept for compatibility with old
    /// modules.
    pub fn to_graphic_string(&self) -> Result<String> {
        decode_text(self, StringKind::Graphic)
    }

    /// Replace the contents with a GraphicString value.
    pub fn set_graphic_string(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::Graphic, text)
    }

    /// Read the contents as an ObjectDescriptor, which carries the
    /// GraphicString repertoire.
    pub fn to_object_descriptor(&self) -> Result<String> {
        decode_text(self, StringKind::Graphic)
    }

    /// Replace the contents with an ObjectDescriptor value.
    pub fn set_object_descriptor(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::Graphic, text)
    }

    /// Read the contents as an IA5String: any ISO 646 octet, controls
    /// included.
    pub fn to_ia5_string(&self) -> Result<String> {
        decode_text(self, StringKind::Ia5)
    }

    /// Replace the contents with an IA5String value.
    pub fn set_ia5_string(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::Ia5, text)
    }

    /// Read the contents as a GeneralString. The octet policy matches
    /// IA5String.
    pub fn to_general_string(&self) -> Result<String> {
        decode_text(self, StringKind::General)
    }

    /// Replace the contents with a GeneralString value.
    pub fn set_general_string(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::General, text)
    }

    /// Read the contents as a UniversalString: UTF-32, big-endian.
    pub fn to_universal_string(&self) -> Result<String> {
        decode_text(self, StringKind::Universal)
    }

    /// Replace the contents with a UniversalString value.
    pub fn set_universal_string(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::Universal, text)
    }

    /// Read the contents as a BMPString: UTF-16, big-endian.
    pub fn to_bmp_string(&self) -> Result<String> {
        decode_text(self, StringKind::Bmp)
    }

    /// Replace the contents with a BMPString value.
    pub fn set_bmp_string(&mut self, text: &str) -> Result<()> {
        encode_text(self, StringKind::Bmp, text)
    }

    /// Read the contents as a TeletexString, octet-transparently.
    pub fn to_teletex_string(&self) -> Result<Vec<u8>> {
        gather_string_octets(
            "TeletexString",
            self.rules(),
            self.tag(),
            self.construction(),
            self.value(),
            self.max_depth(),
        )
    }

    /// Replace the contents with a TeletexString value, taken verbatim.
    pub fn set_teletex_string(&mut self, octets: &[u8]) {
        let (construction, contents) = segment_string_octets(self.rules(), octets);
        self.replace(construction, contents);
    }

    /// Read the contents as a VideotexString, octet-transparently.
    pub fn to_videotex_string(&self) -> Result<Vec<u8>> {
        gather_string_octets(
            "VideotexString",
            self.rules(),
            self.tag(),
            self.construction(),
            self.value(),
            self.max_depth(),
        )
    }

    /// Replace the contents with a VideotexString value, taken verbatim.
    pub fn set_videotex_string(&mut self, octets: &[u8]) {
        let (construction, contents) = segment_string_octets(self.rules(), octets);
        self.replace(construction, contents);
    }
}
