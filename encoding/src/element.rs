//! The dynamic TLV element model.

use x690_core::{Construction, EncodingRules, Header, Length, Tag};

use crate::decode::DEFAULT_MAX_DEPTH;

/// A single tag-length-value node decoded from, or destined for, one of
/// the X.690 transfer syntaxes.
///
/// An element owns its contents octets (the V of TLV); the tag and length
/// octets are serialized from the remaining fields on demand. Elements
/// are value-like: constructed from bytes by copy, mutated wholesale by
/// the typed setters, and serialized back to bytes by copy. Nothing is
/// shared between elements.
///
/// Every element records the rule variant it belongs to. The typed
/// accessors in [`crate::value`] consult it to decide which canonicality
/// checks apply, and [`Element::to_bytes`] consults it to pick the length
/// form.
///
/// Elements also carry the nesting depth cap used when their accessors
/// frame nested material (child elements, string segments). Elements
/// produced by a decoder inherit that decoder's configured limit, so a
/// cap raised with `with_max_depth` keeps applying through the value
/// layer; elements built directly start at the default.
#[derive(Debug, Clone)]
pub struct Element {
    tag: Tag,
    construction: Construction,
    value: Vec<u8>,
    rules: EncodingRules,
    max_depth: usize,
}

impl Element {
    /// Create an empty primitive element with the given tag.
    pub fn new(rules: EncodingRules, tag: Tag) -> Element {
        Element {
            tag,
            construction: Construction::Primitive,
            value: Vec::new(),
            rules,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create an empty element with the given tag and construction.
    pub fn with_construction(
        rules: EncodingRules,
        tag: Tag,
        construction: Construction,
    ) -> Element {
        Element {
            tag,
            construction,
            value: Vec::new(),
            rules,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create an element from its parts, copying the caller's contents
    /// buffer.
    pub fn from_parts(
        rules: EncodingRules,
        tag: Tag,
        construction: Construction,
        value: &[u8],
    ) -> Element {
        Element {
            tag,
            construction,
            value: value.to_vec(),
            rules,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create an element from its parts, taking ownership of the
    /// contents buffer.
    pub(crate) fn from_parts_owned(
        rules: EncodingRules,
        tag: Tag,
        construction: Construction,
        value: Vec<u8>,
    ) -> Element {
        Element {
            tag,
            construction,
            value,
            rules,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Retrieve the element's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Replace the element's tag.
    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    /// Retrieve the element's construction.
    pub fn construction(&self) -> Construction {
        self.construction
    }

    /// Retrieve the rule variant this element belongs to.
    pub fn rules(&self) -> EncodingRules {
        self.rules
    }

    /// Retrieve the nesting depth cap applied when this element's
    /// accessors frame nested elements or reassemble string segments.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Replace the nesting depth cap.
    ///
    /// Elements produced by a decoder already carry the decoder's
    /// configured limit, and pass it on to their children.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Borrow the contents octets.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Consume the element, retrieving the contents octets.
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Replace the contents octets, copying the caller's buffer.
    ///
    /// This does not touch the construction bit; prefer the typed
    /// setters, which keep the two consistent.
    pub fn set_value(&mut self, value: &[u8]) {
        self.value = value.to_vec();
    }

    /// Replace the contents octets without copying.
    pub(crate) fn set_value_owned(&mut self, value: Vec<u8>) {
        self.value = value;
    }

    /// Replace the contents octets and the construction bit at once.
    pub(crate) fn replace(&mut self, construction: Construction, value: Vec<u8>) {
        self.construction = construction;
        self.value = value;
    }
}

/// Equality covers the wire-relevant fields; the depth cap is a local
/// processing setting, not part of the value.
impl PartialEq for Element {
    fn eq(&self, other: &Element) -> bool {
        self.tag == other.tag
            && self.construction == other.construction
            && self.rules == other.rules
            && self.value == other.value
    }
}

impl Header for Element {
    fn tag(&self) -> Tag {
        self.tag
    }

    fn construction(&self) -> Construction {
        self.construction
    }

    fn length(&self) -> Length {
        Length(self.value.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_copied_on_set() {
        let mut buffer = vec![0x01, 0x02, 0x03];
        let mut elem = Element::new(EncodingRules::Der, Tag::OCTET_STRING);
        elem.set_value(&buffer);
        // mutating the caller's buffer must not affect the element
        buffer[0] = 0xFF;
        assert_eq!(elem.value(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn new_element_is_empty_primitive() {
        let elem = Element::new(EncodingRules::Ber, Tag::SEQUENCE);
        assert_eq!(elem.construction(), Construction::Primitive);
        assert!(elem.value().is_empty());
        assert_eq!(elem.length(), Length(0));
        assert_eq!(elem.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn depth_cap_does_not_affect_equality() {
        let mut a = Element::new(EncodingRules::Ber, Tag::SEQUENCE);
        let b = a.clone();
        a.set_max_depth(64);
        assert_eq!(a.max_depth(), 64);
        assert_eq!(a, b);
    }
}
