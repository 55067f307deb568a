//! OCTET STRING codec, and the segmented-string logic shared with the
//! restricted string types.
//!
//! Under BER a string type may arrive in the constructed form, as a
//! sequence of segments; under CER it must do so once the contents exceed
//! 1000 octets, segmented at exactly 1000; under DER the constructed form
//! is forbidden entirely.

use snafu::{ensure, ResultExt};
use tracing::debug;
use x690_core::{Construction, EncodingRules, Tag};

use super::{Result, UnexpectedTagSnafu, ValueInvalidSnafu, WrongConstructionSnafu};
use crate::decode;
use crate::element::Element;
use crate::encode;

/// Gather the complete octet contents of a string-typed element,
/// reassembling the constructed form when the rules allow it.
///
/// `outer_tag` is the tag of the element being accessed; segments may
/// carry either that tag or the plain OCTET STRING tag. `max_depth`
/// caps segment nesting, and is normally the element's own inherited
/// limit.
pub(crate) fn gather_string_octets(
    typ: &'static str,
    rules: EncodingRules,
    outer_tag: Tag,
    construction: Construction,
    contents: &[u8],
    max_depth: usize,
) -> Result<Vec<u8>> {
    match construction {
        Construction::Primitive => {
            if let Some(limit) = rules.max_primitive_string_length() {
                ensure!(
                    contents.len() <= limit,
                    ValueInvalidSnafu {
                        typ,
                        reason: "primitive contents above the segmentation threshold",
                    }
                );
            }
            Ok(contents.to_vec())
        }
        Construction::Constructed => {
            ensure!(
                rules.allows_constructed_strings(),
                WrongConstructionSnafu {
                    typ,
                    expected: Construction::Primitive,
                    got: Construction::Constructed,
                }
            );
            let mut out = Vec::with_capacity(contents.len());
            gather_segments(typ, rules, outer_tag, contents, max_depth, max_depth, &mut out)?;
            Ok(out)
        }
    }
}

fn gather_segments(
    typ: &'static str,
    rules: EncodingRules,
    outer_tag: Tag,
    contents: &[u8],
    depth: usize,
    limit: usize,
    out: &mut Vec<u8>,
) -> Result<()> {
    ensure!(depth > 0, super::RecursionSnafu { limit });
    let mut offset = 0;
    let mut segments: Vec<(usize, bool)> = Vec::new();
    while offset < contents.len() {
        let (segment, read) = decode::decode_element_at(rules, contents, offset, depth)
            .context(super::NestedSnafu { typ })?;
        offset += read;
        ensure!(
            segment.tag() == outer_tag || segment.tag() == Tag::OCTET_STRING,
            UnexpectedTagSnafu {
                typ,
                got: segment.tag(),
            }
        );
        match segment.construction() {
            Construction::Primitive => {
                segments.push((segment.value().len(), true));
                out.extend_from_slice(segment.value());
            }
            Construction::Constructed => {
                // nested segmentation is a BER liberty
                segments.push((segment.value().len(), false));
                gather_segments(typ, rules, outer_tag, segment.value(), depth - 1, limit, out)?;
            }
        }
    }
    if let Some(limit) = rules.max_primitive_string_length() {
        // all segments but the last must be full
        for (index, &(len, primitive)) in segments.iter().enumerate() {
            ensure!(
                primitive,
                ValueInvalidSnafu {
                    typ,
                    reason: "segments must be primitive",
                }
            );
            let full = len == limit;
            let last = index + 1 == segments.len();
            ensure!(
                full || last,
                ValueInvalidSnafu {
                    typ,
                    reason: "every segment but the last must hold 1000 octets",
                }
            );
            ensure!(
                len <= limit,
                ValueInvalidSnafu {
                    typ,
                    reason: "segment above the segmentation threshold",
                }
            );
        }
    }
    Ok(())
}

/// Serialize string contents, segmenting into primitive OCTET STRING
/// chunks when the rules demand it. Returns the construction and the
/// contents octets of the resulting element.
pub(crate) fn segment_string_octets(
    rules: EncodingRules,
    octets: &[u8],
) -> (Construction, Vec<u8>) {
    match rules.max_primitive_string_length() {
        Some(limit) if octets.len() > limit => {
            debug!(
                len = octets.len(),
                limit, "segmenting string contents into primitive chunks"
            );
            let mut out = Vec::with_capacity(octets.len() + (octets.len() / limit + 1) * 4);
            for chunk in octets.chunks(limit) {
                let segment =
                    Element::from_parts(rules, Tag::OCTET_STRING, Construction::Primitive, chunk);
                encode::encode_element(rules, &segment, &mut out);
            }
            (Construction::Constructed, out)
        }
        _ => (Construction::Primitive, octets.to_vec()),
    }
}

pub(crate) fn decode_octet_string(
    rules: EncodingRules,
    outer_tag: Tag,
    construction: Construction,
    contents: &[u8],
    max_depth: usize,
) -> Result<Vec<u8>> {
    gather_string_octets(
        "OCTET STRING",
        rules,
        outer_tag,
        construction,
        contents,
        max_depth,
    )
}

impl Element {
    /// Read the contents as an OCTET STRING, reassembling segments when
    /// the element is in the constructed form and the rules allow it.
    pub fn to_octet_string(&self) -> Result<Vec<u8>> {
        decode_octet_string(
            self.rules(),
            self.tag(),
            self.construction(),
            self.value(),
            self.max_depth(),
        )
    }

    /// Replace the contents with an OCTET STRING value, segmenting at
    /// 1000 octets under CER.
    pub fn set_octet_string(&mut self, octets: &[u8]) {
        let (construction, contents) = segment_string_octets(self.rules(), octets);
        self.replace(construction, contents);
    }
}
