//! EXTERNAL, EMBEDDED PDV and CHARACTER STRING codecs.
//!
//! All three are SEQUENCE-shaped composites whose identification CHOICE
//! selects how the embedded payload's syntaxes are known. EMBEDDED PDV
//! and CHARACTER STRING frame the CHOICE behind an explicit `[0]`
//! wrapper, with alternatives tagged `[0]` through `[5]`; EXTERNAL keeps
//! its 1990 SEQUENCE form, in which the identification is flattened into
//! a direct (object identifier) and/or indirect (integer) reference.
//!
//! Under the canonical rule sets the negotiation-dependent alternatives
//! are not encodable: EMBEDDED PDV and CHARACTER STRING silently
//! downgrade them to `fixed`, while EXTERNAL demands a direct reference.

use snafu::{ensure, OptionExt};
use tracing::debug;
use x690_core::{
    CharacterString, Construction, EmbeddedPdv, EncodingRules, External, ExternalEncoding,
    Identification, Oid, Tag, TagClass,
};

use super::structured::{decode_children, encode_children};
use super::{
    Result, UnexpectedTagSnafu, ValueInvalidSnafu, ValueSizeSnafu,
};
use crate::element::Element;

/// Decode the identification CHOICE from its context-tagged element.
/// The element carries the inherited depth cap for its own nesting.
fn decode_identification(rules: EncodingRules, elem: &Element) -> Result<Identification> {
    const TYP: &str = "identification";
    ensure!(
        elem.tag().class == TagClass::Context,
        UnexpectedTagSnafu {
            typ: TYP,
            got: elem.tag(),
        }
    );
    match elem.tag().number {
        0 => {
            // syntaxes SEQUENCE { abstract [0], transfer [1] }
            let children = decode_children(
                TYP,
                rules,
                elem.construction(),
                elem.value(),
                elem.max_depth(),
            )?;
            ensure!(
                children.len() == 2,
                ValueSizeSnafu {
                    typ: TYP,
                    got: children.len(),
                }
            );
            let abstract_syntax = expect_context_oid(&children[0], 0)?;
            let transfer_syntax = expect_context_oid(&children[1], 1)?;
            Ok(Identification::Syntaxes {
                abstract_syntax,
                transfer_syntax,
            })
        }
        1 => Ok(Identification::Syntax(super::oid::decode_oid(
            elem.construction(),
            elem.value(),
        )?)),
        2 => Ok(Identification::PresentationContextId(
            super::integer::decode_int(TYP, rules, elem.construction(), elem.value())?,
        )),
        3 => {
            // context-negotiation SEQUENCE { presentation-context-id [0],
            // transfer-syntax [1] }
            let children = decode_children(
                TYP,
                rules,
                elem.construction(),
                elem.value(),
                elem.max_depth(),
            )?;
            ensure!(
                children.len() == 2,
                ValueSizeSnafu {
                    typ: TYP,
                    got: children.len(),
                }
            );
            ensure!(
                children[0].tag() == Tag::context(0),
                UnexpectedTagSnafu {
                    typ: TYP,
                    got: children[0].tag(),
                }
            );
            let presentation_context_id = super::integer::decode_int(
                TYP,
                rules,
                children[0].construction(),
                children[0].value(),
            )?;
            let transfer_syntax = expect_context_oid(&children[1], 1)?;
            Ok(Identification::ContextNegotiation {
                presentation_context_id,
                transfer_syntax,
            })
        }
        4 => Ok(Identification::TransferSyntax(super::oid::decode_oid(
            elem.construction(),
            elem.value(),
        )?)),
        5 => {
            super::boolean::decode_null(elem.construction(), elem.value())?;
            Ok(Identification::Fixed)
        }
        _ => UnexpectedTagSnafu {
            typ: TYP,
            got: elem.tag(),
        }
        .fail(),
    }
}

fn expect_context_oid(elem: &Element, number: u64) -> Result<Oid> {
    ensure!(
        elem.tag() == Tag::context(number),
        UnexpectedTagSnafu {
            typ: "identification",
            got: elem.tag(),
        }
    );
    super::oid::decode_oid(elem.construction(), elem.value())
}

/// Build the context-tagged element for an identification CHOICE,
/// downgrading the negotiation-dependent alternatives under the
/// canonical rule sets.
fn encode_identification(rules: EncodingRules, id: &Identification) -> Result<Element> {
    let id = if rules.is_canonical() {
        let canonical = id.canonicalized();
        if canonical != *id {
            debug!(
                rules = %rules,
                "downgrading a negotiation-dependent identification to fixed"
            );
        }
        canonical
    } else {
        id.clone()
    };

    let elem = match id {
        Identification::Syntaxes {
            abstract_syntax,
            transfer_syntax,
        } => {
            let mut abstract_elem = Element::new(rules, Tag::context(0));
            abstract_elem.set_oid(&abstract_syntax)?;
            let mut transfer_elem = Element::new(rules, Tag::context(1));
            transfer_elem.set_oid(&transfer_syntax)?;
            let mut wrapper =
                Element::with_construction(rules, Tag::context(0), Construction::Constructed);
            wrapper.set_value_owned(encode_children(rules, &[abstract_elem, transfer_elem]));
            wrapper
        }
        Identification::Syntax(oid) => {
            let mut elem = Element::new(rules, Tag::context(1));
            elem.set_oid(&oid)?;
            elem
        }
        Identification::PresentationContextId(id) => {
            let mut elem = Element::new(rules, Tag::context(2));
            elem.set_int(id);
            elem
        }
        Identification::ContextNegotiation {
            presentation_context_id,
            transfer_syntax,
        } => {
            let mut id_elem = Element::new(rules, Tag::context(0));
            id_elem.set_int(presentation_context_id);
            let mut transfer_elem = Element::new(rules, Tag::context(1));
            transfer_elem.set_oid(&transfer_syntax)?;
            let mut wrapper =
                Element::with_construction(rules, Tag::context(3), Construction::Constructed);
            wrapper.set_value_owned(encode_children(rules, &[id_elem, transfer_elem]));
            wrapper
        }
        Identification::TransferSyntax(oid) => {
            let mut elem = Element::new(rules, Tag::context(4));
            elem.set_oid(&oid)?;
            elem
        }
        Identification::Fixed => Element::new(rules, Tag::context(5)),
    };
    Ok(elem)
}

/// Decode the two-component shape shared by EMBEDDED PDV and
/// CHARACTER STRING: `[0] identification` (explicit) and `[2]` payload.
fn decode_pdv_shape(
    typ: &'static str,
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
    max_depth: usize,
) -> Result<(Identification, Vec<u8>)> {
    let children = decode_children(typ, rules, construction, contents, max_depth)?;
    ensure!(
        children.len() == 2,
        ValueSizeSnafu {
            typ,
            got: children.len(),
        }
    );

    // [0] is an explicit wrapper around the CHOICE element
    ensure!(
        children[0].tag() == Tag::context(0)
            && children[0].construction() == Construction::Constructed,
        UnexpectedTagSnafu {
            typ,
            got: children[0].tag(),
        }
    );
    let choice = decode_children(
        typ,
        rules,
        Construction::Constructed,
        children[0].value(),
        max_depth,
    )?;
    ensure!(
        choice.len() == 1,
        ValueSizeSnafu {
            typ,
            got: choice.len(),
        }
    );
    let identification = decode_identification(rules, &choice[0])?;

    ensure!(
        children[1].tag() == Tag::context(2),
        UnexpectedTagSnafu {
            typ,
            got: children[1].tag(),
        }
    );
    let payload = super::octets::gather_string_octets(
        typ,
        rules,
        Tag::context(2),
        children[1].construction(),
        children[1].value(),
        max_depth,
    )?;
    Ok((identification, payload))
}

/// Serialize the shared two-component shape into contents octets.
fn encode_pdv_shape(
    rules: EncodingRules,
    identification: &Identification,
    payload: &[u8],
) -> Result<Vec<u8>> {
    let choice = encode_identification(rules, identification)?;
    let mut wrapper =
        Element::with_construction(rules, Tag::context(0), Construction::Constructed);
    wrapper.set_value_owned(encode_children(rules, &[choice]));

    let (construction, contents) = super::octets::segment_string_octets(rules, payload);
    let mut value_elem = Element::with_construction(rules, Tag::context(2), construction);
    value_elem.set_value_owned(contents);

    Ok(encode_children(rules, &[wrapper, value_elem]))
}

pub(crate) fn decode_embedded_pdv(
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
    max_depth: usize,
) -> Result<EmbeddedPdv> {
    let (identification, data_value) =
        decode_pdv_shape("EMBEDDED PDV", rules, construction, contents, max_depth)?;
    Ok(EmbeddedPdv {
        identification,
        data_value,
    })
}

pub(crate) fn decode_character_string(
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
    max_depth: usize,
) -> Result<CharacterString> {
    let (identification, string_value) =
        decode_pdv_shape("CHARACTER STRING", rules, construction, contents, max_depth)?;
    Ok(CharacterString {
        identification,
        string_value,
    })
}

pub(crate) fn decode_external(
    rules: EncodingRules,
    construction: Construction,
    contents: &[u8],
    max_depth: usize,
) -> Result<External> {
    const TYP: &str = "EXTERNAL";
    let children = decode_children(TYP, rules, construction, contents, max_depth)?;
    ensure!(
        (2..=4).contains(&children.len()),
        ValueSizeSnafu {
            typ: TYP,
            got: children.len(),
        }
    );

    let mut direct_reference = None;
    let mut indirect_reference = None;
    let mut data_value_descriptor = None;
    let mut encoding = None;

    for child in &children {
        match (child.tag().class, child.tag().number) {
            (TagClass::Universal, 6) if direct_reference.is_none() && encoding.is_none() => {
                direct_reference = Some(child.to_oid()?);
            }
            (TagClass::Universal, 2) if indirect_reference.is_none() && encoding.is_none() => {
                indirect_reference = Some(child.to_int::<i64>()?);
            }
            (TagClass::Universal, 7) if data_value_descriptor.is_none() && encoding.is_none() => {
                data_value_descriptor = Some(child.to_object_descriptor()?);
            }
            (TagClass::Context, 0) if encoding.is_none() => {
                // single-ASN1-type is explicit: the wrapper holds one
                // complete element encoding, carried verbatim
                ensure!(
                    child.construction() == Construction::Constructed,
                    UnexpectedTagSnafu {
                        typ: TYP,
                        got: child.tag(),
                    }
                );
                encoding = Some(ExternalEncoding::SingleAsn1Type(child.value().to_vec()));
            }
            (TagClass::Context, 1) if encoding.is_none() => {
                encoding = Some(ExternalEncoding::OctetAligned(
                    super::octets::gather_string_octets(
                        TYP,
                        rules,
                        Tag::context(1),
                        child.construction(),
                        child.value(),
                        max_depth,
                    )?,
                ));
            }
            (TagClass::Context, 2) if encoding.is_none() => {
                encoding = Some(ExternalEncoding::Arbitrary(
                    super::bit_string::decode_bit_string(
                        rules,
                        child.construction(),
                        child.value(),
                        max_depth,
                    )?,
                ));
            }
            _ => {
                return UnexpectedTagSnafu {
                    typ: TYP,
                    got: child.tag(),
                }
                .fail()
            }
        }
    }

    let encoding = encoding.context(ValueInvalidSnafu {
        typ: TYP,
        reason: "missing the encoding component",
    })?;
    let identification = match (direct_reference, indirect_reference) {
        (Some(direct), Some(indirect)) => Identification::ContextNegotiation {
            presentation_context_id: indirect,
            transfer_syntax: direct,
        },
        (Some(direct), None) => Identification::Syntax(direct),
        (None, Some(indirect)) => Identification::PresentationContextId(indirect),
        (None, None) => {
            return ValueInvalidSnafu {
                typ: TYP,
                reason: "at least one of the direct and indirect references is required",
            }
            .fail()
        }
    };

    Ok(External {
        identification,
        data_value_descriptor,
        encoding,
    })
}

pub(crate) fn encode_external(rules: EncodingRules, external: &External) -> Result<Vec<u8>> {
    const TYP: &str = "EXTERNAL";

    // flatten the identification onto the 1990 reference fields
    let (direct, indirect) = match &external.identification {
        Identification::Syntax(oid) => (Some(oid.clone()), None),
        Identification::PresentationContextId(id) => (None, Some(*id)),
        Identification::ContextNegotiation {
            presentation_context_id,
            transfer_syntax,
        } => (Some(transfer_syntax.clone()), Some(*presentation_context_id)),
        Identification::Syntaxes { .. }
        | Identification::TransferSyntax(_)
        | Identification::Fixed => {
            return ValueInvalidSnafu {
                typ: TYP,
                reason: "identification has no pre-1994 reference form",
            }
            .fail()
        }
    };
    if rules.is_canonical() {
        ensure!(
            direct.is_some(),
            ValueInvalidSnafu {
                typ: TYP,
                reason: "canonical encodings require a direct reference",
            }
        );
        ensure!(
            indirect.is_none(),
            ValueInvalidSnafu {
                typ: TYP,
                reason: "canonical encodings carry the syntax alternative only",
            }
        );
    }

    let mut children = Vec::new();
    if let Some(oid) = direct {
        let mut elem = Element::new(rules, Tag::OBJECT_IDENTIFIER);
        elem.set_oid(&oid)?;
        children.push(elem);
    }
    if let Some(id) = indirect {
        let mut elem = Element::new(rules, Tag::INTEGER);
        elem.set_int(id);
        children.push(elem);
    }
    if let Some(descriptor) = &external.data_value_descriptor {
        let mut elem = Element::new(rules, Tag::OBJECT_DESCRIPTOR);
        elem.set_object_descriptor(descriptor)?;
        children.push(elem);
    }

    let encoding_elem = match &external.encoding {
        ExternalEncoding::SingleAsn1Type(encoded) => {
            let mut elem =
                Element::with_construction(rules, Tag::context(0), Construction::Constructed);
            elem.set_value(encoded);
            elem
        }
        ExternalEncoding::OctetAligned(octets) => {
            let (construction, contents) = super::octets::segment_string_octets(rules, octets);
            let mut elem = Element::with_construction(rules, Tag::context(1), construction);
            elem.set_value_owned(contents);
            elem
        }
        ExternalEncoding::Arbitrary(bits) => {
            let (construction, contents) = super::bit_string::encode_bit_string(rules, bits);
            let mut elem = Element::with_construction(rules, Tag::context(2), construction);
            elem.set_value_owned(contents);
            elem
        }
    };
    children.push(encoding_elem);

    Ok(encode_children(rules, &children))
}

impl Element {
    /// Read the contents as an EMBEDDED PDV value.
    pub fn to_embedded_pdv(&self) -> Result<EmbeddedPdv> {
        decode_embedded_pdv(
            self.rules(),
            self.construction(),
            self.value(),
            self.max_depth(),
        )
    }

    /// Replace the contents with an EMBEDDED PDV value, marking this
    /// element constructed.
    ///
    /// Under CER and DER the negotiation-dependent identification
    /// alternatives are downgraded to `fixed`.
    pub fn set_embedded_pdv(&mut self, value: &EmbeddedPdv) -> Result<()> {
        let contents = encode_pdv_shape(self.rules(), &value.identification, &value.data_value)?;
        self.replace(Construction::Constructed, contents);
        Ok(())
    }

    /// Read the contents as a CHARACTER STRING value.
    pub fn to_character_string(&self) -> Result<CharacterString> {
        decode_character_string(
            self.rules(),
            self.construction(),
            self.value(),
            self.max_depth(),
        )
    }

    /// Replace the contents with a CHARACTER STRING value, marking this
    /// element constructed.
    ///
    /// Under CER and DER the negotiation-dependent identification
    /// alternatives are downgraded to `fixed`.
    pub fn set_character_string(&mut self, value: &CharacterString) -> Result<()> {
        let contents =
            encode_pdv_shape(self.rules(), &value.identification, &value.string_value)?;
        self.replace(Construction::Constructed, contents);
        Ok(())
    }

    /// Read the contents as an EXTERNAL value in its 1990 SEQUENCE form.
    pub fn to_external(&self) -> Result<External> {
        decode_external(
            self.rules(),
            self.construction(),
            self.value(),
            self.max_depth(),
        )
    }

    /// Replace the contents with an EXTERNAL value, marking this element
    /// constructed.
    ///
    /// Fails when the identification cannot be expressed through the
    /// pre-1994 reference fields; the canonical rule sets additionally
    /// require the `syntax` alternative.
    pub fn set_external(&mut self, value: &External) -> Result<()> {
        let contents = encode_external(self.rules(), value)?;
        self.replace(Construction::Constructed, contents);
        Ok(())
    }
}
