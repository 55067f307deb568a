//! The EXTERNAL composite type, in its pre-1994 form.

use crate::identification::Identification;
use crate::BitString;

/// The encoding alternative chosen for an EXTERNAL data value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalEncoding {
    /// `single-ASN1-type [0]`: the data value is one complete encoded
    /// element, carried verbatim.
    SingleAsn1Type(Vec<u8>),
    /// `octet-aligned [1]`: an octet string.
    OctetAligned(Vec<u8>),
    /// `arbitrary [2]`: a bit string, possibly ending mid-octet.
    Arbitrary(BitString),
}

/// An EXTERNAL value.
///
/// On the wire this uses the 1990 SEQUENCE form, in which the
/// identification appears as a direct reference (an object identifier),
/// an indirect reference (an integer), or both. Only the alternatives of
/// [`Identification`] that can be mapped onto those fields are encodable;
/// the canonical rule sets additionally require a direct reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct External {
    /// How the embedded data value's syntaxes are identified.
    pub identification: Identification,
    /// Human-readable description of the data value.
    pub data_value_descriptor: Option<String>,
    /// The embedded data value itself.
    pub encoding: ExternalEncoding,
}
