//! The identification CHOICE shared by the context-switching types
//! EXTERNAL, EMBEDDED PDV and CHARACTER STRING.

use crate::oid::Oid;

/// The means by which the abstract and transfer syntaxes of an embedded
/// data value are identified. Exactly one alternative is in effect at a
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identification {
    /// Both the abstract and the transfer syntax are named by object
    /// identifiers.
    Syntaxes {
        /// The abstract syntax of the data value.
        abstract_syntax: Oid,
        /// The transfer syntax used to encode the data value.
        transfer_syntax: Oid,
    },
    /// A single object identifier names both syntaxes at once.
    Syntax(Oid),
    /// The syntaxes were negotiated out of band and are referred to by an
    /// OSI presentation context identifier.
    PresentationContextId(i64),
    /// A presentation context is being negotiated; the transfer syntax is
    /// already fixed.
    ContextNegotiation {
        /// The presentation context identifier under negotiation.
        presentation_context_id: i64,
        /// The transfer syntax used to encode the data value.
        transfer_syntax: Oid,
    },
    /// Only the transfer syntax is named; the abstract syntax is known
    /// from context.
    TransferSyntax(Oid),
    /// The data value is the value of a fixed ASN.1 type known to both
    /// parties.
    Fixed,
}

impl Identification {
    /// The form this identification takes under the canonical rule sets.
    ///
    /// CER and DER forbid the alternatives that depend on an OSI
    /// presentation layer negotiation; those collapse to `Fixed`.
    pub fn canonicalized(&self) -> Identification {
        match self {
            Identification::PresentationContextId(_)
            | Identification::ContextNegotiation { .. } => Identification::Fixed,
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_downgrade() {
        let oid: Oid = "1.3.6.4.1".parse().unwrap();

        assert_eq!(
            Identification::PresentationContextId(9).canonicalized(),
            Identification::Fixed
        );
        assert_eq!(
            Identification::ContextNegotiation {
                presentation_context_id: 9,
                transfer_syntax: oid.clone(),
            }
            .canonicalized(),
            Identification::Fixed
        );
        // the syntax-bearing alternatives survive unchanged
        assert_eq!(
            Identification::Syntax(oid.clone()).canonicalized(),
            Identification::Syntax(oid)
        );
        assert_eq!(Identification::Fixed.canonicalized(), Identification::Fixed);
    }
}
