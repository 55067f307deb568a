//! The EMBEDDED PDV and CHARACTER STRING composite types.

use crate::identification::Identification;

/// An EMBEDDED PDV value: a presentation data value from some other
/// abstract/transfer syntax pair, embedded as opaque octets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPdv {
    /// How the embedded data value's syntaxes are identified.
    pub identification: Identification,
    /// The embedded data value, encoded under the identified transfer
    /// syntax.
    pub data_value: Vec<u8>,
}

/// An unrestricted CHARACTER STRING value: characters from some character
/// abstract syntax, carried in an identified character transfer syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterString {
    /// How the character syntaxes are identified.
    pub identification: Identification,
    /// The encoded characters.
    pub string_value: Vec<u8>,
}
