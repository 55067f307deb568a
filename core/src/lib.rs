#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features
)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core X.690 library, containing the data types shared by every
//! encoding rule variant: the element tag model, the length field, object
//! identifiers, the context-switching composite values (EXTERNAL,
//! EMBEDDED PDV, CHARACTER STRING) and the rule-variant selector.
//!
//! Nothing in this crate reads or writes encoded octets. The framing engine
//! and the typed codecs live in the `x690-encoding` crate, which builds on
//! these types.

pub mod embedded;
pub mod external;
pub mod header;
pub mod identification;
pub mod oid;
pub mod rules;

pub use embedded::{CharacterString, EmbeddedPdv};
pub use external::{External, ExternalEncoding};
pub use header::{Construction, ElementHeader, Header, Length, Tag, TagClass};
pub use identification::Identification;
pub use oid::{Oid, RelativeOid};
pub use rules::EncodingRules;

/// The abstract value of a `BIT STRING`: an ordered sequence of bits,
/// most significant bit first within each octet, as they appear on the wire.
pub type BitString = bitvec::vec::BitVec<u8, bitvec::order::Msb0>;
