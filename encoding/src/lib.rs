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

//! Encoding and decoding of ASN.1 element trees under the three X.690
//! transfer syntaxes: the Basic, Canonical and Distinguished Encoding
//! Rules.
//!
//! The crate is organized around the dynamic [`Element`] model: one
//! tag-length-value node owning its contents octets. The [`decode`]
//! module reads elements out of encoded input, the [`encode`] module
//! serializes them back, and the typed accessors in [`value`] translate
//! between contents octets and abstract values for every UNIVERSAL type.
//!
//! Each transfer syntax has its own decoder and encoder type, so the
//! strictness profile in effect is fixed at the call site:
//!
//! ```
//! use x690_encoding::decode::{Decode, BerDecoder, DerDecoder};
//!
//! // BOOLEAN TRUE in its canonical form
//! let data = [0x01, 0x01, 0xFF];
//! let (elem, read) = DerDecoder::new().decode_one(&data).unwrap();
//! assert_eq!(read, 3);
//! assert!(elem.to_bool().unwrap());
//!
//! // a sloppy BER truth value is accepted by BER alone
//! let sloppy = [0x01, 0x01, 0x01];
//! let (elem, _) = BerDecoder::new().decode_one(&sloppy).unwrap();
//! assert!(elem.to_bool().unwrap());
//! assert!(DerDecoder::new()
//!     .decode_one(&sloppy)
//!     .unwrap()
//!     .0
//!     .to_bool()
//!     .is_err());
//! ```

pub mod decode;
pub mod element;
pub mod encode;
pub mod text;
pub mod value;

pub use decode::{BerDecoder, CerDecoder, Decode, DerDecoder};
pub use element::Element;
pub use encode::{BerEncoder, CerEncoder, DerEncoder, Encode};
pub use x690_core::{
    BitString, CharacterString, Construction, ElementHeader, EmbeddedPdv, EncodingRules,
    External, ExternalEncoding, Header, Identification, Length, Oid, RelativeOid, Tag,
    TagClass,
};
