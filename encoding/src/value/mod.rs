//! This module contains the typed codecs: the translation between
//! contents octets and abstract values for every UNIVERSAL type, exposed
//! as accessor pairs on [`Element`](crate::element::Element).
//!
//! Every getter validates three things before producing a value: that the
//! element's construction is one the type permits, that the contents
//! length is within the type's bounds, and that the contents octets
//! satisfy the type's invariants under the element's rule variant. Every
//! setter serializes into the canonical form for that variant.

use snafu::{ensure, Backtrace, Snafu};
use x690_core::{Construction, Tag};

pub mod bit_string;
pub mod boolean;
pub mod embedded;
pub mod integer;
pub mod octets;
pub mod oid;
pub mod real;
pub mod strings;
pub mod structured;
pub mod time;

/// Module-level error type:
/// for errors which may occur while reading or writing typed values.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The element's construction is not one the type permits.
    #[snafu(display("{} must be {}, but the element is {}", typ, expected, got))]
    WrongConstruction {
        /// The type being accessed.
        typ: &'static str,
        /// The construction the type requires.
        expected: Construction,
        /// The element's actual construction.
        got: Construction,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The contents length is outside the permitted range for the type.
    #[snafu(display("invalid contents length {} for {}", got, typ))]
    ValueSize {
        /// The type being accessed.
        typ: &'static str,
        /// The actual contents length.
        got: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The contents octets violate an invariant of the type.
    #[snafu(display("invalid {} contents: {}", typ, reason))]
    ValueInvalid {
        /// The type being accessed.
        typ: &'static str,
        /// What was violated.
        reason: &'static str,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The contents carry a non-minimal encoding where the active rules
    /// demand the canonical form.
    #[snafu(display("non-canonical padding in {} contents at position {}", typ, position))]
    ValuePadding {
        /// The type being accessed.
        typ: &'static str,
        /// The position of the redundant material within the contents.
        position: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The decoded value does not fit the requested target type.
    #[snafu(display("{} value does not fit the requested target width", typ))]
    ValueOverflow {
        /// The type being accessed.
        typ: &'static str,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A character or code unit violates the type's repertoire.
    #[snafu(display("forbidden character in {}", typ))]
    ValueCharacters {
        /// The type being accessed.
        typ: &'static str,
        /// The underlying repertoire error.
        #[snafu(backtrace)]
        source: crate::text::Error,
    },
    /// A component element carries an unexpected tag.
    #[snafu(display("unexpected tag {} in {}", got, typ))]
    UnexpectedTag {
        /// The composite type being accessed.
        typ: &'static str,
        /// The tag encountered.
        got: Tag,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// Nesting exceeded the depth limit while reassembling segments.
    #[snafu(display("segment nesting exceeded the depth limit of {}", limit))]
    Recursion {
        /// The depth limit in effect.
        limit: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A nested element could not be framed.
    #[snafu(display("could not frame a nested element within {}", typ))]
    Nested {
        /// The composite type being accessed.
        typ: &'static str,
        /// The underlying framing error.
        #[snafu(backtrace)]
        source: crate::decode::Error,
    },
    /// A constructed value was malformed at the object identifier level.
    #[snafu(display("invalid object identifier value"))]
    InvalidOid {
        /// The underlying identifier construction error.
        #[snafu(backtrace)]
        source: x690_core::oid::Error,
    },
}

/// Type alias for a result from this module.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Check that an element accessed as `typ` is primitive.
pub(crate) fn expect_primitive(typ: &'static str, construction: Construction) -> Result<()> {
    ensure!(
        construction == Construction::Primitive,
        WrongConstructionSnafu {
            typ,
            expected: Construction::Primitive,
            got: construction,
        }
    );
    Ok(())
}

/// Check that an element accessed as `typ` is constructed.
pub(crate) fn expect_constructed(typ: &'static str, construction: Construction) -> Result<()> {
    ensure!(
        construction == Construction::Constructed,
        WrongConstructionSnafu {
            typ,
            expected: Construction::Constructed,
            got: construction,
        }
    );
    Ok(())
}
