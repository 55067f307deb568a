//! Canonical Encoding Rules encoder.

use x690_core::EncodingRules;

use super::Encode;

/// An encoder producing Canonical Encoding Rules output: a segmented
/// string uses the constructed indefinite form terminated by an
/// end-of-contents marker, and everything else uses the shortest
/// definite form.
///
/// Segmentation of string contents above 1000 octets happens in the typed
/// setters, which produce the constructed element tree this encoder then
/// frames.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CerEncoder;

impl Encode for CerEncoder {
    fn rules(&self) -> EncodingRules {
        EncodingRules::Cer
    }
}
