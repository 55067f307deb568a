//! Distinguished Encoding Rules encoder.

use x690_core::EncodingRules;

use super::Encode;

/// An encoder producing Distinguished Encoding Rules output: definite
/// lengths only, always in their shortest form.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DerEncoder;

impl Encode for DerEncoder {
    fn rules(&self) -> EncodingRules {
        EncodingRules::Der
    }
}
