//! Basic Encoding Rules encoder.

use x690_core::EncodingRules;

use super::Encode;

/// An encoder producing Basic Encoding Rules output.
///
/// Although BER grants encoders many freedoms, this encoder always emits
/// the shortest definite length form; the permissiveness of BER shows in
/// what the matching decoder accepts, not in what is produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BerEncoder;

impl Encode for BerEncoder {
    fn rules(&self) -> EncodingRules {
        EncodingRules::Ber
    }
}
