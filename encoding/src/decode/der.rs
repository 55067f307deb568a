//! Distinguished Encoding Rules decoder.

use x690_core::EncodingRules;

use super::{Decode, DEFAULT_MAX_DEPTH};

/// A decoder for the Distinguished Encoding Rules: definite lengths only,
/// in their shortest form, and no constructed string encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerDecoder {
    max_depth: usize,
}

impl DerDecoder {
    /// Create a decoder with the default nesting limit.
    pub fn new() -> DerDecoder {
        DerDecoder {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a decoder with a custom cap on nesting depth.
    pub fn with_max_depth(max_depth: usize) -> DerDecoder {
        DerDecoder { max_depth }
    }
}

impl Default for DerDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decode for DerDecoder {
    fn rules(&self) -> EncodingRules {
        EncodingRules::Der
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }
}
