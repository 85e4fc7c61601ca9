//! Bit stream addressing configuration.

use super::{parse_env_var, Config};
use crate::entropy::bit_ops::{BitOrder, BytePairing};
use crate::error::{HuffError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How logical bit positions map onto a byte buffer.
///
/// The default (`MsbFirst`, `Identity`) is the layout produced by the generic
/// encoder. Format-compatible decoding selects the convention per data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BitStreamConfig {
    /// Which bit within a byte is read first
    pub bit_order: BitOrder,
    /// Byte address translation applied before bit addressing
    pub byte_pairing: BytePairing,
}

impl BitStreamConfig {
    /// Create a configuration from both policies
    pub const fn new(bit_order: BitOrder, byte_pairing: BytePairing) -> Self {
        Self {
            bit_order,
            byte_pairing,
        }
    }

    /// Every supported combination of policies
    pub fn all() -> [Self; 4] {
        [
            Self::new(BitOrder::MsbFirst, BytePairing::Identity),
            Self::new(BitOrder::MsbFirst, BytePairing::SwapPairs),
            Self::new(BitOrder::LsbFirst, BytePairing::Identity),
            Self::new(BitOrder::LsbFirst, BytePairing::SwapPairs),
        ]
    }

    /// Builder-style setter for the bit order
    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Builder-style setter for the byte pairing
    pub fn with_byte_pairing(mut self, byte_pairing: BytePairing) -> Self {
        self.byte_pairing = byte_pairing;
        self
    }
}

impl Config for BitStreamConfig {
    fn validate(&self) -> Result<()> {
        // Every combination of the two enums is a valid addressing scheme
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.bit_order = parse_env_var(&format!("{}BIT_ORDER", prefix), config.bit_order)?;
        config.byte_pairing =
            parse_env_var(&format!("{}BYTE_PAIRING", prefix), config.byte_pairing)?;
        config.validate()?;
        Ok(config)
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            HuffError::configuration(format!("Failed to serialize bit stream config: {}", e))
        })?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            HuffError::configuration(format!("Failed to parse bit stream config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
