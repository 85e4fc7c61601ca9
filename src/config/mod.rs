//! Configuration APIs for pagehuff
//!
//! Compressed pages in the wild disagree on bit-level conventions, so the
//! convention a decoder uses is configuration rather than code. This module
//! holds the configuration types and the [`Config`] trait they share.
//!
//! # Configuration Traits
//!
//! The [`Config`] trait provides validation, environment initialization and
//! JSON file persistence for every configuration type.
//!
//! # Core Configuration Types
//!
//! - [`BitStreamConfig`]: bit order and byte pairing used to address compressed buffers
//!
//! # Environment Initialization
//!
//! ```rust
//! use pagehuff::config::{BitStreamConfig, Config};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads PAGEHUFF_BIT_ORDER and PAGEHUFF_BYTE_PAIRING
//! let config = BitStreamConfig::from_env()?;
//!
//! // Or with a custom prefix: MYAPP_BIT_ORDER, MYAPP_BYTE_PAIRING
//! let config = BitStreamConfig::from_env_with_prefix("MYAPP_")?;
//! # Ok(())
//! # }
//! ```

use crate::error::{HuffError, Result};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub mod bit_stream;


pub use bit_stream::BitStreamConfig;

/// Default prefix for environment variables
pub const ENV_PREFIX: &str = "PAGEHUFF_";

/// Common configuration trait providing validation, environment initialization
/// and file persistence.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables.
    ///
    /// Variables use the format `PAGEHUFF_{FIELD}`, for example
    /// `PAGEHUFF_BIT_ORDER=lsb`. Unset variables keep their default value.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Parse an environment variable, falling back to `default` when it is unset.
///
/// A variable that is set but does not parse is a configuration error.
pub fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(var_name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| {
            HuffError::configuration(format!("{}='{}': {}", var_name, raw, e))
        }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(env::VarError::NotUnicode(_)) => Err(HuffError::configuration(format!(
            "{} is not valid unicode",
            var_name
        ))),
    }
}
