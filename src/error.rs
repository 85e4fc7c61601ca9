//! Error handling for the pagehuff library
//!
//! Every fallible operation returns [`Result`], whose error side is
//! [`HuffError`]. Decoding is a pure function of its input, so apart from I/O
//! none of these errors is worth retrying.

use thiserror::Error;

/// Main error type for the pagehuff library
#[derive(Error, Debug)]
pub enum HuffError {
    /// I/O related errors (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed length table, colliding codes or an unusable source
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message describing the issue
        message: String,
    },

    /// A bit address mapped to a byte outside the buffer
    #[error("Buffer underrun: bit {bit} maps to byte {byte}, buffer has {len} bytes")]
    BufferUnderrun {
        /// Logical bit position being read
        bit: usize,
        /// Physical byte address after pairing translation
        byte: usize,
        /// Buffer length in bytes
        len: usize,
    },

    /// Tree traversal reached a node without the child selected by the stream
    #[error("Malformed stream: {message}")]
    MalformedStream {
        /// Error message describing where decoding stopped
        message: String,
    },

    /// Index out of bounds access
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl HuffError {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    /// Create a buffer underrun error
    pub fn buffer_underrun(bit: usize, byte: usize, len: usize) -> Self {
        Self::BufferUnderrun { bit, byte, len }
    }

    /// Create a malformed stream error
    pub fn malformed_stream<S: Into<String>>(message: S) -> Self {
        Self::MalformedStream { message: message.into() }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::InvalidInput { .. } => false,
            Self::BufferUnderrun { .. } => false,
            Self::MalformedStream { .. } => false,
            Self::OutOfBounds { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidInput { .. } => "input",
            Self::BufferUnderrun { .. } => "underrun",
            Self::MalformedStream { .. } => "stream",
            Self::OutOfBounds { .. } => "bounds",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HuffError>;

/// Assert that a range is well formed and ends within `size`
#[inline]
pub fn check_range(start: usize, end: usize, size: usize) -> Result<()> {
    if start > end {
        return Err(HuffError::invalid_input(format!(
            "Invalid range: start {} > end {}",
            start, end
        )));
    }
    if end > size {
        return Err(HuffError::out_of_bounds(end, size));
    }
    Ok(())
}
