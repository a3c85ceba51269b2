//! Error types for mapper construction
//!
//! Only construction can fail; queries against a built mapper are total.

use std::fmt;

/// Error type for parsing `#RRGGBB` color keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    /// Key does not start with '#'
    MissingHash,
    /// Wrong number of bytes after the '#' (must be exactly 6)
    InvalidLength(usize),
    /// A character after the '#' is not a hexadecimal digit
    InvalidHex,
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::MissingHash => {
                write!(f, "color must start with '#'")
            }
            ParseColorError::InvalidLength(len) => {
                write!(f, "expected 6 hex digits after '#', found {} bytes", len)
            }
            ParseColorError::InvalidHex => {
                write!(f, "invalid hex digit")
            }
        }
    }
}

impl std::error::Error for ParseColorError {}

/// Error type for [`ColorMapper`](super::ColorMapper) construction.
///
/// Construction is atomic: when this is returned, no mapper exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapperError {
    /// The mapping had no entries
    EmptyMapping,
    /// A key is not a `#RRGGBB` color
    InvalidColorKey {
        /// The offending key, as given
        key: String,
        /// Why it was rejected
        reason: ParseColorError,
    },
}

impl fmt::Display for MapperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapperError::EmptyMapping => {
                write!(f, "color mapping cannot be empty")
            }
            MapperError::InvalidColorKey { key, reason } => {
                write!(f, "invalid color key {:?}: {}", key, reason)
            }
        }
    }
}

impl std::error::Error for MapperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapperError::InvalidColorKey { reason, .. } => Some(reason),
            MapperError::EmptyMapping => None,
        }
    }
}
