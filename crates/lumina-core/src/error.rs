//! Error types for lumina-core.
//!
//! The data model itself cannot fail; errors come from interpreting external
//! descriptions such as pixel format layouts.
//!
//! # Usage
//!
//! ```rust
//! use lumina_core::{Error, Result};
//!
//! fn check_planes(planes: usize) -> Result<()> {
//!     if planes > 4 {
//!         return Err(Error::unsupported_format(format!("{planes} planes")));
//!     }
//!     Ok(())
//! }
//! assert!(check_planes(5).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while interpreting color and layout metadata.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel format cannot be expressed as byte-aligned planes.
    ///
    /// Returned for big-endian, bitstream and palette formats as well as
    /// descriptors without any components.
    #[error("unsupported pixel format: {format}")]
    UnsupportedFormat {
        /// Format name or description
        format: String,
    },

    /// Pixel format descriptor is internally inconsistent.
    #[error("invalid pixel format layout: {reason}")]
    InvalidLayout {
        /// What was wrong with it
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an [`Error::InvalidLayout`] error.
    #[inline]
    pub fn invalid_layout(reason: impl Into<String>) -> Self {
        Self::InvalidLayout {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error rejects a whole class of formats.
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }
}
