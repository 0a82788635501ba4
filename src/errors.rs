// visa-io/src/errors.rs
//
// Copyright (c) 2026, Frank Pagliughi
//
// Licensed under the MIT license:
//   <LICENSE or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according
// to those terms.
//
//!
//! Error definitions for the VISA library.

use std::{ffi, fmt};
use thiserror::Error;

use crate::ffi::ViStatus;

/// A failed call into the VISA library.
///
/// This carries the status code returned by the library along with the
/// symbolic name and description of that code from the status catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisaError {
    /// The status code returned by the library
    pub code: ViStatus,
    /// The symbolic name of the status, like `VI_ERROR_TMO`
    pub short_desc: &'static str,
    /// A longer, human-readable description of the status
    pub long_desc: &'static str,
}

impl fmt::Display for VisaError {
    /// Formats as "<short> (<hex>): <long>", with the code in its unsigned,
    /// 32-bit, hexadecimal form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:X}): {}",
            self.short_desc, self.code as u32, self.long_desc
        )
    }
}

impl std::error::Error for VisaError {}

/// The Error type for the VISA library
#[derive(Error, Debug)]
pub enum Error {
    /// A call into the native library returned an error status.
    #[error("{0}")]
    Visa(#[from] VisaError),
    /// The native library returned an error status that isn't in the
    /// status catalog. Signed hex formatting prints the two's complement,
    /// which is the unsigned 32-bit form of the code.
    #[error("Unknown VISA status ({0:X})")]
    UnknownStatus(ViStatus),
    /// The native library could not be loaded.
    #[error("Unable to load the VISA library: {0}")]
    Library(String),
    /// A string passed to the library contained a NUL value.
    #[error("{0}")]
    NulError(#[from] ffi::NulError),
    /// An error converting a value to/from a string representation.
    #[error("String conversion error")]
    StringConversionError,
    /// A resource descriptor from the library filled the whole buffer
    /// without a terminator.
    #[error("Resource descriptor truncated")]
    DescriptorTruncated,
    /// An unbounded read went past the limit set for the resource.
    #[error("Read exceeded the limit of {0} bytes")]
    ReadLimitExceeded(usize),
}

impl Error {
    /// Gets the native status code behind the error, if there is one.
    pub fn status(&self) -> Option<ViStatus> {
        match *self {
            Error::Visa(ref err) => Some(err.code),
            Error::UnknownStatus(code) => Some(code),
            _ => None,
        }
    }
}

/// The default result type for the VISA library
pub type Result<T> = std::result::Result<T, Error>;

// --------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi;

    #[test]
    fn unknown_status_renders_unsigned_hex() {
        let err = Error::UnknownStatus(ffi::_VI_ERROR + 0x1234);
        assert_eq!(err.to_string(), "Unknown VISA status (80001234)");
        assert_eq!(err.status(), Some(ffi::_VI_ERROR + 0x1234));
    }

    #[test]
    fn non_native_errors_have_no_status() {
        assert_eq!(Error::DescriptorTruncated.status(), None);
        assert_eq!(Error::ReadLimitExceeded(16).status(), None);
    }
}
