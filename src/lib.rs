// visa-io/src/lib.rs
//
// Copyright (c) 2026, Frank Pagliughi
//
// Licensed under the MIT license:
//   <LICENSE or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according
// to those terms.
//
//!
//! The Rust VISA crate.
//!
//! This is a Rust wrapper for a _VISA_ library, the Virtual Instrument
//! Software Architecture used to talk to test and measurement instruments
//! over GPIB, USB, serial, and network buses. The native library is loaded
//! at run time; see [`visa_sys::library()`].
//!
//! Sessions are opened through a [`ResourceManager`], which can also search
//! for the instruments that are attached to the system:
//!
//! ```no_run
//! use visa_io::ResourceManager;
//!
//! let rm = ResourceManager::new()?;
//! for name in rm.find_resource("?*INSTR")? {
//!     let res = rm.open(&name)?;
//!     res.write(b"*IDN?\n")?;
//!     println!("{}: {}", name, String::from_utf8_lossy(&res.read_to_end()?));
//! }
//! # Ok::<(), visa_io::Error>(())
//! ```
//!
//! Every call into the library returns a status code. Errors are turned
//! into an [`Error`] that carries the code along with its name and
//! description from the VISA specification.
//!

// Lints
// This may be overkill.
#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

#[macro_use]
extern crate lazy_static;

use visa_sys::{self as ffi};

pub use visa_sys::{ViSession, ViStatus};

pub use crate::driver::*;
pub use crate::errors::*;
pub use crate::resource::*;
pub use crate::resource_manager::*;
pub use crate::status::{check, describe, is_success, Completion};

pub mod driver;
pub mod errors;
pub mod resource;
pub mod resource_manager;
pub mod status;

#[cfg(test)]
mod mock;

// --------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi;

    // Without an installed library, opening a manager should fail cleanly.
    #[test]
    fn missing_library_is_an_error() {
        if ffi::library().is_ok() {
            return;
        }
        match ResourceManager::new() {
            Err(Error::Library(msg)) => assert!(msg.contains(&ffi::library_name())),
            other => panic!("unexpected: {:?}", other.map(|rm| rm.session())),
        }
    }
}
