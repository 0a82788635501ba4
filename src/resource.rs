// visa-io/src/resource.rs
//
// Copyright (c) 2026, Frank Pagliughi
//
// Licensed under the MIT license:
//   <LICENSE or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according
// to those terms.
//
//! VISA instrument resources.
//!
//! A [`Resource`] is an open session to a single instrument. It is obtained
//! from [`ResourceManager::open()`] and does basic message-based I/O.
//!
//! Reads come in two forms. [`Resource::read()`] makes a single native read
//! of, at most, the requested size. [`Resource::read_to_end()`] keeps
//! reading until the device signals the end of the message, either with
//! END or the termination character. Since a misbehaving device might
//! never do that, the unbounded read is capped by a limit that can be set
//! per resource.
//!

use log::{debug, trace, warn};

use crate::driver::{Driver, NativeDriver};
use crate::ffi::{self, ViSession, ViUInt16, ViUInt32};
use crate::status::{self, check, sys_result, Completion};
use crate::{Error, ResourceManager, Result};

/// The size of each native read made by [`Resource::read_to_end()`].
pub const READ_CHUNK_SIZE: usize = 1024;

/// The default cap on the size of an unbounded read (1 MiB).
pub const DEFAULT_READ_LIMIT: usize = 1024 * 1024;

/// An open session to an instrument.
///
/// The session is closed when the resource is dropped, unless it was
/// already closed explicitly with [`Resource::close()`]. The resource
/// keeps its resource manager alive.
#[derive(Debug)]
pub struct Resource<D: Driver = NativeDriver> {
    vi: ViSession,
    open: bool,
    desc: String,
    read_limit: usize,
    rm: ResourceManager<D>,
}

impl<D: Driver> Resource<D> {
    pub(crate) fn new(rm: ResourceManager<D>, vi: ViSession, desc: &str) -> Self {
        Self {
            vi,
            open: true,
            desc: desc.to_string(),
            read_limit: DEFAULT_READ_LIMIT,
            rm,
        }
    }

    fn driver(&self) -> &D {
        self.rm.driver()
    }

    /// Gets the native session handle
    pub fn session(&self) -> ViSession {
        self.vi
    }

    /// Gets the resource descriptor that was used to open the resource.
    pub fn descriptor(&self) -> &str {
        &self.desc
    }

    /// Gets the resource manager that opened this resource.
    pub fn resource_manager(&self) -> &ResourceManager<D> {
        &self.rm
    }

    /// Gets the most data that [`Resource::read_to_end()`] will accumulate.
    pub fn read_limit(&self) -> usize {
        self.read_limit
    }

    /// Sets the most data that [`Resource::read_to_end()`] will accumulate
    /// before giving up with [`Error::ReadLimitExceeded`].
    pub fn set_read_limit(&mut self, limit: usize) {
        self.read_limit = limit;
    }

    /// Writes data to the device.
    ///
    /// Returns the number of bytes actually transferred, as reported by the
    /// library. This can be less than the length of `data`; the rest was
    /// not sent.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        let mut ret_cnt: ViUInt32 = 0;
        let status = self.driver().write(self.vi, data, &mut ret_cnt);
        check(status)?;
        let n = ret_cnt as usize;
        if n < data.len() {
            debug!("Partial write on {}: {} of {} bytes", self.vi, n, data.len());
        }
        Ok(n)
    }

    /// Writes all of the data to the device, continuing after partial
    /// writes.
    pub fn write_all(&self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            if n == 0 {
                return Err(status::error(ffi::VI_ERROR_IO));
            }
            data = &data[n..];
        }
        Ok(())
    }

    /// Makes a single read from the device into the buffer.
    ///
    /// Returns the number of bytes read and how the read completed.
    pub fn read_chunk(&self, buf: &mut [u8]) -> Result<(usize, Completion)> {
        let mut ret_cnt: ViUInt32 = 0;
        let status = check(self.driver().read(self.vi, buf, &mut ret_cnt))?;
        let n = (ret_cnt as usize).min(buf.len());
        trace!("Read {} bytes from {} (status {:X})", n, self.vi, status);
        Ok((n, Completion::from(status)))
    }

    /// Reads, at most, `max_count` bytes from the device with a single
    /// native read.
    ///
    /// Returns exactly what was received, which may be less than the
    /// requested count.
    pub fn read(&self, max_count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; max_count];
        let (n, _) = self.read_chunk(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Reads a complete message from the device.
    ///
    /// This reads in chunks of [`READ_CHUNK_SIZE`] bytes until the library
    /// reports a plain success or that the termination character was read,
    /// and returns everything received. If more than the read limit
    /// accumulates first, this fails with [`Error::ReadLimitExceeded`].
    pub fn read_to_end(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            let (n, completion) = self.read_chunk(&mut chunk)?;
            data.extend_from_slice(&chunk[..n]);

            if data.len() > self.read_limit {
                return Err(Error::ReadLimitExceeded(self.read_limit));
            }
            if completion.is_end() {
                return Ok(data);
            }
        }
    }

    /// Controls the state of the GPIB Remote Enable (REN) line, and
    /// optionally the remote/local state of the device.
    pub fn gpib_control_ren(&self, mode: RenMode) -> Result<()> {
        let status = self.driver().gpib_control_ren(self.vi, mode.into());
        sys_result(status, ())
    }

    /// Returns the device to local control.
    ///
    /// This sends the device the GPIB Go To Local command after addressing
    /// it, leaving the REN line as it was.
    pub fn set_local(&self) -> Result<()> {
        self.gpib_control_ren(RenMode::AddressGtl)
    }

    fn close_session(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        debug!("Closing session {} to '{}'", self.vi, self.desc);
        sys_result(self.driver().close(self.vi), ())
    }

    /// Closes the session to the device.
    ///
    /// This consumes the resource, so the session can't be used or closed
    /// again.
    pub fn close(mut self) -> Result<()> {
        self.close_session()
    }
}

impl<D: Driver> Drop for Resource<D> {
    fn drop(&mut self) {
        if let Err(err) = self.close_session() {
            warn!("Error closing session to '{}': {}", self.desc, err);
        }
    }
}

impl<D: Driver> PartialEq for Resource<D> {
    /// Two resources are the same if they refer to the same session from
    /// the same resource manager.
    fn eq(&self, other: &Self) -> bool {
        self.vi == other.vi && self.rm == other.rm
    }
}

// --------------------------------------------------------------------------

/// Modes for the GPIB Remote Enable line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenMode {
    /// Deassert the REN line.
    Deassert,
    /// Assert the REN line.
    Assert,
    /// Send Go To Local to the device and deassert REN.
    DeassertGtl,
    /// Assert REN and address the device.
    AssertAddress,
    /// Send Local Lockout to all devices.
    AssertLlo,
    /// Address the device and send it Local Lockout.
    AssertAddressLlo,
    /// Send Go To Local to the device.
    AddressGtl,
}

impl From<RenMode> for ViUInt16 {
    fn from(mode: RenMode) -> Self {
        use RenMode::*;
        match mode {
            Deassert => ffi::VI_GPIB_REN_DEASSERT,
            Assert => ffi::VI_GPIB_REN_ASSERT,
            DeassertGtl => ffi::VI_GPIB_REN_DEASSERT_GTL,
            AssertAddress => ffi::VI_GPIB_REN_ASSERT_ADDRESS,
            AssertLlo => ffi::VI_GPIB_REN_ASSERT_LLO,
            AssertAddressLlo => ffi::VI_GPIB_REN_ASSERT_ADDRESS_LLO,
            AddressGtl => ffi::VI_GPIB_REN_ADDRESS_GTL,
        }
    }
}

// --------------------------------------------------------------------------
