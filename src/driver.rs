// visa-io/src/driver.rs
//
// Copyright (c) 2026, Frank Pagliughi
//
// Licensed under the MIT license:
//   <LICENSE or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according
// to those terms.
//
//! The VISA entry points used by the session objects.
//!
//! The [`Driver`] trait is a safe, one-to-one mirror of the native calls.
//! Each method returns the raw status code from the library, leaving the
//! interpretation of it to the caller. Out parameters stay out parameters,
//! but as references and slices rather than raw pointers.
//!
//! [`NativeDriver`] is the implementation that calls into the VISA shared
//! library. The session objects are generic over the driver, defaulting to
//! the native one.

use std::{ffi::CStr, fmt};

use crate::ffi::{
    self, ViAccessMode, ViChar, ViFindList, ViObject, ViSession, ViStatus, ViUInt16, ViUInt32,
};
use crate::{Error, Result};

/// A buffer that receives a resource descriptor from the library.
pub type DescriptorBuf = [ViChar; ffi::VI_FIND_BUFLEN];

/// The native VISA entry points.
pub trait Driver {
    /// `viOpenDefaultRM`: Opens a session to the default resource manager.
    fn open_default_rm(&self, sesn: &mut ViSession) -> ViStatus;

    /// `viOpen`: Opens a session to the resource named by `name`.
    fn open(
        &self,
        sesn: ViSession,
        name: &CStr,
        mode: ViAccessMode,
        timeout: ViUInt32,
        vi: &mut ViSession,
    ) -> ViStatus;

    /// `viParseRsrc`: Gets the interface type and number for a resource.
    fn parse_rsrc(
        &self,
        sesn: ViSession,
        name: &CStr,
        intf_type: &mut ViUInt16,
        intf_num: &mut ViUInt16,
    ) -> ViStatus;

    /// `viFindRsrc`: Starts a search for resources matching an expression.
    ///
    /// On success, `desc` holds the first match, `ret_cnt` the total
    /// number of matches, and `find_list` a handle for the remaining ones.
    fn find_rsrc(
        &self,
        sesn: ViSession,
        expr: &CStr,
        find_list: &mut ViFindList,
        ret_cnt: &mut ViUInt32,
        desc: &mut DescriptorBuf,
    ) -> ViStatus;

    /// `viFindNext`: Gets the next match from a find list.
    fn find_next(&self, find_list: ViFindList, desc: &mut DescriptorBuf) -> ViStatus;

    /// `viClose`: Closes a session or find list.
    fn close(&self, vi: ViObject) -> ViStatus;

    /// `viWrite`: Writes the buffer to the device.
    fn write(&self, vi: ViSession, buf: &[u8], ret_cnt: &mut ViUInt32) -> ViStatus;

    /// `viRead`: Reads up to the length of the buffer from the device.
    fn read(&self, vi: ViSession, buf: &mut [u8], ret_cnt: &mut ViUInt32) -> ViStatus;

    /// `viGpibControlREN`: Controls the GPIB Remote Enable line.
    fn gpib_control_ren(&self, vi: ViSession, mode: ViUInt16) -> ViStatus;
}

// --------------------------------------------------------------------------

impl<D: Driver + ?Sized> Driver for &D {
    fn open_default_rm(&self, sesn: &mut ViSession) -> ViStatus {
        (**self).open_default_rm(sesn)
    }

    fn open(
        &self,
        sesn: ViSession,
        name: &CStr,
        mode: ViAccessMode,
        timeout: ViUInt32,
        vi: &mut ViSession,
    ) -> ViStatus {
        (**self).open(sesn, name, mode, timeout, vi)
    }

    fn parse_rsrc(
        &self,
        sesn: ViSession,
        name: &CStr,
        intf_type: &mut ViUInt16,
        intf_num: &mut ViUInt16,
    ) -> ViStatus {
        (**self).parse_rsrc(sesn, name, intf_type, intf_num)
    }

    fn find_rsrc(
        &self,
        sesn: ViSession,
        expr: &CStr,
        find_list: &mut ViFindList,
        ret_cnt: &mut ViUInt32,
        desc: &mut DescriptorBuf,
    ) -> ViStatus {
        (**self).find_rsrc(sesn, expr, find_list, ret_cnt, desc)
    }

    fn find_next(&self, find_list: ViFindList, desc: &mut DescriptorBuf) -> ViStatus {
        (**self).find_next(find_list, desc)
    }

    fn close(&self, vi: ViObject) -> ViStatus {
        (**self).close(vi)
    }

    fn write(&self, vi: ViSession, buf: &[u8], ret_cnt: &mut ViUInt32) -> ViStatus {
        (**self).write(vi, buf, ret_cnt)
    }

    fn read(&self, vi: ViSession, buf: &mut [u8], ret_cnt: &mut ViUInt32) -> ViStatus {
        (**self).read(vi, buf, ret_cnt)
    }

    fn gpib_control_ren(&self, vi: ViSession, mode: ViUInt16) -> ViStatus {
        (**self).gpib_control_ren(vi, mode)
    }
}

// --------------------------------------------------------------------------

/// Clamps a buffer length to what fits in a single native transfer.
fn xfer_len(len: usize) -> ViUInt32 {
    ViUInt32::try_from(len).unwrap_or(ViUInt32::MAX)
}

/// The driver that calls into the VISA shared library.
#[derive(Clone, Copy)]
pub struct NativeDriver {
    api: &'static ffi::Api,
}

impl NativeDriver {
    /// Gets the driver for the process-wide VISA library, loading the
    /// library if this is the first use.
    pub fn load() -> Result<Self> {
        let lib = ffi::library().map_err(|err| Error::Library(err.to_string()))?;
        Ok(Self { api: lib })
    }
}

impl fmt::Debug for NativeDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeDriver")
            .field("library", &ffi::library_name())
            .finish()
    }
}

impl Driver for NativeDriver {
    fn open_default_rm(&self, sesn: &mut ViSession) -> ViStatus {
        unsafe { self.api.viOpenDefaultRM(sesn) }
    }

    fn open(
        &self,
        sesn: ViSession,
        name: &CStr,
        mode: ViAccessMode,
        timeout: ViUInt32,
        vi: &mut ViSession,
    ) -> ViStatus {
        unsafe { self.api.viOpen(sesn, name.as_ptr(), mode, timeout, vi) }
    }

    fn parse_rsrc(
        &self,
        sesn: ViSession,
        name: &CStr,
        intf_type: &mut ViUInt16,
        intf_num: &mut ViUInt16,
    ) -> ViStatus {
        unsafe { self.api.viParseRsrc(sesn, name.as_ptr(), intf_type, intf_num) }
    }

    fn find_rsrc(
        &self,
        sesn: ViSession,
        expr: &CStr,
        find_list: &mut ViFindList,
        ret_cnt: &mut ViUInt32,
        desc: &mut DescriptorBuf,
    ) -> ViStatus {
        unsafe {
            self.api
                .viFindRsrc(sesn, expr.as_ptr(), find_list, ret_cnt, desc.as_mut_ptr())
        }
    }

    fn find_next(&self, find_list: ViFindList, desc: &mut DescriptorBuf) -> ViStatus {
        unsafe { self.api.viFindNext(find_list, desc.as_mut_ptr()) }
    }

    fn close(&self, vi: ViObject) -> ViStatus {
        unsafe { self.api.viClose(vi) }
    }

    fn write(&self, vi: ViSession, buf: &[u8], ret_cnt: &mut ViUInt32) -> ViStatus {
        unsafe { self.api.viWrite(vi, buf.as_ptr(), xfer_len(buf.len()), ret_cnt) }
    }

    fn read(&self, vi: ViSession, buf: &mut [u8], ret_cnt: &mut ViUInt32) -> ViStatus {
        unsafe {
            self.api
                .viRead(vi, buf.as_mut_ptr(), xfer_len(buf.len()), ret_cnt)
        }
    }

    fn gpib_control_ren(&self, vi: ViSession, mode: ViUInt16) -> ViStatus {
        unsafe { self.api.viGpibControlREN(vi, mode) }
    }
}

// --------------------------------------------------------------------------

/// Converts a descriptor filled in by the library into a string.
///
/// The library writes a NUL-terminated string into the fixed-size buffer.
/// If there's no terminator, the descriptor didn't fit and is reported as
/// an error rather than silently cut short.
pub(crate) fn descriptor_string(buf: &DescriptorBuf) -> Result<String> {
    let len = buf
        .iter()
        .position(|&c| c == 0)
        .ok_or(Error::DescriptorTruncated)?;
    let bytes: Vec<u8> = buf[..len].iter().map(|&c| c as u8).collect();
    String::from_utf8(bytes).map_err(|_| Error::StringConversionError)
}

// --------------------------------------------------------------------------
