// visa-io/src/resource_manager.rs
//
// Copyright (c) 2026, Frank Pagliughi
//
// Licensed under the MIT license:
//   <LICENSE or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according
// to those terms.
//
//! VISA Resource Managers.
//!

use std::{ffi::CString, rc::Rc, time::Duration};

use log::{debug, warn};

use crate::driver::{descriptor_string, DescriptorBuf, Driver, NativeDriver};
use crate::ffi::{self, ViAccessMode, ViChar, ViFindList, ViSession, ViUInt16, ViUInt32};
use crate::status::{check, sys_result};
use crate::{Resource, Result};

/// The open timeout used when one isn't specified.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_millis(1000);

/** A session to the VISA default resource manager.

The resource manager is used to find and open instrument resources.

Since VISA doesn't provide any thread safety guarantees, this object cannot
be Send or Sync. It maintains a reference counted pointer to the underlying
session. Each [`Resource`] opened from the manager holds a reference, so the
manager session stays open until the manager and all of its resources have
been dropped, at which point the session is closed exactly once.
**/
#[derive(Debug)]
pub struct ResourceManager<D: Driver = NativeDriver> {
    pub(crate) raw: Rc<RawManager<D>>,
}

/// RawManager holds the driver and the manager session.
#[derive(Debug)]
pub(crate) struct RawManager<D: Driver> {
    pub(crate) driver: D,
    pub(crate) sesn: ViSession,
    open: bool,
}

impl<D: Driver> RawManager<D> {
    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        debug!("Closing resource manager session {}", self.sesn);
        sys_result(self.driver.close(self.sesn), ())
    }
}

impl<D: Driver> Drop for RawManager<D> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("Error closing resource manager session: {}", err);
        }
    }
}

impl ResourceManager {
    /// Opens a session to the default resource manager of the VISA library.
    ///
    /// This loads the VISA library on first use. See [`visa_sys::library()`]
    /// for how the library is located.
    pub fn new() -> Result<Self> {
        Self::with_driver(NativeDriver::load()?)
    }
}

impl<D: Driver> ResourceManager<D> {
    /// Opens a session to the default resource manager through the
    /// specified driver.
    pub fn with_driver(driver: D) -> Result<Self> {
        let mut sesn: ViSession = 0;
        check(driver.open_default_rm(&mut sesn))?;
        debug!("Opened resource manager session {}", sesn);
        Ok(Self {
            raw: Rc::new(RawManager {
                driver,
                sesn,
                open: true,
            }),
        })
    }

    /// Gets the native session handle
    pub fn session(&self) -> ViSession {
        self.raw.sesn
    }

    /// Gets the driver used by the manager
    pub fn driver(&self) -> &D {
        &self.raw.driver
    }

    /// Finds all the resources that match an expression.
    ///
    /// `expr` A VISA search expression, like "?*INSTR" or "GPIB?*INSTR".
    ///
    /// This returns the complete list of matches, which is empty if no
    /// resource matches the expression.
    pub fn find_resource(&self, expr: &str) -> Result<Vec<String>> {
        let cexpr = CString::new(expr)?;
        let drv = &self.raw.driver;

        let mut find_list: ViFindList = 0;
        let mut count: ViUInt32 = 0;
        let mut desc: DescriptorBuf = [0 as ViChar; ffi::VI_FIND_BUFLEN];

        let status = drv.find_rsrc(self.raw.sesn, &cexpr, &mut find_list, &mut count, &mut desc);
        if status == ffi::VI_ERROR_RSRC_NFOUND {
            debug!("No resources found matching '{}'", expr);
            return Ok(Vec::new());
        }
        check(status)?;

        let res = collect_matches(drv, find_list, count, &mut desc);
        let close_status = drv.close(find_list);

        let resources = res?;
        debug!("Found {} resource(s) matching '{}'", resources.len(), expr);
        sys_result(close_status, resources)
    }

    /// Parses a resource descriptor to get the interface it would use,
    /// without opening it.
    ///
    /// Returns the interface type and interface number.
    pub fn parse_resource(&self, name: &str) -> Result<(InterfaceType, u16)> {
        let cname = CString::new(name)?;
        let mut intf_type: ViUInt16 = 0;
        let mut intf_num: ViUInt16 = 0;
        let status =
            self.raw
                .driver
                .parse_rsrc(self.raw.sesn, &cname, &mut intf_type, &mut intf_num);
        sys_result(status, (InterfaceType::from(intf_type), intf_num))
    }

    /// Opens a session to a resource using the default options.
    ///
    /// The resource is opened without locks or configuration, and with the
    /// default open timeout of one second.
    pub fn open(&self, name: &str) -> Result<Resource<D>> {
        self.open_with(name, &OpenOptions::default())
    }

    /// Opens a session to a resource with the specified options.
    pub fn open_with(&self, name: &str, opts: &OpenOptions) -> Result<Resource<D>> {
        let cname = CString::new(name)?;
        let mut vi: ViSession = 0;
        let status = self.raw.driver.open(
            self.raw.sesn,
            &cname,
            opts.access_mode(),
            opts.timeout_ms(),
            &mut vi,
        );
        check(status)?;
        debug!("Opened session {} to '{}'", vi, name);
        Ok(Resource::new(self.clone(), vi, name))
    }

    /// Closes the manager.
    ///
    /// This consumes the manager. If no resources opened from it are still
    /// alive, the session is closed now and any error is reported.
    /// Otherwise it is closed when the last of them is dropped.
    pub fn close(self) -> Result<()> {
        match Rc::try_unwrap(self.raw) {
            Ok(mut raw) => raw.close(),
            Err(_) => {
                debug!("Resource manager still in use; deferring close");
                Ok(())
            }
        }
    }
}

impl<D: Driver> Clone for ResourceManager<D> {
    fn clone(&self) -> Self {
        Self {
            raw: Rc::clone(&self.raw),
        }
    }
}

impl<D: Driver> PartialEq for ResourceManager<D> {
    /// Two managers are the same if they refer to the same underlying
    /// session.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.raw, &other.raw)
    }
}

/// Reads the rest of the matches from a find list.
///
/// The first match is already in `desc`. This makes one `viFindNext` call
/// for each of the remaining `count - 1` matches.
fn collect_matches<D: Driver>(
    drv: &D,
    find_list: ViFindList,
    count: ViUInt32,
    desc: &mut DescriptorBuf,
) -> Result<Vec<String>> {
    let mut resources = Vec::with_capacity(count as usize);
    if count == 0 {
        return Ok(resources);
    }
    resources.push(descriptor_string(desc)?);

    for _ in 1..count {
        check(drv.find_next(find_list, desc))?;
        resources.push(descriptor_string(desc)?);
    }
    Ok(resources)
}

// --------------------------------------------------------------------------

/// The type of hardware interface used by a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceType {
    /// GPIB (IEEE-488)
    Gpib,
    /// VXI
    Vxi,
    /// GPIB-VXI
    GpibVxi,
    /// Serial (asynchronous serial line)
    Asrl,
    /// PXI
    Pxi,
    /// TCP/IP (VXI-11, HiSLIP, raw sockets)
    Tcpip,
    /// USB (USBTMC and raw)
    Usb,
    /// A type code not known to this library
    Other(u16),
}

impl From<ViUInt16> for InterfaceType {
    fn from(code: ViUInt16) -> Self {
        use InterfaceType::*;
        match code {
            ffi::VI_INTF_GPIB => Gpib,
            ffi::VI_INTF_VXI => Vxi,
            ffi::VI_INTF_GPIB_VXI => GpibVxi,
            ffi::VI_INTF_ASRL => Asrl,
            ffi::VI_INTF_PXI => Pxi,
            ffi::VI_INTF_TCPIP => Tcpip,
            ffi::VI_INTF_USB => Usb,
            other => Other(other),
        }
    }
}

// --------------------------------------------------------------------------

/// Options for opening a resource.
///
/// The lock and configuration flags are combined into the VISA access mode
/// passed to `viOpen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    exclusive_lock: bool,
    shared_lock: bool,
    load_config: bool,
    timeout: Duration,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            exclusive_lock: false,
            shared_lock: false,
            load_config: false,
            timeout: DEFAULT_OPEN_TIMEOUT,
        }
    }
}

impl OpenOptions {
    /// Creates the default set of options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an exclusive lock on the resource when opening it.
    pub fn exclusive_lock(mut self, on: bool) -> Self {
        self.exclusive_lock = on;
        self
    }

    /// Request a shared lock on the resource when opening it.
    pub fn shared_lock(mut self, on: bool) -> Self {
        self.shared_lock = on;
        self
    }

    /// Load the configured attribute values for the resource.
    pub fn load_config(mut self, on: bool) -> Self {
        self.load_config = on;
        self
    }

    /// Sets the time to wait for the resource to open.
    ///
    /// The native library takes whole milliseconds; anything finer is
    /// dropped, and anything longer than the native range is clamped.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Gets the VISA access mode for these options.
    pub fn access_mode(&self) -> ViAccessMode {
        let mut mode = ffi::VI_NO_LOCK;
        if self.exclusive_lock {
            mode |= ffi::VI_EXCLUSIVE_LOCK;
        }
        if self.shared_lock {
            mode |= ffi::VI_SHARED_LOCK;
        }
        if self.load_config {
            mode |= ffi::VI_LOAD_CONFIG;
        }
        mode
    }

    /// Gets the open timeout, in milliseconds.
    pub fn timeout_ms(&self) -> ViUInt32 {
        ViUInt32::try_from(self.timeout.as_millis()).unwrap_or(ViUInt32::MAX)
    }
}

// --------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockDriver};

    fn find_nexts(drv: &MockDriver) -> usize {
        drv.count(|c| matches!(c, Call::FindNext(_)))
    }

    // The mock hands out the find list handle right after the manager's.
    fn find_list_closes(rm: &ResourceManager<&MockDriver>) -> usize {
        rm.driver().closes_of(rm.session() + 1)
    }

    #[test]
    fn find_many() {
        let names = ["GPIB0::1::INSTR", "GPIB0::12::INSTR", "TCPIP0::10.0.0.5::INSTR"];
        let drv = MockDriver::with_resources(&names);
        let rm = ResourceManager::with_driver(&drv).unwrap();

        let found = rm.find_resource("?*INSTR").unwrap();
        assert_eq!(found, names);
        assert_eq!(find_nexts(&drv), names.len() - 1);
        assert_eq!(find_list_closes(&rm), 1);
    }

    #[test]
    fn find_one() {
        let drv = MockDriver::with_resources(&["ASRL1::INSTR"]);
        let rm = ResourceManager::with_driver(&drv).unwrap();

        let found = rm.find_resource("ASRL?*").unwrap();
        assert_eq!(found, ["ASRL1::INSTR"]);
        assert_eq!(find_nexts(&drv), 0);
        assert_eq!(find_list_closes(&rm), 1);
    }

    #[test]
    fn find_none() {
        let drv = MockDriver::new();
        let rm = ResourceManager::with_driver(&drv).unwrap();

        let found = rm.find_resource("USB?*").unwrap();
        assert!(found.is_empty());
        assert_eq!(find_nexts(&drv), 0);
        assert_eq!(find_list_closes(&rm), 1);
    }

    #[test]
    fn find_next_failure_still_closes_list() {
        let drv = MockDriver::with_resources(&["GPIB0::1::INSTR", "GPIB0::2::INSTR"]);
        let rm = ResourceManager::with_driver(&drv).unwrap();
        // Claim more matches than the mock can deliver
        drv.extra_count.set(1);

        let err = rm.find_resource("GPIB?*").unwrap_err();
        assert_eq!(err.status(), Some(ffi::VI_ERROR_RSRC_NFOUND));
        assert_eq!(find_nexts(&drv), 2);
        assert_eq!(find_list_closes(&rm), 1);
    }

    #[test]
    fn find_not_found_status_is_empty() {
        let drv = MockDriver::new();
        drv.find_status.set(Some(ffi::VI_ERROR_RSRC_NFOUND));
        let rm = ResourceManager::with_driver(&drv).unwrap();

        assert!(rm.find_resource("USB?*").unwrap().is_empty());
    }

    #[test]
    fn find_invalid_expression_fails() {
        let drv = MockDriver::new();
        drv.find_status.set(Some(ffi::VI_ERROR_INV_EXPR));
        let rm = ResourceManager::with_driver(&drv).unwrap();

        let err = rm.find_resource("[").unwrap_err();
        assert_eq!(err.status(), Some(ffi::VI_ERROR_INV_EXPR));
    }

    #[test]
    fn find_rejects_nul() {
        let drv = MockDriver::new();
        let rm = ResourceManager::with_driver(&drv).unwrap();
        assert!(matches!(rm.find_resource("a\0b"), Err(crate::Error::NulError(_))));
        assert_eq!(drv.count(|c| matches!(c, Call::FindRsrc(_))), 0);
    }

    #[test]
    fn parse() {
        let drv = MockDriver::new();
        let rm = ResourceManager::with_driver(&drv).unwrap();
        assert_eq!(
            rm.parse_resource("GPIB2::5::INSTR").unwrap(),
            (InterfaceType::Gpib, 2)
        );
        let err = rm.parse_resource("bogus").unwrap_err();
        assert_eq!(err.status(), Some(ffi::VI_ERROR_INV_RSRC_NAME));
    }

    #[test]
    fn open_default_options() {
        let drv = MockDriver::new();
        let rm = ResourceManager::with_driver(&drv).unwrap();
        let res = rm.open("GPIB0::12::INSTR").unwrap();
        assert_eq!(res.descriptor(), "GPIB0::12::INSTR");

        assert!(drv.calls().contains(&Call::Open {
            sesn: rm.session(),
            name: "GPIB0::12::INSTR".into(),
            mode: ffi::VI_NO_LOCK,
            timeout: 1000,
        }));
    }

    #[test]
    fn open_combines_access_flags() {
        let drv = MockDriver::new();
        let rm = ResourceManager::with_driver(&drv).unwrap();
        let opts = OpenOptions::new()
            .exclusive_lock(true)
            .load_config(true)
            .timeout(Duration::from_millis(2500));
        let _res = rm.open_with("GPIB0::12::INSTR", &opts).unwrap();

        assert!(drv.calls().contains(&Call::Open {
            sesn: rm.session(),
            name: "GPIB0::12::INSTR".into(),
            mode: ffi::VI_EXCLUSIVE_LOCK | ffi::VI_LOAD_CONFIG,
            timeout: 2500,
        }));
    }

    #[test]
    fn open_failure() {
        let drv = MockDriver::new();
        drv.open_status.set(ffi::VI_ERROR_RSRC_NFOUND);
        let rm = ResourceManager::with_driver(&drv).unwrap();

        let err = rm.open("GPIB0::30::INSTR").unwrap_err();
        assert!(err.to_string().starts_with("VI_ERROR_RSRC_NFOUND (BFFF0011): "));
    }

    #[test]
    fn access_modes() {
        assert_eq!(OpenOptions::new().access_mode(), 0);
        assert_eq!(OpenOptions::new().exclusive_lock(true).access_mode(), 1);
        assert_eq!(OpenOptions::new().shared_lock(true).access_mode(), 2);
        assert_eq!(OpenOptions::new().load_config(true).access_mode(), 4);
    }

    #[test]
    fn timeout_is_clamped() {
        let opts = OpenOptions::new().timeout(Duration::from_secs(u64::MAX));
        assert_eq!(opts.timeout_ms(), ViUInt32::MAX);
        assert_eq!(OpenOptions::new().timeout_ms(), 1000);
    }

    #[test]
    fn interface_types() {
        assert_eq!(InterfaceType::from(ffi::VI_INTF_USB), InterfaceType::Usb);
        assert_eq!(InterfaceType::from(99), InterfaceType::Other(99));
    }

    #[test]
    fn drop_closes_session_once() {
        let drv = MockDriver::new();
        let rm = ResourceManager::with_driver(&drv).unwrap();
        let sesn = rm.session();
        let rm2 = rm.clone();
        assert!(rm == rm2);

        drop(rm);
        assert_eq!(drv.closes_of(sesn), 0);
        drop(rm2);
        assert_eq!(drv.closes_of(sesn), 1);
    }

    #[test]
    fn explicit_close() {
        let drv = MockDriver::new();
        let rm = ResourceManager::with_driver(&drv).unwrap();
        let sesn = rm.session();

        rm.close().unwrap();
        assert_eq!(drv.closes_of(sesn), 1);
    }

    #[test]
    fn explicit_close_reports_error() {
        let drv = MockDriver::new();
        let rm = ResourceManager::with_driver(&drv).unwrap();
        let sesn = rm.session();
        drv.close_status.set(ffi::VI_ERROR_CLOSING_FAILED);

        let err = rm.close().unwrap_err();
        assert_eq!(err.status(), Some(ffi::VI_ERROR_CLOSING_FAILED));
        assert_eq!(drv.closes_of(sesn), 1);
    }

    #[test]
    fn close_is_deferred_while_resources_are_open() {
        let drv = MockDriver::new();
        let rm = ResourceManager::with_driver(&drv).unwrap();
        let sesn = rm.session();
        let res = rm.open("GPIB0::1::INSTR").unwrap();
        let vi = res.session();

        rm.close().unwrap();
        assert_eq!(drv.closes_of(sesn), 0);

        drop(res);
        assert_eq!(drv.closes_of(vi), 1);
        assert_eq!(drv.closes_of(sesn), 1);

        // The device session is closed before the manager session
        let calls = drv.calls();
        let pos_vi = calls.iter().position(|c| *c == Call::Close(vi));
        let pos_rm = calls.iter().position(|c| *c == Call::Close(sesn));
        assert!(pos_vi < pos_rm);
    }
}
