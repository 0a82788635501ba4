// visa-sys/src/lib.rs
//
//! Native, unsafe, bindings to a VISA instrument-control library.
//!
//! Unlike a link-time binding, the VISA shared library is located and
//! loaded at run time, the first time [`library()`] is called. The result
//! of that load is kept for the life of the process, so every caller
//! shares a single table of entry points.
//!
//! #### Library selection
//!
//! * **Windows** `visa32.dll`
//! * **macOS** `/Library/Frameworks/VISA.framework/VISA`
//! * **Other Unix** `libvisa.so`
//!
//! The `VISA_LIBRARY` environment variable, if set, overrides the
//! platform default with an explicit path.
//!
//! The types and constants mirror the values in the VPP-4.3 `visa.h` and
//! `visatype.h` headers. Only the values matter for compatibility with the
//! native library.
//!

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

#[macro_use]
extern crate dlopen_derive;
#[macro_use]
extern crate lazy_static;

use std::{env, os::raw::c_char};

use dlopen::wrapper::{Container, WrapperApi};

// ----- Types -----

pub type ViInt32 = i32;
pub type ViUInt32 = u32;
pub type ViUInt16 = u16;
pub type ViChar = c_char;
pub type ViByte = u8;

pub type ViStatus = ViInt32;
pub type ViObject = ViUInt32;
pub type ViSession = ViObject;
pub type ViFindList = ViObject;
pub type ViAccessMode = ViUInt32;

// ----- Miscellaneous -----

pub const VI_NULL: ViUInt32 = 0;
pub const VI_TRUE: ViUInt16 = 1;
pub const VI_FALSE: ViUInt16 = 0;

/// Size of the descriptor buffer filled by `viFindRsrc` and `viFindNext`.
pub const VI_FIND_BUFLEN: usize = 256;

pub const VI_TMO_IMMEDIATE: ViUInt32 = 0;
pub const VI_TMO_INFINITE: ViUInt32 = 0xFFFF_FFFF;

// ----- Access modes -----

pub const VI_NO_LOCK: ViAccessMode = 0;
pub const VI_EXCLUSIVE_LOCK: ViAccessMode = 1;
pub const VI_SHARED_LOCK: ViAccessMode = 2;
pub const VI_LOAD_CONFIG: ViAccessMode = 4;

// ----- Interface types -----

pub const VI_INTF_GPIB: ViUInt16 = 1;
pub const VI_INTF_VXI: ViUInt16 = 2;
pub const VI_INTF_GPIB_VXI: ViUInt16 = 3;
pub const VI_INTF_ASRL: ViUInt16 = 4;
pub const VI_INTF_PXI: ViUInt16 = 5;
pub const VI_INTF_TCPIP: ViUInt16 = 6;
pub const VI_INTF_USB: ViUInt16 = 7;

// ----- GPIB remote enable modes -----

pub const VI_GPIB_REN_DEASSERT: ViUInt16 = 0;
pub const VI_GPIB_REN_ASSERT: ViUInt16 = 1;
pub const VI_GPIB_REN_DEASSERT_GTL: ViUInt16 = 2;
pub const VI_GPIB_REN_ASSERT_ADDRESS: ViUInt16 = 3;
pub const VI_GPIB_REN_ASSERT_LLO: ViUInt16 = 4;
pub const VI_GPIB_REN_ASSERT_ADDRESS_LLO: ViUInt16 = 5;
pub const VI_GPIB_REN_ADDRESS_GTL: ViUInt16 = 6;

// ----- Completion codes -----

pub const VI_SUCCESS: ViStatus = 0;
pub const VI_SUCCESS_EVENT_EN: ViStatus = 0x3FFF_0002;
pub const VI_SUCCESS_EVENT_DIS: ViStatus = 0x3FFF_0003;
pub const VI_SUCCESS_QUEUE_EMPTY: ViStatus = 0x3FFF_0004;
pub const VI_SUCCESS_TERM_CHAR: ViStatus = 0x3FFF_0005;
pub const VI_SUCCESS_MAX_CNT: ViStatus = 0x3FFF_0006;
pub const VI_WARN_QUEUE_OVERFLOW: ViStatus = 0x3FFF_000C;
pub const VI_WARN_CONFIG_NLOADED: ViStatus = 0x3FFF_0077;
pub const VI_SUCCESS_DEV_NPRESENT: ViStatus = 0x3FFF_007D;
pub const VI_SUCCESS_TRIG_MAPPED: ViStatus = 0x3FFF_007E;
pub const VI_SUCCESS_QUEUE_NEMPTY: ViStatus = 0x3FFF_0080;
pub const VI_WARN_NULL_OBJECT: ViStatus = 0x3FFF_0082;
pub const VI_WARN_NSUP_ATTR_STATE: ViStatus = 0x3FFF_0084;
pub const VI_WARN_UNKNOWN_STATUS: ViStatus = 0x3FFF_0085;
pub const VI_WARN_NSUP_BUF: ViStatus = 0x3FFF_0088;
pub const VI_SUCCESS_NCHAIN: ViStatus = 0x3FFF_0098;
pub const VI_SUCCESS_NESTED_SHARED: ViStatus = 0x3FFF_0099;
pub const VI_SUCCESS_NESTED_EXCLUSIVE: ViStatus = 0x3FFF_009A;
pub const VI_SUCCESS_SYNC: ViStatus = 0x3FFF_009B;
pub const VI_WARN_EXT_FUNC_NIMPL: ViStatus = 0x3FFF_00A9;

// ----- Error codes -----

pub const _VI_ERROR: ViStatus = ViStatus::MIN;

pub const VI_ERROR_SYSTEM_ERROR: ViStatus = _VI_ERROR + 0x3FFF_0000;
pub const VI_ERROR_INV_OBJECT: ViStatus = _VI_ERROR + 0x3FFF_000E;
pub const VI_ERROR_RSRC_LOCKED: ViStatus = _VI_ERROR + 0x3FFF_000F;
pub const VI_ERROR_INV_EXPR: ViStatus = _VI_ERROR + 0x3FFF_0010;
pub const VI_ERROR_RSRC_NFOUND: ViStatus = _VI_ERROR + 0x3FFF_0011;
pub const VI_ERROR_INV_RSRC_NAME: ViStatus = _VI_ERROR + 0x3FFF_0012;
pub const VI_ERROR_INV_ACC_MODE: ViStatus = _VI_ERROR + 0x3FFF_0013;
pub const VI_ERROR_TMO: ViStatus = _VI_ERROR + 0x3FFF_0015;
pub const VI_ERROR_CLOSING_FAILED: ViStatus = _VI_ERROR + 0x3FFF_0016;
pub const VI_ERROR_INV_DEGREE: ViStatus = _VI_ERROR + 0x3FFF_001B;
pub const VI_ERROR_INV_JOB_ID: ViStatus = _VI_ERROR + 0x3FFF_001C;
pub const VI_ERROR_NSUP_ATTR: ViStatus = _VI_ERROR + 0x3FFF_001D;
pub const VI_ERROR_NSUP_ATTR_STATE: ViStatus = _VI_ERROR + 0x3FFF_001E;
pub const VI_ERROR_ATTR_READONLY: ViStatus = _VI_ERROR + 0x3FFF_001F;
pub const VI_ERROR_INV_LOCK_TYPE: ViStatus = _VI_ERROR + 0x3FFF_0020;
pub const VI_ERROR_INV_ACCESS_KEY: ViStatus = _VI_ERROR + 0x3FFF_0021;
pub const VI_ERROR_INV_EVENT: ViStatus = _VI_ERROR + 0x3FFF_0026;
pub const VI_ERROR_INV_MECH: ViStatus = _VI_ERROR + 0x3FFF_0027;
pub const VI_ERROR_HNDLR_NINSTALLED: ViStatus = _VI_ERROR + 0x3FFF_0028;
pub const VI_ERROR_INV_HNDLR_REF: ViStatus = _VI_ERROR + 0x3FFF_0029;
pub const VI_ERROR_INV_CONTEXT: ViStatus = _VI_ERROR + 0x3FFF_002A;
pub const VI_ERROR_QUEUE_OVERFLOW: ViStatus = _VI_ERROR + 0x3FFF_002D;
pub const VI_ERROR_NENABLED: ViStatus = _VI_ERROR + 0x3FFF_002F;
pub const VI_ERROR_ABORT: ViStatus = _VI_ERROR + 0x3FFF_0030;
pub const VI_ERROR_RAW_WR_PROT_VIOL: ViStatus = _VI_ERROR + 0x3FFF_0034;
pub const VI_ERROR_RAW_RD_PROT_VIOL: ViStatus = _VI_ERROR + 0x3FFF_0035;
pub const VI_ERROR_OUTP_PROT_VIOL: ViStatus = _VI_ERROR + 0x3FFF_0036;
pub const VI_ERROR_INP_PROT_VIOL: ViStatus = _VI_ERROR + 0x3FFF_0037;
pub const VI_ERROR_BERR: ViStatus = _VI_ERROR + 0x3FFF_0038;
pub const VI_ERROR_IN_PROGRESS: ViStatus = _VI_ERROR + 0x3FFF_0039;
pub const VI_ERROR_INV_SETUP: ViStatus = _VI_ERROR + 0x3FFF_003A;
pub const VI_ERROR_QUEUE_ERROR: ViStatus = _VI_ERROR + 0x3FFF_003B;
pub const VI_ERROR_ALLOC: ViStatus = _VI_ERROR + 0x3FFF_003C;
pub const VI_ERROR_INV_MASK: ViStatus = _VI_ERROR + 0x3FFF_003D;
pub const VI_ERROR_IO: ViStatus = _VI_ERROR + 0x3FFF_003E;
pub const VI_ERROR_INV_FMT: ViStatus = _VI_ERROR + 0x3FFF_003F;
pub const VI_ERROR_NSUP_FMT: ViStatus = _VI_ERROR + 0x3FFF_0041;
pub const VI_ERROR_LINE_IN_USE: ViStatus = _VI_ERROR + 0x3FFF_0042;
pub const VI_ERROR_NSUP_MODE: ViStatus = _VI_ERROR + 0x3FFF_0046;
pub const VI_ERROR_SRQ_NOCCURRED: ViStatus = _VI_ERROR + 0x3FFF_004A;
pub const VI_ERROR_INV_SPACE: ViStatus = _VI_ERROR + 0x3FFF_004E;
pub const VI_ERROR_INV_OFFSET: ViStatus = _VI_ERROR + 0x3FFF_0051;
pub const VI_ERROR_INV_WIDTH: ViStatus = _VI_ERROR + 0x3FFF_0052;
pub const VI_ERROR_NSUP_OFFSET: ViStatus = _VI_ERROR + 0x3FFF_0054;
pub const VI_ERROR_NSUP_VAR_WIDTH: ViStatus = _VI_ERROR + 0x3FFF_0055;
pub const VI_ERROR_WINDOW_NMAPPED: ViStatus = _VI_ERROR + 0x3FFF_0057;
pub const VI_ERROR_RESP_PENDING: ViStatus = _VI_ERROR + 0x3FFF_0059;
pub const VI_ERROR_NLISTENERS: ViStatus = _VI_ERROR + 0x3FFF_005F;
pub const VI_ERROR_NCIC: ViStatus = _VI_ERROR + 0x3FFF_0060;
pub const VI_ERROR_NSYS_CNTLR: ViStatus = _VI_ERROR + 0x3FFF_0061;
pub const VI_ERROR_NSUP_OPER: ViStatus = _VI_ERROR + 0x3FFF_0067;
pub const VI_ERROR_INTR_PENDING: ViStatus = _VI_ERROR + 0x3FFF_0068;
pub const VI_ERROR_ASRL_PARITY: ViStatus = _VI_ERROR + 0x3FFF_006A;
pub const VI_ERROR_ASRL_FRAMING: ViStatus = _VI_ERROR + 0x3FFF_006B;
pub const VI_ERROR_ASRL_OVERRUN: ViStatus = _VI_ERROR + 0x3FFF_006C;
pub const VI_ERROR_TRIG_NMAPPED: ViStatus = _VI_ERROR + 0x3FFF_006E;
pub const VI_ERROR_NSUP_ALIGN_OFFSET: ViStatus = _VI_ERROR + 0x3FFF_0070;
pub const VI_ERROR_USER_BUF: ViStatus = _VI_ERROR + 0x3FFF_0071;
pub const VI_ERROR_RSRC_BUSY: ViStatus = _VI_ERROR + 0x3FFF_0072;
pub const VI_ERROR_NSUP_WIDTH: ViStatus = _VI_ERROR + 0x3FFF_0076;
pub const VI_ERROR_INV_PARAMETER: ViStatus = _VI_ERROR + 0x3FFF_0078;
pub const VI_ERROR_INV_PROT: ViStatus = _VI_ERROR + 0x3FFF_0079;
pub const VI_ERROR_INV_SIZE: ViStatus = _VI_ERROR + 0x3FFF_007B;
pub const VI_ERROR_WINDOW_MAPPED: ViStatus = _VI_ERROR + 0x3FFF_0080;
pub const VI_ERROR_NIMPL_OPER: ViStatus = _VI_ERROR + 0x3FFF_0081;
pub const VI_ERROR_INV_LENGTH: ViStatus = _VI_ERROR + 0x3FFF_0083;
pub const VI_ERROR_INV_MODE: ViStatus = _VI_ERROR + 0x3FFF_0091;
pub const VI_ERROR_SESN_NLOCKED: ViStatus = _VI_ERROR + 0x3FFF_009C;
pub const VI_ERROR_MEM_NSHARED: ViStatus = _VI_ERROR + 0x3FFF_009D;
pub const VI_ERROR_LIBRARY_NFOUND: ViStatus = _VI_ERROR + 0x3FFF_009E;
pub const VI_ERROR_NSUP_INTR: ViStatus = _VI_ERROR + 0x3FFF_009F;
pub const VI_ERROR_INV_LINE: ViStatus = _VI_ERROR + 0x3FFF_00A0;
pub const VI_ERROR_FILE_ACCESS: ViStatus = _VI_ERROR + 0x3FFF_00A1;
pub const VI_ERROR_FILE_IO: ViStatus = _VI_ERROR + 0x3FFF_00A2;
pub const VI_ERROR_NSUP_LINE: ViStatus = _VI_ERROR + 0x3FFF_00A3;
pub const VI_ERROR_NSUP_MECH: ViStatus = _VI_ERROR + 0x3FFF_00A4;
pub const VI_ERROR_INTF_NUM_NCONFIG: ViStatus = _VI_ERROR + 0x3FFF_00A5;
pub const VI_ERROR_CONN_LOST: ViStatus = _VI_ERROR + 0x3FFF_00A6;
pub const VI_ERROR_MACHINE_NAVAIL: ViStatus = _VI_ERROR + 0x3FFF_00A7;
pub const VI_ERROR_NPERMISSION: ViStatus = _VI_ERROR + 0x3FFF_00A8;

// ----- Entry points -----

/// The table of VISA entry points resolved from the shared library.
///
/// Field names are the exported symbol names.
#[derive(WrapperApi)]
pub struct Api {
    viOpenDefaultRM: unsafe extern "system" fn(vi: *mut ViSession) -> ViStatus,
    viOpen: unsafe extern "system" fn(
        sesn: ViSession,
        name: *const ViChar,
        mode: ViAccessMode,
        timeout: ViUInt32,
        vi: *mut ViSession,
    ) -> ViStatus,
    viParseRsrc: unsafe extern "system" fn(
        sesn: ViSession,
        name: *const ViChar,
        intf_type: *mut ViUInt16,
        intf_num: *mut ViUInt16,
    ) -> ViStatus,
    viFindRsrc: unsafe extern "system" fn(
        sesn: ViSession,
        expr: *const ViChar,
        find_list: *mut ViFindList,
        ret_cnt: *mut ViUInt32,
        desc: *mut ViChar,
    ) -> ViStatus,
    viFindNext: unsafe extern "system" fn(find_list: ViFindList, desc: *mut ViChar) -> ViStatus,
    viClose: unsafe extern "system" fn(vi: ViObject) -> ViStatus,
    viWrite: unsafe extern "system" fn(
        vi: ViSession,
        buf: *const ViByte,
        cnt: ViUInt32,
        ret_cnt: *mut ViUInt32,
    ) -> ViStatus,
    viRead: unsafe extern "system" fn(
        vi: ViSession,
        buf: *mut ViByte,
        cnt: ViUInt32,
        ret_cnt: *mut ViUInt32,
    ) -> ViStatus,
    viGpibControlREN: unsafe extern "system" fn(vi: ViSession, mode: ViUInt16) -> ViStatus,
}

/// Environment variable that overrides the library path.
pub const LIBRARY_PATH_ENV: &str = "VISA_LIBRARY";

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        /// The platform default name of the VISA library.
        pub const DEFAULT_LIBRARY: &str = "visa32.dll";
    }
    else if #[cfg(target_os = "macos")] {
        /// The platform default name of the VISA library.
        pub const DEFAULT_LIBRARY: &str = "/Library/Frameworks/VISA.framework/VISA";
    }
    else {
        /// The platform default name of the VISA library.
        pub const DEFAULT_LIBRARY: &str = "libvisa.so";
    }
}

/// Gets the name or path of the library that will be loaded.
pub fn library_name() -> String {
    env::var(LIBRARY_PATH_ENV).unwrap_or_else(|_| DEFAULT_LIBRARY.to_string())
}

lazy_static! {
    static ref LIBRARY: Result<Container<Api>, String> = {
        let name = library_name();
        unsafe { Container::load(&name) }
            .map_err(|err| format!("{}: {}", name, err))
    };
}

/// Gets the process-wide table of VISA entry points.
///
/// The library is loaded on the first call. If that fails, every call
/// returns the same error message.
pub fn library() -> Result<&'static Container<Api>, &'static str> {
    LIBRARY.as_ref().map_err(|err| err.as_str())
}

// --------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_header() {
        assert_eq!(VI_ERROR_INV_OBJECT, -1073807346);
        assert_eq!(VI_ERROR_INV_OBJECT as u32, 0xBFFF_000E);
        assert_eq!(VI_ERROR_SYSTEM_ERROR as u32, 0xBFFF_0000);
        assert_eq!(VI_ERROR_NPERMISSION as u32, 0xBFFF_00A8);
    }

    #[test]
    fn access_modes_are_distinct_bits() {
        assert_eq!(VI_EXCLUSIVE_LOCK & VI_LOAD_CONFIG, 0);
        assert_eq!(VI_EXCLUSIVE_LOCK | VI_LOAD_CONFIG, 5);
    }
}
