// visa-io/src/status.rs
//
// Copyright (c) 2026, Frank Pagliughi
//
// Licensed under the MIT license:
//   <LICENSE or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according
// to those terms.
//
//! VISA completion and error status codes.
//!
//! Every call into the VISA library returns a [`ViStatus`]. Negative
//! values are errors, and zero or positive values are successful
//! completions, some of which carry extra information, like a read that
//! stopped on the termination character.
//!
//! The catalog here maps each code defined by the VISA specification to
//! its symbolic name and a description. It is built once, on first use,
//! and never changes.

use std::collections::HashMap;

use crate::errors::{Error, Result, VisaError};
use crate::ffi::{self, ViStatus};

lazy_static! {
    static ref CATALOG: HashMap<ViStatus, (&'static str, &'static str)> = STATUS_TABLE
        .iter()
        .map(|&(code, short_desc, long_desc)| (code, (short_desc, long_desc)))
        .collect();
}

/// Checks a status returned from the library.
///
/// A successful completion code is passed back unchanged. An error code is
/// converted into an [`Error::Visa`] carrying its catalog text, or an
/// [`Error::UnknownStatus`] if the code isn't in the catalog.
pub fn check(status: ViStatus) -> Result<ViStatus> {
    if status < 0 {
        Err(error(status))
    }
    else {
        Ok(status)
    }
}

/// Creates the error for a status code, with its catalog text.
pub fn error(status: ViStatus) -> Error {
    match describe(status) {
        Some((short_desc, long_desc)) => VisaError {
            code: status,
            short_desc,
            long_desc,
        }
        .into(),
        None => Error::UnknownStatus(status),
    }
}

/// Like [`check()`] but returns the given value on success.
pub(crate) fn sys_result<T>(status: ViStatus, result: T) -> Result<T> {
    check(status).map(|_| result)
}

/// Looks up the symbolic name and description of a status code.
pub fn describe(status: ViStatus) -> Option<(&'static str, &'static str)> {
    CATALOG.get(&status).copied()
}

/// Determines if the status code is a successful completion.
pub fn is_success(status: ViStatus) -> bool {
    status >= 0
}

// --------------------------------------------------------------------------

/// The successful completions that matter to the I/O operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The operation completed successfully (`VI_SUCCESS`).
    Success,
    /// A read stopped on the termination character (`VI_SUCCESS_TERM_CHAR`).
    TermChar,
    /// A read filled the requested count; more data might be available
    /// (`VI_SUCCESS_MAX_CNT`).
    MaxCount,
    /// Any other successful completion or warning code.
    Other(ViStatus),
}

impl Completion {
    /// Determines if a read with this completion reached the end of a
    /// message.
    pub fn is_end(&self) -> bool {
        matches!(self, Completion::Success | Completion::TermChar)
    }
}

impl From<ViStatus> for Completion {
    fn from(status: ViStatus) -> Self {
        match status {
            ffi::VI_SUCCESS => Completion::Success,
            ffi::VI_SUCCESS_TERM_CHAR => Completion::TermChar,
            ffi::VI_SUCCESS_MAX_CNT => Completion::MaxCount,
            other => Completion::Other(other),
        }
    }
}

// --------------------------------------------------------------------------

/// The status codes defined by the VISA specification, as
/// (code, name, description).
const STATUS_TABLE: &[(ViStatus, &str, &str)] = &[
    (ffi::VI_SUCCESS, "VI_SUCCESS", "Operation completed successfully."),
    (ffi::VI_SUCCESS_EVENT_EN, "VI_SUCCESS_EVENT_EN",
        "Specified event is already enabled for at least one of the specified mechanisms."),
    (ffi::VI_SUCCESS_EVENT_DIS, "VI_SUCCESS_EVENT_DIS",
        "Specified event is already disabled for at least one of the specified mechanisms."),
    (ffi::VI_SUCCESS_QUEUE_EMPTY, "VI_SUCCESS_QUEUE_EMPTY",
        "Operation completed successfully, but queue was already empty."),
    (ffi::VI_SUCCESS_TERM_CHAR, "VI_SUCCESS_TERM_CHAR",
        "The specified termination character was read."),
    (ffi::VI_SUCCESS_MAX_CNT, "VI_SUCCESS_MAX_CNT",
        "The number of bytes transferred is equal to the requested input count. \
         More data might be available."),
    (ffi::VI_WARN_QUEUE_OVERFLOW, "VI_WARN_QUEUE_OVERFLOW",
        "VISA received more event information of the specified type than the \
         configured queue size could hold."),
    (ffi::VI_WARN_CONFIG_NLOADED, "VI_WARN_CONFIG_NLOADED",
        "The specified configuration either does not exist or could not be loaded. \
         VISA-specified defaults will be used."),
    (ffi::VI_SUCCESS_DEV_NPRESENT, "VI_SUCCESS_DEV_NPRESENT",
        "Session opened successfully, but the device at the specified address is \
         not responding."),
    (ffi::VI_SUCCESS_TRIG_MAPPED, "VI_SUCCESS_TRIG_MAPPED",
        "The path from trigSrc to trigDest is already mapped."),
    (ffi::VI_SUCCESS_QUEUE_NEMPTY, "VI_SUCCESS_QUEUE_NEMPTY",
        "Wait terminated successfully on receipt of an event notification. There is \
         at least one more event object of the requested type(s) available for this \
         session."),
    (ffi::VI_WARN_NULL_OBJECT, "VI_WARN_NULL_OBJECT",
        "The specified object reference is uninitialized."),
    (ffi::VI_WARN_NSUP_ATTR_STATE, "VI_WARN_NSUP_ATTR_STATE",
        "Although the specified state of the attribute is valid, it is not supported \
         by this implementation."),
    (ffi::VI_WARN_UNKNOWN_STATUS, "VI_WARN_UNKNOWN_STATUS",
        "The status code passed to the operation could not be interpreted."),
    (ffi::VI_WARN_NSUP_BUF, "VI_WARN_NSUP_BUF",
        "The specified I/O buffer type is not supported."),
    (ffi::VI_SUCCESS_NCHAIN, "VI_SUCCESS_NCHAIN",
        "Event handled successfully. Do not invoke any other handlers on this session \
         for this event."),
    (ffi::VI_SUCCESS_NESTED_SHARED, "VI_SUCCESS_NESTED_SHARED",
        "Operation completed successfully, and this session has nested shared locks."),
    (ffi::VI_SUCCESS_NESTED_EXCLUSIVE, "VI_SUCCESS_NESTED_EXCLUSIVE",
        "Operation completed successfully, and this session has nested exclusive locks."),
    (ffi::VI_SUCCESS_SYNC, "VI_SUCCESS_SYNC",
        "Operation completed successfully, but the operation was actually synchronous \
         rather than asynchronous."),
    (ffi::VI_WARN_EXT_FUNC_NIMPL, "VI_WARN_EXT_FUNC_NIMPL",
        "The operation succeeded, but a lower level driver did not implement the \
         extended functionality."),
    (ffi::VI_ERROR_SYSTEM_ERROR, "VI_ERROR_SYSTEM_ERROR",
        "Unknown system error (miscellaneous error)."),
    (ffi::VI_ERROR_INV_OBJECT, "VI_ERROR_INV_OBJECT",
        "The given session or object reference is invalid."),
    (ffi::VI_ERROR_RSRC_LOCKED, "VI_ERROR_RSRC_LOCKED",
        "Specified type of lock cannot be obtained, or specified operation cannot be \
         performed, because the resource is locked."),
    (ffi::VI_ERROR_INV_EXPR, "VI_ERROR_INV_EXPR",
        "Invalid expression specified for search."),
    (ffi::VI_ERROR_RSRC_NFOUND, "VI_ERROR_RSRC_NFOUND",
        "Insufficient location information or the requested device or resource is not \
         present in the system."),
    (ffi::VI_ERROR_INV_RSRC_NAME, "VI_ERROR_INV_RSRC_NAME",
        "Invalid resource reference specified. Parsing error."),
    (ffi::VI_ERROR_INV_ACC_MODE, "VI_ERROR_INV_ACC_MODE", "Invalid access mode."),
    (ffi::VI_ERROR_TMO, "VI_ERROR_TMO", "Timeout expired before operation completed."),
    (ffi::VI_ERROR_CLOSING_FAILED, "VI_ERROR_CLOSING_FAILED",
        "The VISA driver failed to properly close the session or object reference. \
         This might be due to an error freeing internal or OS resources, a failed \
         network connection, or a lower-level driver or OS error."),
    (ffi::VI_ERROR_INV_DEGREE, "VI_ERROR_INV_DEGREE", "Specified degree is invalid."),
    (ffi::VI_ERROR_INV_JOB_ID, "VI_ERROR_INV_JOB_ID", "Specified job identifier is invalid."),
    (ffi::VI_ERROR_NSUP_ATTR, "VI_ERROR_NSUP_ATTR",
        "The specified attribute is not defined or supported by the referenced resource."),
    (ffi::VI_ERROR_NSUP_ATTR_STATE, "VI_ERROR_NSUP_ATTR_STATE",
        "The specified state of the attribute is not valid, or is not supported as \
         defined by the resource."),
    (ffi::VI_ERROR_ATTR_READONLY, "VI_ERROR_ATTR_READONLY",
        "The specified attribute is read-only."),
    (ffi::VI_ERROR_INV_LOCK_TYPE, "VI_ERROR_INV_LOCK_TYPE",
        "The specified type of lock is not supported by this resource."),
    (ffi::VI_ERROR_INV_ACCESS_KEY, "VI_ERROR_INV_ACCESS_KEY",
        "The access key to the resource associated with the specified session is invalid."),
    (ffi::VI_ERROR_INV_EVENT, "VI_ERROR_INV_EVENT",
        "Specified event type is not supported by the resource."),
    (ffi::VI_ERROR_INV_MECH, "VI_ERROR_INV_MECH", "Invalid mechanism specified."),
    (ffi::VI_ERROR_HNDLR_NINSTALLED, "VI_ERROR_HNDLR_NINSTALLED",
        "A handler was not installed."),
    (ffi::VI_ERROR_INV_HNDLR_REF, "VI_ERROR_INV_HNDLR_REF",
        "The given handler reference is either invalid or was not installed."),
    (ffi::VI_ERROR_INV_CONTEXT, "VI_ERROR_INV_CONTEXT", "Specified event context is invalid."),
    (ffi::VI_ERROR_QUEUE_OVERFLOW, "VI_ERROR_QUEUE_OVERFLOW",
        "The event queue for the specified type has overflowed (usually due to previous \
         events not having been closed)."),
    (ffi::VI_ERROR_NENABLED, "VI_ERROR_NENABLED",
        "You must be enabled for events of the specified type in order to receive them."),
    (ffi::VI_ERROR_ABORT, "VI_ERROR_ABORT", "User abort occurred during transfer."),
    (ffi::VI_ERROR_RAW_WR_PROT_VIOL, "VI_ERROR_RAW_WR_PROT_VIOL",
        "Violation of raw write protocol occurred during transfer."),
    (ffi::VI_ERROR_RAW_RD_PROT_VIOL, "VI_ERROR_RAW_RD_PROT_VIOL",
        "Violation of raw read protocol occurred during transfer."),
    (ffi::VI_ERROR_OUTP_PROT_VIOL, "VI_ERROR_OUTP_PROT_VIOL",
        "Device reported an output protocol error during transfer."),
    (ffi::VI_ERROR_INP_PROT_VIOL, "VI_ERROR_INP_PROT_VIOL",
        "Device reported an input protocol error during transfer."),
    (ffi::VI_ERROR_BERR, "VI_ERROR_BERR", "Bus error occurred during transfer."),
    (ffi::VI_ERROR_IN_PROGRESS, "VI_ERROR_IN_PROGRESS",
        "Unable to queue the asynchronous operation because there is already an \
         operation in progress."),
    (ffi::VI_ERROR_INV_SETUP, "VI_ERROR_INV_SETUP",
        "Unable to start operation because setup is invalid (usually due to attributes \
         being set to an inconsistent state)."),
    (ffi::VI_ERROR_QUEUE_ERROR, "VI_ERROR_QUEUE_ERROR",
        "Unable to queue the asynchronous operation (usually due to the I/O completion \
         event not being enabled or insufficient space in the session's queue)."),
    (ffi::VI_ERROR_ALLOC, "VI_ERROR_ALLOC",
        "Insufficient system resources to perform necessary memory allocation."),
    (ffi::VI_ERROR_INV_MASK, "VI_ERROR_INV_MASK", "Invalid buffer mask specified."),
    (ffi::VI_ERROR_IO, "VI_ERROR_IO", "Could not perform operation because of I/O error."),
    (ffi::VI_ERROR_INV_FMT, "VI_ERROR_INV_FMT",
        "A format specifier in the format string is invalid."),
    (ffi::VI_ERROR_NSUP_FMT, "VI_ERROR_NSUP_FMT",
        "A format specifier in the format string is not supported."),
    (ffi::VI_ERROR_LINE_IN_USE, "VI_ERROR_LINE_IN_USE",
        "The specified trigger line is currently in use."),
    (ffi::VI_ERROR_NSUP_MODE, "VI_ERROR_NSUP_MODE",
        "The specified mode is not supported by this VISA implementation."),
    (ffi::VI_ERROR_SRQ_NOCCURRED, "VI_ERROR_SRQ_NOCCURRED",
        "Service request has not been received for the session."),
    (ffi::VI_ERROR_INV_SPACE, "VI_ERROR_INV_SPACE", "Invalid address space specified."),
    (ffi::VI_ERROR_INV_OFFSET, "VI_ERROR_INV_OFFSET", "Invalid offset specified."),
    (ffi::VI_ERROR_INV_WIDTH, "VI_ERROR_INV_WIDTH",
        "Invalid source or destination width specified."),
    (ffi::VI_ERROR_NSUP_OFFSET, "VI_ERROR_NSUP_OFFSET",
        "Specified offset is not accessible from this hardware."),
    (ffi::VI_ERROR_NSUP_VAR_WIDTH, "VI_ERROR_NSUP_VAR_WIDTH",
        "Cannot support source and destination widths that are different."),
    (ffi::VI_ERROR_WINDOW_NMAPPED, "VI_ERROR_WINDOW_NMAPPED",
        "The specified session is not currently mapped."),
    (ffi::VI_ERROR_RESP_PENDING, "VI_ERROR_RESP_PENDING",
        "A previous response is still pending, causing a multiple query error."),
    (ffi::VI_ERROR_NLISTENERS, "VI_ERROR_NLISTENERS",
        "No listeners condition is detected (both NRFD and NDAC are deasserted)."),
    (ffi::VI_ERROR_NCIC, "VI_ERROR_NCIC",
        "The interface associated with this session is not currently the controller \
         in charge."),
    (ffi::VI_ERROR_NSYS_CNTLR, "VI_ERROR_NSYS_CNTLR",
        "The interface associated with this session is not the system controller."),
    (ffi::VI_ERROR_NSUP_OPER, "VI_ERROR_NSUP_OPER",
        "The given session or object reference does not support this operation."),
    (ffi::VI_ERROR_INTR_PENDING, "VI_ERROR_INTR_PENDING",
        "An interrupt is still pending from a previous call."),
    (ffi::VI_ERROR_ASRL_PARITY, "VI_ERROR_ASRL_PARITY",
        "A parity error occurred during transfer."),
    (ffi::VI_ERROR_ASRL_FRAMING, "VI_ERROR_ASRL_FRAMING",
        "A framing error occurred during transfer."),
    (ffi::VI_ERROR_ASRL_OVERRUN, "VI_ERROR_ASRL_OVERRUN",
        "An overrun error occurred during transfer. A character was not read from the \
         hardware before the next character arrived."),
    (ffi::VI_ERROR_TRIG_NMAPPED, "VI_ERROR_TRIG_NMAPPED",
        "The path from trigSrc to trigDest is not currently mapped."),
    (ffi::VI_ERROR_NSUP_ALIGN_OFFSET, "VI_ERROR_NSUP_ALIGN_OFFSET",
        "The specified offset is not properly aligned for the access width of the \
         operation."),
    (ffi::VI_ERROR_USER_BUF, "VI_ERROR_USER_BUF",
        "A specified user buffer is not valid or cannot be accessed for the required size."),
    (ffi::VI_ERROR_RSRC_BUSY, "VI_ERROR_RSRC_BUSY",
        "The resource is valid, but VISA cannot currently access it."),
    (ffi::VI_ERROR_NSUP_WIDTH, "VI_ERROR_NSUP_WIDTH",
        "Specified width is not supported by this hardware."),
    (ffi::VI_ERROR_INV_PARAMETER, "VI_ERROR_INV_PARAMETER",
        "The value of some parameter (which parameter is not known) is invalid."),
    (ffi::VI_ERROR_INV_PROT, "VI_ERROR_INV_PROT", "The protocol specified is invalid."),
    (ffi::VI_ERROR_INV_SIZE, "VI_ERROR_INV_SIZE", "Invalid size of window specified."),
    (ffi::VI_ERROR_WINDOW_MAPPED, "VI_ERROR_WINDOW_MAPPED",
        "The specified session currently contains a mapped window."),
    (ffi::VI_ERROR_NIMPL_OPER, "VI_ERROR_NIMPL_OPER", "The given operation is not implemented."),
    (ffi::VI_ERROR_INV_LENGTH, "VI_ERROR_INV_LENGTH", "Invalid length specified."),
    (ffi::VI_ERROR_INV_MODE, "VI_ERROR_INV_MODE", "Invalid mode specified."),
    (ffi::VI_ERROR_SESN_NLOCKED, "VI_ERROR_SESN_NLOCKED",
        "The current session did not have a lock on the resource."),
    (ffi::VI_ERROR_MEM_NSHARED, "VI_ERROR_MEM_NSHARED", "The device does not export any memory."),
    (ffi::VI_ERROR_LIBRARY_NFOUND, "VI_ERROR_LIBRARY_NFOUND",
        "A code library required by VISA could not be located or loaded."),
    (ffi::VI_ERROR_NSUP_INTR, "VI_ERROR_NSUP_INTR",
        "The interface cannot generate an interrupt on the requested level or with the \
         requested statusID value."),
    (ffi::VI_ERROR_INV_LINE, "VI_ERROR_INV_LINE",
        "The value specified by the line parameter is invalid."),
    (ffi::VI_ERROR_FILE_ACCESS, "VI_ERROR_FILE_ACCESS",
        "An error occurred while trying to open the specified file. Possible reasons \
         include an invalid path or lack of access rights."),
    (ffi::VI_ERROR_FILE_IO, "VI_ERROR_FILE_IO",
        "An error occurred while performing I/O on the specified file."),
    (ffi::VI_ERROR_NSUP_LINE, "VI_ERROR_NSUP_LINE",
        "One of the specified lines (trigSrc or trigDest) is not supported by this VISA \
         implementation, or the combination of lines is not a valid mapping."),
    (ffi::VI_ERROR_NSUP_MECH, "VI_ERROR_NSUP_MECH",
        "The specified mechanism is not supported by the given event type."),
    (ffi::VI_ERROR_INTF_NUM_NCONFIG, "VI_ERROR_INTF_NUM_NCONFIG",
        "The interface type is valid but the specified interface number is not configured."),
    (ffi::VI_ERROR_CONN_LOST, "VI_ERROR_CONN_LOST",
        "The connection for the given session has been lost."),
    (ffi::VI_ERROR_MACHINE_NAVAIL, "VI_ERROR_MACHINE_NAVAIL",
        "The remote machine does not exist or is not accepting any connections."),
    (ffi::VI_ERROR_NPERMISSION, "VI_ERROR_NPERMISSION",
        "Access to the remote machine is denied."),
];

// --------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_object_message() {
        let err = check(-1073807346).unwrap_err();
        assert_eq!(
            err.to_string(),
            "VI_ERROR_INV_OBJECT (BFFF000E): The given session or object reference is invalid."
        );
        assert_eq!(err.status(), Some(ffi::VI_ERROR_INV_OBJECT));
    }

    #[test]
    fn every_catalogued_error_is_described() {
        for &(code, short_desc, long_desc) in STATUS_TABLE.iter().filter(|e| e.0 < 0) {
            let msg = check(code).unwrap_err().to_string();
            assert!(msg.starts_with(short_desc));
            assert!(msg.ends_with(long_desc));
            assert!(msg.contains(&format!("({:X})", code as u32)));
            assert!(msg.contains("(BFFF"));
        }
    }

    #[test]
    fn catalog_codes_are_unique() {
        assert_eq!(CATALOG.len(), STATUS_TABLE.len());
    }

    #[test]
    fn success_codes_pass_through() {
        assert_eq!(check(ffi::VI_SUCCESS).unwrap(), ffi::VI_SUCCESS);
        assert_eq!(check(ffi::VI_SUCCESS_TERM_CHAR).unwrap(), ffi::VI_SUCCESS_TERM_CHAR);
        assert_eq!(check(ffi::VI_WARN_CONFIG_NLOADED).unwrap(), ffi::VI_WARN_CONFIG_NLOADED);
        // Not in the catalog, but not an error either
        assert_eq!(check(0x1234).unwrap(), 0x1234);
        assert_eq!(check(i32::MAX).unwrap(), i32::MAX);
    }

    #[test]
    fn unknown_error_is_distinct() {
        let err = check(-1).unwrap_err();
        assert!(matches!(err, Error::UnknownStatus(-1)));
        assert_eq!(err.to_string(), "Unknown VISA status (FFFFFFFF)");
    }

    #[test]
    fn describe_success() {
        let (short_desc, _) = describe(ffi::VI_SUCCESS_TERM_CHAR).unwrap();
        assert_eq!(short_desc, "VI_SUCCESS_TERM_CHAR");
        assert!(describe(0x1234).is_none());
    }

    #[test]
    fn completions() {
        assert_eq!(Completion::from(ffi::VI_SUCCESS), Completion::Success);
        assert_eq!(Completion::from(ffi::VI_SUCCESS_TERM_CHAR), Completion::TermChar);
        assert_eq!(Completion::from(ffi::VI_SUCCESS_MAX_CNT), Completion::MaxCount);
        assert!(Completion::TermChar.is_end());
        assert!(!Completion::MaxCount.is_end());
        assert!(!Completion::Other(ffi::VI_SUCCESS_DEV_NPRESENT).is_end());
    }
}
