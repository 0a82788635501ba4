// visa-io/src/mock.rs
//
// Copyright (c) 2026, Frank Pagliughi
//
// Licensed under the MIT license:
//   <LICENSE or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according
// to those terms.
//
//! A scripted driver for unit tests.
//!
//! It hands out session numbers, keeps a log of every native call, and
//! replays canned responses for find, read, and write.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    ffi::CStr,
};

use crate::driver::{DescriptorBuf, Driver};
use crate::ffi::{
    self, ViAccessMode, ViChar, ViFindList, ViObject, ViSession, ViStatus, ViUInt16, ViUInt32,
};

/// A native call, as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    OpenDefaultRm,
    Open { sesn: ViSession, name: String, mode: ViAccessMode, timeout: ViUInt32 },
    ParseRsrc(String),
    FindRsrc(String),
    FindNext(ViFindList),
    Close(ViObject),
    Write(Vec<u8>),
    Read(usize),
    GpibControlRen(ViUInt16),
}

#[derive(Debug, Default)]
pub struct MockDriver {
    next_handle: Cell<ViObject>,
    pub calls: RefCell<Vec<Call>>,
    /// Descriptors returned by find, in order.
    pub resources: RefCell<Vec<String>>,
    /// Added to the match count reported by find.
    pub extra_count: Cell<ViUInt32>,
    /// Status returned by the initial find, if not success.
    pub find_status: Cell<Option<ViStatus>>,
    /// (status, data) returned by successive reads.
    pub reads: RefCell<VecDeque<(ViStatus, Vec<u8>)>>,
    /// If set, the most bytes a single write will accept.
    pub write_limit: Cell<Option<usize>>,
    /// Status returned by every open.
    pub open_status: Cell<ViStatus>,
    /// Status returned by every close.
    pub close_status: Cell<ViStatus>,
    found: RefCell<VecDeque<String>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            next_handle: Cell::new(100),
            ..Default::default()
        }
    }

    pub fn with_resources(names: &[&str]) -> Self {
        let drv = Self::new();
        *drv.resources.borrow_mut() = names.iter().map(|s| s.to_string()).collect();
        drv
    }

    pub fn push_read(&self, status: ViStatus, data: &[u8]) {
        self.reads.borrow_mut().push_back((status, data.to_vec()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn closes_of(&self, vi: ViObject) -> usize {
        self.count(|c| *c == Call::Close(vi))
    }

    fn handle(&self) -> ViObject {
        let h = self.next_handle.get();
        self.next_handle.set(h + 1);
        h
    }

    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

fn fill(desc: &mut DescriptorBuf, name: &str) {
    desc.iter_mut().for_each(|c| *c = 0);
    for (dst, src) in desc.iter_mut().zip(name.bytes()) {
        *dst = src as ViChar;
    }
}

fn to_string(s: &CStr) -> String {
    s.to_string_lossy().into_owned()
}

impl Driver for MockDriver {
    fn open_default_rm(&self, sesn: &mut ViSession) -> ViStatus {
        self.log(Call::OpenDefaultRm);
        *sesn = self.handle();
        ffi::VI_SUCCESS
    }

    fn open(
        &self,
        sesn: ViSession,
        name: &CStr,
        mode: ViAccessMode,
        timeout: ViUInt32,
        vi: &mut ViSession,
    ) -> ViStatus {
        self.log(Call::Open { sesn, name: to_string(name), mode, timeout });
        let status = self.open_status.get();
        if status >= 0 {
            *vi = self.handle();
        }
        status
    }

    fn parse_rsrc(
        &self,
        _sesn: ViSession,
        name: &CStr,
        intf_type: &mut ViUInt16,
        intf_num: &mut ViUInt16,
    ) -> ViStatus {
        let name = to_string(name);
        self.log(Call::ParseRsrc(name.clone()));
        if let Some(rest) = name.strip_prefix("GPIB") {
            *intf_type = ffi::VI_INTF_GPIB;
            *intf_num = rest.split("::").next().and_then(|n| n.parse().ok()).unwrap_or(0);
            ffi::VI_SUCCESS
        }
        else if let Some(rest) = name.strip_prefix("TCPIP") {
            *intf_type = ffi::VI_INTF_TCPIP;
            *intf_num = rest.split("::").next().and_then(|n| n.parse().ok()).unwrap_or(0);
            ffi::VI_SUCCESS
        }
        else {
            ffi::VI_ERROR_INV_RSRC_NAME
        }
    }

    fn find_rsrc(
        &self,
        _sesn: ViSession,
        expr: &CStr,
        find_list: &mut ViFindList,
        ret_cnt: &mut ViUInt32,
        desc: &mut DescriptorBuf,
    ) -> ViStatus {
        self.log(Call::FindRsrc(to_string(expr)));
        if let Some(status) = self.find_status.get() {
            return status;
        }
        let mut found: VecDeque<String> = self.resources.borrow().iter().cloned().collect();
        *ret_cnt = found.len() as ViUInt32 + self.extra_count.get();
        *find_list = self.handle();
        if let Some(first) = found.pop_front() {
            fill(desc, &first);
        }
        *self.found.borrow_mut() = found;
        ffi::VI_SUCCESS
    }

    fn find_next(&self, find_list: ViFindList, desc: &mut DescriptorBuf) -> ViStatus {
        self.log(Call::FindNext(find_list));
        match self.found.borrow_mut().pop_front() {
            Some(name) => {
                fill(desc, &name);
                ffi::VI_SUCCESS
            }
            None => ffi::VI_ERROR_RSRC_NFOUND,
        }
    }

    fn close(&self, vi: ViObject) -> ViStatus {
        self.log(Call::Close(vi));
        self.close_status.get()
    }

    fn write(&self, _vi: ViSession, buf: &[u8], ret_cnt: &mut ViUInt32) -> ViStatus {
        self.log(Call::Write(buf.to_vec()));
        let n = self.write_limit.get().map_or(buf.len(), |lim| lim.min(buf.len()));
        *ret_cnt = n as ViUInt32;
        ffi::VI_SUCCESS
    }

    fn read(&self, _vi: ViSession, buf: &mut [u8], ret_cnt: &mut ViUInt32) -> ViStatus {
        self.log(Call::Read(buf.len()));
        match self.reads.borrow_mut().pop_front() {
            Some((status, data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                *ret_cnt = n as ViUInt32;
                status
            }
            None => {
                *ret_cnt = 0;
                ffi::VI_ERROR_TMO
            }
        }
    }

    fn gpib_control_ren(&self, _vi: ViSession, mode: ViUInt16) -> ViStatus {
        self.log(Call::GpibControlRen(mode));
        ffi::VI_SUCCESS
    }
}
