#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]

use libc;
use std::{
    ffi::{CStr, CString},
    io,
    mem::MaybeUninit,
    ptr,
};

/// Path of the clone device every TUN/TAP interface is created through.
pub(crate) const TUN_CLONE_DEVICE: &[u8] = b"/dev/net/tun\0";

/// `_IOW('T', 202, int)` from linux/if_tun.h
pub(crate) const TUNSETIFF: libc::c_ulong = 0x4004_54ca;

pub(crate) const IFF_TUN: libc::c_short = 0x0001;
pub(crate) const IFF_TAP: libc::c_short = 0x0002;
/// Frames are exchanged without the 4-byte packet information prefix.
pub(crate) const IFF_NO_PI: libc::c_short = 0x1000;

pub(crate) const IFF_UP: libc::c_short = 0x0001;
pub(crate) const IFF_RUNNING: libc::c_short = 0x0040;

pub(crate) const SIOCGIFFLAGS: libc::c_ulong = 0x8913;
pub(crate) const SIOCSIFFLAGS: libc::c_ulong = 0x8914;
pub(crate) const SIOCSIFADDR: libc::c_ulong = 0x8916;
pub(crate) const SIOCSIFNETMASK: libc::c_ulong = 0x891c;
pub(crate) const SIOCSIFMTU: libc::c_ulong = 0x8922;

#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct ifmap {
    pub(crate) mem_start: libc::c_ulong,
    pub(crate) mem_end: libc::c_ulong,
    pub(crate) base_addr: libc::c_ushort,
    pub(crate) irq: libc::c_uchar,
    pub(crate) dma: libc::c_uchar,
    pub(crate) port: libc::c_uchar,
}

#[repr(C)]
pub(crate) union ifru {
    pub(crate) ifru_addr: libc::sockaddr,
    pub(crate) ifru_netmask: libc::sockaddr,
    pub(crate) ifru_flags: libc::c_short,
    pub(crate) ifru_ivalue: libc::c_int,
    pub(crate) ifru_mtu: libc::c_int,
    pub(crate) ifru_map: ifmap,
    pub(crate) ifru_newname: [libc::c_char; libc::IFNAMSIZ],
}

#[repr(C)]
pub(crate) union ifrn {
    pub(crate) ifrn_name: [libc::c_char; libc::IFNAMSIZ],
}

#[repr(C)]
pub(crate) struct ifreq {
    pub(crate) ifr_ifrn: ifrn,
    pub(crate) ifr_ifru: ifru,
}

/// Checks that `name` fits in `ifr_name` with its terminating NUL.
pub(crate) fn interface_name(name: &str) -> io::Result<CString> {
    if name.is_empty() || name.len() >= libc::IFNAMSIZ {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("interface name {:?} must be 1 to 15 bytes", name),
        ));
    }
    CString::new(name).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

impl ifreq {
    /// A zeroed request addressed to `name`.
    pub(crate) fn with_name(name: &CStr) -> ifreq {
        // All-zero bytes are a valid value for every field of `ifreq`, and `name` is never longer
        // than `ifr_name` once it has passed `interface_name`.
        unsafe {
            let mut ifr: ifreq = MaybeUninit::zeroed().assume_init();
            let bytes = name.to_bytes();
            let len = bytes.len().min(libc::IFNAMSIZ - 1);
            ptr::copy_nonoverlapping(
                bytes.as_ptr() as *const libc::c_char,
                ifr.ifr_ifrn.ifrn_name.as_mut_ptr(),
                len,
            );
            ifr
        }
    }

    /// The name the kernel left in the request, which differs from the one asked for when that
    /// was a pattern such as `tap%d`.
    pub(crate) fn name(&self) -> String {
        let raw = unsafe { &self.ifr_ifrn.ifrn_name };
        let bytes: Vec<u8> = raw
            .iter()
            .take_while(|c| **c != 0)
            .map(|c| *c as u8)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
