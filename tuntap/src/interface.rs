#![deny(missing_docs)]

use crate::linux;
use libc;
use std::{
    ffi::CString,
    io,
    mem::{self, MaybeUninit},
    net::Ipv4Addr,
};

/// Configures a network interface by name through `SIOCSIF*` ioctls on an `AF_INET` datagram
/// socket. Changing anything requires `CAP_NET_ADMIN`.
pub struct Interface {
    fd: libc::c_int,
    name: CString,
}

impl Interface {
    /// Opens the control socket used for `name`. The interface does not have to exist yet.
    pub fn new(name: &str) -> io::Result<Self> {
        let name = linux::interface_name(name)?;
        // This block must be marked as unsafe because it uses FFI with C code. It does not touch
        // any memory owned by Rust code.
        let fd = unsafe {
            // man 7 netdevice
            let fd = libc::socket(libc::AF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0);
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            fd
        };
        Ok(Self { fd, name })
    }

    /// Name of the interface being configured.
    pub fn name(&self) -> &str {
        self.name.to_str().unwrap_or_default()
    }

    fn ioctl(&self, request: libc::c_ulong, ifr: &mut linux::ifreq) -> io::Result<()> {
        // `ifr` is borrowed mutably for the duration of the call, the kernel reads and writes
        // only within it.
        let err = unsafe { libc::ioctl(self.fd, request, ifr as *mut linux::ifreq) };
        if err < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    fn flags(&self) -> io::Result<libc::c_short> {
        let mut ifr = linux::ifreq::with_name(&self.name);
        self.ioctl(linux::SIOCGIFFLAGS, &mut ifr)?;
        Ok(unsafe { ifr.ifr_ifru.ifru_flags })
    }

    /// Returns true if the interface is administratively up.
    pub fn is_up(&self) -> io::Result<bool> {
        Ok(self.flags()? & linux::IFF_UP == linux::IFF_UP)
    }

    /// Brings the interface up, keeping whatever other flags it has.
    pub fn set_up(&self) -> io::Result<()> {
        let flags = self.flags()?;
        let mut ifr = linux::ifreq::with_name(&self.name);
        ifr.ifr_ifru.ifru_flags = flags | linux::IFF_UP | linux::IFF_RUNNING;
        self.ioctl(linux::SIOCSIFFLAGS, &mut ifr)
    }

    /// Assigns `addr` to the interface.
    pub fn set_ipv4_addr(&self, addr: Ipv4Addr) -> io::Result<()> {
        let mut ifr = linux::ifreq::with_name(&self.name);
        ifr.ifr_ifru.ifru_addr = sockaddr(addr);
        self.ioctl(linux::SIOCSIFADDR, &mut ifr)
    }

    /// Sets the netmask of the address assigned with `set_ipv4_addr`.
    pub fn set_netmask(&self, netmask: Ipv4Addr) -> io::Result<()> {
        let mut ifr = linux::ifreq::with_name(&self.name);
        ifr.ifr_ifru.ifru_netmask = sockaddr(netmask);
        self.ioctl(linux::SIOCSIFNETMASK, &mut ifr)
    }

    /// Sets the interface MTU.
    pub fn set_mtu(&self, mtu: usize) -> io::Result<()> {
        let mut ifr = linux::ifreq::with_name(&self.name);
        ifr.ifr_ifru.ifru_mtu = mtu as libc::c_int;
        self.ioctl(linux::SIOCSIFMTU, &mut ifr)
    }
}

/// An `AF_INET` address laid out as the generic `sockaddr` the ifreq union holds.
fn sockaddr(addr: Ipv4Addr) -> libc::sockaddr {
    // sockaddr_in and sockaddr have the same size, and zero is a valid value for both.
    unsafe {
        let mut sin: libc::sockaddr_in = MaybeUninit::zeroed().assume_init();
        sin.sin_family = libc::AF_INET as libc::sa_family_t;
        sin.sin_addr = libc::in_addr {
            s_addr: u32::from(addr).to_be(),
        };
        mem::transmute::<libc::sockaddr_in, libc::sockaddr>(sin)
    }
}

impl Drop for Interface {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
