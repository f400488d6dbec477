#![deny(missing_docs)]

use crate::linux;
use libc;
use std::io;

/// What the device exchanges with user space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Bare IP packets.
    Tun,
    /// Ethernet frames.
    Tap,
}

impl Mode {
    fn flags(self) -> libc::c_short {
        match self {
            Mode::Tun => linux::IFF_TUN,
            Mode::Tap => linux::IFF_TAP,
        }
    }
}

/// An open TUN or TAP device. The interface exists for as long as this value does, unless it was
/// made persistent by someone else.
pub struct Device {
    fd: libc::c_int,
    name: String,
    mode: Mode,
}

impl Device {
    /// Creates (or attaches to) the interface `name`. Frames are read and written without the
    /// packet information prefix.
    pub fn new(name: &str, mode: Mode) -> io::Result<Self> {
        let c_name = linux::interface_name(name)?;

        // This block must be marked as unsafe because it uses FFI with C code. It does not touch
        // any memory owned by Rust code and returns an Err if the device cannot be opened.
        let fd = unsafe {
            // man 2 open
            let fd = libc::open(
                linux::TUN_CLONE_DEVICE.as_ptr() as *const libc::c_char,
                libc::O_RDWR | libc::O_CLOEXEC,
            );
            if fd < 0 {
                return Err(io::Error::last_os_error());
            }
            fd
        };
        // From here on `Drop` closes the descriptor if anything fails.
        let mut device = Device {
            fd,
            name: name.to_string(),
            mode,
        };

        let mut ifr = linux::ifreq::with_name(&c_name);
        ifr.ifr_ifru.ifru_flags = mode.flags() | linux::IFF_NO_PI;
        // The ifreq is owned by this frame and outlives the call. The kernel writes the final
        // interface name back into it.
        // Resources:
        // https://www.kernel.org/doc/Documentation/networking/tuntap.txt
        let err = unsafe { libc::ioctl(device.fd, linux::TUNSETIFF, &mut ifr as *mut linux::ifreq) };
        if err < 0 {
            return Err(io::Error::last_os_error());
        }
        device.name = ifr.name();

        Ok(device)
    }

    /// The interface name the kernel assigned.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is a TUN or a TAP device.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Another handle to the same device, sharing its queue. Used to read and write from
    /// different owners.
    pub fn try_clone(&self) -> io::Result<Self> {
        // man 2 fcntl, F_DUPFD_CLOEXEC
        let fd = unsafe { libc::fcntl(self.fd, libc::F_DUPFD_CLOEXEC, 0) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Device {
            fd,
            name: self.name.clone(),
            mode: self.mode,
        })
    }

    /// Blocks until one frame arrives and copies it into `frame`, returning its length. Frames
    /// longer than `frame` are truncated by the kernel.
    pub fn recv(&mut self, frame: &mut [u8]) -> io::Result<usize> {
        // This block is marked as unsafe because it uses FFI. The buffer is borrowed mutably for
        // the duration of the call and its length is passed along, so the kernel never writes
        // past it.
        unsafe {
            // man 2 read
            let bytes = libc::read(self.fd, frame.as_mut_ptr() as *mut _, frame.len());
            if bytes < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(bytes as usize)
            }
        }
    }

    /// Writes one frame. A device write either takes the whole frame or fails.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        // Note comment in `recv` call.
        unsafe {
            // man 2 write
            let bytes = libc::write(self.fd, frame.as_ptr() as *const _, frame.len());
            if bytes < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(bytes as usize)
            }
        }
    }

    /// Configures the device's non-blocking status.
    pub fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        // We handle fcntl's failures and do not borrow any Rust-owned memory.
        // man 2 fcntl
        unsafe {
            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 {
                return Err(io::Error::last_os_error());
            }
            let new_flags = if nonblocking {
                flags | libc::O_NONBLOCK
            } else {
                flags & (!libc::O_NONBLOCK)
            };
            let err = libc::fcntl(self.fd, libc::F_SETFL, new_flags);
            if err < 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
