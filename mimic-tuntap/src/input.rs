use mimic_runtime::FrameSource;
use std::io;
use tuntap::Device;

/// Reading half of a TUN/TAP device.
pub struct TunTapInput {
    device: Device,
}

impl TunTapInput {
    /// Reads from `device`.
    pub fn new(device: Device) -> Self {
        TunTapInput { device }
    }

    /// The device being read.
    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl FrameSource for TunTapInput {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.device.recv(buf)
    }
}
