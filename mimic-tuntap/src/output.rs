use mimic_runtime::FrameSink;
use std::io;
use tuntap::Device;

/// Writing half of a TUN/TAP device.
pub struct TunTapOutput {
    device: Device,
}

impl TunTapOutput {
    /// Writes to `device`.
    pub fn new(device: Device) -> Self {
        TunTapOutput { device }
    }

    /// The device being written.
    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl FrameSink for TunTapOutput {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        let written = self.device.send(frame)?;
        if written != frame.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("device took {} of {} bytes", written, frame.len()),
            ));
        }
        Ok(())
    }
}
