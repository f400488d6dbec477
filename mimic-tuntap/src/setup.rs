use crate::{TunTapInput, TunTapOutput};
use mimic_runtime::{ResponderConfig, Variant};
use std::io;
use tracing::info;
use tuntap::{Device, Interface, Mode};

fn mode(variant: &Variant) -> Mode {
    match variant {
        Variant::Tap(_) => Mode::Tap,
        Variant::Tun => Mode::Tun,
    }
}

/// Creates the device described by `config`, sets its MTU, assigns its address and brings it up.
/// Returns a reading and a writing handle to it.
pub fn open(config: &ResponderConfig) -> io::Result<(TunTapInput, TunTapOutput)> {
    let device = Device::new(&config.interface.name, mode(&config.variant))?;

    let interface = Interface::new(device.name())?;
    interface.set_mtu(config.mtu)?;
    interface.set_ipv4_addr(config.interface.address)?;
    interface.set_netmask(config.interface.netmask())?;
    interface.set_up()?;

    info!(
        name = device.name(),
        mode = ?device.mode(),
        address = %config.interface.address,
        prefix_len = config.interface.prefix_len,
        mtu = config.mtu,
        "interface is up"
    );

    let output = TunTapOutput::new(device.try_clone()?);
    Ok((TunTapInput::new(device), output))
}
