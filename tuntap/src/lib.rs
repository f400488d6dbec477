#![cfg(target_os = "linux")]
mod device;
mod interface;
mod linux;

pub use device::{Device, Mode};
pub use interface::Interface;
