//! This crate connects the mimic dispatch loop to the `tuntap` crate.
#![deny(missing_docs)]

mod input;
mod output;
mod setup;

pub use input::TunTapInput;
pub use output::TunTapOutput;
pub use setup::open;
