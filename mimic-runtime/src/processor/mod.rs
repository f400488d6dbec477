//! # What are they for?
//!
//! Processors take one classified request by value and produce what should go back out, or
//! `None` when nothing should. Responders never see raw bytes: they are handed decoded headers
//! and return a reply layer stack, which the engine encodes.
mod arp_responder;
pub use self::arp_responder::*;

mod echo_responder;
pub use self::echo_responder::*;

pub trait Processor {
    type Input: Send + Clone;
    type Output: Send + Clone;

    fn process(&mut self, packet: Self::Input) -> Option<Self::Output>;
}
