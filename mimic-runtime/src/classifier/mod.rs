//! # What are they for?
//!
//! Classifiers are very similar to processors, but are used to differentiate a stream of frames.
//! As such, they take each decoded frame by reference and are not able to modify it. Classifiers
//! are able to return any type, but generally return an Enum that tells the engine which
//! processor, if any, the frame belongs to.
mod request;
pub use self::request::*;

/// Used by the engine to determine the kind of frame we have. Classifier::Class is then consumed
/// by the engine to hand the frame to the matching processor.
pub trait Classifier {
    type Packet;
    type Class: Sized;

    fn classify(&self, packet: &Self::Packet) -> Self::Class;
}
