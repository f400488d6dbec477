/// Classifiers look at a decoded frame by reference and decide which kind of request, if any, it
/// carries. They never modify what they are shown and never build replies; that is left to the
/// processor the class is handed to.
pub mod classifier;

/// Processors are the unit of transformation. Each one takes a classified request by value and
/// returns the reply layer stack that answers it. Responders are processors, and new kinds of
/// request are answered by adding another processor next to them.
pub mod processor;

/// Startup configuration. Everything in here is validated once, before any device is opened, and
/// is immutable afterwards.
pub mod config;
pub use self::config::*;

/// The per-frame pipeline: decode, classify, respond, encode, with the counters that make the
/// silent drops observable.
pub mod engine;
pub use self::engine::*;

/// The dispatch loop and the seams to whatever supplies and accepts frames.
pub mod dispatch;
pub use self::dispatch::*;

mod pacing;
pub use self::pacing::*;

mod hex;
pub use self::hex::*;

/// Utility module
pub mod utils;
