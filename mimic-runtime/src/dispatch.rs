use crate::config::ResponderConfig;
use crate::engine::{Engine, Stats};
use crate::pacing::Pacer;
use std::io;
use tracing::warn;

/// Where inbound frames come from. `recv` blocks until one frame is available and copies it into
/// `buf`, returning its length.
pub trait FrameSource {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Where replies go. A frame is either written whole or not at all.
pub trait FrameSink {
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// What happened during one iteration of the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Replied,
    NoReply,
    ReadFailed,
    WriteFailed,
}

/// Reads one frame, answers it if it is owed an answer, repeats. Per-frame failures are logged and
/// counted, they never end the loop.
pub struct Dispatcher<Source: FrameSource, Sink: FrameSink> {
    source: Source,
    sink: Sink,
    engine: Engine,
    pacer: Pacer,
    buffer: Vec<u8>,
}

impl<Source: FrameSource, Sink: FrameSink> Dispatcher<Source, Sink> {
    pub fn new(source: Source, sink: Sink, engine: Engine, frame_capacity: usize) -> Self {
        Dispatcher {
            source,
            sink,
            engine,
            pacer: Pacer::disabled(),
            buffer: vec![0; frame_capacity],
        }
    }

    pub fn from_config(source: Source, sink: Sink, config: &ResponderConfig) -> Self {
        Dispatcher::new(
            source,
            sink,
            Engine::for_variant(&config.variant),
            config.frame_capacity(),
        )
        .pacer(Pacer::new(config.pacing))
    }

    pub fn pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn stats(&self) -> &Stats {
        self.engine.stats()
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn into_parts(self) -> (Source, Sink, Engine) {
        (self.source, self.sink, self.engine)
    }

    /// One unpaced iteration: read, respond, write.
    pub fn poll_once(&mut self) -> Outcome {
        let len = match self.source.recv(&mut self.buffer) {
            Ok(len) => len.min(self.buffer.len()),
            Err(e) => {
                warn!(error = %e, "failed to read frame");
                self.engine.stats_mut().read_errors += 1;
                return Outcome::ReadFailed;
            }
        };

        let reply = match self.engine.respond(&self.buffer[..len]) {
            Some(reply) => reply,
            None => return Outcome::NoReply,
        };

        match self.sink.send(&reply) {
            Ok(()) => Outcome::Replied,
            Err(e) => {
                warn!(error = %e, len = reply.len(), "failed to write reply");
                self.engine.stats_mut().write_errors += 1;
                Outcome::WriteFailed
            }
        }
    }

    /// Runs until the process is killed.
    pub fn run(&mut self) -> ! {
        loop {
            self.poll_once();
            self.pacer.wait();
        }
    }
}
