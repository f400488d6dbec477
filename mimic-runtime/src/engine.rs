use crate::classifier::{Classifier, Request, RequestClassifier};
use crate::config::Variant;
use crate::hex::HexDump;
use crate::processor::{ArpResponder, EchoResponder, Processor};
use mimic_packets::{decode, LayerStack, LinkType};
use tracing::{debug, info, trace, warn};

/// Running totals kept by the engine and the dispatch loop. `ignored` counts every frame that was
/// read successfully but owed no reply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub frames_received: u64,
    pub arp_replies: u64,
    pub echo_replies: u64,
    pub ignored: u64,
    pub read_errors: u64,
    pub encode_errors: u64,
    pub write_errors: u64,
}

#[derive(Clone, Copy)]
enum ReplyKind {
    Arp,
    Echo,
}

impl ReplyKind {
    fn label(self) -> &'static str {
        match self {
            ReplyKind::Arp => "ARP REPLY",
            ReplyKind::Echo => "ICMP REPLY",
        }
    }
}

/// Decode, classify, respond and encode for one frame at a time. Nothing is carried from one
/// frame to the next apart from the counters.
pub struct Engine {
    link_type: LinkType,
    classifier: RequestClassifier,
    arp_responder: Option<ArpResponder>,
    echo_responder: EchoResponder,
    stats: Stats,
}

impl Engine {
    pub fn new(link_type: LinkType, arp_responder: Option<ArpResponder>) -> Self {
        Engine {
            link_type,
            classifier: RequestClassifier::new(),
            arp_responder,
            echo_responder: EchoResponder::new(),
            stats: Stats::default(),
        }
    }

    /// TAP devices get an ARP responder for the configured identity, TUN devices only ever see
    /// IPv4 and answer pings.
    pub fn for_variant(variant: &Variant) -> Self {
        match variant {
            Variant::Tap(identity) => {
                Engine::new(LinkType::Ethernet, Some(ArpResponder::new(*identity)))
            }
            Variant::Tun => Engine::new(LinkType::Ipv4, None),
        }
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    /// Returns the encoded reply owed for `frame`, if any. Frames that are not requests, or
    /// whose reply cannot be encoded, yield `None`.
    pub fn respond(&mut self, frame: &[u8]) -> Option<Vec<u8>> {
        self.stats.frames_received += 1;

        let stack = decode(frame, self.link_type);
        let (kind, reply) = match self.classifier.classify(&stack) {
            Request::Arp(request) => match self.arp_responder.as_mut() {
                Some(responder) => {
                    info!("ARP REQUEST: {}", HexDump(frame));
                    (ReplyKind::Arp, responder.process(request))
                }
                None => {
                    debug!(len = frame.len(), "no ARP responder, ignoring ARP request");
                    self.stats.ignored += 1;
                    return None;
                }
            },
            Request::Echo(request) => {
                info!("ICMP REQUEST: {}", HexDump(frame));
                (ReplyKind::Echo, self.echo_responder.process(request))
            }
            Request::NoAction => {
                trace!(len = frame.len(), layers = stack.len(), "ignoring frame");
                self.stats.ignored += 1;
                return None;
            }
        };

        match reply {
            Some(reply) => self.encode(kind, &reply),
            None => {
                self.stats.ignored += 1;
                None
            }
        }
    }

    fn encode(&mut self, kind: ReplyKind, reply: &LayerStack) -> Option<Vec<u8>> {
        match reply.encode() {
            Ok(bytes) => {
                info!("{}: {}", kind.label(), HexDump(&bytes));
                match kind {
                    ReplyKind::Arp => self.stats.arp_replies += 1,
                    ReplyKind::Echo => self.stats.echo_replies += 1,
                }
                Some(bytes)
            }
            Err(e) => {
                warn!(error = %e, "failed to encode {}", kind.label());
                self.stats.encode_errors += 1;
                None
            }
        }
    }
}
