/// In-memory frame sources and sinks for exercising the dispatch loop without a device.
pub mod test;
