//! Pluggable, two-phase encoders for stream sinks.
//!
//! A [`SinkEncoder`] turns an opaque [`Data`] value into bytes. Callers ask
//! for the exact encoded size first, allocate a buffer of that size, then
//! have the encoder fill it. A [`Sink`] runs that protocol for every value
//! and hands finished buffers to a [`Destination`].

/// The encoder contract and a bounds-checked slice writer.
pub mod encoding;

/// Built-in formats: raw octets, text, keyed records and stream framing.
pub mod encoders;

pub mod config;
pub mod data;
pub mod errs;
pub mod pool;
pub mod registry;
pub mod sink;
pub mod stats;


pub use config::SinkConfig;
pub use data::{
    Data,
    Record,
    Slot,
};
pub use encoding::{
    SinkEncoder,
    SliceWriter,
};
pub use errs::{
    EncodeError,
    RegistryError,
    SinkError,
};
pub use registry::EncoderRegistry;
pub use sink::{
    ChannelDestination,
    Destination,
    MemoryDestination,
    Sink,
};
