// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    fmt::Debug,
    mem,
    sync::{
        atomic::Ordering::Relaxed,
        Arc,
    },
};

use bytes::Bytes;
use crossbeam_channel::{
    bounded,
    unbounded,
    Receiver,
    Sender,
};
use parking_lot::Mutex;
use tracing::{
    instrument,
    warn,
};

use crate::{
    config::SinkConfig,
    data::Data,
    encoding::SinkEncoder,
    errs::{
        RegistryError,
        SinkError,
    },
    pool::BufferPool,
    registry::EncoderRegistry,
    stats::STATS,
};

/// Where a sink sends fully encoded values.
pub trait Destination: Debug + Send + Sync {
    fn deliver(&self, bytes: Bytes) -> Result<(), SinkError>;
}

/// Forwards encoded values over a crossbeam channel.
#[derive(Debug, Clone)]
pub struct ChannelDestination {
    tx: Sender<Bytes>,
}

impl ChannelDestination {
    pub fn new(tx: Sender<Bytes>) -> Self {
        Self { tx }
    }

    /// A destination whose channel holds at most `cap` undelivered values.
    /// Delivery blocks while the channel is full.
    pub fn bounded(cap: usize) -> (Self, Receiver<Bytes>) {
        let (tx, rx) = bounded(cap);
        (Self { tx }, rx)
    }

    pub fn unbounded() -> (Self, Receiver<Bytes>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl Destination for ChannelDestination {
    fn deliver(&self, bytes: Bytes) -> Result<(), SinkError> {
        self.tx.send(bytes).map_err(|_| SinkError::DestinationClosed)
    }
}

/// Collects encoded values in memory.
#[derive(Debug, Default)]
pub struct MemoryDestination {
    frames: Mutex<Vec<Bytes>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything delivered so far.
    pub fn take(&self) -> Vec<Bytes> {
        mem::take(&mut *self.frames.lock())
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }
}

impl Destination for MemoryDestination {
    fn deliver(&self, bytes: Bytes) -> Result<(), SinkError> {
        self.frames.lock().push(bytes);
        Ok(())
    }
}

/// Encodes values with one encoder and hands them to one destination.
///
/// Every value goes through the two-phase protocol: the encoder reports the
/// size, the sink takes an exactly-sized buffer from its pool, the encoder
/// fills it, and only a successfully filled buffer is delivered. Failed
/// buffers go back to the pool and are never delivered.
#[derive(Debug)]
pub struct Sink {
    encoder: Arc<dyn SinkEncoder>,
    destination: Arc<dyn Destination>,
    pool: BufferPool,
    max_encoded_size: usize,
}

impl Sink {
    pub fn new(
        encoder: Arc<dyn SinkEncoder>,
        destination: Arc<dyn Destination>,
        config: SinkConfig,
    ) -> Self {
        Self {
            encoder,
            destination,
            pool: BufferPool::new(config.pool_capacity),
            max_encoded_size: config.max_encoded_size,
        }
    }

    /// Build a sink around the encoder registered under `name`.
    pub fn from_registry(
        registry: &EncoderRegistry,
        name: &str,
        destination: Arc<dyn Destination>,
        config: SinkConfig,
    ) -> Result<Self, RegistryError> {
        Ok(Self::new(registry.get(name)?, destination, config))
    }

    pub fn encoder(&self) -> &Arc<dyn SinkEncoder> {
        &self.encoder
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Encode `data` without delivering it.
    #[instrument(level = "trace", skip(self), fields(format = self.encoder.name()))]
    pub fn encode(&self, data: &dyn Data) -> Result<Bytes, SinkError> {
        let size = self.encoder.get_size(data)?;
        if size > self.max_encoded_size {
            return Err(SinkError::ExceedsMaximum {
                size,
                max: self.max_encoded_size,
            });
        }

        let mut buf = self.pool.acquire(size);
        if let Err(e) = self.encoder.encode(data, &mut buf) {
            self.pool.release(buf);
            return Err(e.into());
        }

        Ok(buf.freeze())
    }

    /// Encode and deliver a single value, returning the number of bytes
    /// delivered.
    #[instrument(level = "debug", skip(self), fields(format = self.encoder.name()))]
    pub fn write(&self, data: &dyn Data) -> Result<usize, SinkError> {
        let bytes = match self.encode(data) {
            | Ok(bytes) => bytes,
            | Err(e) => {
                STATS.encode_failures.fetch_add(1, Relaxed);
                warn!(error = %e, "dropping value that failed to encode");
                return Err(e);
            },
        };

        let len = bytes.len();
        self.destination.deliver(bytes)?;

        STATS.values_encoded.fetch_add(1, Relaxed);
        STATS.bytes_encoded.fetch_add(len, Relaxed);
        Ok(len)
    }

    /// Write values in order, stopping at the first failure. The error
    /// carries how many values were delivered before it.
    #[instrument(level = "debug", skip(self, batch), fields(len = batch.len()))]
    pub fn write_batch(&self, batch: &[&dyn Data]) -> Result<usize, SinkError> {
        let mut total = 0;
        for (delivered, data) in batch.iter().enumerate() {
            match self.write(*data) {
                | Ok(len) => total += len,
                | Err(e) => {
                    return Err(SinkError::Batch {
                        delivered,
                        source: Box::new(e),
                    })
                },
            }
        }
        Ok(total)
    }

    /// Give a delivered buffer back once the destination is done with it.
    pub fn recycle(&self, bytes: Bytes) -> bool {
        self.pool.recycle(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{
            Record,
            Slot,
        },
        encoders::{
            FramedEncoder,
            OctetEncoder,
            RecordEncoder,
            TextEncoder,
        },
        errs::EncodeError,
    };

    fn memory_sink(encoder: Arc<dyn SinkEncoder>) -> (Sink, Arc<MemoryDestination>) {
        let destination = Arc::new(MemoryDestination::new());
        let sink = Sink::new(encoder, destination.clone(), SinkConfig::default());
        (sink, destination)
    }

    #[test]
    fn test_write_delivers_exact_bytes() {
        let (sink, destination) = memory_sink(Arc::new(TextEncoder::new()));
        assert_eq!(sink.write(&"ok").unwrap(), 2);
        assert_eq!(destination.take(), vec![Bytes::from_static(b"ok")]);
        assert!(destination.is_empty());
    }

    #[test]
    fn test_failed_value_is_not_delivered() {
        let (sink, destination) = memory_sink(Arc::new(RecordEncoder::new()));
        let err = sink.write(&String::from("not a record")).unwrap_err();
        assert!(matches!(
            err,
            SinkError::Encode(EncodeError::UnsupportedValue { encoder: "record", .. })
        ));

        let mut slot = Slot::new(Record::new(1, "a"));
        slot.release();
        assert!(matches!(
            sink.write(&slot),
            Err(SinkError::Encode(EncodeError::InvalidState(_)))
        ));
        assert!(destination.is_empty());
    }

    #[test]
    fn test_exceeds_maximum() {
        let destination = Arc::new(MemoryDestination::new());
        let mut config = SinkConfig::new();
        config.max_encoded_size(4);
        let sink = Sink::new(Arc::new(OctetEncoder::new()), destination.clone(), config);

        assert_eq!(sink.write(&vec![0u8; 4]).unwrap(), 4);
        assert!(matches!(
            sink.write(&vec![0u8; 5]),
            Err(SinkError::ExceedsMaximum { size: 5, max: 4 })
        ));
        assert_eq!(destination.len(), 1);
    }

    #[test]
    fn test_write_batch_stops_at_first_failure() {
        let (sink, destination) = memory_sink(Arc::new(TextEncoder::line_terminated()));
        let a = String::from("a");
        let b = 2u32;
        let bad = vec![0u8];
        let c = true;
        let batch: [&dyn Data; 4] = [&a, &b, &bad, &c];

        match sink.write_batch(&batch) {
            | Err(SinkError::Batch { delivered, source }) => {
                assert_eq!(delivered, 2);
                assert!(matches!(
                    *source,
                    SinkError::Encode(EncodeError::UnsupportedValue { .. })
                ));
            },
            | other => panic!("expected a batch error, got {:?}", other),
        }
        assert_eq!(
            destination.take(),
            vec![Bytes::from_static(b"a\n"), Bytes::from_static(b"2\n")]
        );

        let batch: [&dyn Data; 2] = [&a, &c];
        assert_eq!(sink.write_batch(&batch).unwrap(), 7);
    }

    #[test]
    fn test_channel_destination() {
        let (destination, rx) = ChannelDestination::unbounded();
        let sink = Sink::new(
            Arc::new(FramedEncoder::length_prefixed(RecordEncoder::new())),
            Arc::new(destination),
            SinkConfig::default(),
        );

        sink.write(&Record::new(1, "x")).unwrap();
        let frame = rx.try_recv().unwrap();
        assert_eq!(&frame[..4], &[0u8, 0, 0, 9]);
        assert_eq!(frame.len(), 13);

        drop(rx);
        assert!(matches!(
            sink.write(&Record::new(2, "y")),
            Err(SinkError::DestinationClosed)
        ));
    }

    #[test]
    fn test_bounded_channel_destination() {
        let (destination, rx) = ChannelDestination::bounded(1);
        let sink = Sink::new(
            Arc::new(TextEncoder::new()),
            Arc::new(destination),
            SinkConfig::default(),
        );

        assert_eq!(sink.write(&"a").unwrap(), 1);
        assert_eq!(rx.recv().unwrap(), Bytes::from_static(b"a"));
        assert_eq!(sink.write(&"bc").unwrap(), 2);
        assert_eq!(rx.len(), 1);

        drop(rx);
        assert!(matches!(sink.write(&"d"), Err(SinkError::DestinationClosed)));
    }

    #[test]
    fn test_pool_capacity_from_config() {
        let mut config = SinkConfig::new();
        config.pool_capacity(3).max_encoded_size(16);
        let sink = Sink::new(
            Arc::new(OctetEncoder::new()),
            Arc::new(MemoryDestination::new()),
            config,
        );
        assert_eq!(sink.pool().capacity(), 3);
    }

    #[test]
    fn test_stats_count_writes_and_failures() {
        let (sink, _destination) = memory_sink(Arc::new(RecordEncoder::new()));

        let failures = STATS.encode_failures.load(Relaxed);
        assert!(sink.write(&1u8).is_err());
        assert!(STATS.encode_failures.load(Relaxed) > failures);

        // other tests write concurrently, so only growth is checked
        let values = STATS.values_encoded.load(Relaxed);
        let bytes = STATS.bytes_encoded.load(Relaxed);
        assert_eq!(sink.write(&Record::new(1, "ab")).unwrap(), 10);
        assert!(STATS.values_encoded.load(Relaxed) > values);
        assert!(STATS.bytes_encoded.load(Relaxed) >= bytes + 10);
    }

    #[test]
    fn test_from_registry() {
        let registry = EncoderRegistry::with_defaults();
        let destination = Arc::new(MemoryDestination::new());
        let sink = Sink::from_registry(
            &registry,
            "framed-text",
            destination.clone(),
            SinkConfig::default(),
        )
        .unwrap();
        assert_eq!(sink.encoder().name(), "framed");

        sink.write(&"hi").unwrap();
        assert_eq!(destination.take(), vec![Bytes::from_static(b"\x00\x00\x00\x02hi")]);

        assert!(matches!(
            Sink::from_registry(&registry, "missing", destination, SinkConfig::default()),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_recycle_returns_buffer_to_pool() {
        let (sink, _destination) = memory_sink(Arc::new(OctetEncoder::new()));
        let bytes = sink.encode(&vec![1u8, 2, 3]).unwrap();
        assert!(sink.pool().is_empty());
        assert!(sink.recycle(bytes));
        assert_eq!(sink.pool().len(), 1);

        let again = sink.encode(&vec![4u8, 5]).unwrap();
        assert_eq!(&again[..], &[4u8, 5]);
        assert!(sink.pool().is_empty());
    }

    #[test]
    fn test_shared_encoder_between_sinks() {
        let encoder: Arc<dyn SinkEncoder> = Arc::new(TextEncoder::new());
        let (first, first_out) = memory_sink(encoder.clone());
        let (second, second_out) = memory_sink(encoder.clone());
        first.write(&1u8).unwrap();
        second.write(&2u8).unwrap();
        assert_eq!(first_out.take(), vec![Bytes::from_static(b"1")]);
        assert_eq!(second_out.take(), vec![Bytes::from_static(b"2")]);
        assert_eq!(Arc::strong_count(&encoder), 3);
    }
}
