// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use getset::{
    CopyGetters,
    Getters,
};
use tracing::instrument;

use crate::{
    data::Data,
    encoding::{
        SinkEncoder,
        SliceWriter,
    },
    errs::EncodeError,
};

const NAME: &str = "framed";

/// Size of the [`Framing::LengthPrefixed`] header.
pub const LENGTH_HEADER_SIZE: usize = size_of::<u32>();
/// Size of the [`Framing::Checksummed`] header.
pub const CHECKSUM_HEADER_SIZE: usize = size_of::<u32>() + size_of::<u32>();

/// How a [`FramedEncoder`] delimits each payload on a byte stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// A big-endian u32 payload length, then the payload.
    #[default]
    LengthPrefixed,
    /// A little-endian CRC32 of the payload and a little-endian u32 payload
    /// length, then the payload.
    Checksummed,
}

impl Framing {
    #[inline]
    pub fn header_size(&self) -> usize {
        match self {
            | Framing::LengthPrefixed => LENGTH_HEADER_SIZE,
            | Framing::Checksummed => CHECKSUM_HEADER_SIZE,
        }
    }
}

/// Wraps another encoder and frames its output so a reader on a stream can
/// find the boundaries between values.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct FramedEncoder<E> {
    #[getset(get = "pub")]
    inner: E,
    #[getset(get_copy = "pub")]
    framing: Framing,
}

impl<E: SinkEncoder> FramedEncoder<E> {
    pub fn new(inner: E, framing: Framing) -> Self {
        Self { inner, framing }
    }

    pub fn length_prefixed(inner: E) -> Self {
        Self::new(inner, Framing::LengthPrefixed)
    }

    pub fn checksummed(inner: E) -> Self {
        Self::new(inner, Framing::Checksummed)
    }

    /// The payload size, rejected if it cannot be described by the u32
    /// length field.
    fn payload_size(&self, data: &dyn Data) -> Result<usize, EncodeError> {
        let size = self.inner.get_size(data)?;
        if u32::try_from(size).is_err() {
            return Err(EncodeError::UnsupportedValue {
                encoder: NAME,
                type_name: data.type_name(),
            });
        }
        Ok(size)
    }
}

impl<E: SinkEncoder> SinkEncoder for FramedEncoder<E> {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(level = "trace", skip(self))]
    fn get_size(&self, data: &dyn Data) -> Result<usize, EncodeError> {
        Ok(self.framing.header_size() + self.payload_size(data)?)
    }

    #[instrument(level = "trace", skip(self, buf))]
    fn encode(&self, data: &dyn Data, buf: &mut [u8]) -> Result<(), EncodeError> {
        let size = self.payload_size(data)?;
        let header_size = self.framing.header_size();

        // payload_size already proved the length fits
        let len = size as u32;
        let mut writer = SliceWriter::with_required(buf, header_size + size)?;
        writer.reserve(header_size)?;
        let payload = writer.reserve(size)?;
        self.inner.encode(data, payload)?;
        let checksum = crc32fast::hash(payload);

        let mut header = SliceWriter::new(&mut buf[..header_size]);
        match self.framing {
            | Framing::LengthPrefixed => header.put_u32(len),
            | Framing::Checksummed => {
                header.put_u32_le(checksum)?;
                header.put_u32_le(len)
            },
        }
    }
}
