// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use tracing::instrument;

use crate::{
    data::{
        downcast,
        Data,
        Record,
    },
    encoding::{
        SinkEncoder,
        SliceWriter,
    },
    errs::EncodeError,
};

const NAME: &str = "record";

/// Encodes a [`Record`] as its value in big-endian order followed by the raw
/// UTF-8 key.
///
/// ```text
/// +----------------+----------------+
/// | val (u64, BE)  | key (utf-8)    |
/// +----------------+----------------+
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordEncoder;

impl RecordEncoder {
    pub fn new() -> Self {
        RecordEncoder
    }
}

impl SinkEncoder for RecordEncoder {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(level = "trace", skip(self))]
    fn get_size(&self, data: &dyn Data) -> Result<usize, EncodeError> {
        let record = downcast::<Record>(data, NAME)?;
        Ok(size_of::<u64>() + record.key().len())
    }

    #[instrument(level = "trace", skip(self, buf))]
    fn encode(&self, data: &dyn Data, buf: &mut [u8]) -> Result<(), EncodeError> {
        let record = downcast::<Record>(data, NAME)?;
        let mut writer =
            SliceWriter::with_required(buf, size_of::<u64>() + record.key().len())?;
        writer.put_u64(record.val())?;
        writer.put_slice(record.key().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_record() {
        let encoder = RecordEncoder::new();
        let data = Record::new(0x0102, "key");
        assert_eq!(encoder.get_size(&data).unwrap(), 11);
        let encoded = encoder.encode_to_bytes(&data).unwrap();
        assert_eq!(&encoded[..], &[0u8, 0, 0, 0, 0, 0, 1, 2, b'k', b'e', b'y']);
    }

    #[test]
    fn test_empty_key() {
        let encoder = RecordEncoder::new();
        let data = Record::new(u64::MAX, "");
        assert_eq!(&encoder.encode_to_bytes(&data).unwrap()[..], &[0xffu8; 8]);
    }

    #[test]
    fn test_short_buffer() {
        let encoder = RecordEncoder::new();
        let data = Record::new(1, "abc");
        let mut buf = [0u8; 10];
        assert_eq!(
            encoder.encode(&data, &mut buf),
            Err(EncodeError::BufferTooSmall {
                required: 11,
                available: 10,
            })
        );
    }

    #[test]
    fn test_rejects_other_types() {
        let encoder = RecordEncoder::new();
        assert!(matches!(
            encoder.get_size(&String::from("nope")),
            Err(EncodeError::UnsupportedValue { encoder: "record", .. })
        ));
    }
}
