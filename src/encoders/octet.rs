// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use bytes::Bytes;
use tracing::instrument;

use crate::{
    data::Data,
    encoding::{
        SinkEncoder,
        SliceWriter,
    },
    errs::EncodeError,
};

const NAME: &str = "octet";

/// Passes byte-like values through unchanged. Strings are written as their
/// UTF-8 bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct OctetEncoder;

impl OctetEncoder {
    pub fn new() -> Self {
        OctetEncoder
    }
}

fn octets(data: &dyn Data) -> Result<&[u8], EncodeError> {
    let value = data
        .value()
        .ok_or(EncodeError::InvalidState("value has been released"))?;

    if let Some(v) = value.downcast_ref::<Vec<u8>>() {
        return Ok(v.as_slice());
    }
    if let Some(v) = value.downcast_ref::<Bytes>() {
        return Ok(v.as_ref());
    }
    if let Some(v) = value.downcast_ref::<String>() {
        return Ok(v.as_bytes());
    }
    if let Some(v) = value.downcast_ref::<&'static str>() {
        return Ok(v.as_bytes());
    }

    Err(EncodeError::UnsupportedValue {
        encoder: NAME,
        type_name: data.type_name(),
    })
}

impl SinkEncoder for OctetEncoder {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(level = "trace", skip(self))]
    fn get_size(&self, data: &dyn Data) -> Result<usize, EncodeError> {
        Ok(octets(data)?.len())
    }

    #[instrument(level = "trace", skip(self, buf))]
    fn encode(&self, data: &dyn Data, buf: &mut [u8]) -> Result<(), EncodeError> {
        let src = octets(data)?;
        SliceWriter::with_required(buf, src.len())?.put_slice(src)
    }
}
