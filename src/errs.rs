// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use thiserror::Error;

/// Failures of the two-phase encode protocol. Buffer contents are
/// unspecified after any of these and must never be transmitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("value of type {type_name} is not supported by the {encoder} encoder")]
    UnsupportedValue {
        encoder: &'static str,
        type_name: &'static str,
    },
    #[error("data reference is not usable: {0}")]
    InvalidState(&'static str),
    #[error("buffer too small: {required} bytes required, {available} available")]
    BufferTooSmall { required: usize, available: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("an encoder named {0:?} is already registered")]
    AlreadyRegistered(String),
    #[error("no encoder named {0:?}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("encoded value is {size} bytes, the sink accepts at most {max}")]
    ExceedsMaximum { size: usize, max: usize },
    #[error("destination is closed")]
    DestinationClosed,
    #[error("batch stopped after {delivered} values")]
    Batch {
        delivered: usize,
        #[source]
        source: Box<SinkError>,
    },
}
