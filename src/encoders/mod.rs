// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

//! Concrete [`SinkEncoder`](crate::encoding::SinkEncoder) formats.

mod framed;
mod octet;
mod record;
mod text;

pub use framed::{
    FramedEncoder,
    Framing,
    CHECKSUM_HEADER_SIZE,
    LENGTH_HEADER_SIZE,
};
pub use octet::OctetEncoder;
pub use record::RecordEncoder;
pub use text::{
    TextEncoder,
    LINE_TERMINATOR,
};
