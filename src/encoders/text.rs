// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::borrow::Cow;

use getset::CopyGetters;
use tracing::instrument;

use crate::{
    data::Data,
    encoding::{
        SinkEncoder,
        SliceWriter,
    },
    errs::EncodeError,
};

const NAME: &str = "text";

/// The line terminator used by [`TextEncoder::line_terminated`].
pub const LINE_TERMINATOR: &str = "\n";

/// Renders scalar values as text: strings verbatim, integers in decimal,
/// floats through their `Display` form and booleans as `true`/`false`.
/// An optional terminator is appended after every value.
#[derive(Debug, Default, Clone, Copy, CopyGetters)]
pub struct TextEncoder {
    #[getset(get_copy = "pub")]
    terminator: &'static str,
}

impl TextEncoder {
    pub fn new() -> Self {
        TextEncoder { terminator: "" }
    }

    /// A text encoder that ends every value with [`LINE_TERMINATOR`].
    pub fn line_terminated() -> Self {
        TextEncoder {
            terminator: LINE_TERMINATOR,
        }
    }

    pub fn with_terminator(terminator: &'static str) -> Self {
        TextEncoder { terminator }
    }
}

fn render(data: &dyn Data) -> Result<Cow<'_, str>, EncodeError> {
    let value = data
        .value()
        .ok_or(EncodeError::InvalidState("value has been released"))?;

    if let Some(v) = value.downcast_ref::<String>() {
        return Ok(Cow::Borrowed(v.as_str()));
    }
    if let Some(v) = value.downcast_ref::<&'static str>() {
        return Ok(Cow::Borrowed(*v));
    }
    if let Some(v) = value.downcast_ref::<bool>() {
        return Ok(Cow::Borrowed(if *v { "true" } else { "false" }));
    }

    macro_rules! display {
        ($($t:ty),*) => {
            $(
                if let Some(v) = value.downcast_ref::<$t>() {
                    return Ok(Cow::Owned(v.to_string()));
                }
            )*
        };
    }
    display!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

    Err(EncodeError::UnsupportedValue {
        encoder: NAME,
        type_name: data.type_name(),
    })
}

impl SinkEncoder for TextEncoder {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(level = "trace", skip(self))]
    fn get_size(&self, data: &dyn Data) -> Result<usize, EncodeError> {
        Ok(render(data)?.len() + self.terminator.len())
    }

    #[instrument(level = "trace", skip(self, buf))]
    fn encode(&self, data: &dyn Data, buf: &mut [u8]) -> Result<(), EncodeError> {
        let text = render(data)?;
        let mut writer = SliceWriter::with_required(buf, text.len() + self.terminator.len())?;
        writer.put_slice(text.as_bytes())?;
        writer.put_slice(self.terminator.as_bytes())
    }
}
