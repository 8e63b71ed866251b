// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::{
    any::{
        type_name,
        Any,
    },
    fmt::Debug,
};

use bytes::Bytes;
use getset::{
    CopyGetters,
    Getters,
};

use crate::errs::EncodeError;

/// An opaque, read-only application value handed to an encoder.
///
/// Encoders only ever borrow a [`Data`] for the length of a single call and
/// must not hold on to it afterwards. A value that has been released by its
/// producer returns `None` from [`Data::value`].
pub trait Data: Debug + Send + Sync {
    /// The underlying value, or `None` once the value has been released.
    fn value(&self) -> Option<&dyn Any>;

    /// Name of the concrete value type, used in error reports.
    fn type_name(&self) -> &'static str;
}

macro_rules! impl_data {
    ($($t:ty),* $(,)?) => {
        $(
            impl Data for $t {
                #[inline]
                fn value(&self) -> Option<&dyn Any> {
                    Some(self as &dyn Any)
                }

                #[inline]
                fn type_name(&self) -> &'static str {
                    type_name::<$t>()
                }
            }
        )*
    };
}

impl_data!(
    String,
    &'static str,
    Vec<u8>,
    Bytes,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    Record,
);

/// Borrow the concrete value behind `data`.
///
/// A released value is an [`EncodeError::InvalidState`], a value of any other
/// type is an [`EncodeError::UnsupportedValue`] attributed to `encoder`.
#[inline]
pub fn downcast<'a, T: Any>(
    data: &'a dyn Data,
    encoder: &'static str,
) -> Result<&'a T, EncodeError> {
    let value = data
        .value()
        .ok_or(EncodeError::InvalidState("value has been released"))?;

    value
        .downcast_ref::<T>()
        .ok_or(EncodeError::UnsupportedValue {
            encoder,
            type_name: data.type_name(),
        })
}

/// A keyed message: a 64-bit value plus a UTF-8 key.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Record {
    #[getset(get_copy = "pub")]
    val: u64,
    #[getset(get = "pub")]
    key: String,
}

impl Record {
    pub fn new(val: u64, key: impl Into<String>) -> Self {
        Self {
            val,
            key: key.into(),
        }
    }
}

/// A producer-owned holder whose value can be released while references to
/// the slot are still around. Encoding a released slot fails with
/// [`EncodeError::InvalidState`].
#[derive(Debug)]
pub struct Slot<T> {
    inner: Option<T>,
}

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Self { inner: Some(value) }
    }

    /// Drop the held value, returning it to the caller.
    pub fn release(&mut self) -> Option<T> {
        self.inner.take()
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }
}

impl<T> Data for Slot<T>
where
    T: Any + Debug + Send + Sync,
{
    fn value(&self) -> Option<&dyn Any> {
        self.inner.as_ref().map(|v| v as &dyn Any)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}
