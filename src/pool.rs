// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::sync::atomic::Ordering::Relaxed;

use bytes::{
    Bytes,
    BytesMut,
};
use crossbeam_queue::ArrayQueue;
use tracing::instrument;

use crate::stats::STATS;

/// A bounded, lock-free free list of encode buffers.
#[derive(Debug)]
pub struct BufferPool {
    queue: ArrayQueue<BytesMut>,
}

impl BufferPool {
    /// Create a pool holding at most `capacity` idle buffers. A capacity of
    /// zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.max(1)),
        }
    }

    /// A zeroed buffer of exactly `size` bytes, reusing an idle allocation
    /// when there is one.
    #[instrument(level = "trace", skip(self))]
    pub fn acquire(&self, size: usize) -> BytesMut {
        match self.queue.pop() {
            | Some(mut buf) => {
                STATS.buffers_reused.fetch_add(1, Relaxed);
                buf.clear();
                buf.resize(size, 0);
                buf
            },
            | None => BytesMut::zeroed(size),
        }
    }

    /// Return a buffer to the pool. It is dropped if the pool is full.
    #[inline]
    pub fn release(&self, buf: BytesMut) {
        let _ = self.queue.push(buf);
    }

    /// Return a delivered buffer to the pool. Only succeeds if `bytes` is the
    /// last handle to its allocation; otherwise it is simply dropped.
    pub fn recycle(&self, bytes: Bytes) -> bool {
        match bytes.try_into_mut() {
            | Ok(buf) => self.queue.push(buf).is_ok(),
            | Err(_) => false,
        }
    }

    /// Idle buffers currently held.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}
