// Copyright (c) Sienna Satterwhite, sink-encoder Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::sync::{
    atomic::AtomicUsize,
    LazyLock,
};

pub static STATS: LazyLock<Stats> = LazyLock::new(Stats::default);

/// Process-wide sink counters. Counts only ever grow.
#[derive(Debug, Default)]
pub struct Stats {
    /// Values delivered to a destination.
    pub values_encoded: AtomicUsize,
    /// Bytes delivered to a destination.
    pub bytes_encoded: AtomicUsize,
    pub encode_failures: AtomicUsize,
    /// Buffers served from a pool instead of a fresh allocation.
    pub buffers_reused: AtomicUsize,
}
