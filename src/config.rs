/// Idle buffers a sink keeps around for reuse.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// The default ceiling on a single encoded value is 16MiB.
pub const DEFAULT_MAX_ENCODED_SIZE: usize = 2 << 23;

/// Sink options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// How many idle buffers the sink's pool holds.
    pub pool_capacity: usize,
    /// Values whose encoded size is larger than this are refused before a
    /// buffer is allocated.
    pub max_encoded_size: usize,
}

impl SinkConfig {
    pub fn new() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            max_encoded_size: DEFAULT_MAX_ENCODED_SIZE,
        }
    }

    pub fn pool_capacity(&mut self, pool_capacity: usize) -> &mut Self {
        self.pool_capacity = pool_capacity;
        self
    }

    pub fn max_encoded_size(&mut self, max_encoded_size: usize) -> &mut Self {
        self.max_encoded_size = max_encoded_size;
        self
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::new()
    }
}
