//! Parser and reader tuning knobs.

use plat_core::EntityFilter;

/// Configuration for a [`StreamingParser`](crate::parser::StreamingParser).
///
/// Controls how output buffers are sized and when a buffer is handed
/// to the consumer. All values are read at construction and immutable
/// afterwards.
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Initial allocation of each output buffer in bytes.
    ///
    /// Default: 1 MiB.
    pub buffer_capacity: usize,

    /// Committed bytes that trigger handing the buffer off.
    ///
    /// Checked between entities, so a buffer can overshoot this by one
    /// entity's encoding. Default: 900 KiB, leaving headroom below the
    /// initial capacity for the entity in flight.
    pub flush_bytes: usize,

    /// Entities written since the last hand-off that trigger the next
    /// one regardless of byte count.
    ///
    /// Default: 10 000.
    pub flush_entities: usize,
}

impl ParserConfig {
    /// Default initial buffer allocation.
    pub const DEFAULT_BUFFER_CAPACITY: usize = 1024 * 1024;

    /// Default byte threshold for a buffer hand-off.
    pub const DEFAULT_FLUSH_BYTES: usize = 900 * 1024;

    /// Default entity-count threshold for a buffer hand-off.
    pub const DEFAULT_FLUSH_ENTITIES: usize = 10_000;

    /// The default configuration.
    pub fn new() -> Self {
        Self {
            buffer_capacity: Self::DEFAULT_BUFFER_CAPACITY,
            flush_bytes: Self::DEFAULT_FLUSH_BYTES,
            flush_entities: Self::DEFAULT_FLUSH_ENTITIES,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a [`Reader`](crate::reader::Reader).
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// Bytes requested from the source per read call.
    ///
    /// Default: 64 KiB.
    pub chunk_size: usize,

    /// Which entity kinds to materialize. Default: all of them.
    pub filter: EntityFilter,

    /// Tuning for the parser thread.
    pub parser: ParserConfig,
}

impl ReaderConfig {
    /// Default source read size.
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    /// The default configuration.
    pub fn new() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            filter: EntityFilter::all(),
            parser: ParserConfig::new(),
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::new()
    }
}
