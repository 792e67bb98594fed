#![forbid(unsafe_code)]

/// Largest byte length a single chunk may occupy: the largest value of a
/// signed 32-bit length.
pub const MAX_CHUNK_BYTES: usize = i32::MAX as usize;

/// Storage options shared by every chunk of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Byte ceiling of a single chunk. Values above [`MAX_CHUNK_BYTES`] are
    /// clamped to it.
    pub max_chunk_bytes: usize,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            max_chunk_bytes: MAX_CHUNK_BYTES,
        }
    }
}

impl ColumnOptions {
    /// Options whose chunks hold at most `rows` elements of `T`.
    ///
    /// Mostly useful for exercising chunk rollover without allocating gigabytes.
    pub fn with_chunk_rows<T>(rows: usize) -> Self {
        Self {
            max_chunk_bytes: rows
                .saturating_mul(std::mem::size_of::<T>())
                .min(MAX_CHUNK_BYTES),
        }
    }

    /// Element capacity ceiling of one chunk of `T`.
    ///
    /// Always at least one, so a column can make progress even with a byte
    /// ceiling smaller than the element width.
    pub fn chunk_capacity<T>(&self) -> usize {
        let width = std::mem::size_of::<T>().max(1);
        (self.max_chunk_bytes.min(MAX_CHUNK_BYTES) / width).max(1)
    }
}
