//! Zero-copy export of chunk ranges in the standard columnar layout.
//!
//! An [`ArrayView`] borrows a chunk's value buffer and validity bitmap
//! directly; nothing is copied. The borrow keeps the container from being
//! mutated or dropped while the view is alive.
#![forbid(unsafe_code)]

use crate::container::ColumnContainer;
use crate::error::{FrameError, FrameResult};
use crate::types::{PrimitiveKind, PrimitiveType};

/// A contiguous range of one chunk, described the way columnar consumers
/// expect it: the full value buffer, the full validity bitmap (LSB-first, set
/// means valid), an element `offset` into both, `len` and `null_count`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrayView<'a, T> {
    values: &'a [T],
    validity: Option<&'a [u8]>,
    offset: usize,
    len: usize,
    null_count: usize,
}

impl<'a, T: PrimitiveType> ArrayView<'a, T> {
    /// A view of zero rows that references no buffers.
    pub fn empty() -> Self {
        Self {
            values: &[],
            validity: None,
            offset: 0,
            len: 0,
            null_count: 0,
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        T::KIND
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element offset of the first exported row within the buffers.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// The whole value buffer of the chunk; exported rows start at `offset`.
    pub fn values(&self) -> &'a [T] {
        self.values
    }

    /// The value buffer as raw little-endian bytes.
    pub fn value_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.values)
    }

    /// `None` only for the empty view.
    pub fn validity_bitmap(&self) -> Option<&'a [u8]> {
        self.validity
    }

    /// Validity of exported row `i` (relative to `offset`).
    pub fn is_valid(&self, i: usize) -> bool {
        debug_assert!(i < self.len, "ArrayView index out of bounds");
        let bit = self.offset + i;
        self.validity
            .is_some_and(|bitmap| (bitmap[bit / 8] >> (bit % 8)) & 1 == 1)
    }

    pub fn get(&self, i: usize) -> Option<T> {
        if i < self.len && self.is_valid(i) {
            Some(self.values[self.offset + i])
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<T>> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

impl<T: PrimitiveType> ColumnContainer<T> {
    /// Export rows `start..start + count`, which must lie within one chunk.
    pub fn export_range(&self, start: u64, count: u64) -> FrameResult<ArrayView<'_, T>> {
        if count == 0 {
            return Ok(ArrayView::empty());
        }
        let end = start
            .checked_add(count)
            .filter(|&end| end <= self.len())
            .ok_or(FrameError::IndexOutOfRange {
                index: start.saturating_add(count - 1),
                len: self.len(),
            })?;

        let capacity = self.chunk_capacity() as u64;
        let chunk = &self.chunks()[self.chunk_index_for_row(start)?];
        let offset = (start % capacity) as usize;
        let count = count as usize;
        if offset + count > chunk.len() {
            return Err(FrameError::RangeSpansMultipleChunks {
                start,
                end,
                chunk_capacity: capacity,
            });
        }

        Ok(ArrayView {
            values: chunk.values.as_slice(),
            validity: Some(chunk.validity.as_bytes()),
            offset,
            len: count,
            null_count: chunk.validity.count_nulls_in(offset, offset + count),
        })
    }

    /// One view per chunk, in row order.
    pub fn export_chunks(&self) -> impl Iterator<Item = ArrayView<'_, T>> + '_ {
        self.chunks().iter().map(|chunk| ArrayView {
            values: chunk.values.as_slice(),
            validity: Some(chunk.validity.as_bytes()),
            offset: 0,
            len: chunk.len(),
            null_count: chunk.validity.count_nulls(),
        })
    }
}
