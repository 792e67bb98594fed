#![forbid(unsafe_code)]

use crate::buffer::ChunkBuffer;
use crate::error::{FrameError, FrameResult};
use crate::options::ColumnOptions;
use crate::types::PrimitiveType;
use crate::validity::ValidityMask;

/// One unit of allocation: a value buffer and its validity mask.
#[derive(Clone, Debug)]
pub struct Chunk<T> {
    pub(crate) values: ChunkBuffer<T>,
    pub(crate) validity: ValidityMask,
}

impl<T: PrimitiveType> Chunk<T> {
    fn new(ceiling: usize) -> Self {
        Self {
            values: ChunkBuffer::new(ceiling),
            validity: ValidityMask::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &ChunkBuffer<T> {
        &self.values
    }

    pub fn validity(&self) -> &ValidityMask {
        &self.validity
    }

    /// Value at `offset` within this chunk.
    pub fn get(&self, offset: usize) -> FrameResult<Option<T>> {
        if offset >= self.len() {
            return Err(FrameError::IndexOutOfRange {
                index: offset as u64,
                len: self.len() as u64,
            });
        }
        Ok(self.value_at(offset))
    }

    /// Unchecked form of [`Chunk::get`]; `offset` must be below `len()`.
    pub(crate) fn value_at(&self, offset: usize) -> Option<T> {
        self.validity
            .is_valid(offset)
            .then(|| self.values.as_slice()[offset])
    }

    fn push(&mut self, value: Option<T>) -> FrameResult<()> {
        self.values.append(value.unwrap_or_default())?;
        self.validity.push(value.is_some());
        Ok(())
    }

    fn push_many(&mut self, value: Option<T>, count: usize) -> FrameResult<()> {
        self.values.append_fill(value.unwrap_or_default(), count)?;
        self.validity.extend_constant(value.is_some(), count);
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
        self.validity.truncate(len);
    }
}

/// Chunks compare by their logical rows; bytes stored under null slots are
/// ignored.
impl<T: PrimitiveType> PartialEq for Chunk<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && (0..self.len()).all(|offset| self.value_at(offset) == other.value_at(offset))
    }
}

/// A nullable column of `T` split across fixed-capacity chunks.
///
/// Logical row `i` lives in chunk `i / ceiling` at offset `i % ceiling`, and
/// every chunk but the last is full. `null_count` always equals the number of
/// cleared validity bits across all chunks.
///
/// Equality is logical: two containers are equal when they hold the same
/// rows in the same chunk layout, whatever sits under their null slots.
#[derive(Clone, Debug)]
pub struct ColumnContainer<T> {
    chunks: Vec<Chunk<T>>,
    len: u64,
    null_count: u64,
    options: ColumnOptions,
}

impl<T: PrimitiveType> PartialEq for ColumnContainer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.null_count == other.null_count && self.chunks == other.chunks
    }
}

impl<T: PrimitiveType> Default for ColumnContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PrimitiveType> ColumnContainer<T> {
    pub fn new() -> Self {
        Self::with_options(ColumnOptions::default())
    }

    pub fn with_options(options: ColumnOptions) -> Self {
        Self {
            chunks: Vec::new(),
            len: 0,
            null_count: 0,
            options,
        }
    }

    /// A container of `len` nulls.
    pub fn with_len(len: u64, options: ColumnOptions) -> FrameResult<Self> {
        let mut container = Self::with_options(options);
        container.append_many(None, len)?;
        Ok(container)
    }

    pub fn from_values<I>(values: I, options: ColumnOptions) -> FrameResult<Self>
    where
        I: IntoIterator<Item = Option<T>>,
    {
        let mut builder = ContainerBuilder::new(options);
        for value in values {
            builder.push(value)?;
        }
        Ok(builder.finish())
    }

    /// Import `len` values from raw little-endian bytes and an optional packed
    /// validity bitmap (LSB-first, set = valid). Without a bitmap every row is
    /// valid.
    pub fn from_raw_bytes(
        values: &[u8],
        validity: Option<&[u8]>,
        len: u64,
        options: ColumnOptions,
    ) -> FrameResult<Self> {
        let width = T::KIND.byte_width();
        let needed = len.saturating_mul(width as u64);
        if (values.len() as u64) < needed {
            return Err(FrameError::BufferTooShort {
                expected: needed,
                actual: values.len() as u64,
            });
        }
        if let Some(bitmap) = validity {
            let needed = len.div_ceil(8);
            if (bitmap.len() as u64) < needed {
                return Err(FrameError::BufferTooShort {
                    expected: needed,
                    actual: bitmap.len() as u64,
                });
            }
        }

        let mut builder = ContainerBuilder::new(options);
        for (row, raw) in values.chunks_exact(width).take(len as usize).enumerate() {
            let valid = validity.map_or(true, |bitmap| (bitmap[row / 8] >> (row % 8)) & 1 == 1);
            let value = T::from_le_bytes(raw);
            builder.push(valid.then_some(value))?;
        }
        Ok(builder.finish())
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    pub fn options(&self) -> ColumnOptions {
        self.options
    }

    /// Element capacity ceiling of each chunk.
    pub fn chunk_capacity(&self) -> usize {
        self.options.chunk_capacity::<T>()
    }

    pub fn chunks(&self) -> &[Chunk<T>] {
        &self.chunks
    }

    pub(crate) fn chunks_mut(&mut self) -> &mut [Chunk<T>] {
        &mut self.chunks
    }

    pub(crate) fn into_chunks(self) -> Vec<Chunk<T>> {
        self.chunks
    }

    /// Resolve a logical row into `(chunk index, offset within chunk)`.
    fn locate(&self, index: u64) -> FrameResult<(usize, usize)> {
        if index >= self.len {
            return Err(FrameError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let capacity = self.chunk_capacity() as u64;
        Ok(((index / capacity) as usize, (index % capacity) as usize))
    }

    /// Index of the chunk holding logical row `index`.
    pub fn chunk_index_for_row(&self, index: u64) -> FrameResult<usize> {
        self.locate(index).map(|(chunk, _)| chunk)
    }

    /// Number of rows from `start` to the end of the chunk containing it.
    ///
    /// Bounds zero-copy export ranges; `0` for an empty container.
    pub fn max_contiguous_run(&self, start: u64) -> FrameResult<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        let (chunk, offset) = self.locate(start)?;
        Ok(self.chunks[chunk].len() - offset)
    }

    pub fn get(&self, index: u64) -> FrameResult<Option<T>> {
        let (chunk, offset) = self.locate(index)?;
        Ok(self.chunks[chunk].value_at(offset))
    }

    pub fn is_valid(&self, index: u64) -> FrameResult<bool> {
        let (chunk, offset) = self.locate(index)?;
        Ok(self.chunks[chunk].validity.is_valid(offset))
    }

    pub fn set(&mut self, index: u64, value: Option<T>) -> FrameResult<()> {
        let (chunk, offset) = self.locate(index)?;
        let chunk = &mut self.chunks[chunk];
        chunk.values.set(offset, value.unwrap_or_default())?;
        let was_valid = chunk.validity.set_valid(offset, value.is_some());
        match (was_valid, value.is_some()) {
            (true, false) => self.null_count += 1,
            (false, true) => self.null_count -= 1,
            _ => {}
        }
        Ok(())
    }

    /// Chunk with room for at least one more element, rolling over to a new
    /// chunk when the last one is full.
    fn writable_chunk(&mut self) -> &mut Chunk<T> {
        let capacity = self.chunk_capacity();
        if self.chunks.last().map_or(true, |chunk| chunk.len() >= capacity) {
            if !self.chunks.is_empty() {
                log::debug!(
                    "{} column rolled over to chunk {} at row {}",
                    T::KIND,
                    self.chunks.len(),
                    self.len
                );
            }
            self.chunks.push(Chunk::new(capacity));
        }
        let last = self.chunks.len() - 1;
        &mut self.chunks[last]
    }

    pub fn append(&mut self, value: Option<T>) -> FrameResult<()> {
        self.writable_chunk().push(value)?;
        self.len += 1;
        if value.is_none() {
            self.null_count += 1;
        }
        Ok(())
    }

    /// Append `count` copies of `value`, growing each chunk once.
    pub fn append_many(&mut self, value: Option<T>, count: u64) -> FrameResult<()> {
        let mut remaining = count;
        while remaining > 0 {
            let chunk = self.writable_chunk();
            let take = remaining.min(chunk.values.remaining() as u64);
            chunk.push_many(value, take as usize)?;
            remaining -= take;
            self.len += take;
            if value.is_none() {
                self.null_count += take;
            }
        }
        Ok(())
    }

    /// Grow with trailing nulls or truncate to `new_len` rows.
    pub fn resize(&mut self, new_len: u64) -> FrameResult<()> {
        if new_len >= self.len {
            return self.append_many(None, new_len - self.len);
        }

        let capacity = self.chunk_capacity() as u64;
        let keep_chunks = new_len.div_ceil(capacity) as usize;
        let removed_nulls: u64 = self
            .chunks
            .iter()
            .enumerate()
            .skip(keep_chunks.saturating_sub(1))
            .map(|(idx, chunk)| {
                let chunk_start = idx as u64 * capacity;
                let from = new_len.saturating_sub(chunk_start).min(chunk.len() as u64) as usize;
                chunk.validity.count_nulls_in(from, chunk.len()) as u64
            })
            .sum();

        self.chunks.truncate(keep_chunks);
        if let Some(last) = self.chunks.last_mut() {
            let tail = new_len - (keep_chunks as u64 - 1) * capacity;
            last.truncate(tail as usize);
        }
        self.len = new_len;
        self.null_count -= removed_nulls;
        Ok(())
    }

    /// Row `k` of the result is source row `map[k]`; with `invert`, the map is
    /// read back-to-front.
    pub fn clone_with_indices(&self, map: &[u64], invert: bool) -> FrameResult<Self> {
        self.clone_mapped(map.len() as u64, invert, |k| Ok(Some(map[k as usize])))
    }

    /// Like [`ColumnContainer::clone_with_indices`], but a null map entry
    /// produces a null row.
    pub fn clone_with_map(&self, map: &ColumnContainer<u64>, invert: bool) -> FrameResult<Self> {
        self.clone_mapped(map.len(), invert, |k| map.get(k))
    }

    fn clone_mapped<F>(&self, map_len: u64, invert: bool, lookup: F) -> FrameResult<Self>
    where
        F: Fn(u64) -> FrameResult<Option<u64>>,
    {
        if map_len > self.len {
            return Err(FrameError::MapIndicesExceedSourceLength {
                map_len,
                source_len: self.len,
            });
        }
        log::debug!("rebuilding {} column from a {map_len}-entry index map", T::KIND);

        let mut builder = ContainerBuilder::new(self.options);
        for k in 0..map_len {
            let position = if invert { map_len - 1 - k } else { k };
            let value = match lookup(position)? {
                Some(source) => self.get(source)?,
                None => None,
            };
            builder.push(value)?;
        }
        Ok(builder.finish())
    }

    /// Null count recomputed from the validity masks.
    pub fn count_nulls_by_scan(&self) -> u64 {
        self.chunks
            .iter()
            .map(|chunk| chunk.validity.count_nulls() as u64)
            .sum()
    }

    pub(crate) fn recount_nulls(&mut self) {
        self.null_count = self.count_nulls_by_scan();
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<T>> + '_ {
        self.chunks
            .iter()
            .flat_map(|chunk| (0..chunk.len()).map(move |offset| chunk.value_at(offset)))
    }
}

impl<T: PrimitiveType> FromIterator<Option<T>> for ColumnContainer<T> {
    /// Panics only if a chunk refuses a push, which the rollover logic rules out.
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let mut builder = ContainerBuilder::new(ColumnOptions::default());
        for value in iter {
            builder
                .push(value)
                .expect("chunk rollover leaves room for every push");
        }
        builder.finish()
    }
}

impl<T: PrimitiveType> From<Vec<T>> for ColumnContainer<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().map(Some).collect()
    }
}

impl<T: PrimitiveType> From<Vec<Option<T>>> for ColumnContainer<T> {
    fn from(values: Vec<Option<T>>) -> Self {
        values.into_iter().collect()
    }
}

/// Two-phase construction: chunks are filled without any null accounting,
/// then the null count is computed from the masks once in `finish`.
pub(crate) struct ContainerBuilder<T> {
    chunks: Vec<Chunk<T>>,
    capacity: usize,
    len: u64,
    options: ColumnOptions,
}

impl<T: PrimitiveType> ContainerBuilder<T> {
    pub(crate) fn new(options: ColumnOptions) -> Self {
        Self {
            chunks: Vec::new(),
            capacity: options.chunk_capacity::<T>(),
            len: 0,
            options,
        }
    }

    pub(crate) fn push(&mut self, value: Option<T>) -> FrameResult<()> {
        if self
            .chunks
            .last()
            .map_or(true, |chunk| chunk.len() >= self.capacity)
        {
            self.chunks.push(Chunk::new(self.capacity));
        }
        let last = self.chunks.len() - 1;
        self.chunks[last].push(value)?;
        self.len += 1;
        Ok(())
    }

    pub(crate) fn finish(self) -> ColumnContainer<T> {
        let mut container = ColumnContainer {
            chunks: self.chunks,
            len: self.len,
            null_count: 0,
            options: self.options,
        };
        container.recount_nulls();
        container
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ColumnOptions {
        ColumnOptions::with_chunk_rows::<i32>(4)
    }

    #[test]
    fn equality_ignores_values_under_null_rows() {
        let built = ColumnContainer::from_values(vec![Some(5), None, Some(7)], small()).unwrap();
        let mut dirty = built.clone();
        dirty.chunks_mut()[0].values.as_mut_slice()[1] = 99;

        assert_eq!(dirty, built);
        assert_ne!(
            dirty,
            ColumnContainer::from_values(vec![Some(5), Some(99), Some(7)], small()).unwrap()
        );
        assert_ne!(
            dirty,
            ColumnContainer::from_values(vec![Some(5), None], small()).unwrap()
        );
    }

    #[test]
    fn locate_splits_rows_by_ceiling() {
        let container = ColumnContainer::<i32>::from_values((0..10).map(Some), small()).unwrap();
        assert_eq!(container.locate(0), Ok((0, 0)));
        assert_eq!(container.locate(5), Ok((1, 1)));
        assert_eq!(container.locate(9), Ok((2, 1)));
        assert!(container.locate(10).is_err());
    }

    #[test]
    fn resize_truncates_across_chunks() {
        let mut container = ColumnContainer::<i32>::from_values(
            (0..10).map(|i| if i % 2 == 0 { None } else { Some(i) }),
            small(),
        )
        .unwrap();
        assert_eq!(container.null_count(), 5);

        container.resize(5).unwrap();
        assert_eq!(container.len(), 5);
        assert_eq!(container.chunks().len(), 2);
        assert_eq!(container.null_count(), 3);
        assert_eq!(container.null_count(), container.count_nulls_by_scan());

        container.resize(4).unwrap();
        assert_eq!(container.chunks().len(), 1);
        assert_eq!(container.null_count(), 2);

        container.resize(0).unwrap();
        assert!(container.chunks().is_empty());
        assert_eq!(container.null_count(), 0);
    }

    #[test]
    fn builder_counts_nulls_once() {
        let mut builder = ContainerBuilder::<u8>::new(ColumnOptions::with_chunk_rows::<u8>(3));
        for v in [Some(1), None, None, Some(4), None] {
            builder.push(v).unwrap();
        }
        let container = builder.finish();
        assert_eq!(container.len(), 5);
        assert_eq!(container.null_count(), 3);
        assert_eq!(container.chunks().len(), 2);
    }
}
