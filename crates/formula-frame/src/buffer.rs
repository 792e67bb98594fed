#![forbid(unsafe_code)]

use crate::error::{FrameError, FrameResult};
use crate::types::PrimitiveType;

/// A growable, contiguous buffer of one primitive type with a hard element
/// ceiling.
///
/// The ceiling keeps `byte_len()` within a signed 32-bit length. Growth doubles
/// the allocation (or jumps straight to the needed size) and never exceeds the
/// ceiling; running into the ceiling is always reported as
/// [`FrameError::CapacityExceeded`].
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkBuffer<T> {
    values: Vec<T>,
    ceiling: usize,
}

impl<T: PrimitiveType> ChunkBuffer<T> {
    pub fn new(ceiling: usize) -> Self {
        Self {
            values: Vec::new(),
            ceiling,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Maximum number of elements this buffer may ever hold.
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Number of elements the current allocation can hold without growing.
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    pub fn remaining(&self) -> usize {
        self.ceiling - self.values.len()
    }

    pub fn byte_len(&self) -> usize {
        std::mem::size_of_val(self.values.as_slice())
    }

    pub fn append(&mut self, value: T) -> FrameResult<()> {
        if self.values.len() == self.ceiling {
            return Err(self.exceeded(1));
        }
        self.grow_for(self.values.len() + 1);
        self.values.push(value);
        Ok(())
    }

    /// Append `count` copies of `value`.
    pub fn append_fill(&mut self, value: T, count: usize) -> FrameResult<()> {
        self.ensure_capacity(count)?;
        self.values.resize(self.values.len() + count, value);
        Ok(())
    }

    /// Guarantee room for `additional` more elements without further growth.
    pub fn ensure_capacity(&mut self, additional: usize) -> FrameResult<()> {
        let needed = self
            .values
            .len()
            .checked_add(additional)
            .filter(|&needed| needed <= self.ceiling)
            .ok_or_else(|| self.exceeded(additional))?;
        self.grow_for(needed);
        Ok(())
    }

    pub fn get(&self, index: usize) -> FrameResult<T> {
        self.values
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn set(&mut self, index: usize, value: T) -> FrameResult<()> {
        let len = self.values.len();
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(FrameError::IndexOutOfRange {
                index: index as u64,
                len: len as u64,
            }),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Raw bytes of the stored values in host order (little-endian on every
    /// supported target).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    pub(crate) fn into_vec(self) -> Vec<T> {
        self.values
    }

    fn grow_for(&mut self, needed: usize) {
        let current = self.values.capacity();
        if needed <= current {
            return;
        }
        let target = needed.max(current.saturating_mul(2)).min(self.ceiling);
        log::trace!(
            "growing {} chunk buffer from {current} to {target} elements",
            T::KIND
        );
        self.values.reserve_exact(target - self.values.len());
    }

    fn exceeded(&self, additional: usize) -> FrameError {
        FrameError::CapacityExceeded {
            requested: (self.values.len() as u64).saturating_add(additional as u64),
            ceiling: self.ceiling as u64,
        }
    }

    fn out_of_range(&self, index: usize) -> FrameError {
        FrameError::IndexOutOfRange {
            index: index as u64,
            len: self.values.len() as u64,
        }
    }
}
