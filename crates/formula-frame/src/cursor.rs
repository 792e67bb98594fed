//! Row-cursor access for consumers that walk a column one row at a time.
#![forbid(unsafe_code)]

use crate::column::PrimitiveColumn;
use crate::error::FrameResult;
use crate::types::{ExternalScalarType, PrimitiveType, Scalar};
use std::cell::Cell;

/// Anything that knows which row it is currently on.
pub trait RowCursor {
    fn position(&self) -> u64;
}

impl RowCursor for Cell<u64> {
    fn position(&self) -> u64 {
        self.get()
    }
}

impl RowCursor for u64 {
    fn position(&self) -> u64 {
        *self
    }
}

/// Reads the value of one column at whatever row its cursor points to.
///
/// The getter holds no position of its own, so advancing the cursor (for
/// example through a shared [`Cell`]) is immediately visible.
#[derive(Debug)]
pub struct ValueGetter<'a, T: PrimitiveType, C: ?Sized> {
    column: &'a PrimitiveColumn<T>,
    cursor: &'a C,
}

impl<'a, T: PrimitiveType, C: RowCursor + ?Sized> ValueGetter<'a, T, C> {
    pub(crate) fn new(column: &'a PrimitiveColumn<T>, cursor: &'a C) -> Self {
        Self { column, cursor }
    }

    pub fn scalar_type(&self) -> ExternalScalarType {
        self.column.external_scalar_type()
    }

    pub fn get(&self) -> FrameResult<Option<T>> {
        self.column.get(self.cursor.position())
    }

    /// Null rows read as `T::default()`.
    pub fn get_or_default(&self) -> FrameResult<T> {
        self.get().map(Option::unwrap_or_default)
    }

    pub fn get_scalar(&self) -> FrameResult<Scalar> {
        self.column.get_scalar(self.cursor.position())
    }
}
