//! Typed, chunked in-memory columns for Formula.
//!
//! This crate focuses on:
//! - Homogeneous nullable columns over thirteen primitive element types, stored in
//!   chunks whose byte length never exceeds a signed 32-bit length.
//! - Vectorized arithmetic, bitwise, shift and comparison operators, dispatched once
//!   per element type and run chunk by chunk.
//! - Zero-copy export of chunk ranges in the standard columnar layout (value buffer,
//!   LSB-first validity bitmap, offset, length, null count), plus optional Arrow
//!   interop behind the `arrow` feature.

#![forbid(unsafe_code)]

mod any;
mod arithmetic;
#[cfg(feature = "arrow")]
mod arrow;
mod buffer;
mod column;
mod container;
mod cursor;
mod decimal;
mod error;
mod export;
mod options;
mod stats;
mod types;
mod validity;

pub use crate::any::AnyColumn;
pub use crate::arithmetic::{
    BinaryOperation, BooleanArithmetic, Char16Arithmetic, ColumnArithmetic, ComparisonOperation,
    DecimalArithmetic, Float32Arithmetic, Float64Arithmetic, Int16Arithmetic, Int32Arithmetic,
    Int64Arithmetic, Int8Arithmetic, Operation, OperationSupport, ShiftOperation,
    UInt16Arithmetic, UInt32Arithmetic, UInt64Arithmetic, UInt8Arithmetic,
};
pub use crate::buffer::ChunkBuffer;
pub use crate::column::{CumulativeOperation, GroupedValues, PrimitiveColumn};
pub use crate::container::{Chunk, ColumnContainer};
pub use crate::cursor::{RowCursor, ValueGetter};
pub use crate::decimal::{Decimal, ParseDecimalError};
pub use crate::error::{FrameError, FrameResult};
pub use crate::export::ArrayView;
pub use crate::options::{ColumnOptions, MAX_CHUNK_BYTES};
pub use crate::stats::ColumnStats;
pub use crate::types::{Char16, ExternalScalarType, PrimitiveKind, PrimitiveType, Scalar};
pub use crate::validity::ValidityMask;
