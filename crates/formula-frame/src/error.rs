#![forbid(unsafe_code)]

use crate::types::PrimitiveKind;

pub type FrameResult<T> = Result<T, FrameError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("chunk capacity exceeded: {requested} elements requested, ceiling is {ceiling}")]
    CapacityExceeded { requested: u64, ceiling: u64 },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: u64, len: u64 },

    #[error("{operation} is not supported for {kind} columns")]
    UnsupportedOperation {
        kind: PrimitiveKind,
        operation: &'static str,
    },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("rows {start}..{end} span more than one chunk (chunk capacity {chunk_capacity})")]
    RangeSpansMultipleChunks {
        start: u64,
        end: u64,
        chunk_capacity: u64,
    },

    #[error("index map has {map_len} entries but the source column only has {source_len} rows")]
    MapIndicesExceedSourceLength { map_len: u64, source_len: u64 },

    #[error("length mismatch: left operand has {left} rows, right operand has {right}")]
    LengthMismatch { left: u64, right: u64 },

    #[error("chunk layouts differ at chunk {chunk}: left has {left} rows there, right has {right}")]
    ChunkLayoutMismatch { chunk: usize, left: u64, right: u64 },

    #[error("division by zero in a {kind} column")]
    DivideByZero { kind: PrimitiveKind },

    #[error("{operation} overflowed in a {kind} column")]
    ArithmeticOverflow {
        kind: PrimitiveKind,
        operation: &'static str,
    },

    #[error("buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort { expected: u64, actual: u64 },

    #[cfg(feature = "arrow")]
    #[error("arrow error: {0}")]
    Arrow(String),
}

#[cfg(feature = "arrow")]
impl From<arrow_schema::ArrowError> for FrameError {
    fn from(err: arrow_schema::ArrowError) -> Self {
        FrameError::Arrow(err.to_string())
    }
}
