//! Arrow interoperability.
//!
//! Exported chunks hand their allocations to Arrow buffers without copying
//! the values. Boolean chunks are the exception: Arrow bit-packs boolean
//! values, so they are repacked.
#![forbid(unsafe_code)]

use crate::column::PrimitiveColumn;
use crate::container::{ColumnContainer, ContainerBuilder};
use crate::decimal::Decimal;
use crate::error::{FrameError, FrameResult};
use crate::options::ColumnOptions;
use crate::types::{PrimitiveKind, PrimitiveType};
use arrow_array::{
    Array, ArrayRef, BooleanArray, Decimal128Array, Float32Array, Float64Array, Int16Array,
    Int32Array, Int64Array, Int8Array, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow_buffer::{BooleanBuffer, Buffer, NullBuffer, ScalarBuffer};
use arrow_schema::{DataType, Field};
use std::sync::Arc;

impl PrimitiveKind {
    pub fn arrow_data_type(self) -> DataType {
        match self {
            PrimitiveKind::Boolean => DataType::Boolean,
            PrimitiveKind::Int8 => DataType::Int8,
            PrimitiveKind::UInt8 => DataType::UInt8,
            PrimitiveKind::Int16 => DataType::Int16,
            PrimitiveKind::UInt16 | PrimitiveKind::Char16 => DataType::UInt16,
            PrimitiveKind::Int32 => DataType::Int32,
            PrimitiveKind::UInt32 => DataType::UInt32,
            PrimitiveKind::Int64 => DataType::Int64,
            PrimitiveKind::UInt64 => DataType::UInt64,
            PrimitiveKind::Float32 => DataType::Float32,
            PrimitiveKind::Float64 => DataType::Float64,
            PrimitiveKind::Decimal => {
                DataType::Decimal128(Decimal::PRECISION, Decimal::SCALE)
            }
        }
    }
}

/// Reinterpret a vector of `T` as a vector of the Arrow native type with the
/// same layout. Only fails if the caller picked a mismatched target.
fn retype<T: PrimitiveType, N: bytemuck::Pod>(values: Vec<T>) -> FrameResult<Vec<N>> {
    bytemuck::allocation::try_cast_vec(values).map_err(|(err, _)| {
        FrameError::Arrow(format!("cannot reinterpret {} values: {err}", T::KIND))
    })
}

fn chunk_to_arrow<T: PrimitiveType>(
    values: Vec<T>,
    nulls: Option<NullBuffer>,
) -> FrameResult<ArrayRef> {
    macro_rules! primitive {
        ($array:ident, $native:ty) => {
            Arc::new($array::new(
                ScalarBuffer::from(retype::<T, $native>(values)?),
                nulls,
            )) as ArrayRef
        };
    }

    Ok(match T::KIND {
        PrimitiveKind::Boolean => {
            let bytes: Vec<u8> = retype(values)?;
            let bits = BooleanBuffer::from_iter(bytes.iter().map(|&b| b != 0));
            Arc::new(BooleanArray::new(bits, nulls))
        }
        PrimitiveKind::Int8 => primitive!(Int8Array, i8),
        PrimitiveKind::UInt8 => primitive!(UInt8Array, u8),
        PrimitiveKind::Int16 => primitive!(Int16Array, i16),
        PrimitiveKind::UInt16 | PrimitiveKind::Char16 => primitive!(UInt16Array, u16),
        PrimitiveKind::Int32 => primitive!(Int32Array, i32),
        PrimitiveKind::UInt32 => primitive!(UInt32Array, u32),
        PrimitiveKind::Int64 => primitive!(Int64Array, i64),
        PrimitiveKind::UInt64 => primitive!(UInt64Array, u64),
        PrimitiveKind::Float32 => primitive!(Float32Array, f32),
        PrimitiveKind::Float64 => primitive!(Float64Array, f64),
        PrimitiveKind::Decimal => Arc::new(
            Decimal128Array::new(ScalarBuffer::from(retype::<T, i128>(values)?), nulls)
                .with_precision_and_scale(Decimal::PRECISION, Decimal::SCALE)?,
        ),
    })
}

impl<T: PrimitiveType> ColumnContainer<T> {
    /// One Arrow array per chunk. Value and validity allocations move into
    /// the arrays; chunks without nulls export no validity buffer.
    pub fn into_arrow_arrays(self) -> FrameResult<Vec<ArrayRef>> {
        self.into_chunks()
            .into_iter()
            .map(|chunk| {
                let len = chunk.len();
                let null_count = chunk.validity.count_nulls();
                let values = chunk.values.into_vec();
                let nulls = (null_count > 0).then(|| {
                    let bits = Buffer::from_vec(chunk.validity.into_bytes());
                    NullBuffer::new(BooleanBuffer::new(bits, 0, len))
                });
                chunk_to_arrow(values, nulls)
            })
            .collect()
    }

    /// Import an Arrow array whose data type matches `T`.
    pub fn from_arrow(array: &dyn Array, options: ColumnOptions) -> FrameResult<Self> {
        let expected = T::KIND.arrow_data_type();
        if array.data_type() != &expected {
            return Err(FrameError::TypeMismatch {
                expected: T::KIND.name(),
                actual: arrow_kind_name(array.data_type()),
            });
        }

        let mut builder = ContainerBuilder::new(options);
        if let Some(bools) = array.as_any().downcast_ref::<BooleanArray>() {
            for i in 0..bools.len() {
                let value = bools
                    .is_valid(i)
                    .then(|| T::from_le_bytes(&[u8::from(bools.value(i))]));
                builder.push(value)?;
            }
            return Ok(builder.finish());
        }

        let data = array.to_data();
        let width = T::KIND.byte_width();
        let bytes = data.buffers()[0].as_slice();
        let start = data.offset() * width;
        for i in 0..array.len() {
            let value = array.is_valid(i).then(|| {
                let at = start + i * width;
                T::from_le_bytes(&bytes[at..at + width])
            });
            builder.push(value)?;
        }
        Ok(builder.finish())
    }
}

fn arrow_kind_name(data_type: &DataType) -> &'static str {
    PrimitiveKind::ALL
        .into_iter()
        .find(|kind| kind.arrow_data_type() == *data_type)
        .map_or("unsupported arrow type", PrimitiveKind::name)
}

impl<T: PrimitiveType> PrimitiveColumn<T> {
    /// Nullable Arrow field describing this column.
    pub fn arrow_field(&self) -> Field {
        Field::new(self.name(), T::KIND.arrow_data_type(), true)
    }

    pub fn into_arrow_arrays(self) -> FrameResult<Vec<ArrayRef>> {
        self.into_container().into_arrow_arrays()
    }

    pub fn from_arrow(
        name: impl Into<String>,
        array: &dyn Array,
        options: ColumnOptions,
    ) -> FrameResult<Self> {
        Ok(Self::from_container(
            name,
            ColumnContainer::from_arrow(array, options)?,
        ))
    }
}
