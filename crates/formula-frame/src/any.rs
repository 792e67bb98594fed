#![forbid(unsafe_code)]

use crate::arithmetic::{BinaryOperation, ComparisonOperation, ShiftOperation};
use crate::column::PrimitiveColumn;
use crate::decimal::Decimal;
use crate::error::{FrameError, FrameResult};
use crate::options::ColumnOptions;
use crate::stats::ColumnStats;
use crate::types::{Char16, ExternalScalarType, PrimitiveKind, PrimitiveType, Scalar};
use std::any::Any;

macro_rules! any_column {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// A column whose element type is only known at runtime.
        #[derive(Clone, Debug, PartialEq)]
        pub enum AnyColumn {
            $($variant(PrimitiveColumn<$ty>),)*
        }

        $(
            impl From<PrimitiveColumn<$ty>> for AnyColumn {
                fn from(column: PrimitiveColumn<$ty>) -> Self {
                    AnyColumn::$variant(column)
                }
            }
        )*

        impl AnyColumn {
            /// An empty column of the given kind.
            pub fn empty(kind: PrimitiveKind, name: impl Into<String>, options: ColumnOptions) -> Self {
                match kind {
                    $(PrimitiveKind::$variant => {
                        AnyColumn::$variant(PrimitiveColumn::with_options(name, options))
                    })*
                }
            }

            pub fn kind(&self) -> PrimitiveKind {
                match self {
                    $(AnyColumn::$variant(c) => c.kind(),)*
                }
            }

            pub fn name(&self) -> &str {
                match self {
                    $(AnyColumn::$variant(c) => c.name(),)*
                }
            }

            pub fn rename(&mut self, name: impl Into<String>) {
                match self {
                    $(AnyColumn::$variant(c) => c.rename(name),)*
                }
            }

            pub fn len(&self) -> u64 {
                match self {
                    $(AnyColumn::$variant(c) => c.len(),)*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn null_count(&self) -> u64 {
                match self {
                    $(AnyColumn::$variant(c) => c.null_count(),)*
                }
            }

            pub fn external_scalar_type(&self) -> ExternalScalarType {
                self.kind().external_scalar_type()
            }

            pub fn get_scalar(&self, index: u64) -> FrameResult<Scalar> {
                match self {
                    $(AnyColumn::$variant(c) => c.get_scalar(index),)*
                }
            }

            pub fn set_scalar(&mut self, index: u64, value: &Scalar) -> FrameResult<()> {
                match self {
                    $(AnyColumn::$variant(c) => c.set_scalar(index, value),)*
                }
            }

            pub fn append_scalar(&mut self, value: &Scalar) -> FrameResult<()> {
                match self {
                    $(AnyColumn::$variant(c) => c.append_scalar(value),)*
                }
            }

            pub fn stats(&self) -> ColumnStats {
                match self {
                    $(AnyColumn::$variant(c) => c.stats(),)*
                }
            }

            pub fn clone_with_indices(&self, map: &[u64], invert: bool) -> FrameResult<Self> {
                Ok(match self {
                    $(AnyColumn::$variant(c) => c.clone_with_indices(map, invert)?.into(),)*
                })
            }

            pub fn binary(&self, op: BinaryOperation, other: &AnyColumn) -> FrameResult<Self> {
                match (self, other) {
                    $((AnyColumn::$variant(l), AnyColumn::$variant(r)) => Ok(l.binary(op, r)?.into()),)*
                    _ => Err(self.mismatch(other.kind().name())),
                }
            }

            /// `self op scalar`, or `scalar op self` when `reverse` is set.
            pub fn binary_scalar(
                &self,
                op: BinaryOperation,
                scalar: &Scalar,
                reverse: bool,
            ) -> FrameResult<Self> {
                match self {
                    $(AnyColumn::$variant(c) => {
                        let scalar = typed_scalar::<$ty>(scalar)?;
                        Ok(c.binary_scalar(op, scalar, reverse)?.into())
                    })*
                }
            }

            pub fn shift(&self, op: ShiftOperation, amount: i32) -> FrameResult<Self> {
                Ok(match self {
                    $(AnyColumn::$variant(c) => c.shift(op, amount)?.into(),)*
                })
            }

            pub fn compare(
                &self,
                op: ComparisonOperation,
                other: &AnyColumn,
            ) -> FrameResult<PrimitiveColumn<bool>> {
                match (self, other) {
                    $((AnyColumn::$variant(l), AnyColumn::$variant(r)) => l.compare(op, r),)*
                    _ => Err(self.mismatch(other.kind().name())),
                }
            }

            pub fn compare_scalar(
                &self,
                op: ComparisonOperation,
                scalar: &Scalar,
            ) -> FrameResult<PrimitiveColumn<bool>> {
                match self {
                    $(AnyColumn::$variant(c) => c.compare_scalar(op, typed_scalar::<$ty>(scalar)?),)*
                }
            }

            /// The typed column, if this column holds `T`.
            pub fn as_primitive<T: PrimitiveType>(&self) -> Option<&PrimitiveColumn<T>> {
                match self {
                    $(AnyColumn::$variant(c) => (c as &dyn Any).downcast_ref(),)*
                }
            }

            pub fn as_primitive_mut<T: PrimitiveType>(&mut self) -> Option<&mut PrimitiveColumn<T>> {
                match self {
                    $(AnyColumn::$variant(c) => (c as &mut dyn Any).downcast_mut(),)*
                }
            }
        }
    };
}

any_column! {
    Boolean(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    Char16(Char16),
}

impl AnyColumn {
    fn mismatch(&self, actual: &'static str) -> FrameError {
        FrameError::TypeMismatch {
            expected: self.kind().name(),
            actual,
        }
    }
}

/// Scalar operands must be non-null and of the column's own kind.
fn typed_scalar<T: PrimitiveType>(scalar: &Scalar) -> FrameResult<T> {
    T::from_scalar(scalar).ok_or(FrameError::TypeMismatch {
        expected: T::KIND.name(),
        actual: scalar.type_name(),
    })
}
