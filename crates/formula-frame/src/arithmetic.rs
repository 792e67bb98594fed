//! Per-type operator kernels.
//!
//! Every primitive type has one [`ColumnArithmetic`] implementation, generated
//! by the macros below and reached through [`PrimitiveType::arithmetic`]. The
//! kernels work directly on a container's chunk list: chunk `k` of the left
//! operand pairs with chunk `k` of the right operand, so no logical row
//! arithmetic happens on the hot path.
//!
//! Arithmetic, bitwise and shift kernels mutate their left operand in place and
//! hold an exclusive borrow of its chunks for the duration of the call. Callers
//! wanting a fresh result clone first (see `PrimitiveColumn::binary`).
#![forbid(unsafe_code)]

use crate::container::{Chunk, ColumnContainer, ContainerBuilder};
use crate::decimal::Decimal;
use crate::error::{FrameError, FrameResult};
use crate::types::{Char16, PrimitiveKind, PrimitiveType};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    Xor,
}

impl BinaryOperation {
    pub const ALL: [BinaryOperation; 8] = [
        BinaryOperation::Add,
        BinaryOperation::Subtract,
        BinaryOperation::Multiply,
        BinaryOperation::Divide,
        BinaryOperation::Modulo,
        BinaryOperation::And,
        BinaryOperation::Or,
        BinaryOperation::Xor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BinaryOperation::Add => "add",
            BinaryOperation::Subtract => "subtract",
            BinaryOperation::Multiply => "multiply",
            BinaryOperation::Divide => "divide",
            BinaryOperation::Modulo => "modulo",
            BinaryOperation::And => "and",
            BinaryOperation::Or => "or",
            BinaryOperation::Xor => "xor",
        }
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOperation::And | BinaryOperation::Or | BinaryOperation::Xor
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShiftOperation {
    LeftShift,
    RightShift,
}

impl ShiftOperation {
    pub const ALL: [ShiftOperation; 2] = [ShiftOperation::LeftShift, ShiftOperation::RightShift];

    pub fn name(self) -> &'static str {
        match self {
            ShiftOperation::LeftShift => "left shift",
            ShiftOperation::RightShift => "right shift",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOperation {
    Equal,
    NotEqual,
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
}

impl ComparisonOperation {
    pub const ALL: [ComparisonOperation; 6] = [
        ComparisonOperation::Equal,
        ComparisonOperation::NotEqual,
        ComparisonOperation::GreaterOrEqual,
        ComparisonOperation::LessOrEqual,
        ComparisonOperation::Greater,
        ComparisonOperation::Less,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComparisonOperation::Equal => "equal",
            ComparisonOperation::NotEqual => "not equal",
            ComparisonOperation::GreaterOrEqual => "greater or equal",
            ComparisonOperation::LessOrEqual => "less or equal",
            ComparisonOperation::Greater => "greater",
            ComparisonOperation::Less => "less",
        }
    }

    /// Whether the comparison needs an ordering rather than just equality.
    pub fn is_ordering(self) -> bool {
        !matches!(
            self,
            ComparisonOperation::Equal | ComparisonOperation::NotEqual
        )
    }

    pub fn evaluate<T: PartialOrd>(self, left: T, right: T) -> bool {
        match self {
            ComparisonOperation::Equal => left == right,
            ComparisonOperation::NotEqual => left != right,
            ComparisonOperation::GreaterOrEqual => left >= right,
            ComparisonOperation::LessOrEqual => left <= right,
            ComparisonOperation::Greater => left > right,
            ComparisonOperation::Less => left < right,
        }
    }
}

/// Any operator the dispatch layer knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Binary(BinaryOperation),
    Shift(ShiftOperation),
    Comparison(ComparisonOperation),
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Binary(op) => op.name(),
            Operation::Shift(op) => op.name(),
            Operation::Comparison(op) => op.name(),
        }
    }

    /// All sixteen operators, binary first.
    pub fn all() -> impl Iterator<Item = Operation> {
        BinaryOperation::ALL
            .into_iter()
            .map(Operation::Binary)
            .chain(ShiftOperation::ALL.into_iter().map(Operation::Shift))
            .chain(ComparisonOperation::ALL.into_iter().map(Operation::Comparison))
    }
}

impl From<BinaryOperation> for Operation {
    fn from(op: BinaryOperation) -> Self {
        Operation::Binary(op)
    }
}

impl From<ShiftOperation> for Operation {
    fn from(op: ShiftOperation) -> Self {
        Operation::Shift(op)
    }
}

impl From<ComparisonOperation> for Operation {
    fn from(op: ComparisonOperation) -> Self {
        Operation::Comparison(op)
    }
}

/// Legality of each operator family for one element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationSupport {
    /// add, subtract, multiply, divide, modulo
    pub arithmetic: bool,
    /// and, or, xor
    pub bitwise: bool,
    pub shift: bool,
    /// `>=`, `<=`, `>`, `<`; equality is always legal
    pub ordering: bool,
}

impl OperationSupport {
    pub const BOOLEAN: OperationSupport = OperationSupport {
        arithmetic: false,
        bitwise: true,
        shift: false,
        ordering: false,
    };

    pub const INTEGER: OperationSupport = OperationSupport {
        arithmetic: true,
        bitwise: true,
        shift: true,
        ordering: true,
    };

    /// Floating point and decimal.
    pub const FRACTIONAL: OperationSupport = OperationSupport {
        arithmetic: true,
        bitwise: false,
        shift: false,
        ordering: true,
    };

    pub fn allows(self, op: Operation) -> bool {
        match op {
            Operation::Binary(op) if op.is_bitwise() => self.bitwise,
            Operation::Binary(_) => self.arithmetic,
            Operation::Shift(_) => self.shift,
            Operation::Comparison(op) => !op.is_ordering() || self.ordering,
        }
    }

    pub fn check(self, kind: PrimitiveKind, op: Operation) -> FrameResult<()> {
        if self.allows(op) {
            Ok(())
        } else {
            Err(unsupported(kind, op))
        }
    }
}

fn unsupported(kind: PrimitiveKind, op: impl Into<Operation>) -> FrameError {
    FrameError::UnsupportedOperation {
        kind,
        operation: op.into().name(),
    }
}

fn overflow(kind: PrimitiveKind, op: BinaryOperation) -> FrameError {
    FrameError::ArithmeticOverflow {
        kind,
        operation: op.name(),
    }
}

/// Vectorized operators for columns of `T`.
pub trait ColumnArithmetic<T: PrimitiveType>: fmt::Debug + Send + Sync {
    fn support(&self) -> OperationSupport;

    /// Apply `op` to two values with the same semantics as the column kernels.
    fn scalar(&self, op: BinaryOperation, left: T, right: T) -> FrameResult<T>;

    /// `left[i] = left[i] op right[i]`; a row is null if either side is null.
    fn binary(
        &self,
        op: BinaryOperation,
        left: &mut ColumnContainer<T>,
        right: &ColumnContainer<T>,
    ) -> FrameResult<()>;

    /// `left[i] = left[i] op scalar`, or `scalar op left[i]` when `reverse`.
    fn binary_scalar(
        &self,
        op: BinaryOperation,
        left: &mut ColumnContainer<T>,
        scalar: T,
        reverse: bool,
    ) -> FrameResult<()>;

    /// Shift one value with the same semantics as [`ColumnArithmetic::shift`].
    fn scalar_shift(&self, op: ShiftOperation, _value: T, _amount: i32) -> FrameResult<T> {
        Err(unsupported(T::KIND, op))
    }

    fn shift(
        &self,
        op: ShiftOperation,
        _left: &mut ColumnContainer<T>,
        _amount: i32,
    ) -> FrameResult<()> {
        Err(unsupported(T::KIND, op))
    }

    fn compare(
        &self,
        op: ComparisonOperation,
        left: &ColumnContainer<T>,
        right: &ColumnContainer<T>,
    ) -> FrameResult<ColumnContainer<bool>> {
        self.support().check(T::KIND, op.into())?;
        check_layout(left, right)?;
        match op {
            ComparisonOperation::Equal => zip_compare(left, right, |a, b| a == b),
            ComparisonOperation::NotEqual => zip_compare(left, right, |a, b| a != b),
            ComparisonOperation::GreaterOrEqual => zip_compare(left, right, |a, b| a >= b),
            ComparisonOperation::LessOrEqual => zip_compare(left, right, |a, b| a <= b),
            ComparisonOperation::Greater => zip_compare(left, right, |a, b| a > b),
            ComparisonOperation::Less => zip_compare(left, right, |a, b| a < b),
        }
    }

    fn compare_scalar(
        &self,
        op: ComparisonOperation,
        left: &ColumnContainer<T>,
        scalar: T,
    ) -> FrameResult<ColumnContainer<bool>> {
        self.support().check(T::KIND, op.into())?;
        match op {
            ComparisonOperation::Equal => map_compare(left, |a| a == scalar),
            ComparisonOperation::NotEqual => map_compare(left, |a| a != scalar),
            ComparisonOperation::GreaterOrEqual => map_compare(left, |a| a >= scalar),
            ComparisonOperation::LessOrEqual => map_compare(left, |a| a <= scalar),
            ComparisonOperation::Greater => map_compare(left, |a| a > scalar),
            ComparisonOperation::Less => map_compare(left, |a| a < scalar),
        }
    }
}

/// Both operands must have the same chunk layout for positional pairing.
fn check_layout<T: PrimitiveType>(
    left: &ColumnContainer<T>,
    right: &ColumnContainer<T>,
) -> FrameResult<()> {
    if left.len() != right.len() {
        return Err(FrameError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    let (lc, rc) = (left.chunks(), right.chunks());
    let count = lc.len().max(rc.len());
    let rows = |chunks: &[Chunk<T>], k: usize| chunks.get(k).map_or(0, |c| c.len() as u64);
    match (0..count).find(|&k| rows(lc, k) != rows(rc, k)) {
        Some(chunk) => Err(FrameError::ChunkLayoutMismatch {
            chunk,
            left: rows(lc, chunk),
            right: rows(rc, chunk),
        }),
        None => Ok(()),
    }
}

fn zip_in_place<T, F>(left: &mut ColumnContainer<T>, right: &ColumnContainer<T>, f: F)
where
    T: PrimitiveType,
    F: Fn(T, T) -> T,
{
    for (dst, src) in left.chunks_mut().iter_mut().zip(right.chunks()) {
        for (a, b) in dst
            .values
            .as_mut_slice()
            .iter_mut()
            .zip(src.values.as_slice())
        {
            *a = f(*a, *b);
        }
        dst.validity.and_inplace(&src.validity);
    }
    left.recount_nulls();
}

fn map_in_place<T, F>(left: &mut ColumnContainer<T>, f: F)
where
    T: PrimitiveType,
    F: Fn(T) -> T,
{
    for chunk in left.chunks_mut() {
        for a in chunk.values.as_mut_slice() {
            *a = f(*a);
        }
    }
}

fn scalar_in_place<T, F>(left: &mut ColumnContainer<T>, scalar: T, reverse: bool, f: F)
where
    T: PrimitiveType,
    F: Fn(T, T) -> T,
{
    if reverse {
        map_in_place(left, |a| f(scalar, a));
    } else {
        map_in_place(left, |a| f(a, scalar));
    }
}

/// Checked form of [`zip_in_place`]: results are staged and only written back
/// once every valid row succeeded.
fn try_zip_in_place<T, F>(
    left: &mut ColumnContainer<T>,
    right: &ColumnContainer<T>,
    f: F,
    err: FrameError,
) -> FrameResult<()>
where
    T: PrimitiveType,
    F: Fn(T, T) -> Option<T>,
{
    let mut staged = Vec::with_capacity(left.chunks().len());
    for (dst, src) in left.chunks().iter().zip(right.chunks()) {
        let (lv, rv) = (dst.values.as_slice(), src.values.as_slice());
        let mut out = Vec::with_capacity(lv.len());
        for i in 0..lv.len() {
            if dst.validity.is_valid(i) && src.validity.is_valid(i) {
                out.push(f(lv[i], rv[i]).ok_or_else(|| err.clone())?);
            } else {
                out.push(T::default());
            }
        }
        staged.push(out);
    }
    for ((dst, src), out) in left.chunks_mut().iter_mut().zip(right.chunks()).zip(staged) {
        dst.values.as_mut_slice().copy_from_slice(&out);
        dst.validity.and_inplace(&src.validity);
    }
    left.recount_nulls();
    Ok(())
}

fn try_scalar_in_place<T, F>(
    left: &mut ColumnContainer<T>,
    scalar: T,
    reverse: bool,
    f: F,
    err: FrameError,
) -> FrameResult<()>
where
    T: PrimitiveType,
    F: Fn(T, T) -> Option<T>,
{
    let mut staged = Vec::with_capacity(left.chunks().len());
    for chunk in left.chunks() {
        let values = chunk.values.as_slice();
        let mut out = Vec::with_capacity(values.len());
        for (i, &a) in values.iter().enumerate() {
            if !chunk.validity.is_valid(i) {
                out.push(a);
                continue;
            }
            let result = if reverse { f(scalar, a) } else { f(a, scalar) };
            out.push(result.ok_or_else(|| err.clone())?);
        }
        staged.push(out);
    }
    for (chunk, out) in left.chunks_mut().iter_mut().zip(staged) {
        chunk.values.as_mut_slice().copy_from_slice(&out);
    }
    Ok(())
}

fn zip_compare<T, F>(
    left: &ColumnContainer<T>,
    right: &ColumnContainer<T>,
    f: F,
) -> FrameResult<ColumnContainer<bool>>
where
    T: PrimitiveType,
    F: Fn(T, T) -> bool,
{
    let mut builder = ContainerBuilder::new(left.options());
    for (l, r) in left.chunks().iter().zip(right.chunks()) {
        let (lv, rv) = (l.values.as_slice(), r.values.as_slice());
        for i in 0..lv.len() {
            let valid = l.validity.is_valid(i) && r.validity.is_valid(i);
            builder.push(valid.then(|| f(lv[i], rv[i])))?;
        }
    }
    Ok(builder.finish())
}

fn map_compare<T, F>(left: &ColumnContainer<T>, f: F) -> FrameResult<ColumnContainer<bool>>
where
    T: PrimitiveType,
    F: Fn(T) -> bool,
{
    let mut builder = ContainerBuilder::new(left.options());
    for chunk in left.chunks() {
        for (i, &a) in chunk.values.as_slice().iter().enumerate() {
            builder.push(chunk.validity.is_valid(i).then(|| f(a)))?;
        }
    }
    Ok(builder.finish())
}

/// Fail if any row valid on both sides has a zero divisor.
fn ensure_nonzero_divisors<T: PrimitiveType>(
    left: &ColumnContainer<T>,
    right: &ColumnContainer<T>,
) -> FrameResult<()> {
    let zero = T::default();
    let found = left.chunks().iter().zip(right.chunks()).any(|(l, r)| {
        r.values
            .as_slice()
            .iter()
            .enumerate()
            .any(|(i, &b)| b == zero && l.validity.is_valid(i) && r.validity.is_valid(i))
    });
    if found {
        Err(FrameError::DivideByZero { kind: T::KIND })
    } else {
        Ok(())
    }
}

/// Fail if dividing by `scalar` (or, reversed, dividing `scalar` by a row)
/// would hit zero on a valid row.
fn ensure_nonzero_scalar_divisor<T: PrimitiveType>(
    left: &ColumnContainer<T>,
    scalar: T,
    reverse: bool,
) -> FrameResult<()> {
    let zero = T::default();
    let found = if reverse {
        left.chunks().iter().any(|chunk| {
            chunk
                .values
                .as_slice()
                .iter()
                .enumerate()
                .any(|(i, &a)| a == zero && chunk.validity.is_valid(i))
        })
    } else {
        scalar == zero && left.null_count() < left.len()
    };
    if found {
        Err(FrameError::DivideByZero { kind: T::KIND })
    } else {
        Ok(())
    }
}

macro_rules! integer_arithmetic {
    ($(#[$meta:meta])* $name:ident, $ty:ty) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl ColumnArithmetic<$ty> for $name {
            fn support(&self) -> OperationSupport {
                OperationSupport::INTEGER
            }

            fn scalar(&self, op: BinaryOperation, left: $ty, right: $ty) -> FrameResult<$ty> {
                let zero = <$ty>::default();
                Ok(match op {
                    BinaryOperation::Add => left.wrapping_add(right),
                    BinaryOperation::Subtract => left.wrapping_sub(right),
                    BinaryOperation::Multiply => left.wrapping_mul(right),
                    BinaryOperation::Divide | BinaryOperation::Modulo if right == zero => {
                        return Err(FrameError::DivideByZero {
                            kind: <$ty as PrimitiveType>::KIND,
                        });
                    }
                    BinaryOperation::Divide => left.wrapping_div(right),
                    BinaryOperation::Modulo => left.wrapping_rem(right),
                    BinaryOperation::And => left & right,
                    BinaryOperation::Or => left | right,
                    BinaryOperation::Xor => left ^ right,
                })
            }

            fn binary(
                &self,
                op: BinaryOperation,
                left: &mut ColumnContainer<$ty>,
                right: &ColumnContainer<$ty>,
            ) -> FrameResult<()> {
                check_layout(left, right)?;
                let zero = <$ty>::default();
                match op {
                    BinaryOperation::Add => zip_in_place(left, right, <$ty>::wrapping_add),
                    BinaryOperation::Subtract => zip_in_place(left, right, <$ty>::wrapping_sub),
                    BinaryOperation::Multiply => zip_in_place(left, right, <$ty>::wrapping_mul),
                    BinaryOperation::Divide => {
                        ensure_nonzero_divisors(left, right)?;
                        // Zero divisors left at this point sit under a null row.
                        zip_in_place(left, right, |a, b| {
                            if b == zero { a } else { a.wrapping_div(b) }
                        });
                    }
                    BinaryOperation::Modulo => {
                        ensure_nonzero_divisors(left, right)?;
                        zip_in_place(left, right, |a, b| {
                            if b == zero { a } else { a.wrapping_rem(b) }
                        });
                    }
                    BinaryOperation::And => zip_in_place(left, right, |a, b| a & b),
                    BinaryOperation::Or => zip_in_place(left, right, |a, b| a | b),
                    BinaryOperation::Xor => zip_in_place(left, right, |a, b| a ^ b),
                }
                Ok(())
            }

            fn binary_scalar(
                &self,
                op: BinaryOperation,
                left: &mut ColumnContainer<$ty>,
                scalar: $ty,
                reverse: bool,
            ) -> FrameResult<()> {
                let zero = <$ty>::default();
                match op {
                    BinaryOperation::Add => {
                        scalar_in_place(left, scalar, reverse, <$ty>::wrapping_add)
                    }
                    BinaryOperation::Subtract => {
                        scalar_in_place(left, scalar, reverse, <$ty>::wrapping_sub)
                    }
                    BinaryOperation::Multiply => {
                        scalar_in_place(left, scalar, reverse, <$ty>::wrapping_mul)
                    }
                    BinaryOperation::Divide => {
                        ensure_nonzero_scalar_divisor(left, scalar, reverse)?;
                        scalar_in_place(left, scalar, reverse, |a, b| {
                            if b == zero { a } else { a.wrapping_div(b) }
                        });
                    }
                    BinaryOperation::Modulo => {
                        ensure_nonzero_scalar_divisor(left, scalar, reverse)?;
                        scalar_in_place(left, scalar, reverse, |a, b| {
                            if b == zero { a } else { a.wrapping_rem(b) }
                        });
                    }
                    BinaryOperation::And => scalar_in_place(left, scalar, reverse, |a, b| a & b),
                    BinaryOperation::Or => scalar_in_place(left, scalar, reverse, |a, b| a | b),
                    BinaryOperation::Xor => scalar_in_place(left, scalar, reverse, |a, b| a ^ b),
                }
                Ok(())
            }

            fn scalar_shift(
                &self,
                op: ShiftOperation,
                value: $ty,
                amount: i32,
            ) -> FrameResult<$ty> {
                let amount = amount as u32;
                Ok(match op {
                    ShiftOperation::LeftShift => value.wrapping_shl(amount),
                    ShiftOperation::RightShift => value.wrapping_shr(amount),
                })
            }

            fn shift(
                &self,
                op: ShiftOperation,
                left: &mut ColumnContainer<$ty>,
                amount: i32,
            ) -> FrameResult<()> {
                // Reinterpreted as unsigned; the wrapping shifts mask it to the width.
                let amount = amount as u32;
                match op {
                    ShiftOperation::LeftShift => map_in_place(left, |a| a.wrapping_shl(amount)),
                    ShiftOperation::RightShift => map_in_place(left, |a| a.wrapping_shr(amount)),
                }
                Ok(())
            }
        }
    };
}

macro_rules! float_arithmetic {
    ($(#[$meta:meta])* $name:ident, $ty:ty) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl ColumnArithmetic<$ty> for $name {
            fn support(&self) -> OperationSupport {
                OperationSupport::FRACTIONAL
            }

            fn scalar(&self, op: BinaryOperation, left: $ty, right: $ty) -> FrameResult<$ty> {
                Ok(match op {
                    BinaryOperation::Add => left + right,
                    BinaryOperation::Subtract => left - right,
                    BinaryOperation::Multiply => left * right,
                    BinaryOperation::Divide => left / right,
                    BinaryOperation::Modulo => left % right,
                    BinaryOperation::And | BinaryOperation::Or | BinaryOperation::Xor => {
                        return Err(unsupported(<$ty as PrimitiveType>::KIND, op));
                    }
                })
            }

            fn binary(
                &self,
                op: BinaryOperation,
                left: &mut ColumnContainer<$ty>,
                right: &ColumnContainer<$ty>,
            ) -> FrameResult<()> {
                self.support().check(<$ty as PrimitiveType>::KIND, op.into())?;
                check_layout(left, right)?;
                match op {
                    BinaryOperation::Add => zip_in_place(left, right, |a, b| a + b),
                    BinaryOperation::Subtract => zip_in_place(left, right, |a, b| a - b),
                    BinaryOperation::Multiply => zip_in_place(left, right, |a, b| a * b),
                    BinaryOperation::Divide => zip_in_place(left, right, |a, b| a / b),
                    BinaryOperation::Modulo => zip_in_place(left, right, |a, b| a % b),
                    BinaryOperation::And | BinaryOperation::Or | BinaryOperation::Xor => {
                        return Err(unsupported(<$ty as PrimitiveType>::KIND, op));
                    }
                }
                Ok(())
            }

            fn binary_scalar(
                &self,
                op: BinaryOperation,
                left: &mut ColumnContainer<$ty>,
                scalar: $ty,
                reverse: bool,
            ) -> FrameResult<()> {
                self.support().check(<$ty as PrimitiveType>::KIND, op.into())?;
                match op {
                    BinaryOperation::Add => scalar_in_place(left, scalar, reverse, |a, b| a + b),
                    BinaryOperation::Subtract => {
                        scalar_in_place(left, scalar, reverse, |a, b| a - b)
                    }
                    BinaryOperation::Multiply => {
                        scalar_in_place(left, scalar, reverse, |a, b| a * b)
                    }
                    BinaryOperation::Divide => scalar_in_place(left, scalar, reverse, |a, b| a / b),
                    BinaryOperation::Modulo => scalar_in_place(left, scalar, reverse, |a, b| a % b),
                    BinaryOperation::And | BinaryOperation::Or | BinaryOperation::Xor => {
                        return Err(unsupported(<$ty as PrimitiveType>::KIND, op));
                    }
                }
                Ok(())
            }
        }
    };
}

integer_arithmetic!(Int8Arithmetic, i8);
integer_arithmetic!(UInt8Arithmetic, u8);
integer_arithmetic!(Int16Arithmetic, i16);
integer_arithmetic!(UInt16Arithmetic, u16);
integer_arithmetic!(Int32Arithmetic, i32);
integer_arithmetic!(UInt32Arithmetic, u32);
integer_arithmetic!(Int64Arithmetic, i64);
integer_arithmetic!(UInt64Arithmetic, u64);
integer_arithmetic!(
    /// UTF-16 code units behave like `u16` under every operator.
    Char16Arithmetic,
    Char16
);
float_arithmetic!(Float32Arithmetic, f32);
float_arithmetic!(Float64Arithmetic, f64);

/// Logical operators only; booleans have no arithmetic, shifts or ordering.
#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanArithmetic;

impl ColumnArithmetic<bool> for BooleanArithmetic {
    fn support(&self) -> OperationSupport {
        OperationSupport::BOOLEAN
    }

    fn scalar(&self, op: BinaryOperation, left: bool, right: bool) -> FrameResult<bool> {
        match op {
            BinaryOperation::And => Ok(left & right),
            BinaryOperation::Or => Ok(left | right),
            BinaryOperation::Xor => Ok(left ^ right),
            _ => Err(unsupported(PrimitiveKind::Boolean, op)),
        }
    }

    fn binary(
        &self,
        op: BinaryOperation,
        left: &mut ColumnContainer<bool>,
        right: &ColumnContainer<bool>,
    ) -> FrameResult<()> {
        self.support().check(PrimitiveKind::Boolean, op.into())?;
        check_layout(left, right)?;
        match op {
            BinaryOperation::And => zip_in_place(left, right, |a, b| a & b),
            BinaryOperation::Or => zip_in_place(left, right, |a, b| a | b),
            BinaryOperation::Xor => zip_in_place(left, right, |a, b| a ^ b),
            _ => return Err(unsupported(PrimitiveKind::Boolean, op)),
        }
        Ok(())
    }

    fn binary_scalar(
        &self,
        op: BinaryOperation,
        left: &mut ColumnContainer<bool>,
        scalar: bool,
        reverse: bool,
    ) -> FrameResult<()> {
        self.support().check(PrimitiveKind::Boolean, op.into())?;
        match op {
            BinaryOperation::And => scalar_in_place(left, scalar, reverse, |a, b| a & b),
            BinaryOperation::Or => scalar_in_place(left, scalar, reverse, |a, b| a | b),
            BinaryOperation::Xor => scalar_in_place(left, scalar, reverse, |a, b| a ^ b),
            _ => return Err(unsupported(PrimitiveKind::Boolean, op)),
        }
        Ok(())
    }
}

/// Checked fixed-point arithmetic; a failing row leaves the column untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecimalArithmetic;

impl DecimalArithmetic {
    fn checked(op: BinaryOperation) -> fn(Decimal, Decimal) -> Option<Decimal> {
        match op {
            BinaryOperation::Subtract => Decimal::checked_sub,
            BinaryOperation::Multiply => Decimal::checked_mul,
            BinaryOperation::Divide => Decimal::checked_div,
            BinaryOperation::Modulo => Decimal::checked_rem,
            _ => Decimal::checked_add,
        }
    }
}

impl ColumnArithmetic<Decimal> for DecimalArithmetic {
    fn support(&self) -> OperationSupport {
        OperationSupport::FRACTIONAL
    }

    fn scalar(&self, op: BinaryOperation, left: Decimal, right: Decimal) -> FrameResult<Decimal> {
        self.support().check(PrimitiveKind::Decimal, op.into())?;
        if matches!(op, BinaryOperation::Divide | BinaryOperation::Modulo) && right.is_zero() {
            return Err(FrameError::DivideByZero {
                kind: PrimitiveKind::Decimal,
            });
        }
        Self::checked(op)(left, right).ok_or_else(|| overflow(PrimitiveKind::Decimal, op))
    }

    fn binary(
        &self,
        op: BinaryOperation,
        left: &mut ColumnContainer<Decimal>,
        right: &ColumnContainer<Decimal>,
    ) -> FrameResult<()> {
        self.support().check(PrimitiveKind::Decimal, op.into())?;
        check_layout(left, right)?;
        if matches!(op, BinaryOperation::Divide | BinaryOperation::Modulo) {
            ensure_nonzero_divisors(left, right)?;
        }
        try_zip_in_place(
            left,
            right,
            Self::checked(op),
            overflow(PrimitiveKind::Decimal, op),
        )
    }

    fn binary_scalar(
        &self,
        op: BinaryOperation,
        left: &mut ColumnContainer<Decimal>,
        scalar: Decimal,
        reverse: bool,
    ) -> FrameResult<()> {
        self.support().check(PrimitiveKind::Decimal, op.into())?;
        if matches!(op, BinaryOperation::Divide | BinaryOperation::Modulo) {
            ensure_nonzero_scalar_divisor(left, scalar, reverse)?;
        }
        try_scalar_in_place(
            left,
            scalar,
            reverse,
            Self::checked(op),
            overflow(PrimitiveKind::Decimal, op),
        )
    }
}
