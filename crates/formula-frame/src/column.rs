#![forbid(unsafe_code)]

use crate::arithmetic::{
    BinaryOperation, ColumnArithmetic, ComparisonOperation, Operation, ShiftOperation,
};
use crate::container::ColumnContainer;
use crate::cursor::{RowCursor, ValueGetter};
use crate::error::{FrameError, FrameResult};
use crate::options::ColumnOptions;
use crate::stats::ColumnStats;
use crate::types::{ExternalScalarType, PrimitiveKind, PrimitiveType, Scalar};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Running aggregates for [`PrimitiveColumn::cumulative`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CumulativeOperation {
    Sum,
    Product,
    Min,
    Max,
}

/// Row indices bucketed by value, in order of first appearance.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupedValues<T> {
    pub groups: Vec<(T, Vec<u64>)>,
    pub null_rows: Vec<u64>,
}

/// A named, nullable column of one primitive type.
///
/// Operators resolve their kernel once, when the column is created, and keep
/// it for the column's lifetime. Plain operator methods return a new column;
/// the `*_in_place` forms reuse the receiver's storage.
#[derive(Clone, Debug)]
pub struct PrimitiveColumn<T: PrimitiveType> {
    name: String,
    container: ColumnContainer<T>,
    arithmetic: &'static dyn ColumnArithmetic<T>,
}

impl<T: PrimitiveType> PartialEq for PrimitiveColumn<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.container == other.container
    }
}

macro_rules! binary_forms {
    ($($op:ident => $name:ident, $in_place:ident;)*) => {$(
        pub fn $name(&self, other: &Self) -> FrameResult<Self> {
            self.binary(BinaryOperation::$op, other)
        }

        pub fn $in_place(&mut self, other: &Self) -> FrameResult<()> {
            self.binary_in_place(BinaryOperation::$op, other)
        }
    )*};
}

macro_rules! comparison_forms {
    ($($op:ident => $name:ident;)*) => {$(
        pub fn $name(&self, other: &Self) -> FrameResult<PrimitiveColumn<bool>> {
            self.compare(ComparisonOperation::$op, other)
        }
    )*};
}

impl<T: PrimitiveType> PrimitiveColumn<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_container(name, ColumnContainer::new())
    }

    pub fn with_options(name: impl Into<String>, options: ColumnOptions) -> Self {
        Self::from_container(name, ColumnContainer::with_options(options))
    }

    pub fn from_container(name: impl Into<String>, container: ColumnContainer<T>) -> Self {
        Self {
            name: name.into(),
            container,
            arithmetic: T::arithmetic(),
        }
    }

    pub fn from_values<I>(
        name: impl Into<String>,
        values: I,
        options: ColumnOptions,
    ) -> FrameResult<Self>
    where
        I: IntoIterator<Item = Option<T>>,
    {
        Ok(Self::from_container(
            name,
            ColumnContainer::from_values(values, options)?,
        ))
    }

    /// A column of `len` nulls.
    pub fn with_len(name: impl Into<String>, len: u64, options: ColumnOptions) -> FrameResult<Self> {
        Ok(Self::from_container(
            name,
            ColumnContainer::with_len(len, options)?,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> PrimitiveKind {
        T::KIND
    }

    /// Scalar type declared to row-cursor consumers.
    pub fn external_scalar_type(&self) -> ExternalScalarType {
        T::KIND.external_scalar_type()
    }

    pub fn len(&self) -> u64 {
        self.container.len()
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    pub fn null_count(&self) -> u64 {
        self.container.null_count()
    }

    pub fn container(&self) -> &ColumnContainer<T> {
        &self.container
    }

    pub fn into_container(self) -> ColumnContainer<T> {
        self.container
    }

    pub fn get(&self, index: u64) -> FrameResult<Option<T>> {
        self.container.get(index)
    }

    pub fn set(&mut self, index: u64, value: Option<T>) -> FrameResult<()> {
        self.container.set(index, value)
    }

    pub fn append(&mut self, value: Option<T>) -> FrameResult<()> {
        self.container.append(value)
    }

    pub fn append_many(&mut self, value: Option<T>, count: u64) -> FrameResult<()> {
        self.container.append_many(value, count)
    }

    pub fn resize(&mut self, len: u64) -> FrameResult<()> {
        self.container.resize(len)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<T>> + '_ {
        self.container.iter()
    }

    pub fn get_scalar(&self, index: u64) -> FrameResult<Scalar> {
        Ok(self
            .get(index)?
            .map_or(Scalar::Null, PrimitiveType::into_scalar))
    }

    pub fn set_scalar(&mut self, index: u64, value: &Scalar) -> FrameResult<()> {
        let value = Self::typed(value)?;
        self.set(index, value)
    }

    pub fn append_scalar(&mut self, value: &Scalar) -> FrameResult<()> {
        let value = Self::typed(value)?;
        self.append(value)
    }

    fn typed(value: &Scalar) -> FrameResult<Option<T>> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_scalar(value)
            .map(Some)
            .ok_or(FrameError::TypeMismatch {
                expected: T::KIND.name(),
                actual: value.type_name(),
            })
    }

    fn with_same_name<U: PrimitiveType>(&self, container: ColumnContainer<U>) -> PrimitiveColumn<U> {
        PrimitiveColumn::from_container(self.name.clone(), container)
    }

    fn check(&self, op: impl Into<Operation>) -> FrameResult<()> {
        self.arithmetic.support().check(T::KIND, op.into())
    }

    pub fn binary(&self, op: BinaryOperation, other: &Self) -> FrameResult<Self> {
        self.check(op)?;
        let mut result = self.clone();
        result.binary_in_place(op, other)?;
        Ok(result)
    }

    pub fn binary_in_place(&mut self, op: BinaryOperation, other: &Self) -> FrameResult<()> {
        self.check(op)?;
        self.arithmetic
            .binary(op, &mut self.container, &other.container)
    }

    /// `self op scalar`, or `scalar op self` when `reverse` is set.
    pub fn binary_scalar(&self, op: BinaryOperation, scalar: T, reverse: bool) -> FrameResult<Self> {
        self.check(op)?;
        let mut result = self.clone();
        result.binary_scalar_in_place(op, scalar, reverse)?;
        Ok(result)
    }

    pub fn binary_scalar_in_place(
        &mut self,
        op: BinaryOperation,
        scalar: T,
        reverse: bool,
    ) -> FrameResult<()> {
        self.check(op)?;
        self.arithmetic
            .binary_scalar(op, &mut self.container, scalar, reverse)
    }

    pub fn shift(&self, op: ShiftOperation, amount: i32) -> FrameResult<Self> {
        self.check(op)?;
        let mut result = self.clone();
        result.shift_in_place(op, amount)?;
        Ok(result)
    }

    pub fn shift_in_place(&mut self, op: ShiftOperation, amount: i32) -> FrameResult<()> {
        self.check(op)?;
        self.arithmetic.shift(op, &mut self.container, amount)
    }

    pub fn left_shift(&self, amount: i32) -> FrameResult<Self> {
        self.shift(ShiftOperation::LeftShift, amount)
    }

    pub fn right_shift(&self, amount: i32) -> FrameResult<Self> {
        self.shift(ShiftOperation::RightShift, amount)
    }

    pub fn compare(
        &self,
        op: ComparisonOperation,
        other: &Self,
    ) -> FrameResult<PrimitiveColumn<bool>> {
        let result = self
            .arithmetic
            .compare(op, &self.container, &other.container)?;
        Ok(self.with_same_name(result))
    }

    pub fn compare_scalar(
        &self,
        op: ComparisonOperation,
        scalar: T,
    ) -> FrameResult<PrimitiveColumn<bool>> {
        let result = self
            .arithmetic
            .compare_scalar(op, &self.container, scalar)?;
        Ok(self.with_same_name(result))
    }

    binary_forms! {
        Add => add, add_in_place;
        Subtract => subtract, subtract_in_place;
        Multiply => multiply, multiply_in_place;
        Divide => divide, divide_in_place;
        Modulo => modulo, modulo_in_place;
        And => bitwise_and, bitwise_and_in_place;
        Or => bitwise_or, bitwise_or_in_place;
        Xor => bitwise_xor, bitwise_xor_in_place;
    }

    comparison_forms! {
        Equal => elementwise_eq;
        NotEqual => elementwise_ne;
        GreaterOrEqual => elementwise_ge;
        LessOrEqual => elementwise_le;
        Greater => elementwise_gt;
        Less => elementwise_lt;
    }

    pub fn clone_with_indices(&self, map: &[u64], invert: bool) -> FrameResult<Self> {
        Ok(self.with_same_name(self.container.clone_with_indices(map, invert)?))
    }

    pub fn clone_with_map(&self, map: &PrimitiveColumn<u64>, invert: bool) -> FrameResult<Self> {
        Ok(self.with_same_name(self.container.clone_with_map(&map.container, invert)?))
    }

    fn rebuild<I>(&self, values: I) -> FrameResult<Self>
    where
        I: IntoIterator<Item = Option<T>>,
    {
        Self::from_values(self.name.clone(), values, self.container.options())
    }

    /// Valid rows with `lower <= value <= upper`.
    pub fn filter(&self, lower: T, upper: T) -> FrameResult<Self> {
        self.check(ComparisonOperation::GreaterOrEqual)?;
        self.rebuild(
            self.iter()
                .filter(|value| matches!(value, Some(v) if lower <= *v && *v <= upper)),
        )
    }

    /// Rows where `mask` is true; null mask rows are dropped.
    pub fn filter_by_mask(&self, mask: &PrimitiveColumn<bool>) -> FrameResult<Self> {
        if mask.len() != self.len() {
            return Err(FrameError::LengthMismatch {
                left: self.len(),
                right: mask.len(),
            });
        }
        self.rebuild(
            self.iter()
                .zip(mask.iter())
                .filter(|(_, keep)| *keep == Some(true))
                .map(|(value, _)| value),
        )
    }

    pub fn clip(&self, lower: T, upper: T) -> FrameResult<Self> {
        let mut result = self.clone();
        result.clip_in_place(lower, upper)?;
        Ok(result)
    }

    /// Clamp valid values into `lower..=upper`.
    pub fn clip_in_place(&mut self, lower: T, upper: T) -> FrameResult<()> {
        self.check(ComparisonOperation::GreaterOrEqual)?;
        for chunk in self.container.chunks_mut() {
            let validity = &chunk.validity;
            for (i, value) in chunk.values.as_mut_slice().iter_mut().enumerate() {
                if !validity.is_valid(i) {
                    continue;
                }
                if *value < lower {
                    *value = lower;
                } else if *value > upper {
                    *value = upper;
                }
            }
        }
        Ok(())
    }

    pub fn fill_nulls(&self, value: T) -> Self {
        let mut result = self.clone();
        result.fill_nulls_in_place(value);
        result
    }

    pub fn fill_nulls_in_place(&mut self, value: T) {
        if self.null_count() == 0 {
            return;
        }
        for chunk in self.container.chunks_mut() {
            for i in 0..chunk.len() {
                if !chunk.validity.set_valid(i, true) {
                    chunk.values.as_mut_slice()[i] = value;
                }
            }
        }
        self.container.recount_nulls();
    }

    pub fn drop_nulls(&self) -> FrameResult<Self> {
        self.rebuild(self.iter().filter(Option::is_some))
    }

    /// `true` where the row is null. The mask itself has no nulls.
    pub fn is_null_mask(&self) -> FrameResult<PrimitiveColumn<bool>> {
        PrimitiveColumn::from_values(
            self.name.clone(),
            self.iter().map(|value| Some(value.is_none())),
            self.container.options(),
        )
    }

    pub fn apply<F>(&self, f: F) -> FrameResult<Self>
    where
        F: Fn(Option<T>) -> Option<T>,
    {
        self.rebuild(self.iter().map(f))
    }

    pub fn apply_in_place<F>(&mut self, f: F) -> FrameResult<()>
    where
        F: Fn(Option<T>) -> Option<T>,
    {
        for index in 0..self.len() {
            let value = f(self.container.get(index)?);
            self.container.set(index, value)?;
        }
        Ok(())
    }

    pub fn head(&self, count: u64) -> FrameResult<Self> {
        self.rebuild(self.iter().take(count.min(self.len()) as usize))
    }

    pub fn tail(&self, count: u64) -> FrameResult<Self> {
        let skip = self.len().saturating_sub(count);
        self.rebuild(self.iter().skip(skip as usize))
    }

    /// Row order that sorts the column; nulls always come last in their
    /// original order.
    pub fn argsort(&self, ascending: bool) -> FrameResult<PrimitiveColumn<u64>> {
        let mut valid = Vec::with_capacity((self.len() - self.null_count()) as usize);
        let mut nulls = Vec::with_capacity(self.null_count() as usize);
        for (row, value) in self.iter().enumerate() {
            match value {
                Some(v) => valid.push((v.key(), row as u64)),
                None => nulls.push(row as u64),
            }
        }
        if ascending {
            valid.sort_by(|a, b| a.0.cmp(&b.0));
        } else {
            valid.sort_by(|a, b| b.0.cmp(&a.0));
        }
        PrimitiveColumn::from_values(
            self.name.clone(),
            valid
                .into_iter()
                .map(|(_, row)| row)
                .chain(nulls)
                .map(Some),
            self.container.options(),
        )
    }

    pub fn sort(&self, ascending: bool) -> FrameResult<Self> {
        let order = self.argsort(ascending)?;
        self.clone_with_map(&order, false)
    }

    fn reduce(&self, op: BinaryOperation) -> FrameResult<Option<T>> {
        self.check(op)?;
        let mut acc = None;
        for value in self.iter().flatten() {
            acc = Some(match acc {
                None => value,
                Some(acc) => self.arithmetic.scalar(op, acc, value)?,
            });
        }
        Ok(acc)
    }

    fn extreme(&self, wanted: Ordering) -> FrameResult<Option<T>> {
        self.check(ComparisonOperation::Less)?;
        Ok(self.iter().flatten().reduce(|best, value| {
            if value.key().cmp(&best.key()) == wanted {
                value
            } else {
                best
            }
        }))
    }

    /// Sum of the valid rows; `None` if there are none.
    pub fn sum(&self) -> FrameResult<Option<T>> {
        self.reduce(BinaryOperation::Add)
    }

    pub fn product(&self) -> FrameResult<Option<T>> {
        self.reduce(BinaryOperation::Multiply)
    }

    pub fn min(&self) -> FrameResult<Option<T>> {
        self.extreme(Ordering::Less)
    }

    pub fn max(&self) -> FrameResult<Option<T>> {
        self.extreme(Ordering::Greater)
    }

    pub fn mean(&self) -> FrameResult<Option<f64>> {
        self.check(BinaryOperation::Add)?;
        let (sum, count) = self
            .iter()
            .flatten()
            .fold((0.0f64, 0u64), |(sum, count), v| (sum + v.to_f64(), count + 1));
        Ok((count > 0).then(|| sum / count as f64))
    }

    /// Running aggregate over the valid rows; null rows stay null.
    pub fn cumulative(&self, op: CumulativeOperation) -> FrameResult<Self> {
        let step = match op {
            CumulativeOperation::Sum => Some(BinaryOperation::Add),
            CumulativeOperation::Product => Some(BinaryOperation::Multiply),
            CumulativeOperation::Min | CumulativeOperation::Max => None,
        };
        match step {
            Some(step) => self.check(step)?,
            None => self.check(ComparisonOperation::Less)?,
        }

        let mut acc: Option<T> = None;
        let mut out = Vec::with_capacity(self.len() as usize);
        for value in self.iter() {
            let Some(value) = value else {
                out.push(None);
                continue;
            };
            let next = match (acc, step) {
                (None, _) => value,
                (Some(acc), Some(step)) => self.arithmetic.scalar(step, acc, value)?,
                (Some(acc), None) => {
                    let wanted = if op == CumulativeOperation::Min {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    };
                    if value.key().cmp(&acc.key()) == wanted {
                        value
                    } else {
                        acc
                    }
                }
            };
            acc = Some(next);
            out.push(acc);
        }
        self.rebuild(out)
    }

    pub fn stats(&self) -> ColumnStats {
        ColumnStats::compute(&self.container)
    }

    pub fn group_column_values(&self) -> GroupedValues<T> {
        let mut positions: HashMap<T::Key, usize> = HashMap::new();
        let mut grouped = GroupedValues {
            groups: Vec::new(),
            null_rows: Vec::new(),
        };
        for (row, value) in self.iter().enumerate() {
            let row = row as u64;
            match value {
                None => grouped.null_rows.push(row),
                Some(v) => {
                    let slot = *positions.entry(v.key()).or_insert_with(|| {
                        grouped.groups.push((v, Vec::new()));
                        grouped.groups.len() - 1
                    });
                    grouped.groups[slot].1.push(row);
                }
            }
        }
        grouped
    }

    /// A getter that reads this column at the cursor's current row.
    pub fn value_getter<'a, C: RowCursor + ?Sized>(&'a self, cursor: &'a C) -> ValueGetter<'a, T, C> {
        ValueGetter::new(self, cursor)
    }
}

impl PrimitiveColumn<bool> {
    /// Whether every valid row is true.
    pub fn all(&self) -> bool {
        self.iter().flatten().all(|v| v)
    }

    /// Whether any valid row is true.
    pub fn any(&self) -> bool {
        self.iter().flatten().any(|v| v)
    }
}
