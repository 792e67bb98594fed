use formula_frame::{
    AnyColumn, BinaryOperation, Char16, ColumnOptions, ComparisonOperation, Decimal, FrameError,
    Operation, PrimitiveColumn, PrimitiveKind, PrimitiveType, Scalar, ShiftOperation,
};
use pretty_assertions::assert_eq;

fn column<T: PrimitiveType>(values: Vec<Option<T>>) -> PrimitiveColumn<T> {
    PrimitiveColumn::from_values("c", values, ColumnOptions::default()).unwrap()
}

fn values<T: PrimitiveType>(column: &PrimitiveColumn<T>) -> Vec<Option<T>> {
    column.iter().collect()
}

fn sample(kind: PrimitiveKind) -> Scalar {
    match kind {
        PrimitiveKind::Boolean => Scalar::Boolean(true),
        PrimitiveKind::Int8 => Scalar::Int8(3),
        PrimitiveKind::UInt8 => Scalar::UInt8(3),
        PrimitiveKind::Int16 => Scalar::Int16(3),
        PrimitiveKind::UInt16 => Scalar::UInt16(3),
        PrimitiveKind::Int32 => Scalar::Int32(3),
        PrimitiveKind::UInt32 => Scalar::UInt32(3),
        PrimitiveKind::Int64 => Scalar::Int64(3),
        PrimitiveKind::UInt64 => Scalar::UInt64(3),
        PrimitiveKind::Float32 => Scalar::Float32(3.0),
        PrimitiveKind::Float64 => Scalar::Float64(3.0),
        PrimitiveKind::Decimal => Scalar::Decimal(Decimal::from_i64(3)),
        PrimitiveKind::Char16 => Scalar::Char16(Char16(3)),
    }
}

fn expected_legal(kind: PrimitiveKind, op: Operation) -> bool {
    let boolean = kind == PrimitiveKind::Boolean;
    let fractional = matches!(
        kind,
        PrimitiveKind::Float32 | PrimitiveKind::Float64 | PrimitiveKind::Decimal
    );
    match op {
        Operation::Binary(op) if op.is_bitwise() => !fractional,
        Operation::Binary(_) => !boolean,
        Operation::Shift(_) => !boolean && !fractional,
        Operation::Comparison(ComparisonOperation::Equal | ComparisonOperation::NotEqual) => true,
        Operation::Comparison(_) => !boolean,
    }
}

#[test]
fn legality_matrix_covers_every_kind_and_operator() {
    let mut checked = 0;
    for kind in PrimitiveKind::ALL {
        let mut col = AnyColumn::empty(kind, "c", ColumnOptions::default());
        col.append_scalar(&sample(kind)).unwrap();
        col.append_scalar(&Scalar::Null).unwrap();
        let before = col.clone();

        for op in Operation::all() {
            let legal = expected_legal(kind, op);
            assert_eq!(kind.support().allows(op), legal, "{kind} {}", op.name());

            let outcome = match op {
                Operation::Binary(op) => col.binary(op, &col).map(|_| ()),
                Operation::Shift(op) => col.shift(op, 1).map(|_| ()),
                Operation::Comparison(op) => col.compare(op, &col).map(|_| ()),
            };
            if legal {
                assert_eq!(outcome, Ok(()), "{kind} {}", op.name());
            } else {
                assert_eq!(
                    outcome,
                    Err(FrameError::UnsupportedOperation {
                        kind,
                        operation: op.name()
                    }),
                    "{kind} {}",
                    op.name()
                );
            }
            assert_eq!(col, before);
            checked += 1;
        }
    }
    assert_eq!(checked, 13 * 16);
}

/// Every legal operator over multi-chunk operands must agree row by row with
/// the kernel's single-value form; illegal ones must be refused.
fn agrees_with_scalar_reference<T: PrimitiveType>(left: Vec<Option<T>>, right: Vec<Option<T>>) {
    let options = ColumnOptions::with_chunk_rows::<T>(3);
    let l = PrimitiveColumn::from_values("l", left.clone(), options).unwrap();
    let r = PrimitiveColumn::from_values("r", right.clone(), options).unwrap();
    assert!(l.container().chunks().len() > 1);

    let kernel = T::arithmetic();
    let pairs = || left.iter().zip(&right);
    let mut legal_ops = 0;
    for op in Operation::all() {
        let legal = T::KIND.support().allows(op);
        let context = format!("{} {}", T::KIND, op.name());
        match op {
            Operation::Binary(op) => {
                let result = l.binary(op, &r);
                if !legal {
                    assert!(result.is_err(), "{context}");
                    continue;
                }
                let expected: Vec<Option<T>> = pairs()
                    .map(|(a, b)| Some(kernel.scalar(op, (*a)?, (*b)?).unwrap()))
                    .collect();
                assert_eq!(values(&result.unwrap()), expected, "{context}");

                let scalar = right[0].unwrap();
                let expected: Vec<Option<T>> = left
                    .iter()
                    .map(|a| Some(kernel.scalar(op, (*a)?, scalar).unwrap()))
                    .collect();
                let result = l.binary_scalar(op, scalar, false).unwrap();
                assert_eq!(values(&result), expected, "{context} scalar");
            }
            Operation::Shift(op) => {
                for amount in [1, 3, 33] {
                    let result = l.shift(op, amount);
                    if !legal {
                        assert!(result.is_err(), "{context}");
                        continue;
                    }
                    let expected: Vec<Option<T>> = left
                        .iter()
                        .map(|a| Some(kernel.scalar_shift(op, (*a)?, amount).unwrap()))
                        .collect();
                    assert_eq!(values(&result.unwrap()), expected, "{context} by {amount}");
                }
            }
            Operation::Comparison(op) => {
                let result = l.compare(op, &r);
                if !legal {
                    assert!(result.is_err(), "{context}");
                    continue;
                }
                let expected: Vec<Option<bool>> = pairs()
                    .map(|(a, b)| Some(op.evaluate((*a)?, (*b)?)))
                    .collect();
                assert_eq!(values(&result.unwrap()), expected, "{context}");
            }
        }
        if legal {
            legal_ops += 1;
        }
    }
    assert!(legal_ops >= 5, "{}", T::KIND);
}

#[test]
fn every_legal_operator_matches_the_scalar_reference() {
    agrees_with_scalar_reference(
        vec![Some(true), None, Some(false), Some(true), Some(false), Some(true), None],
        vec![Some(false), Some(true), Some(false), None, Some(true), Some(true), Some(true)],
    );
    agrees_with_scalar_reference(
        vec![Some(100i8), Some(-7), None, Some(-128), Some(55), Some(3), Some(127)],
        vec![Some(3i8), Some(2), Some(5), Some(-1), None, Some(-9), Some(4)],
    );
    agrees_with_scalar_reference(
        vec![Some(200u8), Some(7), None, Some(255), Some(16), Some(1), Some(90)],
        vec![Some(3u8), Some(2), Some(5), Some(9), None, Some(200), Some(4)],
    );
    agrees_with_scalar_reference(
        vec![Some(30_000i16), Some(-7), None, Some(i16::MIN), Some(1_000), Some(-3), Some(12)],
        vec![Some(7i16), Some(2), Some(5), Some(-1), None, Some(-9), Some(300)],
    );
    agrees_with_scalar_reference(
        vec![Some(60_000u16), Some(7), None, Some(u16::MAX), Some(1_024), Some(3), Some(12)],
        vec![Some(7u16), Some(2), Some(5), Some(9), None, Some(40_000), Some(300)],
    );
    agrees_with_scalar_reference(
        vec![Some(i32::MAX), Some(-70_000), None, Some(i32::MIN), Some(12_345), Some(-3), Some(8)],
        vec![Some(2i32), Some(-300), Some(5), Some(-1), None, Some(7), Some(1 << 20)],
    );
    agrees_with_scalar_reference(
        vec![Some(u32::MAX), Some(70_000u32), None, Some(1), Some(12_345), Some(3), Some(8)],
        vec![Some(2u32), Some(300), Some(5), Some(u32::MAX), None, Some(7), Some(1 << 20)],
    );
    agrees_with_scalar_reference(
        vec![Some(i64::MAX), Some(-9_000_000_000), None, Some(i64::MIN), Some(77), Some(-3), Some(5)],
        vec![Some(3i64), Some(-40_000), Some(5), Some(-1), None, Some(11), Some(1 << 40)],
    );
    agrees_with_scalar_reference(
        vec![Some(u64::MAX), Some(9_000_000_000u64), None, Some(0), Some(77), Some(3), Some(5)],
        vec![Some(3u64), Some(40_000), Some(5), Some(u64::MAX), None, Some(11), Some(1 << 40)],
    );
    agrees_with_scalar_reference(
        vec![Some(1.5f32), Some(-2.25), None, Some(7.0), Some(0.5), Some(3.0), Some(-1e30)],
        vec![Some(2.0f32), Some(4.0), Some(1.0), None, Some(-8.0), Some(0.25), Some(1e10)],
    );
    agrees_with_scalar_reference(
        vec![Some(1.5f64), Some(-2.25), None, Some(7.0), Some(0.5), Some(3.0), Some(-1e300)],
        vec![Some(2.0f64), Some(4.0), Some(1.0), None, Some(-8.0), Some(0.25), Some(1e10)],
    );
    let d = |s: &str| Some(s.parse::<Decimal>().unwrap());
    agrees_with_scalar_reference(
        vec![d("1.5"), d("-2.25"), None, d("7"), d("0.5"), d("3"), d("-123456.789")],
        vec![d("2"), d("4"), d("1"), None, d("-8"), d("0.25"), d("0.003")],
    );
    let c = |code: u16| Some(Char16(code));
    agrees_with_scalar_reference(
        vec![c(0xFFFF), c(0x41), None, c(1), c(0x8000), c(9), c(0x7A)],
        vec![c(3), c(2), c(5), c(0xFFFF), None, c(7), c(0x20)],
    );
}

#[test]
fn illegal_in_place_operations_leave_data_untouched() {
    let mut flags = column(vec![Some(true), None, Some(false)]);
    let other = flags.clone();
    assert_eq!(
        flags.add_in_place(&other),
        Err(FrameError::UnsupportedOperation {
            kind: PrimitiveKind::Boolean,
            operation: "add"
        })
    );
    assert_eq!(flags, other);

    let mut floats = column(vec![Some(1.5f64)]);
    assert!(floats
        .shift_in_place(ShiftOperation::LeftShift, 1)
        .is_err());
    assert_eq!(values(&floats), vec![Some(1.5)]);
}

#[test]
fn binary_results_are_null_where_either_side_is_null() {
    let left = column(vec![Some(1), None, Some(3), None]);
    let right = column(vec![Some(10), Some(20), None, None]);
    let sum = left.add(&right).unwrap();
    assert_eq!(values(&sum), vec![Some(11), None, None, None]);
    assert_eq!(sum.null_count(), 3);
    assert_eq!(sum.null_count(), sum.container().count_nulls_by_scan());
    // Copy-on-write: operands are unchanged.
    assert_eq!(values(&left), vec![Some(1), None, Some(3), None]);
}

#[test]
fn integer_arithmetic_wraps() {
    let left = column(vec![Some(i8::MAX), Some(i8::MIN), Some(-128)]);
    let right = column(vec![Some(1i8), Some(1), Some(-1)]);
    assert_eq!(
        values(&left.add(&right).unwrap()),
        vec![Some(i8::MIN), Some(-127), Some(127)]
    );
    assert_eq!(
        values(&left.divide(&right).unwrap()),
        vec![Some(i8::MAX), Some(i8::MIN), Some(-128)]
    );

    let bytes = column(vec![Some(250u8)]);
    assert_eq!(
        values(&bytes.binary_scalar(BinaryOperation::Multiply, 2, false).unwrap()),
        vec![Some(244)]
    );
}

#[test]
fn integer_division_by_zero_fails_before_mutating() {
    let mut left = column(vec![Some(4), Some(6), Some(8)]);
    let right = column(vec![Some(2), Some(3), Some(0)]);
    assert_eq!(
        left.divide_in_place(&right),
        Err(FrameError::DivideByZero {
            kind: PrimitiveKind::Int32
        })
    );
    assert_eq!(values(&left), vec![Some(4), Some(6), Some(8)]);

    assert!(left
        .binary_scalar(BinaryOperation::Modulo, 0, false)
        .is_err());
    assert!(column(vec![Some(0), Some(1)])
        .binary_scalar(BinaryOperation::Divide, 10, true)
        .is_err());
}

#[test]
fn zero_divisor_under_a_null_row_is_ignored() {
    let left = column(vec![Some(9), Some(5)]);
    let mut right = column(vec![Some(3), Some(0)]);
    right.set(1, None).unwrap();
    assert_eq!(values(&left.divide(&right).unwrap()), vec![Some(3), None]);
    assert_eq!(values(&left.modulo(&right).unwrap()), vec![Some(0), None]);
}

#[test]
fn float_division_follows_ieee() {
    let left = column(vec![Some(1.0f64), Some(-1.0), Some(0.0)]);
    let right = column(vec![Some(0.0f64), Some(0.0), Some(0.0)]);
    let quotient = values(&left.divide(&right).unwrap());
    assert_eq!(quotient[0], Some(f64::INFINITY));
    assert_eq!(quotient[1], Some(f64::NEG_INFINITY));
    assert!(quotient[2].is_some_and(f64::is_nan));
}

#[test]
fn reversed_scalar_puts_the_scalar_on_the_left() {
    let col = column(vec![Some(1), Some(2), None]);
    assert_eq!(
        values(&col.binary_scalar(BinaryOperation::Subtract, 10, true).unwrap()),
        vec![Some(9), Some(8), None]
    );
    assert_eq!(
        values(&col.binary_scalar(BinaryOperation::Subtract, 10, false).unwrap()),
        vec![Some(-9), Some(-8), None]
    );
}

#[test]
fn kernels_pair_chunks_positionally() {
    let options = ColumnOptions::with_chunk_rows::<i64>(3);
    let left = PrimitiveColumn::from_values("l", (0..10i64).map(Some), options).unwrap();
    let right = PrimitiveColumn::from_values("r", (0..10i64).map(|v| Some(v * 100)), options).unwrap();
    let sum = left.add(&right).unwrap();
    assert_eq!(sum.container().chunks().len(), 4);
    assert_eq!(
        values(&sum),
        (0..10i64).map(|v| Some(v * 101)).collect::<Vec<_>>()
    );

    let short = PrimitiveColumn::from_values("s", (0..4i64).map(Some), options).unwrap();
    assert_eq!(
        left.add(&short),
        Err(FrameError::LengthMismatch { left: 10, right: 4 })
    );

    let wider = ColumnOptions::with_chunk_rows::<i64>(4);
    let regrouped = PrimitiveColumn::from_values("w", (0..10i64).map(Some), wider).unwrap();
    let expected = FrameError::ChunkLayoutMismatch {
        chunk: 0,
        left: 3,
        right: 4,
    };
    assert_eq!(left.add(&regrouped), Err(expected.clone()));
    assert_eq!(
        left.compare(ComparisonOperation::Equal, &regrouped),
        Err(expected)
    );
}

#[test]
fn comparisons_produce_nullable_booleans() {
    let col = column(vec![Some(1), None, Some(3)]);
    let gt = col.compare_scalar(ComparisonOperation::Greater, 1).unwrap();
    assert_eq!(values(&gt), vec![Some(false), None, Some(true)]);
    assert_eq!(gt.null_count(), 1);

    let other = column(vec![Some(1), Some(2), Some(4)]);
    assert_eq!(
        values(&col.elementwise_eq(&other).unwrap()),
        vec![Some(true), None, Some(false)]
    );
    assert_eq!(
        values(&col.elementwise_le(&other).unwrap()),
        vec![Some(true), None, Some(true)]
    );

    let flags = column(vec![Some(true), Some(false)]);
    assert_eq!(
        values(&flags.compare_scalar(ComparisonOperation::NotEqual, true).unwrap()),
        vec![Some(false), Some(true)]
    );
}

#[test]
fn shifts_use_wrapping_width_semantics() {
    let col = column(vec![Some(1i32), Some(-8)]);
    assert_eq!(values(&col.left_shift(2).unwrap()), vec![Some(4), Some(-32)]);
    assert_eq!(values(&col.right_shift(1).unwrap()), vec![Some(0), Some(-4)]);
    assert_eq!(values(&col.left_shift(33).unwrap()), vec![Some(2), Some(-16)]);

    let bytes = column(vec![Some(200u8)]);
    assert_eq!(values(&bytes.right_shift(1).unwrap()), vec![Some(100)]);
}

#[test]
fn boolean_logic() {
    let left = column(vec![Some(true), Some(true), Some(false), None]);
    let right = column(vec![Some(true), Some(false), Some(false), Some(true)]);
    assert_eq!(
        values(&left.bitwise_xor(&right).unwrap()),
        vec![Some(false), Some(true), Some(false), None]
    );
    assert_eq!(
        values(&left.bitwise_or(&right).unwrap()),
        vec![Some(true), Some(true), Some(false), None]
    );
}

#[test]
fn decimal_arithmetic_is_checked() {
    let d = |s: &str| s.parse::<Decimal>().unwrap();
    let left = column(vec![Some(d("1.5")), Some(d("1"))]);
    let right = column(vec![Some(d("2")), Some(d("3"))]);

    let product = left.multiply(&right).unwrap();
    assert_eq!(product.get(0), Ok(Some(d("3"))));
    let quotient = left.divide(&right).unwrap();
    assert_eq!(quotient.get(1).unwrap().unwrap().to_string(), "0.3333333333");

    let zero = column(vec![Some(d("1")), Some(Decimal::ZERO)]);
    assert_eq!(
        left.divide(&zero),
        Err(FrameError::DivideByZero {
            kind: PrimitiveKind::Decimal
        })
    );

    let mut big = column(vec![Some(d("1")), Some(Decimal::MAX)]);
    assert_eq!(
        big.binary_scalar_in_place(BinaryOperation::Add, d("1"), false),
        Err(FrameError::ArithmeticOverflow {
            kind: PrimitiveKind::Decimal,
            operation: "add"
        })
    );
    assert_eq!(values(&big), vec![Some(d("1")), Some(Decimal::MAX)]);
}

#[test]
fn decimal_products_and_quotients_of_large_values_fit() {
    let d = |s: &str| s.parse::<Decimal>().unwrap();
    let large = column(vec![Some(d("10000000000000000000")), Some(d("9000000000000000000"))]);

    let halves = column(vec![Some(d("0.5")), Some(d("0.5"))]);
    assert_eq!(
        values(&large.multiply(&halves).unwrap()),
        vec![Some(d("5000000000000000000")), Some(d("4500000000000000000"))]
    );

    let divisors = column(vec![Some(d("4000000000000000000")), Some(d("5000000000000000000"))]);
    assert_eq!(
        values(&large.divide(&divisors).unwrap()),
        vec![Some(d("2.5")), Some(d("1.8"))]
    );

    assert_eq!(
        values(&large.binary_scalar(BinaryOperation::Divide, d("-0.25"), false).unwrap()),
        vec![Some(d("-40000000000000000000")), Some(d("-36000000000000000000"))]
    );
}

#[test]
fn in_place_results_equal_freshly_built_columns() {
    let mut sum = column(vec![Some(1), Some(2)]);
    sum.add_in_place(&column(vec![Some(1), None])).unwrap();
    assert_eq!(sum, column(vec![Some(2), None]));

    let mut product = column(vec![Some(d64(1.5)), None, Some(d64(4.0))]);
    product
        .multiply_in_place(&column(vec![Some(d64(2.0)), Some(d64(3.0)), None]))
        .unwrap();
    assert_eq!(product, column(vec![Some(d64(3.0)), None, None]));
}

fn d64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap()
}

#[test]
fn char16_behaves_like_u16() {
    let col = column(vec![Some(Char16(u16::MAX)), Some(Char16(0x41))]);
    let bumped = col
        .binary_scalar(BinaryOperation::Add, Char16(1), false)
        .unwrap();
    assert_eq!(values(&bumped), vec![Some(Char16(0)), Some(Char16(0x42))]);
    assert_eq!(
        values(&col.compare_scalar(ComparisonOperation::Less, Char16(0x100)).unwrap()),
        vec![Some(false), Some(true)]
    );
}
