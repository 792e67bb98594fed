#![cfg(feature = "arrow")]

use arrow_array::{Array, BooleanArray, Decimal128Array, Float64Array, Int32Array, UInt16Array};
use arrow_schema::DataType;
use formula_frame::{
    Char16, ColumnContainer, ColumnOptions, Decimal, FrameError, PrimitiveColumn,
};
use pretty_assertions::assert_eq;

#[test]
fn chunks_move_into_arrow_arrays_without_copying() {
    let container = ColumnContainer::from_values(
        vec![Some(1), None, Some(3), Some(4), Some(5)],
        ColumnOptions::with_chunk_rows::<i32>(3),
    )
    .unwrap();
    let first_chunk = container.chunks()[0].values().as_slice().as_ptr() as usize;

    let arrays = container.into_arrow_arrays().unwrap();
    assert_eq!(arrays.len(), 2);

    let first = arrays[0].as_any().downcast_ref::<Int32Array>().unwrap();
    assert_eq!(first.values().as_ptr() as usize, first_chunk);
    assert_eq!(first.len(), 3);
    assert_eq!(first.null_count(), 1);
    assert!(first.is_null(1));
    assert_eq!(first.value(2), 3);

    let second = arrays[1].as_any().downcast_ref::<Int32Array>().unwrap();
    assert_eq!(second.null_count(), 0);
    assert!(second.nulls().is_none());
    assert_eq!(second.values().to_vec(), vec![4, 5]);
}

#[test]
fn special_kinds_map_to_arrow_types() {
    let decimals = ColumnContainer::from(vec![Some("1.25".parse::<Decimal>().unwrap()), None]);
    let arrays = decimals.into_arrow_arrays().unwrap();
    assert_eq!(arrays[0].data_type(), &DataType::Decimal128(38, 10));
    let array = arrays[0].as_any().downcast_ref::<Decimal128Array>().unwrap();
    assert_eq!(array.value(0), 12_500_000_000);
    assert!(array.is_null(1));

    let chars = ColumnContainer::from(vec![Char16(0x41), Char16(0x42)]);
    let arrays = chars.into_arrow_arrays().unwrap();
    let array = arrays[0].as_any().downcast_ref::<UInt16Array>().unwrap();
    assert_eq!(array.values().to_vec(), vec![0x41, 0x42]);

    let flags = ColumnContainer::from(vec![Some(true), Some(false), None]);
    let arrays = flags.into_arrow_arrays().unwrap();
    let array = arrays[0].as_any().downcast_ref::<BooleanArray>().unwrap();
    assert!(array.value(0));
    assert!(!array.value(1));
    assert!(array.is_null(2));
}

#[test]
fn imports_matching_arrow_arrays() {
    let array = Int32Array::from(vec![Some(7), None, Some(9), Some(11)]);
    let sliced = array.slice(1, 3);
    let container =
        ColumnContainer::<i32>::from_arrow(&sliced, ColumnOptions::default()).unwrap();
    assert_eq!(
        container.iter().collect::<Vec<_>>(),
        vec![None, Some(9), Some(11)]
    );
    assert_eq!(container.null_count(), 1);

    let flags = BooleanArray::from(vec![Some(false), None, Some(true)]);
    let column =
        PrimitiveColumn::<bool>::from_arrow("flags", &flags, ColumnOptions::default()).unwrap();
    assert_eq!(column.iter().collect::<Vec<_>>(), vec![Some(false), None, Some(true)]);

    let floats = Float64Array::from(vec![1.0]);
    assert_eq!(
        ColumnContainer::<i32>::from_arrow(&floats, ColumnOptions::default()),
        Err(FrameError::TypeMismatch {
            expected: "i32",
            actual: "f64"
        })
    );
}

#[test]
fn arrow_field_describes_the_column() {
    let column = PrimitiveColumn::<Char16>::new("initials");
    let field = column.arrow_field();
    assert_eq!(field.name(), "initials");
    assert_eq!(field.data_type(), &DataType::UInt16);
    assert!(field.is_nullable());
}
