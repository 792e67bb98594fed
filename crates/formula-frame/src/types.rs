#![forbid(unsafe_code)]

use crate::arithmetic::{
    BooleanArithmetic, Char16Arithmetic, ColumnArithmetic, DecimalArithmetic, Float32Arithmetic,
    Float64Arithmetic, Int16Arithmetic, Int32Arithmetic, Int64Arithmetic, Int8Arithmetic,
    OperationSupport, UInt16Arithmetic, UInt32Arithmetic, UInt64Arithmetic, UInt8Arithmetic,
};
use crate::decimal::Decimal;
use ordered_float::OrderedFloat;
use std::fmt;
use std::hash::Hash;

/// Runtime identity of a column's element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Boolean,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Char16,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 13] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Int8,
        PrimitiveKind::UInt8,
        PrimitiveKind::Int16,
        PrimitiveKind::UInt16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt64,
        PrimitiveKind::Float32,
        PrimitiveKind::Float64,
        PrimitiveKind::Decimal,
        PrimitiveKind::Char16,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::Int8 => "i8",
            PrimitiveKind::UInt8 => "u8",
            PrimitiveKind::Int16 => "i16",
            PrimitiveKind::UInt16 => "u16",
            PrimitiveKind::Int32 => "i32",
            PrimitiveKind::UInt32 => "u32",
            PrimitiveKind::Int64 => "i64",
            PrimitiveKind::UInt64 => "u64",
            PrimitiveKind::Float32 => "f32",
            PrimitiveKind::Float64 => "f64",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::Char16 => "char16",
        }
    }

    /// Size in bytes of one element.
    pub fn byte_width(self) -> usize {
        match self {
            PrimitiveKind::Boolean | PrimitiveKind::Int8 | PrimitiveKind::UInt8 => 1,
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 | PrimitiveKind::Char16 => 2,
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 | PrimitiveKind::Float32 => 4,
            PrimitiveKind::Int64 | PrimitiveKind::UInt64 | PrimitiveKind::Float64 => 8,
            PrimitiveKind::Decimal => 16,
        }
    }

    /// Which operator families are legal for this kind.
    pub fn support(self) -> OperationSupport {
        match self {
            PrimitiveKind::Boolean => OperationSupport::BOOLEAN,
            PrimitiveKind::Float32 | PrimitiveKind::Float64 | PrimitiveKind::Decimal => {
                OperationSupport::FRACTIONAL
            }
            _ => OperationSupport::INTEGER,
        }
    }

    /// Scalar type declared to external row-cursor consumers.
    pub fn external_scalar_type(self) -> ExternalScalarType {
        match self {
            PrimitiveKind::Boolean => ExternalScalarType::Boolean,
            PrimitiveKind::Int8 => ExternalScalarType::Int8,
            PrimitiveKind::UInt8 => ExternalScalarType::UInt8,
            PrimitiveKind::Int16 => ExternalScalarType::Int16,
            PrimitiveKind::UInt16 | PrimitiveKind::Char16 => ExternalScalarType::UInt16,
            PrimitiveKind::Int32 => ExternalScalarType::Int32,
            PrimitiveKind::UInt32 => ExternalScalarType::UInt32,
            PrimitiveKind::Int64 => ExternalScalarType::Int64,
            PrimitiveKind::UInt64 => ExternalScalarType::UInt64,
            PrimitiveKind::Float32 => ExternalScalarType::Float32,
            PrimitiveKind::Float64 | PrimitiveKind::Decimal => ExternalScalarType::Float64,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar types understood by row-cursor consumers. Narrower than
/// [`PrimitiveKind`]: decimals are declared as `Float64` and UTF-16 code units
/// as `UInt16`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExternalScalarType {
    Boolean,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

/// A single UTF-16 code unit.
#[repr(transparent)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
pub struct Char16(pub u16);

impl Char16 {
    pub fn wrapping_add(self, rhs: Self) -> Self {
        Char16(self.0.wrapping_add(rhs.0))
    }

    pub fn wrapping_sub(self, rhs: Self) -> Self {
        Char16(self.0.wrapping_sub(rhs.0))
    }

    pub fn wrapping_mul(self, rhs: Self) -> Self {
        Char16(self.0.wrapping_mul(rhs.0))
    }

    pub fn wrapping_div(self, rhs: Self) -> Self {
        Char16(self.0.wrapping_div(rhs.0))
    }

    pub fn wrapping_rem(self, rhs: Self) -> Self {
        Char16(self.0.wrapping_rem(rhs.0))
    }

    pub fn wrapping_shl(self, amount: u32) -> Self {
        Char16(self.0.wrapping_shl(amount))
    }

    pub fn wrapping_shr(self, amount: u32) -> Self {
        Char16(self.0.wrapping_shr(amount))
    }

    /// The code unit as a `char`, or `None` for a lone surrogate.
    pub fn to_char(self) -> Option<char> {
        char::from_u32(u32::from(self.0))
    }
}

impl From<u16> for Char16 {
    fn from(value: u16) -> Self {
        Char16(value)
    }
}

impl TryFrom<char> for Char16 {
    type Error = std::num::TryFromIntError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        u16::try_from(u32::from(value)).map(Char16)
    }
}

impl std::ops::BitAnd for Char16 {
    type Output = Char16;

    fn bitand(self, rhs: Self) -> Self {
        Char16(self.0 & rhs.0)
    }
}

impl std::ops::BitOr for Char16 {
    type Output = Char16;

    fn bitor(self, rhs: Self) -> Self {
        Char16(self.0 | rhs.0)
    }
}

impl std::ops::BitXor for Char16 {
    type Output = Char16;

    fn bitxor(self, rhs: Self) -> Self {
        Char16(self.0 ^ rhs.0)
    }
}

impl fmt::Display for Char16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_char() {
            Some(c) => write!(f, "{c}"),
            None => write!(f, "\\u{{{:04x}}}", self.0),
        }
    }
}

/// A dynamically typed cell value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Null,
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

impl Scalar {
    /// The kind of a non-null scalar.
    pub fn kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Scalar::Null => return None,
            Scalar::Boolean(_) => PrimitiveKind::Boolean,
            Scalar::Int8(_) => PrimitiveKind::Int8,
            Scalar::UInt8(_) => PrimitiveKind::UInt8,
            Scalar::Int16(_) => PrimitiveKind::Int16,
            Scalar::UInt16(_) => PrimitiveKind::UInt16,
            Scalar::Int32(_) => PrimitiveKind::Int32,
            Scalar::UInt32(_) => PrimitiveKind::UInt32,
            Scalar::Int64(_) => PrimitiveKind::Int64,
            Scalar::UInt64(_) => PrimitiveKind::UInt64,
            Scalar::Float32(_) => PrimitiveKind::Float32,
            Scalar::Float64(_) => PrimitiveKind::Float64,
            Scalar::Decimal(_) => PrimitiveKind::Decimal,
            Scalar::Char16(_) => PrimitiveKind::Char16,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().map(PrimitiveKind::name).unwrap_or("null")
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Boolean(v) => write!(f, "{v}"),
            Scalar::Int8(v) => write!(f, "{v}"),
            Scalar::UInt8(v) => write!(f, "{v}"),
            Scalar::Int16(v) => write!(f, "{v}"),
            Scalar::UInt16(v) => write!(f, "{v}"),
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::UInt32(v) => write!(f, "{v}"),
            Scalar::Int64(v) => write!(f, "{v}"),
            Scalar::UInt64(v) => write!(f, "{v}"),
            Scalar::Float32(v) => write!(f, "{v}"),
            Scalar::Float64(v) => write!(f, "{v}"),
            Scalar::Decimal(v) => write!(f, "{v}"),
            Scalar::Char16(v) => write!(f, "{v}"),
        }
    }
}

/// An element type a column can store.
///
/// Each implementation fixes the element's runtime kind, how it hashes and
/// orders for grouping and sorting, how it decodes from raw little-endian
/// bytes, and which [`ColumnArithmetic`] kernel serves its operators.
pub trait PrimitiveType:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + bytemuck::NoUninit
    + 'static
{
    /// Hashable, totally ordered stand-in for the value.
    type Key: Copy + Eq + Ord + Hash + fmt::Debug;

    const KIND: PrimitiveKind;

    /// Multiplicative identity (`true` for booleans).
    const ONE: Self;

    /// The operator kernel for this element type.
    fn arithmetic() -> &'static dyn ColumnArithmetic<Self>;

    fn key(self) -> Self::Key;

    /// Bits fed to distinct-count sketches.
    fn hash_bits(self) -> u64;

    fn to_f64(self) -> f64;

    /// Decode one value from exactly `KIND.byte_width()` little-endian bytes.
    fn from_le_bytes(bytes: &[u8]) -> Self;

    fn into_scalar(self) -> Scalar;

    /// `None` for [`Scalar::Null`] and for scalars of another kind.
    fn from_scalar(scalar: &Scalar) -> Option<Self>;
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut raw = [0u8; N];
    raw.copy_from_slice(&bytes[..N]);
    raw
}

macro_rules! integer_type {
    ($ty:ty, $kind:ident, $arithmetic:ident) => {
        impl PrimitiveType for $ty {
            type Key = $ty;

            const KIND: PrimitiveKind = PrimitiveKind::$kind;
            const ONE: Self = 1;

            fn arithmetic() -> &'static dyn ColumnArithmetic<Self> {
                &$arithmetic
            }

            fn key(self) -> Self::Key {
                self
            }

            fn hash_bits(self) -> u64 {
                self as u64
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_le_bytes(bytes: &[u8]) -> Self {
                <$ty>::from_le_bytes(le_array(bytes))
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$kind(self)
            }

            fn from_scalar(scalar: &Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$kind(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! float_type {
    ($ty:ty, $kind:ident, $arithmetic:ident) => {
        impl PrimitiveType for $ty {
            type Key = OrderedFloat<$ty>;

            const KIND: PrimitiveKind = PrimitiveKind::$kind;
            const ONE: Self = 1.0;

            fn arithmetic() -> &'static dyn ColumnArithmetic<Self> {
                &$arithmetic
            }

            fn key(self) -> Self::Key {
                OrderedFloat(self)
            }

            fn hash_bits(self) -> u64 {
                // Fold -0.0 into 0.0 so both land in the same sketch bucket.
                let value = if self == 0.0 { 0.0 } else { self };
                value.to_bits() as u64
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_le_bytes(bytes: &[u8]) -> Self {
                <$ty>::from_le_bytes(le_array(bytes))
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$kind(self)
            }

            fn from_scalar(scalar: &Scalar) -> Option<Self> {
                match scalar {
                    Scalar::$kind(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

integer_type!(i8, Int8, Int8Arithmetic);
integer_type!(u8, UInt8, UInt8Arithmetic);
integer_type!(i16, Int16, Int16Arithmetic);
integer_type!(u16, UInt16, UInt16Arithmetic);
integer_type!(i32, Int32, Int32Arithmetic);
integer_type!(u32, UInt32, UInt32Arithmetic);
integer_type!(i64, Int64, Int64Arithmetic);
integer_type!(u64, UInt64, UInt64Arithmetic);
float_type!(f32, Float32, Float32Arithmetic);
float_type!(f64, Float64, Float64Arithmetic);

impl PrimitiveType for bool {
    type Key = bool;

    const KIND: PrimitiveKind = PrimitiveKind::Boolean;
    const ONE: Self = true;

    fn arithmetic() -> &'static dyn ColumnArithmetic<Self> {
        &BooleanArithmetic
    }

    fn key(self) -> Self::Key {
        self
    }

    fn hash_bits(self) -> u64 {
        u64::from(self)
    }

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn from_le_bytes(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Boolean(self)
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl PrimitiveType for Decimal {
    type Key = Decimal;

    const KIND: PrimitiveKind = PrimitiveKind::Decimal;
    const ONE: Self = Decimal::ONE;

    fn arithmetic() -> &'static dyn ColumnArithmetic<Self> {
        &DecimalArithmetic
    }

    fn key(self) -> Self::Key {
        self
    }

    fn hash_bits(self) -> u64 {
        let raw = self.raw() as u128;
        (raw as u64) ^ ((raw >> 64) as u64)
    }

    fn to_f64(self) -> f64 {
        Decimal::to_f64(self)
    }

    fn from_le_bytes(bytes: &[u8]) -> Self {
        Decimal::from_raw(i128::from_le_bytes(le_array(bytes)))
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Decimal(self)
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Decimal(v) => Some(*v),
            _ => None,
        }
    }
}

impl PrimitiveType for Char16 {
    type Key = Char16;

    const KIND: PrimitiveKind = PrimitiveKind::Char16;
    const ONE: Self = Char16(1);

    fn arithmetic() -> &'static dyn ColumnArithmetic<Self> {
        &Char16Arithmetic
    }

    fn key(self) -> Self::Key {
        self
    }

    fn hash_bits(self) -> u64 {
        u64::from(self.0)
    }

    fn to_f64(self) -> f64 {
        f64::from(self.0)
    }

    fn from_le_bytes(bytes: &[u8]) -> Self {
        Char16(u16::from_le_bytes(le_array(bytes)))
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Char16(self)
    }

    fn from_scalar(scalar: &Scalar) -> Option<Self> {
        match scalar {
            Scalar::Char16(v) => Some(*v),
            _ => None,
        }
    }
}
