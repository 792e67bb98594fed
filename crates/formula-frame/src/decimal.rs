#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

/// Signed fixed-point decimal with [`Decimal::SCALE`] fractional digits.
///
/// Stored as a scaled `i128`, which is the same layout as the columnar
/// `Decimal128(38, 10)` type, so exported buffers need no conversion.
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
pub struct Decimal(i128);

const FACTOR: i128 = 10_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal literal: {0:?}")]
pub struct ParseDecimalError(String);

impl Decimal {
    /// Number of fractional digits.
    pub const SCALE: i8 = 10;
    /// Total number of significant decimal digits.
    pub const PRECISION: u8 = 38;

    pub const ZERO: Decimal = Decimal(0);
    pub const ONE: Decimal = Decimal(FACTOR);
    pub const MAX: Decimal = Decimal(i128::MAX);
    pub const MIN: Decimal = Decimal(i128::MIN);

    /// Build from the raw scaled representation (`value * 10^SCALE`).
    pub const fn from_raw(raw: i128) -> Self {
        Decimal(raw)
    }

    pub const fn raw(self) -> i128 {
        self.0
    }

    pub const fn from_i64(value: i64) -> Self {
        Decimal(value as i128 * FACTOR)
    }

    /// Nearest representable decimal, or `None` for non-finite or out-of-range input.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * FACTOR as f64).round();
        if scaled >= i128::MAX as f64 || scaled <= i128::MIN as f64 {
            return None;
        }
        Some(Decimal(scaled as i128))
    }

    pub fn to_f64(self) -> f64 {
        let int = (self.0 / FACTOR) as f64;
        let frac = (self.0 % FACTOR) as f64 / FACTOR as f64;
        int + frac
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Decimal)
    }

    /// Product truncated toward zero at [`Decimal::SCALE`] digits.
    ///
    /// The raw product is formed at 256 bits, so only results outside the
    /// `i128` range overflow.
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        let (hi, lo) = widening_mul(self.0.unsigned_abs(), rhs.0.unsigned_abs());
        let magnitude = wide_div(hi, lo, FACTOR as u128)?;
        with_sign(magnitude, (self.0 < 0) != (rhs.0 < 0)).map(Decimal)
    }

    /// Quotient truncated toward zero at [`Decimal::SCALE`] digits.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.0 == 0 {
            return None;
        }
        let (hi, lo) = widening_mul(self.0.unsigned_abs(), FACTOR as u128);
        let magnitude = wide_div(hi, lo, rhs.0.unsigned_abs())?;
        with_sign(magnitude, (self.0 < 0) != (rhs.0 < 0)).map(Decimal)
    }

    pub fn checked_rem(self, rhs: Self) -> Option<Self> {
        self.0.checked_rem(rhs.0).map(Decimal)
    }

    pub fn abs(self) -> Self {
        Decimal(self.0.wrapping_abs())
    }
}

/// Full 256-bit product of two `u128`s as `(high, low)` halves.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let low = a_lo * b_lo;
    let cross_a = a_hi * b_lo;
    let cross_b = a_lo * b_hi;
    let high = a_hi * b_hi;

    // At most three 64-bit terms, so this cannot overflow.
    let mid = (low >> 64) + (cross_a & MASK) + (cross_b & MASK);
    let lo = (low & MASK) | (mid << 64);
    let hi = high + (cross_a >> 64) + (cross_b >> 64) + (mid >> 64);
    (hi, lo)
}

/// `(hi, lo) / divisor`, or `None` when the quotient does not fit in `u128`.
fn wide_div(hi: u128, lo: u128, divisor: u128) -> Option<u128> {
    if divisor == 0 || hi >= divisor {
        return None;
    }
    if hi == 0 {
        return Some(lo / divisor);
    }
    // Restoring long division over the low half; the remainder stays below
    // the divisor, with the shifted-out bit carried separately.
    let mut remainder = hi;
    let mut quotient = 0u128;
    for bit in (0..128).rev() {
        let carry = remainder >> 127;
        remainder = (remainder << 1) | ((lo >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || remainder >= divisor {
            remainder = remainder.wrapping_sub(divisor);
            quotient |= 1;
        }
    }
    Some(quotient)
}

fn with_sign(magnitude: u128, negative: bool) -> Option<i128> {
    if negative {
        if magnitude <= i128::MIN.unsigned_abs() {
            Some((magnitude as i128).wrapping_neg())
        } else {
            None
        }
    } else {
        i128::try_from(magnitude).ok()
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::from_i64(value)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let magnitude = self.0.unsigned_abs();
        let factor = FACTOR as u128;
        let int = magnitude / factor;
        let frac = magnitude % factor;
        if negative {
            f.write_str("-")?;
        }
        write!(f, "{int}")?;
        if frac != 0 {
            let digits = format!("{frac:0width$}", width = Decimal::SCALE as usize);
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDecimalError(s.to_owned());
        let text = s.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if frac_part.len() > Decimal::SCALE as usize {
            return Err(err());
        }
        if !int_part
            .bytes()
            .chain(frac_part.bytes())
            .all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }

        let int: i128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err())?
        };
        let mut frac: i128 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| err())?
        };
        for _ in frac_part.len()..Decimal::SCALE as usize {
            frac *= 10;
        }

        let raw = int
            .checked_mul(FACTOR)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(err)?;
        Ok(Decimal(if negative { -raw } else { raw }))
    }
}
