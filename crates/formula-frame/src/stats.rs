#![forbid(unsafe_code)]

use crate::container::ColumnContainer;
use crate::types::{PrimitiveKind, PrimitiveType, Scalar};
use std::collections::HashSet;

/// Summary of one column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnStats {
    pub kind: PrimitiveKind,
    pub len: u64,
    pub null_count: u64,
    /// Exact up to a few thousand values, a HyperLogLog estimate above.
    pub distinct_count: u64,
    /// `None` for all-null columns and for kinds without an ordering.
    pub min: Option<Scalar>,
    pub max: Option<Scalar>,
    /// `None` for all-null columns and for kinds without arithmetic.
    pub mean: Option<f64>,
}

impl ColumnStats {
    pub(crate) fn compute<T: PrimitiveType>(container: &ColumnContainer<T>) -> Self {
        let support = T::KIND.support();
        let mut distinct = DistinctCounter::for_rows(container.len() - container.null_count());
        let mut bounds: Option<(T, T)> = None;
        let mut sum = 0.0f64;
        let mut valid = 0u64;

        for value in container.iter().flatten() {
            distinct.insert(value.hash_bits());
            valid += 1;
            sum += value.to_f64();
            bounds = Some(match bounds {
                None => (value, value),
                Some((lo, hi)) => (
                    if value.key() < lo.key() { value } else { lo },
                    if value.key() > hi.key() { value } else { hi },
                ),
            });
        }

        let bounds = bounds.filter(|_| support.ordering);
        Self {
            kind: T::KIND,
            len: container.len(),
            null_count: container.null_count(),
            distinct_count: distinct.estimate(),
            min: bounds.map(|(lo, _)| lo.into_scalar()),
            max: bounds.map(|(_, hi)| hi.into_scalar()),
            mean: (valid > 0 && support.arithmetic).then(|| sum / valid as f64),
        }
    }
}

/// HyperLogLog sketch over 64-bit hashes with `2^precision` registers.
#[derive(Clone, Debug)]
pub(crate) struct HyperLogLog {
    precision: u8,
    registers: Box<[u8]>,
}

impl HyperLogLog {
    pub fn with_precision(precision: u8) -> Self {
        debug_assert!((4..=16).contains(&precision));
        Self {
            precision,
            registers: vec![0u8; 1 << precision].into_boxed_slice(),
        }
    }

    pub fn insert_hash(&mut self, hash: u64) {
        let register = (hash >> (64 - self.precision)) as usize;
        let rank = ((hash << self.precision).leading_zeros() + 1) as u8;
        let slot = &mut self.registers[register];
        *slot = (*slot).max(rank);
    }

    pub fn estimate(&self) -> u64 {
        let m = self.registers.len() as f64;
        let alpha = match self.registers.len() {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / m),
        };
        let (harmonic, empty) = self.registers.iter().fold((0.0f64, 0u32), |(sum, empty), &r| {
            (sum + (-(r as f64)).exp2(), empty + u32::from(r == 0))
        });
        let raw = alpha * m * m / harmonic;

        // Linear counting while many registers are still empty.
        let estimate = if raw <= 2.5 * m && empty > 0 {
            m * (m / empty as f64).ln()
        } else {
            raw
        };
        estimate.round().max(0.0) as u64
    }
}

fn splitmix64(bits: u64) -> u64 {
    let mut z = bits.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Distinct-value counter: exact while small, a sketch once it spills.
#[derive(Clone, Debug)]
pub(crate) enum DistinctCounter {
    Exact { seen: HashSet<u64>, precision: u8 },
    Sketch(HyperLogLog),
}

impl DistinctCounter {
    const MIN_PRECISION: u8 = 10;
    const MAX_PRECISION: u8 = 14;

    /// Counter sized for a column of `rows` non-null values.
    ///
    /// Longer columns get a wider sketch (one register bit per fourfold growth
    /// past 64Ki rows), and the exact phase holds twice as many hashes as the
    /// sketch has registers.
    pub fn for_rows(rows: u64) -> Self {
        let bits = u64::BITS - rows.leading_zeros();
        let precision = (bits / 2 + 2).clamp(
            u32::from(Self::MIN_PRECISION),
            u32::from(Self::MAX_PRECISION),
        ) as u8;
        Self::Exact {
            seen: HashSet::new(),
            precision,
        }
    }

    fn exact_limit(precision: u8) -> usize {
        2 << precision
    }

    /// Record a value by its [`PrimitiveType::hash_bits`].
    pub fn insert(&mut self, bits: u64) {
        let hash = splitmix64(bits);
        match self {
            Self::Exact { seen, precision } => {
                if seen.len() >= Self::exact_limit(*precision) && !seen.contains(&hash) {
                    log::trace!(
                        "distinct counter spilled into a 2^{precision} sketch after {} values",
                        seen.len()
                    );
                    let mut sketch = HyperLogLog::with_precision(*precision);
                    seen.iter().for_each(|&h| sketch.insert_hash(h));
                    sketch.insert_hash(hash);
                    *self = Self::Sketch(sketch);
                } else {
                    seen.insert(hash);
                }
            }
            Self::Sketch(sketch) => sketch.insert_hash(hash),
        }
    }

    pub fn estimate(&self) -> u64 {
        match self {
            Self::Exact { seen, .. } => seen.len() as u64,
            Self::Sketch(sketch) => sketch.estimate(),
        }
    }
}
