#![forbid(unsafe_code)]

/// Bit-packed presence flags for one chunk.
///
/// Bits are stored LSB-first within each byte, the columnar validity layout:
/// - bit 0 is the LSB of byte 0
/// - bit 7 is the MSB of byte 0
///
/// A set bit means the slot holds a value, a cleared bit means null. The mask
/// does not keep a running null count; the owning container does.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ValidityMask {
    bytes: Vec<u8>,
    len: usize,
}

fn byte_len(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Mask of the bits in use within the last byte of a `len`-bit buffer.
fn tail_mask(len: usize) -> u8 {
    match len % 8 {
        0 => u8::MAX,
        rem => (1u8 << rem) - 1,
    }
}

impl ValidityMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(byte_len(bits)),
            len: 0,
        }
    }

    pub fn with_len_all_valid(bits: usize) -> Self {
        let mut mask = Self::new();
        mask.extend_constant(true, bits);
        mask
    }

    pub fn with_len_all_null(bits: usize) -> Self {
        Self {
            bytes: vec![0u8; byte_len(bits)],
            len: bits,
        }
    }

    /// Reconstruct a mask from packed bytes, ignoring any bits past `len`.
    ///
    /// Panics if `bytes` holds fewer than `len` bits.
    pub fn from_bytes(bytes: &[u8], len: usize) -> Self {
        let mut owned = bytes[..byte_len(len)].to_vec();
        if let Some(last) = owned.last_mut() {
            *last &= tail_mask(len);
        }
        Self { bytes: owned, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn reserve(&mut self, additional_bits: usize) {
        let needed = byte_len(self.len + additional_bits);
        self.bytes.reserve(needed.saturating_sub(self.bytes.len()));
    }

    pub fn push(&mut self, valid: bool) {
        let bit = self.len % 8;
        if bit == 0 {
            self.bytes.push(0);
        }
        if valid {
            self.bytes[self.len / 8] |= 1u8 << bit;
        }
        self.len += 1;
    }

    /// Append `count` copies of the same flag.
    pub fn extend_constant(&mut self, valid: bool, count: usize) {
        if count == 0 {
            return;
        }
        let new_len = self.len + count;
        if valid {
            // Finish the partially used byte, then fill whole bytes.
            let mut start = self.len;
            while start % 8 != 0 && start < new_len {
                self.bytes[start / 8] |= 1u8 << (start % 8);
                start += 1;
            }
            self.bytes.resize(byte_len(new_len), u8::MAX);
            if let Some(last) = self.bytes.last_mut() {
                *last &= tail_mask(new_len);
            }
        } else {
            self.bytes.resize(byte_len(new_len), 0);
        }
        self.len = new_len;
    }

    pub fn is_valid(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "ValidityMask index out of bounds");
        (self.bytes[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Write the flag at `index` and return the previous one, so the caller
    /// can tell whether its null count changed.
    pub fn set_valid(&mut self, index: usize, valid: bool) -> bool {
        debug_assert!(index < self.len, "ValidityMask index out of bounds");
        let byte = &mut self.bytes[index / 8];
        let bit = 1u8 << (index % 8);
        let was_valid = *byte & bit != 0;
        if valid {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
        was_valid
    }

    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.bytes.truncate(byte_len(len));
        if let Some(last) = self.bytes.last_mut() {
            *last &= tail_mask(len);
        }
        self.len = len;
    }

    /// Clear every bit that is cleared in `other`.
    pub fn and_inplace(&mut self, other: &ValidityMask) {
        debug_assert_eq!(self.len, other.len, "ValidityMask length mismatch");
        for (dst, src) in self.bytes.iter_mut().zip(&other.bytes) {
            *dst &= *src;
        }
    }

    /// Number of cleared bits, by scanning the whole mask.
    pub fn count_nulls(&self) -> usize {
        self.count_nulls_in(0, self.len)
    }

    /// Number of cleared bits in `start..end`.
    pub fn count_nulls_in(&self, start: usize, end: usize) -> usize {
        debug_assert!(start <= end && end <= self.len);
        if start >= end {
            return 0;
        }

        let mut valid = 0usize;
        let mut idx = start;
        while idx < end && idx % 8 != 0 {
            valid += usize::from(self.is_valid(idx));
            idx += 1;
        }
        let full_end = idx + (end - idx) / 8 * 8;
        for byte in &self.bytes[idx / 8..full_end / 8] {
            valid += byte.count_ones() as usize;
        }
        for i in full_end..end {
            valid += usize::from(self.is_valid(i));
        }

        (end - start) - valid
    }

    pub fn all_valid(&self) -> bool {
        self.count_nulls() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back_lsb_first() {
        let mut mask = ValidityMask::new();
        for valid in [true, false, true, true, false, false, false, false, true] {
            mask.push(valid);
        }
        assert_eq!(mask.len(), 9);
        assert_eq!(mask.as_bytes(), &[0b0000_1101, 0b0000_0001]);
        assert!(mask.is_valid(8));
        assert_eq!(mask.count_nulls(), 5);
    }

    #[test]
    fn set_valid_reports_previous_flag() {
        let mut mask = ValidityMask::with_len_all_valid(10);
        assert!(mask.set_valid(3, false));
        assert!(!mask.set_valid(3, false));
        assert!(!mask.set_valid(3, true));
        assert_eq!(mask.count_nulls(), 0);
    }

    #[test]
    fn extend_constant_across_byte_boundaries() {
        let mut mask = ValidityMask::new();
        mask.push(false);
        mask.extend_constant(true, 12);
        mask.extend_constant(false, 5);
        mask.extend_constant(true, 3);
        assert_eq!(mask.len(), 21);
        assert_eq!(mask.count_nulls(), 6);
        assert!(!mask.is_valid(0));
        assert!(mask.is_valid(12));
        assert!(!mask.is_valid(13));
        assert!(mask.is_valid(20));
        assert_eq!(mask.as_bytes().len(), 3);
        // Bits past `len` stay cleared.
        assert_eq!(mask.as_bytes()[2] & !0b0001_1111, 0);
    }

    #[test]
    fn range_counts_match_bitwise_scan() {
        let mut mask = ValidityMask::new();
        for i in 0..100 {
            mask.push(i % 3 != 0);
        }
        for (start, end) in [(0, 100), (5, 6), (7, 64), (13, 99), (50, 50)] {
            let expected = (start..end).filter(|i| i % 3 == 0).count();
            assert_eq!(mask.count_nulls_in(start, end), expected, "{start}..{end}");
        }
    }

    #[test]
    fn truncate_clears_tail_bits() {
        let mut mask = ValidityMask::with_len_all_valid(16);
        mask.truncate(3);
        assert_eq!(mask.as_bytes(), &[0b0000_0111]);
        mask.extend_constant(false, 2);
        assert_eq!(mask.count_nulls(), 2);
    }

    #[test]
    fn and_inplace_propagates_nulls() {
        let mut a = ValidityMask::with_len_all_valid(4);
        let mut b = ValidityMask::with_len_all_valid(4);
        b.set_valid(1, false);
        a.set_valid(3, false);
        a.and_inplace(&b);
        assert_eq!(a.count_nulls(), 2);
        assert!(!a.is_valid(1));
        assert!(!a.is_valid(3));
    }

    #[test]
    fn from_bytes_masks_trailing_bits() {
        let mask = ValidityMask::from_bytes(&[0xff, 0xff], 10);
        assert_eq!(mask.as_bytes(), &[0xff, 0b0000_0011]);
        assert_eq!(mask.count_nulls(), 0);
    }
}
