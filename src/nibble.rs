use std::fmt;
use std::ops::{Index, IndexMut};

/// A 4-bit unsigned integer.
///
/// Register numbers, keypad codes and opcode fields are all nibbles, so
/// carrying them as `u4` lets `[T; 16]` be indexed without a bounds check
/// at every use site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub struct u4(u8);

impl u4 {
    /// Creates a `u4`, panicking if `value` does not fit in four bits.
    pub const fn new(value: u8) -> Self {
        assert!(value <= 0x0F, "u4 out of range");
        Self(value)
    }

    /// Creates a `u4` from the low four bits of `value`.
    pub const fn from_low(value: u8) -> Self {
        Self(value & 0x0F)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// All sixteen nibble values in ascending order.
    pub fn all() -> impl Iterator<Item = u4> {
        (0..16u8).map(u4)
    }
}

impl From<u4> for u8 {
    fn from(v: u4) -> u8 {
        v.0
    }
}

impl From<u4> for u16 {
    fn from(v: u4) -> u16 {
        v.0.into()
    }
}

impl From<u4> for usize {
    fn from(v: u4) -> usize {
        v.0.into()
    }
}

impl fmt::Display for u4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl<T> Index<u4> for [T; 16] {
    type Output = T;

    fn index(&self, index: u4) -> &T {
        &self[usize::from(index)]
    }
}

impl<T> IndexMut<u4> for [T; 16] {
    fn index_mut(&mut self, index: u4) -> &mut T {
        &mut self[usize::from(index)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_sixteen_element_arrays() {
        let mut regs = [0u8; 16];
        regs[u4::new(0xF)] = 0xAB;
        assert_eq!(regs[u4::new(0xF)], 0xAB);
    }

    #[test]
    fn from_low_masks_high_bits() {
        assert_eq!(u4::from_low(0xAB).value(), 0x0B);
    }

    #[test]
    #[should_panic]
    fn new_rejects_wide_values() {
        u4::new(0x10);
    }
}
