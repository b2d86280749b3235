use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Returns a value with the `width` least significant bits set.
///
/// # Example
/// ```
/// # use rtlsim::data_structures::mask;
/// # use rtlsim::BigUint;
/// assert_eq!(mask(4), BigUint::from(0b1111u8));
/// assert_eq!(mask(0), BigUint::from(0u8));
/// ```
pub fn mask(width: usize) -> BigUint {
    (BigUint::one() << width) - 1u32
}

/// Returns the `width` least significant bits of `value`.
pub fn truncate(value: &BigUint, width: usize) -> BigUint {
    value & &mask(width)
}

/// Returns true if `value` can be represented in `width` bits.
pub fn fits(value: &BigUint, width: usize) -> bool {
    value.bits() <= width as u64
}

/// Returns the minimum number of bits needed to represent `value`, zero takes 1 bit.
pub fn min_width(value: &BigUint) -> usize {
    std::cmp::max(value.bits() as usize, 1)
}

/// Gathers the bits of `value` at `positions`, the first position lands in bit 0 of the result.
pub fn select(value: &BigUint, positions: &[usize]) -> BigUint {
    let mut out = BigUint::zero();
    for (i, position) in positions.iter().enumerate() {
        if value.bit(*position as u64) {
            out.set_bit(i as u64, true);
        }
    }
    out
}

/// Concatenates `(value, width)` groups, the first group occupies the most significant bits.
pub fn concat<'a, I: IntoIterator<Item = (&'a BigUint, usize)>>(parts: I) -> BigUint {
    parts.into_iter().fold(BigUint::zero(), |acc, (value, width)| {
        (acc << width) | truncate(value, width)
    })
}

/// Returns `a - b` wrapped to `width` bits, both operands are assumed to fit in `width` bits.
pub fn wrapping_sub(a: &BigUint, b: &BigUint, width: usize) -> BigUint {
    truncate(&((BigUint::one() << width) + a - b), width)
}
