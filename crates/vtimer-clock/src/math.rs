//! Scaled integer arithmetic for converting between frequency domains.

/// Computes `value * mul / div` with a 128-bit intermediate.
///
/// The product of two `u64`s always fits in `u128`, so only the final quotient can exceed the
/// `u64` range; such results saturate to `u64::MAX`.
///
/// `div` must be non-zero.
#[inline]
pub fn mul_div(value: u64, mul: u64, div: u64) -> u64 {
    debug_assert!(div != 0, "mul_div: zero divisor");
    let q = (value as u128) * (mul as u128) / (div as u128);
    u64::try_from(q).unwrap_or(u64::MAX)
}

/// Like [`mul_div`], but rounds the quotient up.
///
/// Used when converting a tick delta into a wait duration, where rounding down would wake the
/// waiter before the deadline is due.
#[inline]
pub fn mul_div_ceil(value: u64, mul: u64, div: u64) -> u64 {
    debug_assert!(div != 0, "mul_div_ceil: zero divisor");
    let numer = (value as u128) * (mul as u128);
    let q = numer.div_ceil(div as u128);
    u64::try_from(q).unwrap_or(u64::MAX)
}
