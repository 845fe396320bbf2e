//! Payout arithmetic
//!
//! Stakes are native base units (18 decimals), so `stake * total_pool`
//! routinely exceeds `u128`. The product is formed in 256 bits and divided
//! back down exactly, truncating toward zero.

const LO_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two u128 values as `(hi, lo)`
#[inline]
pub fn mul_wide(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LO_MASK);
    let (b1, b0) = (b >> 64, b & LO_MASK);

    let ll = a0 * b0;
    let lh = a0 * b1;
    let hl = a1 * b0;
    let hh = a1 * b1;

    // < 3 * 2^64, cannot overflow
    let mid = (ll >> 64) + (lh & LO_MASK) + (hl & LO_MASK);

    let lo = (ll & LO_MASK) | ((mid & LO_MASK) << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// `floor(a * b / d)`, or `None` if `d == 0` or the quotient exceeds u128
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let (hi, lo) = mul_wide(a, b);
    if hi == 0 {
        return Some(lo / d);
    }
    if hi >= d {
        return None;
    }

    // Restoring long division of (hi:lo) by d; remainder stays below d.
    let mut rem = hi;
    let mut quot = 0u128;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quot |= 1;
        }
    }
    Some(quot)
}

/// Winner payout: `stake * total_pool / winning_pool`, truncated.
///
/// Returns `None` when the winning pool is empty; nobody can hold a winning
/// stake in that case, so callers short-circuit before reaching here.
#[inline]
pub fn pro_rata_payout(stake: u128, total_pool: u128, winning_pool: u128) -> Option<u128> {
    mul_div_floor(stake, total_pool, winning_pool)
}
