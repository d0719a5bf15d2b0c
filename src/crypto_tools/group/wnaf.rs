use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

/// wNAF window width in bits.
pub const WINDOW_SIZE: usize = 6;

/// Odd powers stored per base and sign: covers digits up to 2^(w−1) − 1.
pub const TABLEN: usize = 1 << (WINDOW_SIZE - 2);

/// The odd powers b, b^3, ..., b^(2·TABLEN − 1) mod n.
pub(super) fn odd_powers(n: &BigUint, b: &BigUint) -> Vec<BigUint> {
    let bsq = (b * b) % n;

    let mut out = Vec::with_capacity(TABLEN);
    out.push(b % n);

    for i in 1..TABLEN {
        let next = (&out[i - 1] * &bsq) % n;
        out.push(next);
    }

    out
}

/// Signed fixed-window recoding of a non-negative exponent into `bitlen`
/// digits, most significant first. Digits are zero or odd in
/// [−2^(w−1) + 1, 2^(w−1) − 1], so [odd_powers] tables of either sign
/// cover them all.
pub(super) fn recode(e: &BigUint, bitlen: usize) -> Vec<i64> {
    let mask = BigUint::from((1u64 << WINDOW_SIZE) - 1);

    let mut out = vec![0i64; bitlen];
    let mut r = e.clone();

    for i in (0..bitlen).rev() {
        let mut digit = 0i64;

        if r.is_odd() {
            digit = (&r & &mask).to_i64().unwrap_or(0);

            if digit & (1 << (WINDOW_SIZE - 1)) != 0 {
                digit -= 1 << WINDOW_SIZE;
            }

            if digit >= 0 {
                r -= BigUint::from(digit as u64);
            } else {
                r += BigUint::from((-digit) as u64);
            }
        }

        out[i] = digit;
        r >>= 1;
    }

    debug_assert!(r.is_zero());

    out
}
