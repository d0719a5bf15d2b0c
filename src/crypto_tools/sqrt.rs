use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

/// Jacobi symbol (a | n) for odd n.
pub(crate) fn jacobi(a: &BigUint, n: &BigUint) -> i32 {
    debug_assert!(n.is_odd());

    let mut a = a % n;
    let mut n = n.clone();
    let mut t = 1i32;

    while !a.is_zero() {
        while a.is_even() {
            a >>= 1;
            // (2 | n) = -1 iff n = 3, 5 (mod 8)
            let r = (&n % 8u32).to_u8().unwrap_or(0);
            if r == 3 || r == 5 {
                t = -t;
            }
        }

        std::mem::swap(&mut a, &mut n);

        // quadratic reciprocity
        if (&a % 4u32).to_u8().unwrap_or(0) == 3 && (&n % 4u32).to_u8().unwrap_or(0) == 3 {
            t = -t;
        }

        a %= &n;
    }

    if n.is_one() {
        t
    } else {
        0
    }
}

fn factor_twos(n: &BigUint) -> (BigUint, u64) {
    let mut d = n.clone();
    let mut s = 0u64;

    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    (d, s)
}

/// Square root of `n` modulo an odd prime `p` via Tonelli-Shanks,
/// with the exponentiation shortcut when p = 3 (mod 4).
/// Returns `None` when `n` is a non-residue.
pub fn mod_sqrt_p(n: &BigUint, p: &BigUint) -> Option<BigUint> {
    let nn = n % p;

    if nn.is_zero() {
        return Some(BigUint::zero());
    }

    if jacobi(&nn, p) == -1 {
        return None;
    }

    if (p % 4u32).to_u8().unwrap_or(0) == 3 {
        let e = (p + 1u32) >> 2;
        return Some(nn.modpow(&e, p));
    }

    // write p - 1 = q · 2^s
    let (q_odd, mut s) = factor_twos(&(p - 1u32));

    // find a witness with Jacobi symbol -1
    let mut w = BigUint::from(2u32);
    while jacobi(&w, p) != -1 {
        w += 1u32;
    }

    let mut w = w.modpow(&q_odd, p);
    let mut y = nn.modpow(&q_odd, p);
    let mut q = nn.modpow(&((&q_odd + 1u32) >> 1), p);

    loop {
        let mut i = 0u64;
        let y_save = y.clone();

        while i < s && !y.is_one() {
            y = y.modpow(&BigUint::from(2u32), p);
            i += 1;
        }

        if i == 0 {
            break;
        }

        if i == s {
            // not a residue after all; unreachable given the Jacobi check
            return None;
        }

        w = w.modpow(&(BigUint::one() << (s - i - 1) as usize), p);
        s = i;

        q = (&q * &w) % p;
        w = w.modpow(&BigUint::from(2u32), p);

        y = (&y_save * &w) % p;
    }

    // canonical representative
    if &q > &(p >> 1) {
        q = p - q;
    }

    debug_assert_eq!((&q * &q) % p, nn);

    Some(q)
}

/// Square root of `x` modulo `p·q`, combining the per-prime roots by CRT.
pub fn mod_sqrt_n(x: &BigUint, p: &BigUint, q: &BigUint) -> Option<BigUint> {
    let sqrt_p = mod_sqrt_p(x, p)?;
    let sqrt_q = mod_sqrt_p(x, q)?;

    let p = BigInt::from(p.clone());
    let q = BigInt::from(q.clone());

    // mp·p + mq·q = gcd(p, q) = 1
    let gcd = num_integer::Integer::extended_gcd(&p, &q);

    let combined = BigInt::from(sqrt_q) * &gcd.x * &p + BigInt::from(sqrt_p) * &gcd.y * &q;

    combined.mod_floor(&(&p * &q)).to_biguint()
}
