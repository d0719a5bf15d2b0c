//! Arithmetic in the quotient of (Z/n)* by {±1}, the group of unknown
//! order underlying the proofs. Canonical representatives lie in
//! [0, n/2]; fixed-base exponentiation of the generators goes through
//! precomputed comb tables, arbitrary-base double exponentiation through
//! per-call wNAF tables.

pub mod comb;
pub mod wnaf;

use std::cmp;

use comb::{Comb, CombSpec};
use num_bigint::{traits::ModInverse, BigUint};
use num_traits::One;
use tracing::{error, warn};

use super::constants::{CHAL_BITS, MAX_COMB_SIZE};
use crate::sdk::api::{FsigError, FsigResult};

/// ceil(log2(n))
fn clog2(n: &BigUint) -> usize {
    (n - 1u32).bits()
}

pub struct Group {
    n: BigUint,
    nh: BigUint,
    g: BigUint,
    h: BigUint,
    rand_bits: usize,
    g_comb_small: Comb,
    h_comb_small: Comb,
    /// Tables covering full protocol exponents; absent in
    /// verification-only groups, whose small pair is challenge-sized.
    combs_big: Option<(Comb, Comb)>,
}

impl Group {
    /// Build a group over the modulus `n` with generators `g` and `h`.
    ///
    /// A non-zero `modbits` hints at the largest RSA modulus whose
    /// factoring proofs this group must support and sizes the big comb
    /// pair accordingly; zero builds only challenge-sized tables, enough
    /// to verify but not to produce commitments or signatures.
    pub fn new(n: BigUint, g: u64, h: u64, modbits: usize) -> FsigResult<Self> {
        if n.bits() < 2 {
            error!("group modulus must exceed 1");
            return Err(FsigError::Validation);
        }

        let nh = &n >> 1;
        let rand_bits = clog2(&n) - 1;
        let g = BigUint::from(g);
        let h = BigUint::from(h);

        let (g_comb_small, h_comb_small, combs_big) = if modbits != 0 {
            let big = cmp::max(2 * modbits, modbits + rand_bits);
            let big_spec = CombSpec::choose(big + CHAL_BITS + 1, MAX_COMB_SIZE)?;

            // toy moduli have rand_bits below the selector's floor; the
            // challenge-sized table still covers their scalars
            let small_spec = CombSpec::choose(cmp::max(rand_bits, CHAL_BITS), MAX_COMB_SIZE)?;

            (
                Comb::new(&n, &g, &small_spec),
                Comb::new(&n, &h, &small_spec),
                Some((
                    Comb::new(&n, &g, &big_spec),
                    Comb::new(&n, &h, &big_spec),
                )),
            )
        } else {
            let tiny_spec = CombSpec::choose(CHAL_BITS, MAX_COMB_SIZE)?;

            debug_assert_eq!(tiny_spec.points_per_add, 8);
            debug_assert_eq!(tiny_spec.adds_per_shift, 2);
            debug_assert_eq!(tiny_spec.shifts, 8);
            debug_assert_eq!(tiny_spec.bits_per_window, 16);
            debug_assert_eq!(tiny_spec.size, 510);

            (
                Comb::new(&n, &g, &tiny_spec),
                Comb::new(&n, &h, &tiny_spec),
                None,
            )
        };

        Ok(Self {
            n,
            nh,
            g,
            h,
            rand_bits,
            g_comb_small,
            h_comb_small,
            combs_big,
        })
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    pub fn h(&self) -> &BigUint {
        &self.h
    }

    /// Bit width of freshly drawn blinding scalars.
    pub fn rand_bits(&self) -> usize {
        self.rand_bits
    }

    /// Canonical representative of b in the quotient by {±1}.
    pub fn reduce(&self, b: BigUint) -> BigUint {
        if b > self.nh {
            &self.n - b
        } else {
            b
        }
    }

    pub fn is_reduced(&self, b: &BigUint) -> bool {
        b <= &self.nh
    }

    pub fn sqr(&self, b: &BigUint) -> BigUint {
        (b * b) % &self.n
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.n
    }

    pub fn pow(&self, b: &BigUint, e: &BigUint) -> BigUint {
        b.modpow(e, &self.n)
    }

    pub fn inv(&self, b: &BigUint) -> FsigResult<BigUint> {
        b.mod_inverse(&self.n)
            .and_then(|i| i.to_biguint())
            .ok_or_else(|| {
                warn!("operand is not invertible mod n");
                FsigError::Crypto
            })
    }

    /// Two inversions for the price of one [Group::inv].
    pub fn inv2(&self, b1: &BigUint, b2: &BigUint) -> FsigResult<(BigUint, BigUint)> {
        let b12_inv = self.inv(&self.mul(b1, b2))?;

        Ok((self.mul(b2, &b12_inv), self.mul(b1, &b12_inv)))
    }

    /// Five inversions for the price of one, by inverting the running
    /// product and back-substituting.
    pub fn inv5(
        &self,
        b1: &BigUint,
        b2: &BigUint,
        b3: &BigUint,
        b4: &BigUint,
        b5: &BigUint,
    ) -> FsigResult<(BigUint, BigUint, BigUint, BigUint, BigUint)> {
        let b12 = self.mul(b1, b2);
        let b34 = self.mul(b3, b4);
        let b1234 = self.mul(&b12, &b34);
        let b12345 = self.mul(&b1234, b5);

        let b12345_inv = self.inv(&b12345)?;
        let b1234_inv = self.mul(&b12345_inv, b5);
        let b34_inv = self.mul(&b1234_inv, &b12);
        let b12_inv = self.mul(&b1234_inv, &b34);

        Ok((
            self.mul(&b12_inv, b2),
            self.mul(&b12_inv, b1),
            self.mul(&b34_inv, b4),
            self.mul(&b34_inv, b3),
            self.mul(&b12345_inv, &b1234),
        ))
    }

    /// g^e1 · h^e2 through the comb tables.
    /// Picks the smallest table pair that admits both exponents; fails if
    /// even the big pair (when present) is too narrow.
    pub fn powgh(&self, e1: &BigUint, e2: &BigUint) -> FsigResult<BigUint> {
        let loge = cmp::max(e1.bits(), e2.bits());

        let (gcomb, hcomb) = if loge <= self.g_comb_small.bits() {
            (&self.g_comb_small, &self.h_comb_small)
        } else {
            match &self.combs_big {
                Some((gc, hc)) if loge <= gc.bits() => (gc, hc),
                _ => {
                    warn!("exponent of {} bits exceeds every comb table", loge);
                    return Err(FsigError::Validation);
                }
            }
        };

        let wins1 = gcomb.recode(e1).ok_or(FsigError::Validation)?;
        let wins2 = hcomb.recode(e2).ok_or(FsigError::Validation)?;

        let mut ret = BigUint::one();

        for s in 0..gcomb.shifts() {
            if !ret.is_one() {
                ret = self.sqr(&ret);
            }

            for a in 0..gcomb.adds_per_shift() {
                let d1 = wins1[s][a];
                let d2 = wins2[s][a];

                if d1 != 0 {
                    ret = self.mul(&ret, gcomb.item(a, d1));
                }

                if d2 != 0 {
                    ret = self.mul(&ret, hcomb.item(a, d2));
                }
            }
        }

        Ok(ret)
    }

    /// b1^e1 · b2^e2 by simultaneous wNAF over per-call odd-power tables.
    /// Exponents are non-negative; the inverses feed the negative-digit
    /// tables of the signed recoding.
    pub fn pow2(
        &self,
        b1: &BigUint,
        b1_inv: &BigUint,
        e1: &BigUint,
        b2: &BigUint,
        b2_inv: &BigUint,
        e2: &BigUint,
    ) -> BigUint {
        let p1 = wnaf::odd_powers(&self.n, b1);
        let n1 = wnaf::odd_powers(&self.n, b1_inv);
        let p2 = wnaf::odd_powers(&self.n, b2);
        let n2 = wnaf::odd_powers(&self.n, b2_inv);

        let totlen = cmp::max(e1.bits(), e2.bits()) + 1;
        let digits1 = wnaf::recode(e1, totlen);
        let digits2 = wnaf::recode(e2, totlen);

        let mut ret = BigUint::one();

        for i in 0..totlen {
            if !ret.is_one() {
                ret = self.sqr(&ret);
            }

            self.one_mul(&mut ret, digits1[i], &p1, &n1);
            self.one_mul(&mut ret, digits2[i], &p2, &n2);
        }

        ret
    }

    fn one_mul(&self, ret: &mut BigUint, digit: i64, pos: &[BigUint], neg: &[BigUint]) {
        if digit > 0 {
            *ret = self.mul(ret, &pos[((digit - 1) >> 1) as usize]);
        } else if digit < 0 {
            *ret = self.mul(ret, &neg[((-1 - digit) >> 1) as usize]);
        }
    }

    /// b1^e1 · b2^e2 · g^e3 · h^e4, reduced: the verifier's four-base
    /// reconstruction primitive.
    #[allow(clippy::too_many_arguments)]
    pub fn recon(
        &self,
        b1: &BigUint,
        b1_inv: &BigUint,
        e1: &BigUint,
        b2: &BigUint,
        b2_inv: &BigUint,
        e2: &BigUint,
        e3: &BigUint,
        e4: &BigUint,
    ) -> FsigResult<BigUint> {
        let val = self.pow2(b1, b1_inv, e1, b2, b2_inv, e2);
        let gh = self.powgh(e3, e4)?;

        Ok(self.reduce(self.mul(&val, &gh)))
    }
}
