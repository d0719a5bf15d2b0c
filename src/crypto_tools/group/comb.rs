use std::collections::BTreeMap;

use num_bigint::BigUint;
use num_traits::One;
use tracing::error;

use crate::sdk::api::{FsigError, FsigResult};

/// Shape of a fixed-base comb table.
///
/// An exponent of up to `bits_per_window · points_per_add` bits is read
/// as `points_per_add` interleaved windows; evaluation costs `shifts`
/// squarings and at most `shifts · adds_per_shift` multiplications per
/// base, against a table of `(2^points_per_add − 1) · adds_per_shift`
/// precomputed elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombSpec {
    pub points_per_add: usize,
    pub adds_per_shift: usize,
    pub shifts: usize,
    pub bits_per_window: usize,
    pub ops: usize,
    pub size: usize,
}

fn isqrt(n: usize) -> usize {
    let mut r = 0usize;
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}

impl CombSpec {
    /// Pick table parameters for exponents of up to `bits` bits.
    ///
    /// Candidates are bucketed by operation count, keeping the smallest
    /// table per bucket; scanning buckets in cost order, the first strict
    /// improvement in size that fits `maxsize` wins.
    pub fn choose(bits: usize, maxsize: usize) -> FsigResult<Self> {
        if bits < 128 {
            error!("comb spec requested for {} bits, minimum is 128", bits);
            return Err(FsigError::Validation);
        }

        let mut best_by_ops: BTreeMap<usize, CombSpec> = BTreeMap::new();

        for ppa in 2..18 {
            let bpw = (bits + ppa - 1) / ppa;

            for aps in 1..isqrt(bpw) + 2 {
                if bpw % aps != 0 {
                    // only factorizations of bits_per_window are useful
                    continue;
                }

                Self::offer(&mut best_by_ops, bpw / aps, aps, ppa, bpw);
                Self::offer(&mut best_by_ops, aps, bpw / aps, ppa, bpw);
            }
        }

        let mut smallest = 0usize;

        for spec in best_by_ops.values() {
            if smallest != 0 && smallest <= spec.size {
                continue;
            }

            smallest = spec.size;

            if smallest <= maxsize {
                return Ok(*spec);
            }
        }

        error!(
            "no comb table of at most {} elements covers {} bits",
            maxsize, bits
        );
        Err(FsigError::Validation)
    }

    fn offer(
        best_by_ops: &mut BTreeMap<usize, CombSpec>,
        shifts: usize,
        adds_per_shift: usize,
        points_per_add: usize,
        bits_per_window: usize,
    ) {
        let candidate = CombSpec {
            points_per_add,
            adds_per_shift,
            shifts,
            bits_per_window,
            ops: shifts * (adds_per_shift + 1) - 1,
            size: ((1usize << points_per_add) - 1) * adds_per_shift,
        };

        best_by_ops
            .entry(candidate.ops)
            .and_modify(|best| {
                if candidate.size < best.size {
                    *best = candidate;
                }
            })
            .or_insert(candidate);
    }
}

/// Precomputed powers of a single base.
///
/// `items[j·(2^P−1) + v−1]` holds `base^(v · 2^(j·shifts))` for every
/// non-zero window digit `v` and sub-comb `j`.
pub struct Comb {
    points_per_add: usize,
    adds_per_shift: usize,
    shifts: usize,
    bits: usize,
    points_per_subcomb: usize,
    items: Vec<BigUint>,
}

impl Comb {
    pub fn new(n: &BigUint, base: &BigUint, spec: &CombSpec) -> Self {
        let skip = (1usize << spec.points_per_add) - 1;
        let mut items = vec![BigUint::one(); spec.size];

        items[0] = base % n;

        // powers for every non-zero digit pattern, by doubling and
        // multiplying: items[2^i − 1] = items[2^(i−1) − 1] ^ (2^W)
        let win = BigUint::one() << spec.bits_per_window;

        for i in 1..spec.points_per_add {
            let oval = 1usize << i;
            let ival = oval >> 1;

            items[oval - 1] = items[ival - 1].modpow(&win, n);

            for j in oval + 1..2 * oval {
                items[j - 1] = (&items[j - oval - 1] * &items[oval - 1]) % n;
            }
        }

        // each sub-comb is the previous one raised to 2^shifts
        let win = BigUint::one() << spec.shifts;

        for i in 1..spec.adds_per_shift {
            for j in 0..skip {
                let k = i * skip + j;
                items[k] = items[k - skip].modpow(&win, n);
            }
        }

        Self {
            points_per_add: spec.points_per_add,
            adds_per_shift: spec.adds_per_shift,
            shifts: spec.shifts,
            bits: spec.bits_per_window * spec.points_per_add,
            points_per_subcomb: skip,
            items,
        }
    }

    /// Exponent bit budget of this table.
    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn shifts(&self) -> usize {
        self.shifts
    }

    pub fn adds_per_shift(&self) -> usize {
        self.adds_per_shift
    }

    /// Table element for the non-zero digit `digit` of sub-comb `sub`.
    pub fn item(&self, sub: usize, digit: u32) -> &BigUint {
        &self.items[sub * self.points_per_subcomb + digit as usize - 1]
    }

    /// Recode `e` into the window digit matrix `wins[shift][add]`.
    /// `None` when `e` exceeds the table's bit budget.
    pub fn recode(&self, e: &BigUint) -> Option<Vec<Vec<u32>>> {
        let len = e.bits();

        if len > self.bits {
            return None;
        }

        let pad = self.bits - len;
        let ebits = e.to_radix_le(2);

        let mut wins = vec![vec![0u32; self.adds_per_shift]; self.shifts];

        for i in (0..self.adds_per_shift).rev() {
            for j in 0..self.shifts {
                let mut digit = 0u32;

                for k in 0..self.points_per_add {
                    let b = (i + k * self.adds_per_shift) * self.shifts + j;

                    digit <<= 1;

                    if b < pad {
                        // left zero-padding of the exponent
                        continue;
                    }

                    let p = self.bits - 1 - b;
                    digit += u32::from(*ebits.get(p).unwrap_or(&0));
                }

                wins[j][self.adds_per_shift - 1 - i] = digit;
            }
        }

        Some(wins)
    }
}
