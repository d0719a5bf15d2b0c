//! Zero-knowledge proofs of knowledge of an RSA factorization, bound to
//! an application message.
//!
//! A signer first publishes `C1 = g^n h^s`, a blinded commitment to its
//! RSA modulus `n` ([challenge]). Later it can bind any message to a
//! proof that it knows a square root of some small prime `t` modulo `n`,
//! an ability equivalent to knowing `n`'s factorization ([sign::sign]).
//! Anyone holding `C1` checks the claim offline ([verify::verify]).
//!
//! The interactive verifier is replaced by the Fiat-Shamir transform: a
//! SHA-256 transcript of all public values seeds a DRBG that yields the
//! challenge `chal` and a 128-bit prime `ell`, and the signature carries
//! the prover's openings of every exponent quotient by `ell`.
//!
//! Protocol reference: <https://github.com/kwantam/GooSig>

mod api;
mod sign;
mod verify;

pub use api::Context;

use std::cmp;

use num_bigint::{BigInt, BigUint};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::error;
use zeroize::Zeroize;

use crate::crypto_tools::{
    constants::{CHAL_BITS, EXPONENT_SIZE},
    group::Group,
    hash::{int_bytes_be, Transcript},
    prng::Prng,
};
use crate::sdk::api::{FsigError, FsigResult};

/// A proof of factoring ability, bound to one message.
///
/// `t` is the small prime whose square root the prover exhibited; `c2`
/// commits to that root; `chal` and `ell` are the Fiat-Shamir outputs;
/// `aq`..`dq` open the exponent quotients by `ell` and the `z_*` carry
/// the residues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub(crate) c2: BigUint,
    pub(crate) t: BigUint,
    pub(crate) chal: BigUint,
    pub(crate) ell: BigUint,
    pub(crate) aq: BigUint,
    pub(crate) bq: BigUint,
    pub(crate) cq: BigUint,
    pub(crate) dq: BigUint,
    pub(crate) z_w: BigUint,
    pub(crate) z_w2: BigUint,
    pub(crate) z_s1: BigUint,
    pub(crate) z_a: BigUint,
    pub(crate) z_an: BigUint,
    pub(crate) z_s1w: BigUint,
    pub(crate) z_sa: BigUint,
}

impl Signature {
    pub(crate) const ITEM_COUNT: usize = 15;

    /// Wire order of the fifteen items.
    pub(crate) fn items(&self) -> [&BigUint; Self::ITEM_COUNT] {
        [
            &self.c2, &self.t, &self.chal, &self.ell, &self.aq, &self.bq, &self.cq, &self.dq,
            &self.z_w, &self.z_w2, &self.z_s1, &self.z_a, &self.z_an, &self.z_s1w, &self.z_sa,
        ]
    }

    pub(crate) fn from_items(items: Vec<BigUint>) -> Option<Self> {
        if items.len() != Self::ITEM_COUNT {
            return None;
        }

        let mut it = items.into_iter();

        Some(Self {
            c2: it.next()?,
            t: it.next()?,
            chal: it.next()?,
            ell: it.next()?,
            aq: it.next()?,
            bq: it.next()?,
            cq: it.next()?,
            dq: it.next()?,
            z_w: it.next()?,
            z_w2: it.next()?,
            z_s1: it.next()?,
            z_a: it.next()?,
            z_an: it.next()?,
            z_s1w: it.next()?,
            z_sa: it.next()?,
        })
    }
}

/// `size` uniform bits from a DRBG freshly keyed by OS entropy.
fn rand_bits(size: usize) -> FsigResult<BigUint> {
    let mut key = [0u8; 32];

    rand::thread_rng().try_fill_bytes(&mut key).map_err(|_| {
        error!("OS randomness source failed");
        FsigError::Resource
    })?;

    let mut prng = Prng::seed(&key)?;
    key.zeroize();

    prng.getrandbits(size)
}

/// A fresh blinding scalar of the group's random-exponent width.
pub(crate) fn rand_scalar(group: &Group) -> FsigResult<BigUint> {
    rand_bits(cmp::min(group.rand_bits(), EXPONENT_SIZE))
}

/// Stretch the 32-byte commitment seed `s'` into the blinding exponent
/// `s`. The seed is left-padded with zeros to exactly 32 bytes before
/// keying the DRBG, so equal seed values expand identically regardless
/// of their minimal byte length.
pub(crate) fn expand_sprime(s_prime: &BigUint) -> FsigResult<BigUint> {
    let bytes = int_bytes_be(s_prime);

    if bytes.len() > 32 {
        error!("seed of {} bytes cannot fit the 32-byte key", bytes.len());
        return Err(FsigError::Validation);
    }

    let mut key = [0u8; 32];
    key[32 - bytes.len()..].copy_from_slice(&bytes);

    let mut prng = Prng::seed(&key)?;
    key.zeroize();

    prng.getrandbits(EXPONENT_SIZE)
}

/// Commit to the RSA modulus `n`: draw the 32-byte seed `s'`, expand it
/// into the blinding `s` and publish `C1 = g^n h^s` reduced.
pub(crate) fn challenge(group: &Group, n: &BigUint) -> FsigResult<(BigUint, BigUint)> {
    let s_prime = rand_bits(256)?;
    let mut s = expand_sprime(&s_prime)?;

    let c1 = group.powgh(n, &s).map(|c1| group.reduce(c1));
    s.zeroize();

    Ok((s_prime, c1?))
}

/// Hash the public transcript and derive the challenge pair.
///
/// Returns `(chal, ell_r)`. The prover advances `ell_r` to a nearby
/// prime `ell`; the verifier instead bounds a published `ell` against
/// its own `ell_r`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn fs_chal(
    group: &Group,
    c1: &BigUint,
    c2: &BigUint,
    t: &BigUint,
    commit_a: &BigUint,
    commit_b: &BigUint,
    commit_c: &BigUint,
    commit_d: &BigInt,
    msg: &BigUint,
) -> FsigResult<(BigUint, BigUint)> {
    let mut transcript = Transcript::new();

    transcript.absorb_uint(group.n())?;
    transcript.absorb_uint(group.g())?;
    transcript.absorb_uint(group.h())?;
    transcript.absorb_uint(c1)?;
    transcript.absorb_uint(c2)?;
    transcript.absorb_uint(t)?;
    transcript.absorb_uint(commit_a)?;
    transcript.absorb_uint(commit_b)?;
    transcript.absorb_uint(commit_c)?;
    transcript.absorb(commit_d)?;
    transcript.absorb_uint(msg)?;

    let mut prng = Prng::seed(&transcript.finalize())?;

    let chal = prng.getrandbits(CHAL_BITS)?;
    let ell_r = prng.getrandbits(CHAL_BITS)?;

    Ok((chal, ell_r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::{One, Zero};

    fn test_group() -> Group {
        Group::new(BigUint::from(1022117u32), 2, 3, 1024).unwrap()
    }

    #[test]
    fn expand_sprime_pads_equal_values_equally() {
        // 0x01 expands the same whether presented short or zero-extended,
        // because the key is the left-padded 32-byte form either way
        let s = expand_sprime(&BigUint::one()).unwrap();

        assert_eq!(s, expand_sprime(&BigUint::from(1u64)).unwrap());
        assert!(s.bits() <= EXPONENT_SIZE);
    }

    #[test]
    fn expand_sprime_rejects_oversized_seeds() {
        assert!(expand_sprime(&(BigUint::one() << 256usize)).is_err());
    }

    #[test]
    fn fs_chal_is_deterministic_and_sensitive() {
        let group = test_group();

        let c1 = BigUint::from(1234u32);
        let c2 = BigUint::from(5678u32);
        let t = BigUint::from(11u32);
        let a = BigUint::from(1u32);
        let b = BigUint::from(2u32);
        let c = BigUint::from(3u32);
        let d = BigInt::from(4);
        let msg = BigUint::from(0x68656c6c6fu64); // "hello"

        let out1 = fs_chal(&group, &c1, &c2, &t, &a, &b, &c, &d, &msg).unwrap();
        let out2 = fs_chal(&group, &c1, &c2, &t, &a, &b, &c, &d, &msg).unwrap();
        assert_eq!(out1, out2);

        assert!(out1.0.bits() <= CHAL_BITS);
        assert!(out1.1.bits() <= CHAL_BITS);

        // any item change moves both outputs with overwhelming probability
        let moved = fs_chal(&group, &c1, &c2, &t, &a, &b, &c, &BigInt::from(-4), &msg).unwrap();
        assert_ne!(out1, moved);

        let moved = fs_chal(&group, &c1, &c2, &t, &a, &b, &c, &d, &BigUint::zero()).unwrap();
        assert_ne!(out1, moved);
    }

    #[test]
    fn challenge_commits_to_the_modulus() {
        let group = test_group();
        let n = BigUint::from(1022117u32);

        let (s_prime, c1) = challenge(&group, &n).unwrap();

        assert!(s_prime.bits() <= 256);
        assert!(group.is_reduced(&c1));

        // re-opening with the same seed reproduces the commitment
        let s = expand_sprime(&s_prime).unwrap();
        assert_eq!(group.reduce(group.powgh(&n, &s).unwrap()), c1);
    }
}
