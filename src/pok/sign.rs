use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use tracing::error;
use zeroize::Zeroize;

use super::{expand_sprime, fs_chal, rand_scalar, Signature};
use crate::crypto_tools::{
    constants::{CHAL_BITS, ELLDIFF_MAX},
    group::Group,
    primes::{next_prime, SMALL_PRIMES},
    sqrt::mod_sqrt_n,
};
use crate::sdk::api::{FsigError, FsigResult};

/// An ephemeral signing secret, zeroized on drop. Scope exit scrubs it
/// on every path out of [sign], early failures included.
#[derive(Zeroize)]
#[zeroize(drop)]
struct SecretScalar(BigUint);

/// Produce a signature binding `msg` to knowledge of the factors of `n`.
///
/// `s_prime` and `c1` must come from a prior [super::challenge] run over
/// the same modulus; `p` and `q` are its prime factors. All ephemeral
/// state (the expanded blinding, the square-root witness and the masks)
/// dies with the call.
#[allow(non_snake_case)]
#[allow(clippy::many_single_char_names)]
pub(crate) fn sign(
    group: &Group,
    msg: &BigUint,
    s_prime: &BigUint,
    c1: &BigUint,
    n: &BigUint,
    p: &BigUint,
    q: &BigUint,
) -> FsigResult<Signature> {
    let s = SecretScalar(expand_sprime(s_prime)?);

    // the commitment must open to n under s
    let opened = group.reduce(group.powgh(n, &s.0)?);
    if &opened != c1 {
        error!("C1 does not commit to the presented modulus under s'");
        return Err(FsigError::Validation);
    }

    // the witness: the first listed prime admitting a root mod n
    let mut found = None;
    for &candidate in SMALL_PRIMES.iter() {
        let t = BigUint::from(candidate);
        if let Some(w) = mod_sqrt_n(&t, p, q) {
            found = Some((t, SecretScalar(w)));
            break;
        }
    }

    let (t, w) = match found {
        Some(tw) => tw,
        None => {
            // for honest p, q this is astronomically unlikely
            error!("no listed prime is a quadratic residue mod n");
            return Err(FsigError::Crypto);
        }
    };

    // a = (w^2 - t) / n, checked exact
    let w2_m_t = BigInt::from(&w.0 * &w.0) - BigInt::from(t.clone());
    let n_int = BigInt::from(n.clone());
    let a_int = w2_m_t.div_floor(&n_int);

    if &a_int * &n_int != w2_m_t {
        error!("w^2 - t is not divisible by n");
        return Err(FsigError::Crypto);
    }

    let a = a_int.to_biguint().ok_or(FsigError::Crypto)?;

    // commitment to the root: C2 = g^w h^s1
    let s1 = SecretScalar(rand_scalar(group)?);
    let c2 = group.reduce(group.powgh(&w.0, &s1.0)?);

    let (c1_inv, c2_inv) = group.inv2(c1, &c2)?;

    // masks; r_s1 is drawn inside the retry loop below
    let r_w = SecretScalar(rand_scalar(group)?);
    let mut r_w2 = SecretScalar(rand_scalar(group)?);
    let r_a = SecretScalar(rand_scalar(group)?);
    let mut r_an = SecretScalar(rand_scalar(group)?);
    let r_s1w = SecretScalar(rand_scalar(group)?);
    let r_sa = SecretScalar(rand_scalar(group)?);

    // keep D = r_w2 - r_an non-negative
    if r_w2.0 < r_an.0 {
        std::mem::swap(&mut r_w2, &mut r_an);
    }

    // first-message commitments that do not involve r_s1:
    // B = C2^(-r_w) · g^r_w2 h^r_s1w
    let B = {
        let lhs = group.pow(&c2_inv, &r_w.0);
        let rhs = group.powgh(&r_w2.0, &r_s1w.0)?;
        group.reduce(group.mul(&lhs, &rhs))
    };

    // C = C1^(-r_a) · g^r_an h^r_sa
    let C = {
        let lhs = group.pow(&c1_inv, &r_a.0);
        let rhs = group.powgh(&r_an.0, &r_sa.0)?;
        group.reduce(group.mul(&lhs, &rhs))
    };

    // D = r_w2 - r_an
    let D = BigInt::from(&r_w2.0 - &r_an.0);

    // the verifier's message: transcript challenge plus a 128-bit prime.
    // Only A depends on r_s1, so when ell comes out unusable we redraw
    // r_s1 and recompute A alone; B, C, D stay fixed across retries.
    // Discarded r_s1 candidates zeroize as they drop.
    let (r_s1, chal, ell) = loop {
        let r_s1 = SecretScalar(rand_scalar(group)?);
        let A = group.reduce(group.powgh(&r_w.0, &r_s1.0)?);

        let (chal, ell_r) = fs_chal(group, c1, &c2, &t, &A, &B, &C, &D, msg)?;

        let ell = match next_prime(&ell_r, ELLDIFF_MAX) {
            Some(ell) if ell.bits() == CHAL_BITS => ell,
            _ => continue,
        };

        break (r_s1, chal, ell);
    };

    // responses: z = chal · witness + mask, over the integers
    let z_w = &chal * &w.0 + &r_w.0;
    let z_w2 = &chal * (&w.0 * &w.0) + &r_w2.0;
    let z_s1 = &chal * &s1.0 + &r_s1.0;
    let z_a = &chal * &a + &r_a.0;
    let z_an = &chal * (&a * n) + &r_an.0;
    let z_s1w = &chal * (&s1.0 * &w.0) + &r_s1w.0;
    let z_sa = &chal * (&s.0 * &a) + &r_sa.0;

    // quotient openings over ell
    let aq = group.reduce(group.powgh(&(&z_w / &ell), &(&z_s1 / &ell))?);

    let bq = {
        let lhs = group.pow(&c2_inv, &(&z_w / &ell));
        let rhs = group.powgh(&(&z_w2 / &ell), &(&z_s1w / &ell))?;
        group.reduce(group.mul(&lhs, &rhs))
    };

    let cq = {
        let lhs = group.pow(&c1_inv, &(&z_a / &ell));
        let rhs = group.powgh(&(&z_an / &ell), &(&z_sa / &ell))?;
        group.reduce(group.mul(&lhs, &rhs))
    };

    // z_w2 - z_an = chal·t + (r_w2 - r_an) is non-negative by the swap
    let dq = (&z_w2 - &z_an) / &ell;

    // the secrets held by SecretScalar guards zeroize as the call ends
    Ok(Signature {
        c2,
        t,
        chal,
        aq,
        bq,
        cq,
        dq,
        z_w: &z_w % &ell,
        z_w2: &z_w2 % &ell,
        z_s1: &z_s1 % &ell,
        z_a: &z_a % &ell,
        z_an: &z_an % &ell,
        z_s1w: &z_s1w % &ell,
        z_sa: &z_sa % &ell,
        ell,
    })
}
