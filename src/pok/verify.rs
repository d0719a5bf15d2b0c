use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use tracing::warn;

use super::{fs_chal, Signature};
use crate::crypto_tools::{
    constants::ELLDIFF_MAX,
    group::Group,
    primes::{is_prime, SMALL_PRIMES},
};

/// Check a signature against a message and the published commitment.
///
/// Any inconsistency rejects; the reason is logged at warn level and the
/// caller only learns `false`.
#[allow(non_snake_case)]
pub(crate) fn verify(group: &Group, msg: &BigUint, c1: &BigUint, sig: &Signature) -> bool {
    // t must be one of the listed small primes
    if !SMALL_PRIMES.iter().any(|&p| sig.t == BigUint::from(p)) {
        warn!("t is not one of the listed small primes");
        return false;
    }

    // every group element must be the canonical representative of the
    // quotient by {±1}
    if !group.is_reduced(c1)
        || !group.is_reduced(&sig.c2)
        || !group.is_reduced(&sig.aq)
        || !group.is_reduced(&sig.bq)
        || !group.is_reduced(&sig.cq)
    {
        warn!("non-canonical group element");
        return false;
    }

    let (c1_inv, c2_inv, aq_inv, bq_inv, cq_inv) =
        match group.inv5(c1, &sig.c2, &sig.aq, &sig.bq, &sig.cq) {
            Ok(inverses) => inverses,
            Err(_) => {
                warn!("a signature element shares a factor with the group modulus");
                return false;
            }
        };

    // reconstruct the prover's first message from the quotient openings
    // and the residues
    let A = match group.recon(
        &sig.aq, &aq_inv, &sig.ell, &c2_inv, &sig.c2, &sig.chal, &sig.z_w, &sig.z_s1,
    ) {
        Ok(v) => v,
        Err(_) => {
            warn!("reconstruction of A failed");
            return false;
        }
    };

    let B = match group.recon(
        &sig.bq, &bq_inv, &sig.ell, &c2_inv, &sig.c2, &sig.z_w, &sig.z_w2, &sig.z_s1w,
    ) {
        Ok(v) => v,
        Err(_) => {
            warn!("reconstruction of B failed");
            return false;
        }
    };

    let C = match group.recon(
        &sig.cq, &cq_inv, &sig.ell, &c1_inv, c1, &sig.z_a, &sig.z_an, &sig.z_sa,
    ) {
        Ok(v) => v,
        Err(_) => {
            warn!("reconstruction of C failed");
            return false;
        }
    };

    // D = Dq·ell + (z_w2 − z_an) − t·chal, carrying one extra ell when
    // the residue difference went negative
    let z_w2_m_an = BigInt::from(sig.z_w2.clone()) - BigInt::from(sig.z_an.clone());

    let mut D = BigInt::from(sig.dq.clone()) * BigInt::from(sig.ell.clone()) + &z_w2_m_an
        - BigInt::from(&sig.t * &sig.chal);

    if z_w2_m_an < BigInt::zero() {
        D += BigInt::from(sig.ell.clone());
    }

    // re-derive the implicitly claimed verifier message
    let (chal_out, ell_r_out) = match fs_chal(group, c1, &sig.c2, &sig.t, &A, &B, &C, &D, msg) {
        Ok(pair) => pair,
        Err(_) => {
            warn!("transcript rejected the reconstructed values");
            return false;
        }
    };

    if sig.chal != chal_out {
        warn!("challenge mismatch");
        return false;
    }

    let elldiff = BigInt::from(sig.ell.clone()) - BigInt::from(ell_r_out);
    if elldiff < BigInt::zero() || elldiff > BigInt::from(ELLDIFF_MAX) {
        warn!("ell is out of range of the derived ell_r");
        return false;
    }

    if !is_prime(&sig.ell) {
        warn!("ell is not prime");
        return false;
    }

    true
}

#[cfg(any(test, feature = "malicious"))]
pub mod malicious {
    use super::*;
    use num_traits::One;

    /// Corrupt one field, leaving the rest of the signature intact.
    pub fn corrupt_chal(sig: &Signature) -> Signature {
        Signature {
            chal: &sig.chal + BigUint::one(),
            ..sig.clone()
        }
    }

    pub fn corrupt_t(sig: &Signature, t: u32) -> Signature {
        Signature {
            t: BigUint::from(t),
            ..sig.clone()
        }
    }

    pub fn corrupt_z_w(sig: &Signature) -> Signature {
        Signature {
            z_w: &sig.z_w + BigUint::one(),
            ..sig.clone()
        }
    }

    pub fn unreduce_c2(group: &Group, sig: &Signature) -> Signature {
        Signature {
            c2: group.n() - &sig.c2,
            ..sig.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{challenge, sign::sign};
    use super::malicious::*;
    use super::*;
    use tracing_test::traced_test;

    fn setup() -> (Group, BigUint, Signature, BigUint) {
        let p = BigUint::from(1009u32);
        let q = BigUint::from(1013u32);
        let n = &p * &q;

        let group = Group::new(n.clone(), 2, 3, 1024).unwrap();
        let (s_prime, c1) = challenge(&group, &n).unwrap();
        let sig = sign(&group, &msg(b"hello"), &s_prime, &c1, &n, &p, &q).unwrap();

        (group, c1, sig, n)
    }

    fn msg(bytes: &[u8]) -> BigUint {
        BigUint::from_bytes_be(bytes)
    }

    #[test]
    #[traced_test]
    fn accepts_honest_signature() {
        let (group, c1, sig, _) = setup();
        assert!(verify(&group, &msg(b"hello"), &c1, &sig));
    }

    #[test]
    #[traced_test]
    fn rejects_wrong_message() {
        let (group, c1, sig, _) = setup();
        assert!(!verify(&group, &msg(b"hellp"), &c1, &sig));
        assert!(!verify(&group, &msg(b""), &c1, &sig));
    }

    #[test]
    #[traced_test]
    fn rejects_wrong_commitment() {
        let (group, c1, sig, _) = setup();

        let c1_tampered = group.reduce(&c1 + BigUint::from(1u32));
        assert!(!verify(&group, &msg(b"hello"), &c1_tampered, &sig));
    }

    #[test]
    #[traced_test]
    fn rejects_non_reduced_commitment() {
        let (group, c1, sig, n) = setup();

        // the other representative of the same class is non-canonical
        let c1_flipped = &n - &c1;
        assert!(!verify(&group, &msg(b"hello"), &c1_flipped, &sig));
    }

    #[test]
    #[traced_test]
    fn rejects_corrupted_fields() {
        let (group, c1, sig, _) = setup();
        let m = msg(b"hello");

        assert!(!verify(&group, &m, &c1, &corrupt_chal(&sig)));
        assert!(!verify(&group, &m, &c1, &corrupt_z_w(&sig)));
        assert!(!verify(&group, &m, &c1, &unreduce_c2(&group, &sig)));
    }

    #[test]
    #[traced_test]
    fn rejects_t_outside_the_table() {
        let (group, c1, sig, _) = setup();

        // 4 is composite, 1021 is prime but beyond the table
        assert!(!verify(&group, &msg(b"hello"), &c1, &corrupt_t(&sig, 4)));
        assert!(!verify(&group, &msg(b"hello"), &c1, &corrupt_t(&sig, 1021)));
    }

    #[test]
    #[traced_test]
    fn rejects_non_prime_ell() {
        let (group, c1, sig, _) = setup();

        let mut bad = sig.clone();
        // keep 128 bits but clear primality with overwhelming likelihood
        bad.ell = &bad.ell - (&bad.ell % BigUint::from(4u32)) + BigUint::from(2u32);

        assert!(!verify(&group, &msg(b"hello"), &c1, &bad));
    }

    #[test]
    #[traced_test]
    fn a_verification_only_group_verifies() {
        let (_, c1, sig, n) = setup();

        // modbits = 0: challenge-sized tables are enough to verify
        let tiny_group = Group::new(n, 2, 3, 0).unwrap();
        assert!(verify(&tiny_group, &msg(b"hello"), &c1, &sig));
        assert!(!verify(&tiny_group, &msg(b"hellp"), &c1, &sig));
    }
}
