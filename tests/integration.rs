//! End-to-end runs of the byte-level API: commit to a modulus, sign a
//! message with its factors, verify against the commitment, and reject
//! every tampering of signature, message or commitment.

use fsig::pok::Context;
use num_bigint::BigUint;
use tracing_test::traced_test;

const P: u32 = 1009;
const Q: u32 = 1013;
const N: u32 = P * Q; // 1022117

fn n_bytes() -> Vec<u8> {
    BigUint::from(N).to_bytes_be()
}

fn signing_context() -> Context {
    Context::new(&n_bytes(), 2, 3, 1024).unwrap()
}

/// challenge → sign → verify over a toy modulus.
fn fresh_signature(ctx: &Context, msg: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let n = n_bytes();
    let (s_prime, c1) = ctx.challenge(&n).unwrap();

    let sig = ctx
        .sign(
            msg,
            &s_prime,
            &c1,
            &n,
            &BigUint::from(P).to_bytes_be(),
            &BigUint::from(Q).to_bytes_be(),
        )
        .unwrap();

    (sig, c1)
}

#[test]
#[traced_test]
fn sign_verify_round_trip() {
    let ctx = signing_context();
    let (sig, c1) = fresh_signature(&ctx, b"hello");

    assert!(ctx.verify(b"hello", &sig, &c1));
}

#[test]
#[traced_test]
fn verification_only_context_accepts() {
    let ctx = signing_context();
    let (sig, c1) = fresh_signature(&ctx, b"hello");

    let verifier = Context::new(&n_bytes(), 2, 3, 0).unwrap();
    assert!(verifier.verify(b"hello", &sig, &c1));
    assert!(!verifier.verify(b"hellp", &sig, &c1));
}

#[test]
#[traced_test]
fn any_flipped_signature_byte_rejects() {
    let ctx = signing_context();
    let (sig, c1) = fresh_signature(&ctx, b"hello");

    for pos in 0..sig.len() {
        let mut tampered = sig.clone();
        tampered[pos] ^= 0x01;
        assert!(
            !ctx.verify(b"hello", &tampered, &c1),
            "flip at byte {} accepted",
            pos
        );
    }
}

#[test]
#[traced_test]
fn tampered_message_rejects() {
    let ctx = signing_context();
    let (sig, c1) = fresh_signature(&ctx, b"hello");

    assert!(!ctx.verify(b"hellp", &sig, &c1));
    assert!(!ctx.verify(b"hello!", &sig, &c1));
    assert!(!ctx.verify(b"", &sig, &c1));
}

#[test]
#[traced_test]
fn tampered_commitment_rejects() {
    let ctx = signing_context();
    let (sig, c1) = fresh_signature(&ctx, b"hello");

    // the non-canonical representative N - C1 of the same class
    let c1_val = BigUint::from_bytes_be(&c1);
    let c1_flipped = (BigUint::from(N) - &c1_val).to_bytes_be();
    assert!(!ctx.verify(b"hello", &sig, &c1_flipped));

    let c1_shifted = (&c1_val + 1u32).to_bytes_be();
    assert!(!ctx.verify(b"hello", &sig, &c1_shifted));
}

/// Split a wire signature into its fifteen framed items.
fn split_items(sig: &[u8]) -> Vec<Vec<u8>> {
    let mut items = Vec::new();
    let mut pos = 0;

    while pos < sig.len() {
        let len = u16::from_le_bytes([sig[pos], sig[pos + 1]]) as usize;
        pos += 2;
        items.push(sig[pos..pos + len].to_vec());
        pos += len;
    }

    items
}

fn join_items(items: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for item in items {
        out.extend_from_slice(&(item.len() as u16).to_le_bytes());
        out.extend_from_slice(item);
    }
    out
}

#[test]
#[traced_test]
fn composite_t_rejects_before_reconstruction() {
    let ctx = signing_context();
    let (sig, c1) = fresh_signature(&ctx, b"hello");

    let mut items = split_items(&sig);
    assert_eq!(items.len(), 15);

    // item 1 is t; 4 is not in the small-prime table
    items[1] = vec![0x04];
    assert!(!ctx.verify(b"hello", &join_items(&items), &c1));
}

#[test]
#[traced_test]
fn malformed_wire_signatures_reject() {
    let ctx = signing_context();
    let (sig, c1) = fresh_signature(&ctx, b"hello");

    // trailing garbage
    let mut extended = sig.clone();
    extended.push(0x00);
    assert!(!ctx.verify(b"hello", &extended, &c1));

    // truncations at every prefix length
    for cut in 0..sig.len() {
        assert!(!ctx.verify(b"hello", &sig[..cut], &c1));
    }

    // an item length above the cap
    let mut oversized = sig.clone();
    oversized[1] = 0x03; // first item now claims 0x03xx > 768 bytes
    assert!(!ctx.verify(b"hello", &oversized, &c1));

    assert!(!ctx.verify(b"hello", &[], &c1));
}

#[test]
#[traced_test]
fn distinct_messages_distinct_signatures() {
    let ctx = signing_context();
    let n = n_bytes();
    let (s_prime, c1) = ctx.challenge(&n).unwrap();
    let p = BigUint::from(P).to_bytes_be();
    let q = BigUint::from(Q).to_bytes_be();

    let sig_a = ctx.sign(b"message a", &s_prime, &c1, &n, &p, &q).unwrap();
    let sig_b = ctx.sign(b"message b", &s_prime, &c1, &n, &p, &q).unwrap();

    assert_ne!(sig_a, sig_b);
    assert!(ctx.verify(b"message a", &sig_a, &c1));
    assert!(ctx.verify(b"message b", &sig_b, &c1));

    // and not across messages
    assert!(!ctx.verify(b"message b", &sig_a, &c1));
    assert!(!ctx.verify(b"message a", &sig_b, &c1));
}

#[test]
#[traced_test]
fn challenge_is_randomized() {
    let ctx = signing_context();
    let n = n_bytes();

    let (s1, c1_a) = ctx.challenge(&n).unwrap();
    let (s2, c1_b) = ctx.challenge(&n).unwrap();

    assert_ne!(s1, s2);
    assert_ne!(c1_a, c1_b);
}
