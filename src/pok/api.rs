use num_bigint::BigUint;
use tracing::{error, warn};

use super::{challenge, sign, verify};
use crate::crypto_tools::{
    constants::{MAX_ITEM_SIZE, MAX_MODBITS, MIN_MODBITS},
    group::Group,
    hash::int_bytes_be,
};
use crate::sdk::{
    api::{BytesVec, FsigError, FsigResult},
    wire_bytes::{decode_signature, encode_signature},
};

/// A protocol context: the group of unknown order and its precomputed
/// tables. Contexts are immutable once built; give each worker thread
/// its own.
pub struct Context {
    group: Group,
}

/// Left-pad the big-endian magnitude of `x` to exactly `size` bytes.
fn pad_left(x: &BigUint, size: usize) -> FsigResult<BytesVec> {
    let bytes = int_bytes_be(x);

    if bytes.len() > size {
        error!("{}-byte value cannot pad into {} bytes", bytes.len(), size);
        return Err(FsigError::Validation);
    }

    let mut out = vec![0u8; size];
    out[size - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

fn check_len(buf: &[u8]) -> FsigResult<()> {
    if buf.len() > MAX_ITEM_SIZE {
        error!("input of {} bytes exceeds the item cap", buf.len());
        return Err(FsigError::Validation);
    }
    Ok(())
}

impl Context {
    /// Build a context over the big-endian group modulus `n` with
    /// generator values `g` and `h` (customarily 2 and 3).
    ///
    /// A non-zero `modbits` must lie in [[MIN_MODBITS], [MAX_MODBITS]]
    /// and enables the signer-side tables; zero builds a cheaper,
    /// verification-only context.
    pub fn new(n: &[u8], g: u64, h: u64, modbits: usize) -> FsigResult<Self> {
        check_len(n)?;

        if n.is_empty() {
            error!("empty group modulus");
            return Err(FsigError::Validation);
        }

        if modbits != 0 && !(MIN_MODBITS..=MAX_MODBITS).contains(&modbits) {
            error!(
                "modbits {} outside [{}, {}]",
                modbits, MIN_MODBITS, MAX_MODBITS
            );
            return Err(FsigError::Validation);
        }

        Ok(Self {
            group: Group::new(BigUint::from_bytes_be(n), g, h, modbits)?,
        })
    }

    /// Commit to the signer's RSA modulus `n` (big-endian bytes).
    ///
    /// Returns the 32-byte seed `s'`, to be kept by the signer, and the
    /// public commitment `C1`, padded to the group modulus width.
    pub fn challenge(&self, n: &[u8]) -> FsigResult<([u8; 32], BytesVec)> {
        check_len(n)?;

        let (s_prime, c1) = challenge(&self.group, &BigUint::from_bytes_be(n))?;

        let mut s_prime_out = [0u8; 32];
        s_prime_out.copy_from_slice(&pad_left(&s_prime, 32)?);

        let c1_len = (self.group.n().bits() + 7) / 8;
        Ok((s_prime_out, pad_left(&c1, c1_len)?))
    }

    /// Sign `msg`, proving knowledge of the factors `p·q = n` behind the
    /// commitment `c1`. Returns the signature in wire format.
    pub fn sign(
        &self,
        msg: &[u8],
        s_prime: &[u8],
        c1: &[u8],
        n: &[u8],
        p: &[u8],
        q: &[u8],
    ) -> FsigResult<BytesVec> {
        for buf in [msg, s_prime, c1, n, p, q] {
            check_len(buf)?;
        }

        let sig = sign::sign(
            &self.group,
            &BigUint::from_bytes_be(msg),
            &BigUint::from_bytes_be(s_prime),
            &BigUint::from_bytes_be(c1),
            &BigUint::from_bytes_be(n),
            &BigUint::from_bytes_be(p),
            &BigUint::from_bytes_be(q),
        )?;

        encode_signature(&sig)
    }

    /// Check a wire-format signature over `msg` against the commitment
    /// `c1`. Malformed input and failed proofs both return `false`.
    pub fn verify(&self, msg: &[u8], sig: &[u8], c1: &[u8]) -> bool {
        if msg.len() > MAX_ITEM_SIZE || c1.len() > MAX_ITEM_SIZE {
            warn!("oversized verify input");
            return false;
        }

        let sig = match decode_signature(sig) {
            Some(sig) => sig,
            None => return false,
        };

        verify::verify(
            &self.group,
            &BigUint::from_bytes_be(msg),
            &BigUint::from_bytes_be(c1),
            &sig,
        )
    }
}
