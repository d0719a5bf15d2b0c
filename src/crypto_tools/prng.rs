use hmac::{Mac, SimpleHmac};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use sha2::Sha256;
use tracing::error;
use zeroize::Zeroize;

use super::constants::PRNG_PERS;
use crate::sdk::api::{FsigError, FsigResult};

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> FsigResult<[u8; 32]> {
    let mut prf = SimpleHmac::<Sha256>::new_from_slice(key).map_err(|_| {
        error!("failure to initialize hmac");
        FsigError::Crypto
    })?;

    for part in parts {
        prf.update(part);
    }

    Ok(prf.finalize().into_bytes().into())
}

/// HMAC-DRBG over SHA-256 in the SP 800-90A shape, minus reseeding:
/// sessions are short-lived, so callers reseed by constructing a fresh
/// instance.
pub struct HmacDrbg {
    k: [u8; 32],
    v: [u8; 32],
}

impl HmacDrbg {
    pub fn new(entropy: &[u8]) -> FsigResult<Self> {
        let mut drbg = Self {
            k: [0x00; 32],
            v: [0x01; 32],
        };
        drbg.update(Some(entropy))?;
        Ok(drbg)
    }

    fn update(&mut self, seed: Option<&[u8]>) -> FsigResult<()> {
        self.k = hmac_sha256(&self.k, &[&self.v, &[0x00], seed.unwrap_or(&[])])?;
        self.v = hmac_sha256(&self.k, &[&self.v])?;

        if let Some(seed) = seed {
            self.k = hmac_sha256(&self.k, &[&self.v, &[0x01], seed])?;
            self.v = hmac_sha256(&self.k, &[&self.v])?;
        }

        Ok(())
    }

    pub fn generate(&mut self, out: &mut [u8; 32]) -> FsigResult<()> {
        self.v = hmac_sha256(&self.k, &[&self.v])?;
        out.copy_from_slice(&self.v);
        self.update(None)
    }
}

/// Deterministic bit source: an [HmacDrbg] session plus a stash of bits
/// left over from previous draws, so that consecutive [Prng::getrandbits]
/// calls consume the DRBG stream without gaps.
pub struct Prng {
    drbg: HmacDrbg,
    save: BigUint,
}

impl Prng {
    /// Start a session keyed by 32 bytes.
    /// DRBG entropy is `key ‖ 32 zero bytes ‖ personalization`.
    pub fn seed(key: &[u8; 32]) -> FsigResult<Self> {
        let mut entropy = [0u8; 64 + PRNG_PERS.len()];
        entropy[..32].copy_from_slice(key);
        entropy[64..].copy_from_slice(PRNG_PERS);

        let drbg = HmacDrbg::new(&entropy);
        entropy.zeroize();

        Ok(Self {
            drbg: drbg?,
            save: BigUint::zero(),
        })
    }

    fn next32(&mut self) -> FsigResult<[u8; 32]> {
        let mut out = [0u8; 32];
        self.drbg.generate(&mut out)?;
        Ok(out)
    }

    /// An integer in [0, 2^nbits).
    /// Pulls 256-bit DRBG blocks until `nbits` bits are available, emits
    /// the top `nbits` and stashes the rest for the next call.
    pub fn getrandbits(&mut self, nbits: usize) -> FsigResult<BigUint> {
        let mut r = std::mem::take(&mut self.save);
        let mut b = r.bits();

        while b < nbits {
            r <<= 256;
            let chunk = BigUint::from_bytes_be(&self.next32()?);
            r |= &chunk;
            b += 256;
        }

        let left = b - nbits;

        if left > 0 {
            let mask = (BigUint::one() << left) - 1u32;
            self.save = &r & &mask;
            r >>= left;
        }

        Ok(r)
    }
}
