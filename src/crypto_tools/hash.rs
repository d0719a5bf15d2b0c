use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::constants::{MAX_ITEM_SIZE, TRANSCRIPT_PREFIX};
use crate::sdk::api::{BytesVec, FsigError, FsigResult};

/// Big-endian magnitude of `n`, empty for zero.
/// This is the canonical byte form used by the transcript, the signature
/// wire format and the public byte API.
pub(crate) fn int_bytes_be(n: &BigUint) -> BytesVec {
    if n.is_zero() {
        BytesVec::new()
    } else {
        n.to_bytes_be()
    }
}

/// Incremental hash of the Fiat-Shamir transcript.
///
/// Every item is framed as a little-endian u16 byte length followed by
/// the big-endian magnitude; bit 15 of the length commits to the sign.
/// Magnitudes are capped at [MAX_ITEM_SIZE] bytes, so a hostile value
/// rejects instead of hashing ambiguously.
pub struct Transcript {
    sha: Sha256,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            sha: Sha256::new().chain_update(TRANSCRIPT_PREFIX),
        }
    }

    pub fn absorb_uint(&mut self, item: &BigUint) -> FsigResult<()> {
        self.absorb_raw(false, &int_bytes_be(item))
    }

    pub fn absorb(&mut self, item: &BigInt) -> FsigResult<()> {
        let (sign, mag) = item.to_bytes_be();
        let mag = if sign == Sign::NoSign { BytesVec::new() } else { mag };
        self.absorb_raw(sign == Sign::Minus, &mag)
    }

    fn absorb_raw(&mut self, negative: bool, mag: &[u8]) -> FsigResult<()> {
        if mag.len() > MAX_ITEM_SIZE {
            warn!("transcript item of {} bytes exceeds the cap", mag.len());
            return Err(FsigError::Validation);
        }

        let mut len = mag.len() as u16;
        if negative {
            len |= 0x8000;
        }

        self.sha.update(len.to_le_bytes());
        self.sha.update(mag);
        Ok(())
    }

    pub fn finalize(self) -> [u8; 32] {
        self.sha.finalize().into()
    }
}
