//! Signature wire format: fifteen integers, each framed as a
//! little-endian u16 byte length followed by that many big-endian
//! magnitude bytes. Lengths above the item cap are malformed, and a
//! valid encoding consumes its buffer exactly.

use num_bigint::BigUint;
use tracing::warn;

use super::api::{BytesVec, FsigError, FsigResult};
use crate::crypto_tools::{constants::MAX_ITEM_SIZE, hash::int_bytes_be};
use crate::pok::Signature;

pub fn encode_signature(sig: &Signature) -> FsigResult<BytesVec> {
    let mut out = BytesVec::new();

    for item in sig.items() {
        let bytes = int_bytes_be(item);

        if bytes.len() > MAX_ITEM_SIZE {
            warn!("signature item of {} bytes exceeds the cap", bytes.len());
            return Err(FsigError::Validation);
        }

        out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
        out.extend_from_slice(&bytes);
    }

    Ok(out)
}

/// Decoding failures are non-fatal: return `None` and log.
pub fn decode_signature(bytes: &[u8]) -> Option<Signature> {
    let mut items = Vec::with_capacity(Signature::ITEM_COUNT);
    let mut pos = 0usize;

    for _ in 0..Signature::ITEM_COUNT {
        if pos + 2 > bytes.len() {
            warn!("signature truncated in a length prefix");
            return None;
        }

        let len = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]) as usize;
        pos += 2;

        if len > MAX_ITEM_SIZE {
            warn!("signature item of {} bytes exceeds the cap", len);
            return None;
        }

        if pos + len > bytes.len() {
            warn!("signature truncated in an item body");
            return None;
        }

        items.push(BigUint::from_bytes_be(&bytes[pos..pos + len]));
        pos += len;
    }

    if pos != bytes.len() {
        warn!("{} trailing bytes after signature", bytes.len() - pos);
        return None;
    }

    Signature::from_items(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn sample_signature() -> Signature {
        let items: Vec<BigUint> = (0..Signature::ITEM_COUNT as u64)
            .map(|i| BigUint::from(i) * BigUint::from(0x0123_4567_89ab_cdefu64))
            .collect();
        Signature::from_items(items).unwrap()
    }

    #[test]
    fn round_trip() {
        let sig = sample_signature();
        let bytes = encode_signature(&sig).unwrap();

        assert_eq!(decode_signature(&bytes), Some(sig));
    }

    #[test]
    fn known_answer_encoding() {
        // hand-assembled frames: LE u16 length, then big-endian magnitude
        let values = [
            0x00u64, 0x02, 0x0123, 0x00ab_cdef, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 0x8000,
        ];
        let sig =
            Signature::from_items(values.iter().map(|&v| BigUint::from(v)).collect()).unwrap();

        let expected = "0000010002020001230300abcdef\
                        01000101000201000301000401000501000601000701000801000901000a\
                        02008000";

        let bytes = encode_signature(&sig).unwrap();
        assert_eq!(hex::encode(&bytes), expected);

        assert_eq!(
            decode_signature(&hex::decode(expected).unwrap()),
            Some(sig)
        );
    }

    #[test]
    fn zero_items_have_zero_length() {
        let sig = Signature::from_items(vec![BigUint::zero(); Signature::ITEM_COUNT]).unwrap();
        let bytes = encode_signature(&sig).unwrap();

        // fifteen empty items: length prefixes only
        assert_eq!(bytes.len(), 2 * Signature::ITEM_COUNT);
        assert!(bytes.iter().all(|&b| b == 0));
        assert_eq!(decode_signature(&bytes), Some(sig));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = encode_signature(&sample_signature()).unwrap();
        bytes.push(0x00);

        assert_eq!(decode_signature(&bytes), None);
    }

    #[test]
    fn truncation_rejected() {
        let bytes = encode_signature(&sample_signature()).unwrap();

        assert_eq!(decode_signature(&bytes[..bytes.len() - 1]), None);
        assert_eq!(decode_signature(&bytes[..1]), None);
        assert_eq!(decode_signature(&[]), None);
    }

    #[test]
    fn oversized_length_prefix_rejected() {
        let mut bytes = encode_signature(&sample_signature()).unwrap();

        // first item claims more than the cap
        let bad = (MAX_ITEM_SIZE as u16 + 1).to_le_bytes();
        bytes[0] = bad[0];
        bytes[1] = bad[1];

        assert_eq!(decode_signature(&bytes), None);
    }
}
