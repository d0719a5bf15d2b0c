/// Bit width of the Fiat-Shamir challenge `chal` and of the prime `ell`.
pub const CHAL_BITS: usize = 128;

/// Bit width of blinding exponents.
/// Must be at least `rand_bits` of the largest supported group modulus.
pub const EXPONENT_SIZE: usize = 2048;

/// Increment budget when advancing `ell_r` to the next prime.
/// A verifier accepts `ell` only within this distance of `ell_r`.
pub const ELLDIFF_MAX: u64 = 512;

/// Upper bound on the number of group elements held by one comb table.
pub const MAX_COMB_SIZE: usize = 512;

/// Supported range for the `modbits` hint at context creation.
pub const MIN_MODBITS: usize = 1024;
pub const MAX_MODBITS: usize = 4096;

/// Magnitude cap, in bytes, for every transcript item and wire item.
pub const MAX_ITEM_SIZE: usize = 768;

/// ASCII prefix of the Fiat-Shamir transcript.
/// Kept byte-for-byte from libGooPy so transcripts agree across
/// implementations of the protocol.
pub const TRANSCRIPT_PREFIX: &[u8] = b"libGooPy:";

/// DRBG personalization string, also inherited from libGooPy.
pub const PRNG_PERS: &[u8] = b"libGooPy_prng";
