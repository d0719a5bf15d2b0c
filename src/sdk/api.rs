//! API for fsig users
pub type FsigResult<T> = Result<T, FsigError>;
pub type BytesVec = Vec<u8>;

/// Failure kinds surfaced by the fallible operations.
/// A signature that merely fails to verify is not an error: `verify`
/// returns `false` and logs the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsigError {
    /// Malformed caller input: wrong length, out-of-range parameter,
    /// or a value the wire format cannot carry.
    Validation,
    /// Arithmetic failure that honest inputs cannot produce, e.g. a
    /// modular inverse that does not exist because the operand shares a
    /// factor with the group modulus.
    Crypto,
    /// The OS randomness source failed.
    Resource,
}

/// Expose fsig's signature codec.
pub use super::wire_bytes::{decode_signature, encode_signature};
