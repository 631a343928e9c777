//! SHA-256 digests used to key cache entries.

use sha2::{Digest, Sha256};

/// Number of hex characters kept when a digest is embedded in a filename.
pub const SHORT_HEX_LEN: usize = 16;

/// SHA-256 of `data` as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// First [`SHORT_HEX_LEN`] hex chars of the SHA-256 of `data`.
pub fn short_hex(data: &[u8]) -> String {
    let mut s = sha256_hex(data);
    s.truncate(SHORT_HEX_LEN);
    s
}
