//! Content hashing for archive members
//!
//! Members are compared by a fixed-size digest of their uncompressed bytes.
//! The digest is not verified any further: equal digests mean equal content.

use md5::{Digest, Md5};
use zipdiff_core::ContentHash;

/// Computes the content digest of a member's bytes
pub trait ContentHasher: Send + Sync {
    /// Digest `data`; must be deterministic
    fn digest(&self, data: &[u8]) -> ContentHash;

    /// Short algorithm name for logs
    fn algorithm(&self) -> &str;
}

/// MD5 content hasher, matching the `md5sum` style digests users expect
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Hasher;

impl ContentHasher for Md5Hasher {
    fn digest(&self, data: &[u8]) -> ContentHash {
        let mut digest = [0u8; ContentHash::LEN];
        digest.copy_from_slice(&Md5::digest(data));
        ContentHash::from_bytes(digest)
    }

    fn algorithm(&self) -> &str {
        "md5"
    }
}
