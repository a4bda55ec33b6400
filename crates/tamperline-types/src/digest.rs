//! Dual digest used for every leaf and node of the ledger tree.

use std::fmt;
use std::fmt::Write as _;

use serde::{Serialize, Serializer};
use sha2::{Digest as _, Sha256};

/// Bytes kept from each of the two hash functions.
pub const HALF_LEN: usize = 8;

/// Total digest length in bytes.
pub const DIGEST_LEN: usize = HALF_LEN * 2;

/// Length of the text form: two hex halves joined by `:`.
pub const DIGEST_TEXT_LEN: usize = DIGEST_LEN * 2 + 1;

/// Fixed-format dual digest: `sha256(data)[..8] || blake3(data)[..8]`.
///
/// The text form is `"<16 hex>:<16 hex>"`. The scheme is illustrative,
/// not hardened against a real adversary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Digest arbitrary bytes. Total and deterministic.
    pub fn of(data: &[u8]) -> Self {
        let sha = Sha256::digest(data);
        let blake = blake3::hash(data);

        let mut bytes = [0u8; DIGEST_LEN];
        bytes[..HALF_LEN].copy_from_slice(&sha[..HALF_LEN]);
        bytes[HALF_LEN..].copy_from_slice(&blake.as_bytes()[..HALF_LEN]);
        Self(bytes)
    }

    /// Digest of an internal node: `of(text(left) || text(right))`.
    ///
    /// Order-sensitive: `combine(a, b) != combine(b, a)` whenever `a != b`.
    pub fn combine(left: &Digest, right: &Digest) -> Self {
        let mut text = String::with_capacity(DIGEST_TEXT_LEN * 2);
        // Writing into a String cannot fail.
        let _ = write!(text, "{left}{right}");
        Self::of(text.as_bytes())
    }

    /// Return the raw 16-byte representation.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// The SHA-256 half.
    pub fn sha256_half(&self) -> &[u8] {
        &self.0[..HALF_LEN]
    }

    /// The BLAKE3 half.
    pub fn blake3_half(&self) -> &[u8] {
        &self.0[HALF_LEN..]
    }

    /// Shortened text form for narration, e.g. `"3fa2b1c0…"`.
    pub fn short(&self) -> String {
        format!("{}…", hex::encode(&self.0[..4]))
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.sha256_half() {
            write!(f, "{byte:02x}")?;
        }
        f.write_char(':')?;
        for byte in self.blake3_half() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
