//! Deterministic identifiers for ordered pairs of sequence keys.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::domain::SequenceKey;

/// 64-bit fingerprint of an ordered `(key1, key2)` pair.
///
/// The first eight bytes of `SHA-256(key1 ‖ 0x1F ‖ key2)`, displayed as 16
/// lowercase hex digits. Used to join result rows against other tables; it
/// is row metadata, not a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairFingerprint([u8; 8]);

impl PairFingerprint {
    /// Fingerprint the ordered pair `(key1, key2)`.
    #[must_use]
    pub fn of(key1: &SequenceKey, key2: &SequenceKey) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key1.as_str().as_bytes());
        // Unit separator: ("ab", "c") and ("a", "bc") must differ.
        hasher.update([0x1f]);
        hasher.update(key2.as_str().as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(bytes)
    }

    /// Return the raw fingerprint bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for PairFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
