// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master-key derivation.
//!
//! The derivation is a single unsalted SHA-256, base64-encoded, with the first
//! 32 ASCII characters used as the AES-256 key. It is weak against offline
//! guessing and is kept only so existing ciphertext stays decryptable.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Length in bytes of the derived AES-256 key.
pub const KEY_LEN: usize = 32;

/// Derive the 32-byte cipher key from a master passphrase.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_legacy_key(passphrase: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let digest = Zeroizing::new(<[u8; 32]>::from(Sha256::digest(passphrase)));
    let encoded = Zeroizing::new(STANDARD.encode(digest.as_slice()));

    // A 32-byte digest encodes to 44 base64 characters, so the slice is in bounds.
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&encoded.as_bytes()[..KEY_LEN]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_passphrase_vector() {
        let key = derive_legacy_key(b"");
        assert_eq!(&key[..], b"47DEQpj8HBSa+/TImW+5JCeuQeRkm5NM");
    }

    #[test]
    fn known_passphrase_vector() {
        let key = derive_legacy_key(b"abc");
        assert_eq!(&key[..], b"ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qc");
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(*derive_legacy_key(b"same"), *derive_legacy_key(b"same"));
        assert_ne!(*derive_legacy_key(b"one"), *derive_legacy_key(b"two"));
    }
}
