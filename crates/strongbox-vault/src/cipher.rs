// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-CBC envelope encryption keyed by the session master key.
//!
//! Wire format: `<hex iv>:<hex ciphertext>`, lowercase, PKCS#7 padding. Every
//! call to [`EnvelopeCipher::encrypt`] draws a fresh 16-byte IV from the system
//! CSPRNG. CBC carries no authentication tag: a padding check catches most
//! tampering but not all of it.

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use strongbox_core::StrongboxError;
use zeroize::Zeroizing;

use crate::kdf::{derive_legacy_key, KEY_LEN};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Length in bytes of the CBC initialization vector.
pub const IV_LEN: usize = 16;

/// Session cipher holding the derived master key.
///
/// The key is absent until [`set_key`](Self::set_key) is called; every
/// operation before then fails with [`StrongboxError::KeyNotSet`].
pub struct EnvelopeCipher {
    key: Option<Zeroizing<[u8; KEY_LEN]>>,
    rng: SystemRandom,
}

impl std::fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCipher")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for EnvelopeCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeCipher {
    /// Create a cipher with no key set.
    pub fn new() -> Self {
        Self {
            key: None,
            rng: SystemRandom::new(),
        }
    }

    /// Create a cipher keyed from `passphrase`.
    pub fn with_passphrase(passphrase: &SecretString) -> Result<Self, StrongboxError> {
        let mut cipher = Self::new();
        cipher.set_key(passphrase)?;
        Ok(cipher)
    }

    /// Derive and install the session key. Replaces any previous key.
    pub fn set_key(&mut self, passphrase: &SecretString) -> Result<(), StrongboxError> {
        let passphrase = passphrase.expose_secret();
        if passphrase.is_empty() {
            return Err(StrongboxError::InvalidInput(
                "master key must not be empty".to_string(),
            ));
        }
        self.key = Some(derive_legacy_key(passphrase.as_bytes()));
        Ok(())
    }

    /// Returns true once a key has been installed.
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    fn key(&self) -> Result<&[u8; KEY_LEN], StrongboxError> {
        self.key.as_deref().ok_or(StrongboxError::KeyNotSet)
    }

    /// Encrypt `plaintext` into the `iv:ciphertext` wire format.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, StrongboxError> {
        let key = self.key()?;

        let mut iv = [0u8; IV_LEN];
        self.rng
            .fill(&mut iv)
            .map_err(|_| StrongboxError::Internal("failed to generate random IV".to_string()))?;

        let ciphertext = Aes256CbcEnc::new_from_slices(key, &iv)
            .map_err(|e| StrongboxError::Internal(format!("cipher init failed: {e}")))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        Ok(format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)))
    }

    /// Decrypt an `iv:ciphertext` wire string.
    pub fn decrypt(&self, wire: &str) -> Result<SecretString, StrongboxError> {
        let key = self.key()?;

        let (iv_hex, ct_hex) = wire
            .split_once(':')
            .ok_or_else(|| StrongboxError::Decryption("missing `:` separator".to_string()))?;

        let iv = hex::decode(iv_hex)
            .map_err(|e| StrongboxError::Decryption(format!("invalid IV encoding: {e}")))?;
        if iv.len() != IV_LEN {
            return Err(StrongboxError::Decryption(format!(
                "IV must be {IV_LEN} bytes, got {}",
                iv.len()
            )));
        }

        let ciphertext = hex::decode(ct_hex)
            .map_err(|e| StrongboxError::Decryption(format!("invalid ciphertext encoding: {e}")))?;
        if ciphertext.is_empty() || ciphertext.len() % IV_LEN != 0 {
            return Err(StrongboxError::Decryption(format!(
                "ciphertext length {} is not a positive multiple of the block size",
                ciphertext.len()
            )));
        }

        let plaintext = Aes256CbcDec::new_from_slices(key, &iv)
            .map_err(|e| StrongboxError::Internal(format!("cipher init failed: {e}")))?
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| {
                StrongboxError::Decryption("padding check failed, wrong key or corrupted data".to_string())
            })?;

        let text = std::str::from_utf8(&plaintext)
            .map_err(|_| StrongboxError::Decryption("plaintext is not valid UTF-8".to_string()))?;
        Ok(SecretString::from(text))
    }
}
