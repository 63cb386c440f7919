// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault facade: generate, store, retrieve, list, and roll back secrets.
//!
//! Composes the generator, the session cipher, and the version ledger.
//! Plaintext only leaves the vault as a [`SecretString`].

use std::collections::BTreeSet;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use strongbox_core::{KvStore, StrongboxError};
use tracing::{debug, error, info};

use crate::cipher::EnvelopeCipher;
use crate::generator::PasswordGenerator;
use crate::ledger::{VersionEntry, VersionLedger};

/// A freshly generated and stored secret.
#[derive(Debug)]
pub struct GeneratedSecret {
    pub version: u64,
    pub password: SecretString,
}

/// Result of [`Vault::store_existing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The secret was stored under this version.
    Stored { version: u64 },
    /// The backend rejected a write; nothing was returned to the caller.
    Failed { reason: String },
}

impl StoreOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

/// The session vault.
///
/// Debug output omits the master key.
pub struct Vault {
    generator: PasswordGenerator,
    cipher: EnvelopeCipher,
    ledger: VersionLedger,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("cipher", &self.cipher)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl Vault {
    /// Create a vault over `store` with no master key set.
    pub fn new(store: Arc<dyn KvStore>, generator: PasswordGenerator) -> Self {
        Self {
            generator,
            cipher: EnvelopeCipher::new(),
            ledger: VersionLedger::new(store),
        }
    }

    /// Set the session master key.
    pub fn set_master_key(&mut self, passphrase: &SecretString) -> Result<(), StrongboxError> {
        self.cipher.set_key(passphrase)?;
        debug!("master key set");
        Ok(())
    }

    /// Builder form of [`set_master_key`](Self::set_master_key).
    pub fn with_master_key(mut self, passphrase: &SecretString) -> Result<Self, StrongboxError> {
        self.set_master_key(passphrase)?;
        Ok(self)
    }

    /// Name of the backing store.
    pub fn backend_name(&self) -> &str {
        self.ledger.backend_name()
    }

    /// Generate a password, store it as a new version, and return it.
    pub async fn generate_and_store(&self, service: &str) -> Result<GeneratedSecret, StrongboxError> {
        let password = self.generator.generate()?;
        let ciphertext = self.cipher.encrypt(password.expose_secret())?;
        let version = self.ledger.write_version(service, &ciphertext).await?;
        info!(service = %service, version, "generated new secret");
        Ok(GeneratedSecret { version, password })
    }

    /// Encrypt and store an operator-supplied password as a new version.
    ///
    /// Backend failures come back as [`StoreOutcome::Failed`]. A missing key
    /// or bad input is still an error.
    pub async fn store_existing(
        &self,
        service: &str,
        password: &SecretString,
    ) -> Result<StoreOutcome, StrongboxError> {
        if password.expose_secret().is_empty() {
            return Err(StrongboxError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        let ciphertext = self.cipher.encrypt(password.expose_secret())?;
        match self.ledger.write_version(service, &ciphertext).await {
            Ok(version) => Ok(StoreOutcome::Stored { version }),
            Err(e) if e.is_backend() => {
                error!(service = %service, error = %e, "failed to store secret");
                Ok(StoreOutcome::Failed {
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Decrypt the current secret of `service`.
    pub async fn retrieve_current(&self, service: &str) -> Result<SecretString, StrongboxError> {
        let ciphertext = self.ledger.read_current(service).await?;
        self.cipher.decrypt(&ciphertext)
    }

    /// Decrypt one version of `service`.
    pub async fn retrieve_version(
        &self,
        service: &str,
        version: u64,
    ) -> Result<SecretString, StrongboxError> {
        let ciphertext = self.ledger.read_version(service, version).await?;
        self.cipher.decrypt(&ciphertext)
    }

    /// Version the current record of `service` points at.
    pub async fn current_version(&self, service: &str) -> Result<u64, StrongboxError> {
        self.ledger.current_version(service).await
    }

    /// Point `service` back at an existing version.
    pub async fn rollback(&self, service: &str, version: u64) -> Result<(), StrongboxError> {
        self.ledger.set_current(service, version).await
    }

    /// History of `service`, newest first.
    pub async fn list_versions(&self, service: &str) -> Result<Vec<VersionEntry>, StrongboxError> {
        self.ledger.list_versions(service).await
    }

    /// Every service with a current record.
    pub async fn list_services(&self) -> Result<BTreeSet<String>, StrongboxError> {
        self.ledger.list_services().await
    }
}
