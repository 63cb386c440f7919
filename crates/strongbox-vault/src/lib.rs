// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Strongbox credential lifecycle engine.
//!
//! A [`Vault`] composes a [`PasswordGenerator`], an [`EnvelopeCipher`] keyed by
//! an operator-supplied master key, and a [`VersionLedger`] over any
//! [`KvStore`](strongbox_core::KvStore). Every write creates an immutable
//! `version#N` record and then repoints the service's `current` record.

pub mod cipher;
pub mod generator;
pub mod kdf;
pub mod ledger;
pub mod prompt;
pub mod vault;

pub use cipher::EnvelopeCipher;
pub use generator::{GeneratorOptions, PasswordGenerator};
pub use ledger::{VersionEntry, VersionLedger};
pub use prompt::{get_master_key, prompt_existing_password, prompt_service_name};
pub use vault::{GeneratedSecret, StoreOutcome, Vault};
