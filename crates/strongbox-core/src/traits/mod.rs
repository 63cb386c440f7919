// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage seam for the version ledger.
//!
//! Backends implement [`KvStore`] with `#[async_trait]` so the ledger can hold
//! them as `Arc<dyn KvStore>`.

pub mod store;

pub use store::KvStore;
