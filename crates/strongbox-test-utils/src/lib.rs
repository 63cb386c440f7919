// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Strongbox integration tests.
//!
//! Provides an in-memory [`KvStore`](strongbox_core::KvStore) for fast,
//! deterministic, CI-runnable tests without SQLite files or AWS.
//!
//! # Components
//!
//! - [`MockKvStore`] - In-memory store with injectable backend failures

pub mod mock_store;

pub use mock_store::MockKvStore;
