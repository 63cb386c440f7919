// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite key-value backend for Strongbox.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. Records are stored
//! one row per `(partition_key, sort_key)` with their attributes as JSON.

pub mod database;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::SqliteKvStore;
