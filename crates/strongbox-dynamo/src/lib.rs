// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DynamoDB key-value backend for Strongbox.
//!
//! The table is expected to exist with a string partition key `pk` and a
//! string sort key `sk`. Table creation and IAM are out of scope.

pub mod client;
pub mod codec;
pub mod store;

pub use client::load_sdk_config;
pub use store::DynamoKvStore;
