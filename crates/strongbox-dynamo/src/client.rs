// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AWS SDK configuration for the DynamoDB backend.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use strongbox_config::model::BackendConfig;
use tracing::info;

/// Build an [`SdkConfig`] from the default credential chain plus the
/// region and endpoint overrides in `config`.
pub async fn load_sdk_config(config: &BackendConfig) -> SdkConfig {
    let mut builder = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        builder = builder.region(Region::new(region.clone()));
    }

    if let Some(endpoint) = &config.endpoint_url {
        info!(endpoint = %endpoint, "routing DynamoDB requests to endpoint override");
        builder = builder.endpoint_url(endpoint);
    }

    builder.load().await
}
