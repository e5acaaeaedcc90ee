//! AWS credential and region resolution
//!
//! Credentials are never handled here directly. The SDK's default provider
//! chain resolves them, optionally pinned to a named shared-config profile.

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Where to resolve AWS settings from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    /// Shared config profile (falls back to `AWS_PROFILE` / `default`)
    pub profile: Option<String>,
    /// Region override (falls back to the profile or `AWS_REGION`)
    pub region: Option<String>,
    /// Endpoint override, for local function emulators
    pub endpoint_url: Option<String>,
}

/// Load the SDK configuration for the given settings
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(profile) = &settings.profile {
        tracing::debug!("Using AWS profile: {}", profile);
        loader = loader.profile_name(profile);
    }
    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &settings.endpoint_url {
        tracing::debug!("Using AWS endpoint override: {}", endpoint);
        loader = loader.endpoint_url(endpoint);
    }

    let config = loader.load().await;
    if config.region().is_none() {
        tracing::warn!("No AWS region resolved; set AWS_REGION or pass --region");
    }
    config
}

/// Build a Lambda client for the given settings
pub async fn lambda_client(settings: &AwsSettings) -> aws_sdk_lambda::Client {
    let config = load_sdk_config(settings).await;
    aws_sdk_lambda::Client::new(&config)
}
