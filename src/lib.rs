//! Provisioning connector for app-store web-app listings
//!
//! Exposes the `applet` resource type on top of the app-store GraphQL
//! service, which is reached by invoking its Lambda function (or, when
//! configured, its GraphQL endpoint directly).

pub mod appstore;
pub mod config;
pub mod resource;

/// Version injected at compile time via APPSTORE_PROVIDER_VERSION env var
/// (set by CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("APPSTORE_PROVIDER_VERSION") {
    Some(v) => v,
    None => "dev",
};
