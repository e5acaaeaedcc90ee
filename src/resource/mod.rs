//! Resource abstraction layer
//!
//! Resource schemas are declared in JSON files under `src/resources/` and
//! compiled into the binary; the adapters in this module implement the
//! lifecycle of each resource type on top of the app-store client.
//!
//! # Architecture
//!
//! - [`registry`] - Loads resource schemas and validates definitions against them
//! - [`applet`] - Create/read/update/delete/import for `applet`
//!
//! # Example
//!
//! ```ignore
//! use appstore_provider::resource::{AppletConfig, AppletResource};
//!
//! async fn ensure(resource: &AppletResource, definition: &serde_json::Value) -> anyhow::Result<String> {
//!     let config = AppletConfig::from_definition(definition)?;
//!     Ok(resource.create(&config).await?.id().to_string())
//! }
//! ```

pub mod applet;
mod registry;

pub use applet::{
    AppletConfig, AppletResource, AppletState, DeleteOutcome, ReadOutcome, ResourceError,
    WriteOutcome, RESOURCE_TYPE,
};
pub use registry::*;
