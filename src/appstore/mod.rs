//! App store service interaction module
//!
//! This module provides everything needed to talk to the app-store GraphQL
//! service: credential resolution, the wire envelope, the two transports and
//! the typed client on top.
//!
//! # Module Structure
//!
//! - [`auth`] - AWS profile/region resolution for the Lambda transport
//! - [`client`] - Typed listing CRUD over GraphQL
//! - [`envelope`] - Request/response envelopes, headers and capability policy
//! - [`error`] - Client error kinds
//! - [`http`] - Direct GraphQL-over-HTTP transport
//! - [`lambda`] - Function invocation transport
//! - [`queries`] - GraphQL documents
//! - [`transport`] - The transport trait
//!
//! # Example
//!
//! ```ignore
//! use appstore_provider::appstore::AppStoreClient;
//! use appstore_provider::config::Config;
//!
//! async fn example() -> appstore_provider::appstore::Result<()> {
//!     let client = AppStoreClient::connect(&Config::load()).await?;
//!     let listing = client.get("abc-123").await?;
//!     println!("{}", listing.name);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod lambda;
pub mod queries;
pub mod transport;

pub use client::{AppStoreClient, Listing};
pub use envelope::{CapabilityPolicy, GraphqlRequest, Identity, Operation};
pub use error::{AppStoreError, Layer, Mutation, Result};
pub use transport::GraphqlTransport;
