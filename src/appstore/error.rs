//! Remote client errors

use std::fmt;
use thiserror::Error;

/// Which JSON layer failed to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// The transport envelope returned by the remote function
    Envelope,
    /// The GraphQL payload carried in the envelope body
    Graphql,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Envelope => f.write_str("envelope"),
            Layer::Graphql => f.write_str("graphql"),
        }
    }
}

/// Mutation classes reported by [`AppStoreError::NotFoundOrFailed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Edit,
    Delete,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Edit => f.write_str("edit"),
            Mutation::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppStoreError {
    /// The remote call could not complete
    #[error("remote invocation failed: {0}")]
    Invocation(String),

    #[error("failed to decode {layer} response: {source}")]
    Decode {
        layer: Layer,
        #[source]
        source: serde_json::Error,
    },

    /// The GraphQL layer answered without usable data
    #[error("graphql request failed: {0}")]
    Graphql(String),

    #[error("listing {0} not found")]
    NotFound(String),

    /// The backend returned `false` for a mutation; it does not say why
    #[error("failed to {mutation} listing {id}: not found or rejected by the backend")]
    NotFoundOrFailed { mutation: Mutation, id: String },

    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

impl AppStoreError {
    pub fn decode(layer: Layer, source: serde_json::Error) -> Self {
        Self::Decode { layer, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppStoreError::NotFound(_))
    }

    /// True for errors raised before or during transport, as opposed to
    /// answers the backend gave
    pub fn is_transport(&self) -> bool {
        matches!(self, AppStoreError::Invocation(_) | AppStoreError::Encode(_))
    }
}

pub type Result<T, E = AppStoreError> = std::result::Result<T, E>;
