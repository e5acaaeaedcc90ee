//! Wire types for the app-store GraphQL service
//!
//! Requests travel as a GraphQL body (`{query, operationName, variables}`).
//! When the service is reached through its Lambda function, the body is
//! wrapped in an API-gateway style envelope and the answer comes back the
//! same way, with the GraphQL payload JSON-encoded in `body`.

use super::error::{AppStoreError, Layer, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const ACCOUNT_HEADER: &str = "LifeOmic-Account";
pub const USER_HEADER: &str = "LifeOmic-User";
pub const POLICY_HEADER: &str = "LifeOmic-Policy";
pub const GRAPHQL_PATH: &str = "/graphql";

/// Account and acting user sent with every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account: String,
    pub user: String,
}

/// The calls the client makes, each with a fixed capability footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Create,
    Edit,
    Delete,
}

impl Operation {
    pub fn policy(self) -> CapabilityPolicy {
        match self {
            Operation::Get => CapabilityPolicy::READ_ONLY,
            Operation::Create | Operation::Edit => CapabilityPolicy::WRITE,
            Operation::Delete => CapabilityPolicy::FULL,
        }
    }
}

/// Mutation classes a request is permitted to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilityPolicy {
    pub create_data: bool,
    pub update_data: bool,
    pub delete_data: bool,
}

impl CapabilityPolicy {
    pub const READ_ONLY: Self = Self {
        create_data: false,
        update_data: false,
        delete_data: false,
    };
    pub const WRITE: Self = Self {
        create_data: true,
        update_data: true,
        delete_data: false,
    };
    pub const FULL: Self = Self {
        create_data: true,
        update_data: true,
        delete_data: true,
    };

    /// Header value: `{"rules": {"createData": .., "updateData": .., "deleteData": ..}}`
    pub fn header_value(&self) -> String {
        #[derive(Serialize)]
        struct Policy<'a> {
            rules: &'a CapabilityPolicy,
        }
        // A struct of three bools always serializes.
        serde_json::to_string(&Policy { rules: self }).unwrap_or_default()
    }
}

impl Serialize for CapabilityPolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut rules = BTreeMap::new();
        rules.insert("createData", self.create_data);
        rules.insert("updateData", self.update_data);
        rules.insert("deleteData", self.delete_data);
        rules.serialize(serializer)
    }
}

/// Build the header set shared by every transport
pub fn request_headers(identity: &Identity, policy: CapabilityPolicy) -> BTreeMap<String, String> {
    BTreeMap::from([
        (ACCOUNT_HEADER.to_string(), identity.account.clone()),
        (USER_HEADER.to_string(), identity.user.clone()),
        ("content-type".to_string(), "application/json".to_string()),
        (POLICY_HEADER.to_string(), policy.header_value()),
    ])
}

/// A GraphQL request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub operation_name: &'static str,
    pub variables: Value,
}

/// Envelope handed to the remote function
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    pub headers: BTreeMap<String, String>,
    pub path: String,
    pub http_method: String,
    pub query_string_parameters: BTreeMap<String, String>,
    pub body: String,
}

impl RequestEnvelope {
    pub fn new(request: &GraphqlRequest, identity: &Identity, policy: CapabilityPolicy) -> Result<Self> {
        let body = serde_json::to_string(request).map_err(AppStoreError::Encode)?;
        Ok(Self {
            headers: request_headers(identity, policy),
            path: GRAPHQL_PATH.to_string(),
            http_method: "POST".to_string(),
            query_string_parameters: BTreeMap::new(),
            body,
        })
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(AppStoreError::Encode)
    }
}

/// Envelope returned by the remote function
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub status_code: Option<u16>,
    pub body: String,
}

impl ResponseEnvelope {
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| AppStoreError::decode(Layer::Envelope, e))
    }

    pub fn is_success(&self) -> bool {
        self.status_code.map_or(true, |code| (200..300).contains(&code))
    }
}

/// GraphQL response payload
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Join GraphQL error messages for display
pub fn join_errors(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
