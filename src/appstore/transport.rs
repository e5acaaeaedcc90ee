//! Transport seam between the typed client and the remote service

use super::envelope::{CapabilityPolicy, GraphqlRequest};
use super::error::Result;
use async_trait::async_trait;

/// Carries one GraphQL request to the service and returns the raw GraphQL
/// response text (`{"data": ..., "errors": ...}`)
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, request: &GraphqlRequest, policy: CapabilityPolicy) -> Result<String>;

    /// Short name used in logs
    fn describe(&self) -> String;
}
