//! Lambda transport
//!
//! Wraps each GraphQL request in the service's request envelope and invokes
//! its function synchronously. The function answers with a response envelope
//! whose `body` carries the GraphQL payload.

use super::envelope::{CapabilityPolicy, GraphqlRequest, Identity, RequestEnvelope, ResponseEnvelope};
use super::error::{AppStoreError, Result};
use super::http::sanitize_for_log;
use super::transport::GraphqlTransport;
use async_trait::async_trait;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use std::fmt;

/// Function name plus optional alias/version qualifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub name: String,
    pub qualifier: Option<String>,
}

impl FunctionRef {
    pub fn new(name: impl Into<String>, qualifier: Option<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: qualifier.filter(|q| !q.is_empty()),
        }
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}:{}", self.name, qualifier),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Clone)]
pub struct LambdaTransport {
    client: aws_sdk_lambda::Client,
    function: FunctionRef,
    identity: Identity,
}

impl LambdaTransport {
    pub fn new(client: aws_sdk_lambda::Client, function: FunctionRef, identity: Identity) -> Self {
        Self {
            client,
            function,
            identity,
        }
    }
}

/// Unwrap the function's response envelope into the GraphQL payload
pub(crate) fn unwrap_envelope(payload: &[u8]) -> Result<String> {
    let envelope = ResponseEnvelope::from_slice(payload)?;
    if !envelope.is_success() {
        tracing::error!(
            "Function answered {:?} - {}",
            envelope.status_code,
            sanitize_for_log(&envelope.body)
        );
        return Err(AppStoreError::Invocation(format!(
            "function answered with status {}",
            envelope.status_code.unwrap_or_default()
        )));
    }
    Ok(envelope.body)
}

#[async_trait]
impl GraphqlTransport for LambdaTransport {
    async fn execute(&self, request: &GraphqlRequest, policy: CapabilityPolicy) -> Result<String> {
        tracing::debug!("INVOKE {} ({})", self.function, request.operation_name);

        let payload = RequestEnvelope::new(request, &self.identity, policy)?.to_vec()?;

        let output = self
            .client
            .invoke()
            .function_name(&self.function.name)
            .set_qualifier(self.function.qualifier.clone())
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| AppStoreError::Invocation(DisplayErrorContext(&e).to_string()))?;

        let body = output.payload().map(|blob| blob.as_ref()).unwrap_or_default();

        if let Some(kind) = output.function_error() {
            let detail = String::from_utf8_lossy(body);
            tracing::error!("Function error {}: {}", kind, sanitize_for_log(&detail));
            return Err(AppStoreError::Invocation(format!(
                "function {} raised {}",
                self.function, kind
            )));
        }

        unwrap_envelope(body)
    }

    fn describe(&self) -> String {
        format!("lambda {}", self.function)
    }
}
