//! Direct GraphQL-over-HTTP transport

use super::envelope::{request_headers, CapabilityPolicy, GraphqlRequest, Identity};
use super::error::{AppStoreError, Result};
use super::transport::GraphqlTransport;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize a response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Posts GraphQL requests straight to the service endpoint
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    identity: Identity,
}

impl HttpTransport {
    pub fn new(endpoint: Url, identity: Identity) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("appstore-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppStoreError::Invocation(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            identity,
        })
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn execute(&self, request: &GraphqlRequest, policy: CapabilityPolicy) -> Result<String> {
        tracing::debug!("POST {} ({})", self.endpoint, request.operation_name);

        let body = serde_json::to_vec(request).map_err(AppStoreError::Encode)?;
        let mut builder = self.client.post(self.endpoint.clone()).body(body);
        for (name, value) in request_headers(&self.identity, policy) {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppStoreError::Invocation(format!("failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppStoreError::Invocation(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(AppStoreError::Invocation(format!(
                "API request failed: {}",
                status
            )));
        }

        Ok(body)
    }

    fn describe(&self) -> String {
        format!("http {}", self.endpoint)
    }
}
