//! App Store Client
//!
//! Typed CRUD calls for app-store listings. Each call is one GraphQL round
//! trip through a [`GraphqlTransport`], decoded in a single serde step.

use super::auth::{lambda_client, AwsSettings};
use super::envelope::{join_errors, GraphqlRequest, GraphqlResponse, Identity, Operation};
use super::error::{AppStoreError, Layer, Mutation, Result};
use super::http::HttpTransport;
use super::lambda::{FunctionRef, LambdaTransport};
use super::queries::{
    CREATE_APP_STORE_LISTING, DELETE_APP_STORE_LISTING, EDIT_APP_STORE_LISTING,
    GET_APP_STORE_LISTING,
};
use super::transport::GraphqlTransport;
use crate::config::{Config, TransportKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// An app-store web-app listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub name: String,
    pub description: String,
    pub author_display: String,
    pub image: String,
    /// Only web applications carry a URL
    #[serde(default)]
    pub url: String,
}

#[derive(Serialize)]
struct CreateInput<'a> {
    #[serde(flatten)]
    listing: &'a Listing,
    product: &'a str,
}

/// Main app-store client
#[derive(Clone)]
pub struct AppStoreClient {
    transport: Arc<dyn GraphqlTransport>,
    product: String,
}

impl AppStoreClient {
    pub fn new(transport: Arc<dyn GraphqlTransport>, product: impl Into<String>) -> Self {
        Self {
            transport,
            product: product.into(),
        }
    }

    /// Create a client with the transport selected by the configuration
    pub async fn connect(config: &Config) -> Result<Self> {
        let identity = Identity {
            account: config.account.clone(),
            user: config.user.clone(),
        };

        let transport: Arc<dyn GraphqlTransport> = match config.transport {
            TransportKind::Lambda => {
                let settings = AwsSettings {
                    profile: config.profile.clone(),
                    region: config.region.clone(),
                    endpoint_url: config
                        .lambda_endpoint
                        .as_ref()
                        .map(|u| u.as_str().trim_end_matches('/').to_string()),
                };
                let function = FunctionRef::new(&config.function_name, config.function_qualifier.clone());
                Arc::new(LambdaTransport::new(lambda_client(&settings).await, function, identity))
            }
            TransportKind::Http => {
                let Some(endpoint) = config.graphql_endpoint.clone() else {
                    return Err(AppStoreError::Invocation(
                        "the http transport needs a GraphQL endpoint".to_string(),
                    ));
                };
                Arc::new(HttpTransport::new(endpoint, identity)?)
            }
        };

        tracing::info!("App store client using {}", transport.describe());
        Ok(Self::new(transport, config.product.clone()))
    }

    /// Send one GraphQL request and decode its `data`
    async fn gql<T: DeserializeOwned>(
        &self,
        operation: Operation,
        operation_name: &'static str,
        query: &'static str,
        variables: Value,
    ) -> Result<T> {
        let request = GraphqlRequest {
            query,
            operation_name,
            variables,
        };

        let raw = self.transport.execute(&request, operation.policy()).await?;
        let response: GraphqlResponse<T> =
            serde_json::from_str(&raw).map_err(|e| AppStoreError::decode(Layer::Graphql, e))?;

        if !response.errors.is_empty() {
            tracing::debug!("{} reported errors: {}", operation_name, join_errors(&response.errors));
        }

        match response.data {
            Some(data) => Ok(data),
            None if response.errors.is_empty() => Err(AppStoreError::Graphql(format!(
                "{} returned no data",
                operation_name
            ))),
            None => Err(AppStoreError::Graphql(join_errors(&response.errors))),
        }
    }

    /// Fetch a listing by id
    pub async fn get(&self, id: &str) -> Result<Listing> {
        #[derive(Deserialize)]
        struct Data {
            app: Option<Listing>,
        }

        let data: Data = self
            .gql(
                Operation::Get,
                "GetAppStoreListing",
                GET_APP_STORE_LISTING,
                json!({ "id": id }),
            )
            .await?;

        data.app.ok_or_else(|| AppStoreError::NotFound(id.to_string()))
    }

    /// Create a listing, returning the id the backend assigned
    pub async fn create(&self, listing: &Listing) -> Result<String> {
        #[derive(Deserialize)]
        struct Created {
            #[serde(default)]
            id: String,
        }
        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "createWebApp")]
            create_web_app: Option<Created>,
        }

        let input = CreateInput {
            listing,
            product: &self.product,
        };
        let variables = json!({
            "input": serde_json::to_value(&input).map_err(AppStoreError::Encode)?
        });

        let data: Data = self
            .gql(
                Operation::Create,
                "CreateAppStoreListing",
                CREATE_APP_STORE_LISTING,
                variables,
            )
            .await?;

        match data.create_web_app {
            Some(created) if !created.id.is_empty() => Ok(created.id),
            _ => Err(AppStoreError::Graphql(
                "createWebApp returned no id".to_string(),
            )),
        }
    }

    /// Replace every field of a listing
    pub async fn update(&self, id: &str, listing: &Listing) -> Result<()> {
        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "editWebApp")]
            edit_web_app: Option<bool>,
        }

        let variables = json!({
            "id": id,
            "edits": serde_json::to_value(listing).map_err(AppStoreError::Encode)?,
        });

        let data: Data = self
            .gql(
                Operation::Edit,
                "EditAppStoreListing",
                EDIT_APP_STORE_LISTING,
                variables,
            )
            .await?;

        if data.edit_web_app != Some(true) {
            return Err(AppStoreError::NotFoundOrFailed {
                mutation: Mutation::Edit,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Delete a listing
    pub async fn delete(&self, id: &str) -> Result<()> {
        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "deleteWebApp")]
            delete_web_app: Option<bool>,
        }

        let data: Data = self
            .gql(
                Operation::Delete,
                "DeleteAppStoreListing",
                DELETE_APP_STORE_LISTING,
                json!({ "id": id }),
            )
            .await?;

        if data.delete_web_app != Some(true) {
            return Err(AppStoreError::NotFoundOrFailed {
                mutation: Mutation::Delete,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
