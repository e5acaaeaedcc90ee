//! In-memory stand-in for the app-store GraphQL service

#![allow(dead_code)]

use appstore_provider::appstore::{
    AppStoreClient, AppStoreError, CapabilityPolicy, GraphqlRequest, GraphqlTransport, Result,
};
use appstore_provider::resource::{AppletConfig, AppletResource};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct State {
    listings: HashMap<String, Value>,
    next_ids: VecDeque<String>,
    counter: usize,
    calls: Vec<(String, CapabilityPolicy)>,
    fail_with: Option<String>,
    fail_reads_with: Option<String>,
    hide_listings: bool,
    reject_deletes: bool,
    error_on_missing_delete: bool,
}

/// Interprets the connector's four operations against a map of listings and
/// enforces the capability policy the way the real service does
#[derive(Default)]
pub struct InMemoryAppStore {
    state: Mutex<State>,
}

impl InMemoryAppStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hand out this id on the next create
    pub fn assign_next_id(&self, id: &str) {
        self.state.lock().unwrap().next_ids.push_back(id.to_string());
    }

    /// Fail every subsequent call at the transport level
    pub fn fail_transport(&self, message: &str) {
        self.state.lock().unwrap().fail_with = Some(message.to_string());
    }

    /// Fail every subsequent read at the transport level; writes still land
    pub fn fail_reads(&self, message: &str) {
        self.state.lock().unwrap().fail_reads_with = Some(message.to_string());
    }

    /// Answer every read with a null `app`, as if nothing were stored
    pub fn hide_listings(&self) {
        self.state.lock().unwrap().hide_listings = true;
    }

    /// Answer deletes of unknown ids with GraphQL errors and no data
    pub fn error_on_missing_delete(&self) {
        self.state.lock().unwrap().error_on_missing_delete = true;
    }

    /// Answer `false` to deletes of listings that exist
    pub fn reject_deletes(&self) {
        self.state.lock().unwrap().reject_deletes = true;
    }

    pub fn remove_behind_our_back(&self, id: &str) {
        self.state.lock().unwrap().listings.remove(id);
    }

    pub fn stored(&self, id: &str) -> Option<Value> {
        self.state.lock().unwrap().listings.get(id).cloned()
    }

    pub fn calls(&self) -> Vec<(String, CapabilityPolicy)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn client(self: &Arc<Self>) -> AppStoreClient {
        AppStoreClient::new(self.clone(), "LX")
    }

    pub fn resource(self: &Arc<Self>) -> AppletResource {
        AppletResource::new(self.client())
    }

    fn answer(state: &mut State, request: &GraphqlRequest, policy: CapabilityPolicy) -> Value {
        let vars = &request.variables;
        let id = vars["id"].as_str().unwrap_or_default().to_string();

        match request.operation_name {
            "GetAppStoreListing" => match state.listings.get(&id) {
                Some(listing) if !state.hide_listings => json!({"data": {"app": listing}}),
                _ => json!({
                    "data": {"app": null},
                    "errors": [{"message": format!("App {} not found", id)}]
                }),
            },
            "CreateAppStoreListing" => {
                if !policy.create_data {
                    return forbidden("createData");
                }
                let id = state.next_ids.pop_front().unwrap_or_else(|| {
                    state.counter += 1;
                    format!("app-{}", state.counter)
                });
                state.listings.insert(id.clone(), vars["input"].clone());
                json!({"data": {"createWebApp": {"id": id}}})
            }
            "EditAppStoreListing" => {
                if !policy.update_data {
                    return forbidden("updateData");
                }
                let edited = match state.listings.get_mut(&id) {
                    Some(listing) => {
                        let product = listing["product"].clone();
                        *listing = vars["edits"].clone();
                        listing["product"] = product;
                        true
                    }
                    None => false,
                };
                json!({"data": {"editWebApp": edited}})
            }
            "DeleteAppStoreListing" => {
                if !policy.delete_data {
                    return forbidden("deleteData");
                }
                if state.error_on_missing_delete && !state.listings.contains_key(&id) {
                    return json!({
                        "data": null,
                        "errors": [{"message": format!("App {} not found", id)}]
                    });
                }
                let deleted = !state.reject_deletes && state.listings.remove(&id).is_some();
                json!({"data": {"deleteWebApp": deleted}})
            }
            other => json!({"errors": [{"message": format!("unknown operation {}", other)}]}),
        }
    }
}

fn forbidden(rule: &str) -> Value {
    json!({"data": null, "errors": [{"message": format!("policy does not grant {}", rule)}]})
}

#[async_trait]
impl GraphqlTransport for InMemoryAppStore {
    async fn execute(&self, request: &GraphqlRequest, policy: CapabilityPolicy) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push((request.operation_name.to_string(), policy));

        if let Some(message) = &state.fail_with {
            return Err(AppStoreError::Invocation(message.clone()));
        }
        if request.operation_name == "GetAppStoreListing" {
            if let Some(message) = &state.fail_reads_with {
                return Err(AppStoreError::Invocation(message.clone()));
            }
        }

        Ok(Self::answer(&mut state, request, policy).to_string())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

pub fn demo_config() -> AppletConfig {
    AppletConfig {
        name: "Demo".to_string(),
        description: "A demo app".to_string(),
        author_display: "Acme".to_string(),
        image: "https://img/demo.png".to_string(),
        url: "https://demo.acme.com".to_string(),
    }
}
