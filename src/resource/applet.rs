//! Applet resource
//!
//! Lifecycle operations for the `applet` resource type, translating between
//! typed definitions/state and the app-store client.

use super::registry::{get_resource, AttributeError};
use crate::appstore::{AppStoreClient, AppStoreError, Listing, Mutation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const RESOURCE_TYPE: &str = "applet";

/// Desired state of an applet, as declared by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppletConfig {
    pub name: String,
    pub description: String,
    pub author_display: String,
    pub image: String,
    pub url: String,
}

impl AppletConfig {
    /// Build a config from a generic key/value definition, checking it
    /// against the embedded `applet` schema
    pub fn from_definition(definition: &Value) -> Result<Self, AttributeError> {
        let schema = get_resource(RESOURCE_TYPE)
            .ok_or_else(|| AttributeError::UnknownResource(RESOURCE_TYPE.to_string()))?;
        let mut values = schema.validate(definition)?;
        let mut take = |name: &str| {
            values
                .remove(name)
                .ok_or_else(|| AttributeError::Missing(name.to_string()))
        };

        Ok(Self {
            name: take("name")?,
            description: take("description")?,
            author_display: take("author_display")?,
            image: take("image")?,
            url: take("url")?,
        })
    }

    pub fn to_listing(&self) -> Listing {
        Listing {
            name: self.name.clone(),
            description: self.description.clone(),
            author_display: self.author_display.clone(),
            image: self.image.clone(),
            url: self.url.clone(),
        }
    }
}

/// Observed state of an applet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppletState {
    pub id: String,
    pub name: String,
    pub description: String,
    pub author_display: String,
    pub image: String,
    pub url: String,
}

impl AppletState {
    pub fn from_listing(id: impl Into<String>, listing: Listing) -> Self {
        Self {
            id: id.into(),
            name: listing.name,
            description: listing.description,
            author_display: listing.author_display,
            image: listing.image,
            url: listing.url,
        }
    }

    pub fn config(&self) -> AppletConfig {
        AppletConfig {
            name: self.name.clone(),
            description: self.description.clone(),
            author_display: self.author_display.clone(),
            image: self.image.clone(),
            url: self.url.clone(),
        }
    }
}

/// Result of reading an applet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Present(AppletState),
    /// The listing no longer exists upstream and should be recreated
    Removed,
}

impl ReadOutcome {
    pub fn into_state(self) -> Option<AppletState> {
        match self {
            ReadOutcome::Present(state) => Some(state),
            ReadOutcome::Removed => None,
        }
    }
}

/// Result of deleting an applet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    /// The listing was already gone
    AlreadyAbsent,
}

/// Result of a create or update that the service accepted.
///
/// Once the write is accepted the id is committed upstream, so a failed
/// read-back still hands the id to the caller.
#[derive(Debug)]
pub enum WriteOutcome {
    Applied(AppletState),
    /// Written, but reading it back failed
    Unconfirmed { id: String, reason: AppStoreError },
}

impl WriteOutcome {
    pub fn id(&self) -> &str {
        match self {
            WriteOutcome::Applied(state) => &state.id,
            WriteOutcome::Unconfirmed { id, .. } => id,
        }
    }

    pub fn state(&self) -> Option<&AppletState> {
        match self {
            WriteOutcome::Applied(state) => Some(state),
            WriteOutcome::Unconfirmed { .. } => None,
        }
    }

    pub fn into_state(self) -> Option<AppletState> {
        match self {
            WriteOutcome::Applied(state) => Some(state),
            WriteOutcome::Unconfirmed { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("invalid applet definition: {0}")]
    Definition(#[from] AttributeError),

    #[error(transparent)]
    Remote(#[from] AppStoreError),

    #[error("listing {0} disappeared right after it was written")]
    Vanished(String),

    #[error("cannot import listing {0}: it does not exist")]
    ImportNotFound(String),
}

/// The `applet` resource adapter
#[derive(Clone)]
pub struct AppletResource {
    client: AppStoreClient,
}

impl AppletResource {
    pub fn new(client: AppStoreClient) -> Self {
        Self { client }
    }

    /// Create the listing and read it back
    pub async fn create(&self, config: &AppletConfig) -> Result<WriteOutcome, ResourceError> {
        tracing::info!("Creating applet {:?}", config.name);
        let id = self.client.create(&config.to_listing()).await?;
        tracing::info!("Created applet {}", id);
        self.refresh(id).await
    }

    /// Read the listing; a listing missing upstream is reported as removed
    pub async fn read(&self, id: &str) -> Result<ReadOutcome, ResourceError> {
        tracing::debug!("Reading applet {}", id);
        match self.client.get(id).await {
            Ok(listing) => Ok(ReadOutcome::Present(AppletState::from_listing(id, listing))),
            Err(e) if e.is_not_found() => {
                tracing::info!("Applet {} no longer exists upstream", id);
                Ok(ReadOutcome::Removed)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace every field of the listing and read it back
    pub async fn update(&self, id: &str, config: &AppletConfig) -> Result<WriteOutcome, ResourceError> {
        tracing::info!("Updating applet {}", id);
        self.client.update(id, &config.to_listing()).await?;
        self.refresh(id.to_string()).await
    }

    /// Delete the listing. Deleting a listing that is already gone succeeds.
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, ResourceError> {
        tracing::info!("Deleting applet {}", id);
        let rejection = match self.client.delete(id).await {
            Ok(()) => return Ok(DeleteOutcome::Deleted),
            Err(e @ AppStoreError::NotFoundOrFailed { mutation: Mutation::Delete, .. }) => e,
            Err(e @ AppStoreError::Graphql(_)) => e,
            Err(e) => return Err(e.into()),
        };

        // The backend does not say why it refused, so look the listing up.
        match self.client.get(id).await {
            Err(e) if e.is_not_found() => {
                tracing::warn!("Applet {} was already deleted", id);
                Ok(DeleteOutcome::AlreadyAbsent)
            }
            Ok(_) => Err(rejection.into()),
            Err(lookup) => {
                tracing::debug!("Lookup after rejected delete of {} failed: {}", id, lookup);
                Err(rejection.into())
            }
        }
    }

    /// Adopt an existing listing by id
    pub async fn import(&self, id: &str) -> Result<AppletState, ResourceError> {
        tracing::info!("Importing applet {}", id);
        self.read(id)
            .await?
            .into_state()
            .ok_or_else(|| ResourceError::ImportNotFound(id.to_string()))
    }

    async fn refresh(&self, id: String) -> Result<WriteOutcome, ResourceError> {
        match self.client.get(&id).await {
            Ok(listing) => Ok(WriteOutcome::Applied(AppletState::from_listing(id, listing))),
            Err(e) if e.is_not_found() => Err(ResourceError::Vanished(id)),
            Err(reason) => {
                tracing::warn!("Applet {} was written but could not be read back: {}", id, reason);
                Ok(WriteOutcome::Unconfirmed { id, reason })
            }
        }
    }
}
