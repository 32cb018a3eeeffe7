//! REST seam between the view and the backend.

use std::sync::Arc;

use filmes_client::{ApiError, ListPayload, ResourceClient, TokenSource};

use crate::model::{MovieId, MovieRecord, NewMovie};
use crate::store::CatalogStore;

/// Backend operations the view needs.
///
/// Implemented by `ResourceClient<MovieRecord>` for the real backend;
/// tests plug in fakes.
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync + 'static {
    async fn list(&self) -> Result<ListPayload<MovieRecord>, ApiError>;
    async fn create(&self, movie: &NewMovie) -> Result<MovieRecord, ApiError>;
    async fn delete(&self, id: &MovieId) -> Result<(), ApiError>;
}

#[async_trait::async_trait]
impl CatalogApi for ResourceClient<MovieRecord> {
    async fn list(&self) -> Result<ListPayload<MovieRecord>, ApiError> {
        ResourceClient::list(self).await
    }

    async fn create(&self, movie: &NewMovie) -> Result<MovieRecord, ApiError> {
        ResourceClient::create(self, movie).await
    }

    async fn delete(&self, id: &MovieId) -> Result<(), ApiError> {
        ResourceClient::delete(self, id.as_str()).await
    }
}

/// Token source that reads the bearer token of the store's current session.
///
/// The token is whatever the session collaborator last established; a
/// refreshed session is picked up by the next request.
pub struct SessionToken {
    store: Arc<CatalogStore>,
}

impl SessionToken {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl TokenSource for SessionToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        match &self.store.state().session {
            Some(session) => Ok(Some(session.token().to_string())),
            None => Err(ApiError::Auth("no session".into())),
        }
    }
}

/// HTTP client for `{base_url}/filmes`, authenticated from `store`'s session.
pub fn movie_client(base_url: impl Into<String>, store: Arc<CatalogStore>) -> ResourceClient<MovieRecord> {
    ResourceClient::new(base_url, Arc::new(SessionToken::new(store)))
}
