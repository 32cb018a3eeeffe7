//! Catalog view operations.
//!
//! Each operation follows the same shape: refuse locally if it cannot run,
//! mint a ticket (`*Started`), await the backend, then dispatch the
//! completion carrying the same ticket. The reducer decides whether the
//! completion still applies.
//!
//! Errors are stored as the banner and also returned, so a one-shot caller
//! can map them to an exit status. None of them leave the view stuck.

use std::sync::Arc;

use tracing::{debug, info};

use crate::action::Action;
use crate::api::CatalogApi;
use crate::error::CatalogError;
use crate::model::{DraftField, DraftForm, MovieId, MovieRecord};
use crate::session::Session;
use crate::state::CatalogState;
use crate::store::CatalogStore;

/// Interactive confirmation before destructive operations.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything (`--yes`).
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

pub struct CatalogView {
    store: Arc<CatalogStore>,
    api: Arc<dyn CatalogApi>,
}

impl CatalogView {
    pub fn new(store: Arc<CatalogStore>, api: Arc<dyn CatalogApi>) -> Self {
        Self { store, api }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub fn state(&self) -> Arc<CatalogState> {
        self.store.state()
    }

    // ── Session ─────────────────────────────────────────────────────

    pub fn establish_session(&self, session: Session) {
        info!(user = %session.profile().name, admin = session.is_admin(), "session established");
        self.store.dispatch(Action::SessionEstablished(Arc::new(session)));
    }

    pub fn clear_session(&self) {
        info!("session cleared");
        self.store.dispatch(Action::SessionCleared);
    }

    // ── Form ────────────────────────────────────────────────────────

    pub fn edit_draft(&self, field: DraftField, value: impl Into<String>) {
        self.store.dispatch(Action::DraftEdited { field, value: value.into() });
    }

    pub fn replace_draft(&self, draft: DraftForm) {
        self.store.dispatch(Action::DraftReplaced(draft));
    }

    pub fn dismiss_error(&self) {
        self.store.dispatch(Action::ErrorDismissed);
    }

    fn refuse(&self, err: CatalogError) -> CatalogError {
        self.store.dispatch(Action::Refused(err.to_string()));
        err
    }

    fn require_session(&self) -> Result<Arc<CatalogState>, CatalogError> {
        let state = self.store.state();
        if !state.is_authenticated() {
            return Err(self.refuse(CatalogError::Unauthenticated("sign in first".into())));
        }
        Ok(state)
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Fetch the whole collection, replacing what is displayed.
    pub async fn load_all(&self) -> Result<(), CatalogError> {
        self.require_session()?;
        let ticket = self.store.begin(Action::LoadStarted);
        debug!(ticket = ticket.id, "loading catalog");

        match self.api.list().await {
            Ok(payload) => {
                let movies = payload.into_items();
                debug!(ticket = ticket.id, count = movies.len(), "catalog loaded");
                let state = self.store.dispatch(Action::LoadSucceeded { ticket, movies });
                if ticket.id < state.reconciled_before {
                    info!(
                        ticket = ticket.id,
                        "reload overtaken by a change made meanwhile, keeping the updated list"
                    );
                }
                Ok(())
            }
            Err(e) => {
                let err = CatalogError::from(e);
                self.store.dispatch(Action::LoadFailed {
                    ticket,
                    message: format!("failed to load: {}", err),
                });
                Err(err)
            }
        }
    }

    /// Replace the draft with `draft` and submit it.
    pub async fn create(&self, draft: DraftForm) -> Result<MovieRecord, CatalogError> {
        self.replace_draft(draft);
        self.submit().await
    }

    /// Submit the current draft. Validation failures send nothing.
    pub async fn submit(&self) -> Result<MovieRecord, CatalogError> {
        let state = self.require_session()?;
        let body = state.draft.validate().map_err(|e| self.refuse(e))?;

        let ticket = self.store.begin(Action::CreateStarted);
        debug!(ticket = ticket.id, "creating movie");

        match self.api.create(&body).await {
            Ok(movie) => {
                info!(id = %movie.id, name = %movie.name, "movie created");
                self.store.dispatch(Action::CreateSucceeded { ticket, movie: movie.clone() });
                Ok(movie)
            }
            Err(e) => {
                let err = CatalogError::from(e);
                self.store.dispatch(Action::CreateFailed {
                    ticket,
                    message: format!("failed to create: {}", err),
                });
                Err(err)
            }
        }
    }

    /// Delete a displayed record after confirmation.
    ///
    /// Returns `Ok(false)` when the user declines. Only admins get here;
    /// everyone else is refused without a request.
    pub async fn delete(&self, id: &MovieId, confirm: &dyn Confirm) -> Result<bool, CatalogError> {
        let state = self.require_session()?;
        if !state.is_admin() {
            return Err(self.refuse(CatalogError::Forbidden(
                "deleting movies requires admin permission".into(),
            )));
        }
        let Some(movie) = state.movie(id) else {
            return Err(self.refuse(CatalogError::NotFound(format!("movie {} is not in the catalog", id))));
        };

        if !confirm.confirm(&format!("Really delete \"{}\" ({})?", movie.name, id)) {
            debug!(%id, "delete declined");
            return Ok(false);
        }

        let ticket = self.store.begin(|ticket| Action::DeleteStarted { ticket, id: id.clone() });
        debug!(ticket = ticket.id, %id, "deleting movie");

        match self.api.delete(id).await {
            Ok(()) => {
                info!(%id, "movie deleted");
                self.store.dispatch(Action::DeleteSucceeded { ticket, id: id.clone() });
                Ok(true)
            }
            Err(e) => {
                let err = CatalogError::from(e);
                self.store.dispatch(Action::DeleteFailed {
                    ticket,
                    id: id.clone(),
                    message: format!("failed to delete: {}", err),
                });
                Err(err)
            }
        }
    }
}
