//! Catalog view state.
//!
//! One immutable record. The reducer produces a new one per action; the
//! UI reads it to decide what to show.

use std::sync::Arc;

use crate::model::{DraftForm, MovieId, MovieRecord};
use crate::session::Session;

/// What the authenticated view is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Loading,
    Error,
}

/// Request fence handed out when an operation starts.
///
/// `id` orders requests; `epoch` names the session they belong to. A
/// completion is only applied while its epoch is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub id: u64,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    pub session: Option<Arc<Session>>,
    /// Exactly the last applied list result, reconciled with creates/deletes.
    pub movies: Vec<MovieRecord>,
    /// A list request is in flight.
    pub loading: bool,
    /// A create request is in flight.
    pub submitting: bool,
    /// Deletes in flight.
    pub deleting: Vec<MovieId>,
    /// Error banner; cleared when the next operation starts.
    pub error: Option<String>,
    pub draft: DraftForm,

    /// Bumped whenever the session changes hands.
    pub epoch: u64,
    /// Next ticket id to hand out.
    pub next_ticket: u64,
    /// The latest list request still in flight.
    pub pending_load: Option<u64>,
    /// List requests issued before this ticket id predate the last
    /// reconciled create/delete and are not applied.
    pub reconciled_before: u64,
}

impl CatalogState {
    pub fn new() -> Self {
        Self {
            session: None,
            movies: Vec::new(),
            loading: false,
            submitting: false,
            deleting: Vec::new(),
            error: None,
            draft: DraftForm::default(),
            epoch: 0,
            next_ticket: 1,
            pending_load: None,
            reconciled_before: 0,
        }
    }

    pub fn status(&self) -> ViewStatus {
        if self.loading {
            ViewStatus::Loading
        } else if self.error.is_some() {
            ViewStatus::Error
        } else {
            ViewStatus::Idle
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the delete affordance is shown.
    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_admin())
    }

    /// The ticket the next operation will get.
    pub fn ticket(&self) -> Ticket {
        Ticket { id: self.next_ticket, epoch: self.epoch }
    }

    pub fn movie(&self, id: &MovieId) -> Option<&MovieRecord> {
        self.movies.iter().find(|m| &m.id == id)
    }
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new()
    }
}
