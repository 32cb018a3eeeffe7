//! Actions fed to the reducer.
//!
//! Network operations come in pairs: a `*Started` carrying the ticket the
//! store minted, and a completion carrying the same ticket back.

use std::sync::Arc;

use crate::model::{DraftField, DraftForm, MovieId, MovieRecord};
use crate::session::Session;
use crate::state::Ticket;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SessionEstablished(Arc<Session>),
    SessionCleared,

    DraftEdited { field: DraftField, value: String },
    DraftReplaced(DraftForm),
    ErrorDismissed,
    /// An operation was refused locally; nothing was sent.
    Refused(String),

    LoadStarted(Ticket),
    LoadSucceeded { ticket: Ticket, movies: Vec<MovieRecord> },
    LoadFailed { ticket: Ticket, message: String },

    CreateStarted(Ticket),
    CreateSucceeded { ticket: Ticket, movie: MovieRecord },
    CreateFailed { ticket: Ticket, message: String },

    DeleteStarted { ticket: Ticket, id: MovieId },
    DeleteSucceeded { ticket: Ticket, id: MovieId },
    DeleteFailed { ticket: Ticket, id: MovieId, message: String },
}

impl Action {
    /// The ticket a network action carries, if any.
    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            Action::LoadStarted(t) | Action::CreateStarted(t) => Some(*t),
            Action::LoadSucceeded { ticket, .. }
            | Action::LoadFailed { ticket, .. }
            | Action::CreateSucceeded { ticket, .. }
            | Action::CreateFailed { ticket, .. }
            | Action::DeleteStarted { ticket, .. }
            | Action::DeleteSucceeded { ticket, .. }
            | Action::DeleteFailed { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }
}
