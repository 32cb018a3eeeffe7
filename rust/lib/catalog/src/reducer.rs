//! Pure reducer: `(state, action) -> state`.
//!
//! Fencing rules for completions:
//! - a completion whose ticket epoch is not the current epoch is dropped
//!   (the session it belonged to is gone);
//! - a list result is applied only if it answers the latest list request
//!   and was issued after the last reconciled create/delete.

use tracing::warn;

use crate::action::Action;
use crate::model::DraftForm;
use crate::state::{CatalogState, Ticket};

pub fn reduce(state: &CatalogState, action: Action) -> CatalogState {
    if let Some(ticket) = action.ticket() {
        if ticket.epoch != state.epoch {
            warn!(ticket = ticket.id, epoch = ticket.epoch, current = state.epoch, "dropping stale action");
            return state.clone();
        }
    }

    let mut next = state.clone();
    match action {
        Action::SessionEstablished(session) => {
            let refresh = state.session.as_ref().is_some_and(|cur| cur.same_user(&session));
            if !refresh {
                next = CatalogState {
                    epoch: state.epoch + 1,
                    next_ticket: state.next_ticket,
                    ..CatalogState::new()
                };
            }
            next.session = Some(session);
        }
        Action::SessionCleared => {
            next = CatalogState {
                epoch: state.epoch + 1,
                next_ticket: state.next_ticket,
                ..CatalogState::new()
            };
        }

        Action::DraftEdited { field, value } => next.draft.set(field, value),
        Action::DraftReplaced(draft) => next.draft = draft,
        Action::ErrorDismissed => next.error = None,
        Action::Refused(message) => next.error = Some(message),

        Action::LoadStarted(ticket) => {
            issue(&mut next, ticket);
            next.loading = true;
            next.pending_load = Some(ticket.id);
        }
        Action::LoadSucceeded { ticket, movies } => {
            if state.pending_load != Some(ticket.id) {
                warn!(ticket = ticket.id, "dropping superseded list result");
                return next;
            }
            next.loading = false;
            next.pending_load = None;
            if ticket.id < state.reconciled_before {
                warn!(ticket = ticket.id, "dropping list result older than last change");
            } else {
                next.movies = movies;
            }
        }
        Action::LoadFailed { ticket, message } => {
            if state.pending_load != Some(ticket.id) {
                return next;
            }
            next.loading = false;
            next.pending_load = None;
            next.error = Some(message);
        }

        Action::CreateStarted(ticket) => {
            issue(&mut next, ticket);
            next.submitting = true;
        }
        Action::CreateSucceeded { movie, .. } => {
            next.submitting = false;
            next.movies.insert(0, movie);
            next.draft = DraftForm::default();
            next.reconciled_before = next.next_ticket;
        }
        Action::CreateFailed { message, .. } => {
            next.submitting = false;
            next.error = Some(message);
        }

        Action::DeleteStarted { ticket, id } => {
            issue(&mut next, ticket);
            next.deleting.push(id);
        }
        Action::DeleteSucceeded { id, .. } => {
            next.deleting.retain(|d| d != &id);
            next.movies.retain(|m| m.id != id);
            next.reconciled_before = next.next_ticket;
        }
        Action::DeleteFailed { id, message, .. } => {
            next.deleting.retain(|d| d != &id);
            next.error = Some(message);
        }
    }
    next
}

/// Common bookkeeping for a started request.
fn issue(state: &mut CatalogState, ticket: Ticket) {
    state.next_ticket = state.next_ticket.max(ticket.id + 1);
    state.error = None;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{DraftField, MovieId, MovieRecord};
    use crate::session::Session;
    use crate::session::tests::token_with;

    fn movie(id: &str, name: &str) -> MovieRecord {
        MovieRecord {
            id: MovieId::new(id),
            name: name.into(),
            description: String::new(),
            rating: Some(3),
            director: "someone".into(),
        }
    }

    fn session(sub: &str) -> Arc<Session> {
        Arc::new(Session::from_token(token_with(serde_json::json!({"sub": sub}))).unwrap())
    }

    fn signed_in() -> CatalogState {
        reduce(&CatalogState::new(), Action::SessionEstablished(session("u1")))
    }

    fn apply(state: CatalogState, actions: Vec<Action>) -> CatalogState {
        actions.into_iter().fold(state, |s, a| reduce(&s, a))
    }

    #[test]
    fn session_established_bumps_epoch() {
        let state = signed_in();
        assert!(state.is_authenticated());
        assert_eq!(state.epoch, 1);
    }

    #[test]
    fn token_refresh_keeps_collection_and_epoch() {
        let state = signed_in();
        let t = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t),
            Action::LoadSucceeded { ticket: t, movies: vec![movie("1", "Dune")] },
            Action::SessionEstablished(session("u1")),
        ]);
        assert_eq!(state.epoch, 1);
        assert_eq!(state.movies.len(), 1);

        let state = reduce(&state, Action::SessionEstablished(session("u2")));
        assert_eq!(state.epoch, 2);
        assert!(state.movies.is_empty());
    }

    #[test]
    fn load_replaces_collection_exactly() {
        let state = signed_in();
        let t = state.ticket();
        let state = reduce(&state, Action::LoadStarted(t));
        assert!(state.loading);

        let movies = vec![movie("1", "Dune"), movie("2", "Alien")];
        let state = reduce(&state, Action::LoadSucceeded { ticket: t, movies: movies.clone() });
        assert!(!state.loading);
        assert_eq!(state.movies, movies);
    }

    #[test]
    fn load_failure_keeps_prior_collection() {
        let state = signed_in();
        let t1 = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t1),
            Action::LoadSucceeded { ticket: t1, movies: vec![movie("1", "Dune")] },
        ]);
        let t2 = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t2),
            Action::LoadFailed { ticket: t2, message: "HTTP 500".into() },
        ]);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("HTTP 500"));
        assert_eq!(state.movies, vec![movie("1", "Dune")]);
    }

    #[test]
    fn older_load_cannot_overwrite_newer() {
        let state = signed_in();
        let t1 = state.ticket();
        let state = reduce(&state, Action::LoadStarted(t1));
        let t2 = state.ticket();
        assert!(t2.id > t1.id);
        let state = apply(state, vec![
            Action::LoadStarted(t2),
            Action::LoadSucceeded { ticket: t2, movies: vec![movie("2", "new")] },
            Action::LoadSucceeded { ticket: t1, movies: vec![movie("1", "old")] },
        ]);
        assert_eq!(state.movies, vec![movie("2", "new")]);
        assert!(!state.loading);
    }

    #[test]
    fn load_issued_before_delete_cannot_resurrect() {
        let state = signed_in();
        let t0 = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t0),
            Action::LoadSucceeded { ticket: t0, movies: vec![movie("1", "Dune"), movie("2", "Alien")] },
        ]);

        let load = state.ticket();
        let state = reduce(&state, Action::LoadStarted(load));
        let del = state.ticket();
        let id = MovieId::new("1");
        let state = apply(state, vec![
            Action::DeleteStarted { ticket: del, id: id.clone() },
            Action::DeleteSucceeded { ticket: del, id: id.clone() },
            // The list request raced the delete and still contains "1".
            Action::LoadSucceeded { ticket: load, movies: vec![movie("1", "Dune"), movie("2", "Alien")] },
        ]);
        assert_eq!(state.movies, vec![movie("2", "Alien")]);
        assert!(!state.loading);
    }

    #[test]
    fn stale_epoch_completion_is_dropped() {
        let state = signed_in();
        let t = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t),
            Action::SessionCleared,
            Action::SessionEstablished(session("u1")),
        ]);
        let after = reduce(&state, Action::LoadSucceeded { ticket: t, movies: vec![movie("1", "Dune")] });
        assert_eq!(after, state);
        assert!(after.movies.is_empty());
    }

    #[test]
    fn stale_epoch_create_and_delete_are_dropped() {
        let state = signed_in();
        let t0 = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t0),
            Action::LoadSucceeded { ticket: t0, movies: vec![movie("1", "Dune")] },
        ]);
        let create = state.ticket();
        let state = reduce(&state, Action::CreateStarted(create));
        let del = state.ticket();
        let id = MovieId::new("1");
        let state = apply(state, vec![
            Action::DeleteStarted { ticket: del, id: id.clone() },
            Action::SessionCleared,
            Action::SessionEstablished(session("u1")),
        ]);
        let t = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t),
            Action::LoadSucceeded { ticket: t, movies: vec![movie("1", "Dune")] },
        ]);

        let after = apply(state.clone(), vec![
            Action::CreateSucceeded { ticket: create, movie: movie("9", "Ghost") },
            Action::DeleteSucceeded { ticket: del, id },
        ]);
        assert_eq!(after, state);
        assert_eq!(after.movies, vec![movie("1", "Dune")]);
        assert!(!after.submitting);
        assert!(after.deleting.is_empty());
    }

    #[test]
    fn create_success_prepends_and_clears_draft() {
        let state = signed_in();
        let t0 = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t0),
            Action::LoadSucceeded { ticket: t0, movies: vec![movie("1", "Dune")] },
            Action::DraftEdited { field: DraftField::Name, value: "Alien".into() },
        ]);
        let t = state.ticket();
        let state = reduce(&state, Action::CreateStarted(t));
        assert!(state.submitting);
        let state = reduce(&state, Action::CreateSucceeded { ticket: t, movie: movie("2", "Alien") });
        assert!(!state.submitting);
        assert_eq!(state.movies[0], movie("2", "Alien"));
        assert_eq!(state.movies.len(), 2);
        assert!(state.draft.is_empty());
    }

    #[test]
    fn create_failure_preserves_draft() {
        let state = apply(signed_in(), vec![
            Action::DraftEdited { field: DraftField::Name, value: "Alien".into() },
            Action::DraftEdited { field: DraftField::Rating, value: "4".into() },
        ]);
        let draft = state.draft.clone();
        let t = state.ticket();
        let state = apply(state, vec![
            Action::CreateStarted(t),
            Action::CreateFailed { ticket: t, message: "HTTP 400 bad".into() },
        ]);
        assert_eq!(state.draft, draft);
        assert_eq!(state.error.as_deref(), Some("HTTP 400 bad"));
    }

    #[test]
    fn delete_removes_only_that_id() {
        let state = signed_in();
        let t0 = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t0),
            Action::LoadSucceeded { ticket: t0, movies: vec![movie("1", "a"), movie("2", "b"), movie("3", "c")] },
        ]);
        let t = state.ticket();
        let id = MovieId::new("2");
        let state = reduce(&state, Action::DeleteStarted { ticket: t, id: id.clone() });
        assert_eq!(state.deleting, vec![id.clone()]);
        let state = reduce(&state, Action::DeleteSucceeded { ticket: t, id });
        assert!(state.deleting.is_empty());
        assert_eq!(state.movies, vec![movie("1", "a"), movie("3", "c")]);
    }

    #[test]
    fn delete_failure_keeps_collection() {
        let state = signed_in();
        let t0 = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t0),
            Action::LoadSucceeded { ticket: t0, movies: vec![movie("1", "a")] },
        ]);
        let t = state.ticket();
        let id = MovieId::new("1");
        let state = apply(state, vec![
            Action::DeleteStarted { ticket: t, id: id.clone() },
            Action::DeleteFailed { ticket: t, id, message: "HTTP 403".into() },
        ]);
        assert_eq!(state.movies, vec![movie("1", "a")]);
        assert_eq!(state.error.as_deref(), Some("HTTP 403"));
    }

    #[test]
    fn starting_an_operation_clears_the_banner() {
        let state = reduce(&signed_in(), Action::Refused("nope".into()));
        assert_eq!(state.error.as_deref(), Some("nope"));
        let t = state.ticket();
        let state = reduce(&state, Action::LoadStarted(t));
        assert!(state.error.is_none());
    }

    #[test]
    fn logout_clears_everything() {
        let state = signed_in();
        let t = state.ticket();
        let state = apply(state, vec![
            Action::LoadStarted(t),
            Action::LoadSucceeded { ticket: t, movies: vec![movie("1", "a")] },
            Action::DraftEdited { field: DraftField::Name, value: "x".into() },
            Action::Refused("err".into()),
            Action::SessionCleared,
        ]);
        assert!(!state.is_authenticated());
        assert!(state.movies.is_empty());
        assert!(state.draft.is_empty());
        assert!(state.error.is_none());
        assert_eq!(state.next_ticket, t.id + 1);
    }
}
