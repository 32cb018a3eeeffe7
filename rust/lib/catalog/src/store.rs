use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::action::Action;
use crate::reducer::reduce;
use crate::state::{CatalogState, Ticket};

/// Callback type for state change notifications.
pub type ChangeHandler = Arc<dyn Fn(&CatalogState) + Send + Sync>;

/// Unique handle for a subscription, returned by `CatalogStore::subscribe()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Holder of the current [`CatalogState`].
///
/// - `dispatch(action)` runs the reducer and notifies subscribers if the
///   state changed.
/// - `begin(make)` mints the next [`Ticket`] and dispatches the started
///   action built from it, atomically.
/// - `state()` returns the current snapshot (Arc clone, cheap).
///
/// Subscribers are called synchronously, outside the state lock.
pub struct CatalogStore {
    state: RwLock<Arc<CatalogState>>,
    handlers: RwLock<Vec<(SubscriptionId, ChangeHandler)>>,
    next_id: AtomicU64,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::with_state(CatalogState::new())
    }

    pub fn with_state(state: CatalogState) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Apply an action and return the resulting state.
    pub fn dispatch(&self, action: Action) -> Arc<CatalogState> {
        self.apply(|_| action).1
    }

    /// Mint a ticket and apply the started action for it.
    pub fn begin(&self, make: impl FnOnce(Ticket) -> Action) -> Ticket {
        let mut ticket = None;
        self.apply(|state| {
            let t = state.ticket();
            ticket = Some(t);
            make(t)
        });
        // `apply` always calls the closure.
        ticket.unwrap_or_else(|| self.state().ticket())
    }

    fn apply(&self, make: impl FnOnce(&CatalogState) -> Action) -> (bool, Arc<CatalogState>) {
        let (changed, next) = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let action = make(&guard);
            let next = reduce(&guard, action);
            if next == **guard {
                (false, guard.clone())
            } else {
                *guard = Arc::new(next);
                (true, guard.clone())
            }
        };
        if changed {
            self.notify(&next);
        }
        (changed, next)
    }

    fn notify(&self, state: &CatalogState) {
        let handlers: Vec<ChangeHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(state);
        }
    }

    /// Subscribe to state changes. Returns an id for unsubscribing.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CatalogState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(sid, _)| *sid != id);
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}
