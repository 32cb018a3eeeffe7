//! Filmes catalog view, the state engine for the movie catalog client.
//!
//! Rust owns all state and logic; the front end (the `filmes` CLI) only
//! renders what the store holds.
//!
//! # Pieces
//!
//! - [`CatalogState`]: immutable view state record
//! - [`reduce`]: pure `(state, action) -> state`
//! - [`CatalogStore`]: current state + ticket minting + subscriptions
//! - [`CatalogView`]: the operations (load, create, delete, session)
//! - [`CatalogApi`]: REST seam, implemented by `ResourceClient<MovieRecord>`
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(CatalogStore::new());
//! let api = movie_client("http://localhost:8080", store.clone());
//! let view = CatalogView::new(store.clone(), Arc::new(api));
//!
//! view.establish_session(Session::from_token(&token)?);
//! view.load_all().await?;
//! println!("{}", render::render(&view.state()));
//! ```

pub mod action;
pub mod api;
pub mod error;
pub mod model;
pub mod reducer;
pub mod render;
pub mod session;
pub mod state;
pub mod store;
pub mod view;

pub use action::Action;
pub use api::{CatalogApi, SessionToken, movie_client};
pub use error::CatalogError;
pub use model::{DraftField, DraftForm, MovieId, MovieRecord, NewMovie};
pub use reducer::reduce;
pub use session::{Claims, PermissionSet, Session, UserProfile};
pub use state::{CatalogState, Ticket, ViewStatus};
pub use store::{CatalogStore, SubscriptionId};
pub use view::{AlwaysConfirm, CatalogView, Confirm};
