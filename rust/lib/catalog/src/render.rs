//! Text rendering of the catalog view.

use std::fmt::Write;

use crate::model::{DraftField, DraftForm, MovieRecord};
use crate::state::{CatalogState, ViewStatus};

const TITLE: &str = "Filmes catalog";

/// Render the whole view as terminal text.
pub fn render(state: &CatalogState) -> String {
    let mut out = String::new();
    let Some(session) = &state.session else {
        let _ = writeln!(out, "{}", TITLE);
        let _ = writeln!(out, "Sign in to manage movies: run `filmes login`.");
        return out;
    };

    // Header.
    let profile = session.profile();
    let _ = write!(out, "{}", profile.name);
    if let Some(email) = &profile.email {
        let _ = write!(out, " <{}>", email);
    }
    if session.is_admin() {
        let _ = write!(out, "  [Admin]");
    }
    out.push('\n');
    if let Some(picture) = &profile.picture {
        let _ = writeln!(out, "avatar: {}", picture);
    }
    let _ = writeln!(out, "\n{}\n{}", TITLE, "=".repeat(TITLE.len()));

    if let Some(error) = &state.error {
        let _ = writeln!(out, "! {}", error);
    }

    if state.status() == ViewStatus::Loading {
        let _ = writeln!(out, "Loading...");
        return out;
    }
    if state.movies.is_empty() {
        let _ = writeln!(out, "No movies yet. Reload the list or create the first one!");
        return out;
    }

    let admin = session.is_admin();
    for movie in &state.movies {
        out.push('\n');
        out.push_str(&render_card(movie, admin));
    }
    out
}

/// One movie card. The delete hint is only shown to admins.
pub fn render_card(movie: &MovieRecord, admin: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", movie.id, movie.name);
    if !movie.description.is_empty() {
        let _ = writeln!(out, "    {}", movie.description);
    }
    let _ = writeln!(out, "    Director: {}    {}", movie.director, rating_badge(movie.rating));
    if admin {
        let _ = writeln!(out, "    delete: `filmes delete {}`", movie.id);
    }
    out
}

pub fn rating_badge(rating: Option<i64>) -> String {
    match rating {
        Some(r) => format!("⭐ {}/5", r),
        None => "⭐ -/5".to_string(),
    }
}

/// The create form, one `field: value` line per input.
pub fn render_draft(draft: &DraftForm, submitting: bool) -> String {
    let mut out = String::new();
    for field in DraftField::ALL {
        let value = draft.get(field);
        let shown = if value.is_empty() { "(empty)" } else { value };
        let _ = writeln!(out, "  {:<12} {}", format!("{}:", field.label()), shown);
    }
    if submitting {
        let _ = writeln!(out, "Saving...");
    }
    out
}

/// The displayed collection as pretty JSON (wire field names).
///
/// Ids are always written as strings, whatever JSON type the backend used.
pub fn render_json(state: &CatalogState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&state.movies)
}
