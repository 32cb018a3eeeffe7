use filmes_client::ApiError;
use thiserror::Error;

/// Everything that can go wrong in a catalog operation.
///
/// None of these are fatal: the view stores the rendered message as its
/// error banner and goes back to idle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The request never completed.
    #[error("network failure: {0}")]
    Network(String),

    /// Non-2xx response.
    #[error("HTTP {status}{}", body_suffix(.body))]
    Server { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Draft rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Operation not permitted for this session.
    #[error("{0}")]
    Forbidden(String),

    /// Record is not in the displayed collection.
    #[error("{0}")]
    NotFound(String),

    /// No session, or the token source refused to produce a token.
    #[error("not signed in: {0}")]
    Unauthenticated(String),

    /// Bearer token could not be decoded into claims.
    #[error("invalid token: {0}")]
    Token(String),
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(" {}", body)
    }
}

impl From<ApiError> for CatalogError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Server { status, message } => CatalogError::Server { status, body: message },
            ApiError::Network(e) => CatalogError::Network(e.to_string()),
            ApiError::Auth(msg) => CatalogError::Unauthenticated(msg),
            ApiError::Decode(msg) => CatalogError::Malformed(msg),
        }
    }
}
