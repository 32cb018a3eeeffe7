//! Authenticated session: bearer token plus what it says about the user.
//!
//! The identity provider hands us a JWT-shaped access token. The view never
//! verifies it (the backend does); it only reads the payload segment once,
//! when the session is established, to learn the profile and permissions.

use std::collections::BTreeSet;

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::CatalogError;

/// Permissions that unlock the delete affordance.
pub const ADMIN_MARKERS: &[&str] = &["ADMIN", "delete:filmes"];

/// Claims read from the token payload. All optional, and a claim of the
/// wrong type reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, deserialize_with = "lenient_text")]
    pub sub: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub picture: Option<String>,
    #[serde(default, deserialize_with = "lenient_permissions")]
    pub permissions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub exp: Option<i64>,
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// `null`, a non-list, or non-string entries all count as no permission.
fn lenient_permissions<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Seconds since the epoch, integer or float.
fn lenient_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        _ => None,
    })
}

impl Claims {
    /// Decode the payload segment of a `header.payload.signature` token.
    pub fn decode(token: &str) -> Result<Self, CatalogError> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(CatalogError::Token("expected three dot-separated segments".into())),
        };
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| CatalogError::Token(format!("payload is not base64url: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError::Token(format!("payload is not a claims object: {}", e)))
    }
}

/// Typed permission set, built once per token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn is_admin(&self) -> bool {
        ADMIN_MARKERS.iter().any(|m| self.contains(m))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Display profile of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// An established session. Immutable; a refreshed token means a new `Session`.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    token: String,
    subject: Option<String>,
    profile: UserProfile,
    permissions: PermissionSet,
    expires_at: Option<DateTime<Utc>>,
    has_claims: bool,
}

impl Session {
    /// Build a session from a bearer token, reading its claims once.
    ///
    /// A token whose payload cannot be read still signs in, as a non-admin
    /// with no profile; the backend remains the judge of what it may do.
    /// Only an empty token is refused.
    pub fn from_token(token: impl Into<String>) -> Result<Self, CatalogError> {
        let token = token.into();
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(CatalogError::Token("empty token".into()));
        }
        let (claims, has_claims) = match Claims::decode(&token) {
            Ok(claims) => (claims, true),
            Err(e) => {
                warn!(error = %e, "token claims unreadable, signing in without permissions");
                (Claims::default(), false)
            }
        };

        let name = claims
            .name
            .clone()
            .or_else(|| claims.email.clone())
            .or_else(|| claims.sub.clone())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self {
            subject: claims.sub,
            profile: UserProfile {
                name,
                email: claims.email,
                picture: claims.picture,
            },
            permissions: claims.permissions.into_iter().collect(),
            expires_at: claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
            has_claims,
            token,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.is_admin()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the token payload could be read.
    pub fn has_claims(&self) -> bool {
        self.has_claims
    }

    /// Whether `other` belongs to the same user (a token refresh).
    pub fn same_user(&self, other: &Session) -> bool {
        self.subject.is_some() && self.subject == other.subject
    }
}
