//! Login / logout / whoami commands.
//!
//! Tokens come from the identity provider out of band; `login` only checks
//! that the token carries readable claims before saving it.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use filmes_catalog::Session;

use crate::config::{ClientConfig, ENV_TOKEN};

/// Save an access token to the current context, creating `default` if
/// no context exists yet.
pub fn login(token: Option<String>, client_config_path: &Path) -> Result<()> {
    let token = match token {
        Some(t) => t,
        None => rpassword::prompt_password("Access token: ")?,
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("Token cannot be empty.");
    }

    let session = Session::from_token(token.clone())?;
    if let Some(exp) = session.expires_at() {
        if exp <= Utc::now() {
            anyhow::bail!("Token expired at {}.", exp.to_rfc3339());
        }
    }

    let mut config = ClientConfig::load(client_config_path)?;
    let ctx = config.current_or_default();
    ctx.token = token;
    let ctx_name = ctx.name.clone();
    config.save(client_config_path)?;

    println!("Logged in as {}.", describe(&session));
    if !session.has_claims() {
        println!("Token claims could not be read; signed in without admin rights.");
    }
    println!("Token saved to context \"{}\".", ctx_name);
    Ok(())
}

/// Logout: clear token from current context.
pub fn logout(client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let current_name = config.current_context.clone();
    if current_name.is_empty() {
        anyhow::bail!("No current context.");
    }

    let ctx = config
        .get_mut(&current_name)
        .ok_or_else(|| anyhow::anyhow!("Current context not found."))?;

    ctx.token = String::new();
    config.save(client_config_path)?;
    println!("Logged out from context \"{}\".", current_name);
    Ok(())
}

/// Print the signed-in user, permissions and token expiry.
pub fn whoami(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;
    let resolved = config.resolve(None);
    let Some(token) = resolved.token else {
        println!("Not signed in. Run `filmes login` or set {}.", ENV_TOKEN);
        return Ok(());
    };

    let session = Session::from_token(token)?;
    println!("{}", describe(&session));
    if !session.has_claims() {
        println!("  (token claims unreadable)");
    }
    if let Some(subject) = session.subject() {
        println!("  subject:     {}", subject);
    }
    let permissions: Vec<&str> = session.permissions().iter().collect();
    println!(
        "  permissions: {}",
        if permissions.is_empty() { "-".to_string() } else { permissions.join(", ") }
    );
    match session.expires_at() {
        Some(exp) if exp <= Utc::now() => println!("  expires:     {} (expired)", exp.to_rfc3339()),
        Some(exp) => println!("  expires:     {}", exp.to_rfc3339()),
        None => {}
    }
    println!("  server:      {}", resolved.server);
    Ok(())
}

fn describe(session: &Session) -> String {
    let profile = session.profile();
    let mut out = profile.name.clone();
    if let Some(email) = &profile.email {
        out.push_str(&format!(" <{}>", email));
    }
    if session.is_admin() {
        out.push_str(" [Admin]");
    }
    out
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    fn token(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}.sig", header, body)
    }

    #[test]
    fn login_saves_token_to_default_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let t = token(serde_json::json!({"sub": "u1", "name": "Ana", "permissions": ["ADMIN"]}));

        login(Some(t.clone()), &path).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.current_context, "default");
        assert_eq!(config.current().unwrap().token, t);

        logout(&path).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert!(config.current().unwrap().token.is_empty());
    }

    #[test]
    fn login_rejects_empty_and_expired_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(login(Some("   ".into()), &path).is_err());
        let expired = token(serde_json::json!({"sub": "u1", "exp": 1}));
        assert!(login(Some(expired), &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn login_accepts_opaque_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        login(Some("opaque-access-token".into()), &path).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.current().unwrap().token, "opaque-access-token");
    }

    #[test]
    fn login_accepts_null_permissions_and_float_exp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let t = token(serde_json::json!({"sub": "u1", "permissions": null, "exp": 4.1e9}));

        login(Some(t.clone()), &path).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap().current().unwrap().token, t);
    }

    #[test]
    fn describe_marks_admin() {
        let t = token(serde_json::json!({"sub": "u1", "name": "Ana", "email": "a@x", "permissions": ["delete:filmes"]}));
        let session = Session::from_token(t).unwrap();
        assert_eq!(describe(&session), "Ana <a@x> [Admin]");
    }
}
