//! Client-side context management.
//!
//! Reads/writes `~/.filmes/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Backend used when nothing else is configured.
pub const DEFAULT_SERVER: &str = "http://localhost:8080";

/// Overrides the server URL of the current context.
pub const ENV_API_URL: &str = "FILMES_API_URL";

/// Overrides the saved bearer token.
pub const ENV_TOKEN: &str = "FILMES_TOKEN";

/// Name given to the context `login` creates when none exists.
pub const DEFAULT_CONTEXT: &str = "default";

/// A single context: one backend plus the token used against it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Context name (e.g. "local").
    pub name: String,

    /// API base URL (e.g. "http://localhost:8080").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Bearer token (set by `filmes login`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    /// List of configured contexts.
    #[serde(default)]
    pub contexts: Vec<Context>,
}

/// Where to talk to and with what token, after applying overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub server: String,
    pub token: Option<String>,
}

impl ClientConfig {
    /// Default config file path: ~/.filmes/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the currently active context, if any.
    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    /// Get a mutable reference to a context by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Current context, creating and selecting `default` if there is none.
    pub fn current_or_default(&mut self) -> &mut Context {
        if self.current().is_none() {
            if self.current_context.is_empty() {
                self.current_context = DEFAULT_CONTEXT.to_string();
            }
            let name = self.current_context.clone();
            self.upsert_context(Context { name, ..Default::default() });
        }
        let name = self.current_context.clone();
        let idx = self
            .contexts
            .iter()
            .position(|c| c.name == name)
            .unwrap_or(self.contexts.len() - 1);
        &mut self.contexts[idx]
    }

    /// Add or update a context.
    pub fn upsert_context(&mut self, ctx: Context) {
        if let Some(existing) = self.get_mut(&ctx.name) {
            *existing = ctx;
        } else {
            self.contexts.push(ctx);
        }
    }

    /// Remove a context by name. Returns true if it was found.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context = String::new();
        }
        self.contexts.len() < len
    }

    /// Resolve server and token: flag, then environment, then current
    /// context, then [`DEFAULT_SERVER`].
    pub fn resolve(&self, server_flag: Option<&str>) -> Resolved {
        self.resolve_with(server_flag, |key| std::env::var(key).ok())
    }

    pub fn resolve_with(
        &self,
        server_flag: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Resolved {
        let ctx = self.current();
        let non_empty = |s: String| if s.trim().is_empty() { None } else { Some(s) };

        let server = server_flag
            .map(str::to_string)
            .and_then(non_empty)
            .or_else(|| env(ENV_API_URL).and_then(non_empty))
            .or_else(|| ctx.map(|c| c.server.clone()).and_then(non_empty))
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        let token = env(ENV_TOKEN)
            .and_then(non_empty)
            .or_else(|| ctx.map(|c| c.token.clone()).and_then(non_empty));

        Resolved { server, token }
    }
}

/// Return the filmes config directory (~/.filmes).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".filmes")
}
