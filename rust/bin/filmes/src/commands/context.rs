//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::{ClientConfig, Context, DEFAULT_SERVER};

/// List all contexts.
pub fn list(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: filmes context set <name> --server <url>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:8}", "", "NAME", "SERVER", "TOKEN");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context { "*" } else { " " };
        let server = if ctx.server.is_empty() { DEFAULT_SERVER } else { &ctx.server };
        let token = if ctx.token.is_empty() { "-" } else { "saved" };
        println!("{:2} {:20} {:40} {:8}", marker, ctx.name, server, token);
    }

    Ok(())
}

/// Create or update a context. The first context becomes current.
pub fn set(client_config_path: &Path, name: &str, server: Option<&str>) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let created = match config.get_mut(name) {
        Some(ctx) => {
            if let Some(s) = server {
                ctx.server = s.trim_end_matches('/').to_string();
            }
            false
        }
        None => {
            config.upsert_context(Context {
                name: name.to_string(),
                server: server.unwrap_or_default().trim_end_matches('/').to_string(),
                token: String::new(),
            });
            true
        }
    };
    if config.current_context.is_empty() {
        config.current_context = name.to_string();
    }

    config.save(client_config_path)?;
    if created {
        println!("Context \"{}\" created.", name);
    } else {
        println!("Context \"{}\" updated.", name);
    }
    Ok(())
}

/// Switch current context.
pub fn use_context(client_config_path: &Path, name: &str) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!(
            "Context \"{}\" not found. Run `filmes context list` to see available contexts.",
            name
        );
    }

    config.current_context = name.to_string();
    config.save(client_config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

/// Delete a context along with its saved token.
pub fn delete(client_config_path: &Path, name: &str) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" deleted.", name);
    Ok(())
}
