//! `filmes`: terminal client for the movie catalog.
//!
//! Manages contexts and sign-in, and drives the catalog view: list,
//! create and delete movies, or work interactively in `filmes shell`.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Movie catalog CLI.
#[derive(Parser, Debug)]
#[command(name = "filmes", about = "Movie catalog client", version)]
struct Cli {
    /// Path to client config file (default: ~/.filmes/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// API base URL, overriding FILMES_API_URL and the current context.
    #[arg(long = "server", global = true)]
    server: Option<String>,

    /// Output format.
    #[arg(long = "output", short = 'o', global = true, value_enum, default_value_t = Output::Table)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Output {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in by saving an access token to the current context.
    Login {
        /// Access token (prompted for when omitted).
        #[arg(long)]
        token: Option<String>,
    },

    /// Sign out: clear the token from the current context.
    Logout,

    /// Show who is signed in.
    Whoami,

    /// List all movies.
    List,

    /// Create a movie.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Whole number from 0 to 5.
        #[arg(long)]
        rating: String,
        #[arg(long)]
        director: String,
    },

    /// Delete a movie (admins only).
    Delete {
        /// Movie ID.
        id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Interactive catalog session.
    Shell,

    /// Manage contexts.
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// List all contexts.
    List,
    /// Create or update a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
    },
    /// Switch the current context.
    Use { name: String },
    /// Delete a context.
    Delete { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);
    let server = cli.server.as_deref();

    match cli.command {
        Commands::Login { token } => commands::login::login(token, &config_path),
        Commands::Logout => commands::login::logout(&config_path),
        Commands::Whoami => commands::login::whoami(&config_path),
        Commands::List => commands::catalog::list(&config_path, server, cli.output).await,
        Commands::Create { name, description, rating, director } => {
            let draft = filmes_catalog::DraftForm { name, description, rating, director };
            commands::catalog::create(&config_path, server, cli.output, draft).await
        }
        Commands::Delete { id, yes } => {
            commands::catalog::delete(&config_path, server, &id, yes).await
        }
        Commands::Shell => commands::catalog::shell(&config_path, server).await,
        Commands::Context { action } => match action {
            ContextAction::List => commands::context::list(&config_path),
            ContextAction::Set { name, server } => {
                commands::context::set(&config_path, &name, server.as_deref())
            }
            ContextAction::Use { name } => commands::context::use_context(&config_path, &name),
            ContextAction::Delete { name } => commands::context::delete(&config_path, &name),
        },
    }
}
