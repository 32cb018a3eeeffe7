//! Catalog commands: list, create, delete and the interactive shell.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use filmes_catalog::render::{render, render_card, render_draft, render_json};
use filmes_catalog::{
    AlwaysConfirm, CatalogState, CatalogStore, CatalogView, Confirm, DraftField, DraftForm,
    MovieId, Session, ViewStatus, movie_client,
};
use tracing::debug;

use crate::Output;
use crate::config::{ClientConfig, ENV_TOKEN, Resolved};

/// Asks on stderr, reads the answer from stdin. Anything but `y` declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        let _ = std::io::stderr().flush();
        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        is_yes(&input)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Build a signed-in view against the resolved backend.
fn open_view(client_config_path: &Path, server: Option<&str>) -> Result<CatalogView> {
    let config = ClientConfig::load(client_config_path)?;
    view_for(config.resolve(server))
}

fn view_for(resolved: Resolved) -> Result<CatalogView> {
    let token = resolved.token.ok_or_else(|| {
        anyhow::anyhow!("Not signed in. Run `filmes login` or set {}.", ENV_TOKEN)
    })?;
    let session = Session::from_token(token)?;
    debug!(server = %resolved.server, "opening catalog view");

    let store = Arc::new(CatalogStore::new());
    let api = movie_client(resolved.server, store.clone());
    let view = CatalogView::new(store, Arc::new(api));
    view.establish_session(session);
    Ok(view)
}

fn print_state(state: &CatalogState, output: Output) -> Result<()> {
    match output {
        Output::Table => print!("{}", render(state)),
        Output::Json => println!("{}", render_json(state)?),
    }
    Ok(())
}

/// Load and print the whole catalog.
pub async fn list(client_config_path: &Path, server: Option<&str>, output: Output) -> Result<()> {
    let view = open_view(client_config_path, server)?;
    view.load_all().await?;
    print_state(&view.state(), output)
}

/// Create one movie and print it.
pub async fn create(
    client_config_path: &Path,
    server: Option<&str>,
    output: Output,
    draft: DraftForm,
) -> Result<()> {
    let view = open_view(client_config_path, server)?;
    let movie = view.create(draft).await?;
    match output {
        Output::Table => {
            print!("{}", render_card(&movie, view.state().is_admin()));
            println!("Created.");
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(&movie)?),
    }
    Ok(())
}

/// Delete one movie after confirmation (skipped with `--yes`).
pub async fn delete(
    client_config_path: &Path,
    server: Option<&str>,
    id: &str,
    yes: bool,
) -> Result<()> {
    let view = open_view(client_config_path, server)?;
    // The record must be on display to be deletable.
    view.load_all().await?;

    let confirm: &dyn Confirm = if yes { &AlwaysConfirm } else { &StdinConfirm };
    if view.delete(&MovieId::new(id), confirm).await? {
        println!("Movie {} deleted.", id);
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

const SHELL_HELP: &str = "\
Commands:
  list                  reload the catalog
  set <field> <value>   edit the create form (name, description, rating, director)
  draft                 show the create form
  clear                 empty the create form
  submit                create a movie from the form
  delete <id>           delete a movie (admins only)
  dismiss               hide the error banner
  help                  show this help
  quit                  leave the shell";

/// A parsed shell line.
#[derive(Debug, PartialEq)]
enum ShellCommand {
    List,
    Set(DraftField, String),
    Draft,
    Clear,
    Submit,
    Delete(String),
    Dismiss,
    Help,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> std::result::Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    match word {
        "" => Ok(ShellCommand::Empty),
        "list" | "reload" | "ls" => Ok(ShellCommand::List),
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((f, v)) => (f, v.trim()),
                None => (rest, ""),
            };
            if field.is_empty() {
                return Err("usage: set <field> <value>".into());
            }
            let field: DraftField = field.parse().map_err(|e| format!("{}", e))?;
            Ok(ShellCommand::Set(field, value.to_string()))
        }
        "draft" => Ok(ShellCommand::Draft),
        "clear" => Ok(ShellCommand::Clear),
        "submit" | "save" => Ok(ShellCommand::Submit),
        "delete" | "rm" => {
            if rest.is_empty() {
                return Err("usage: delete <id>".into());
            }
            Ok(ShellCommand::Delete(rest.to_string()))
        }
        "dismiss" => Ok(ShellCommand::Dismiss),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command: {} (try `help`)", other)),
    }
}

/// Interactive session. The catalog is re-rendered every time the view
/// settles after a change.
pub async fn shell(client_config_path: &Path, server: Option<&str>) -> Result<()> {
    let view = open_view(client_config_path, server)?;

    let sub = view.store().subscribe(|state| {
        let settled = state.status() != ViewStatus::Loading
            && !state.submitting
            && state.deleting.is_empty();
        if settled {
            println!("{}", render(state));
            if !state.draft.is_empty() {
                print!("New movie:\n{}", render_draft(&state.draft, false));
            }
        }
    });

    println!("{}", SHELL_HELP);
    // Failures land in the banner, which the subscriber prints.
    let _ = view.load_all().await;

    // No long-lived stdin lock: delete confirmation reads stdin too.
    let stdin = std::io::stdin();
    loop {
        print!("filmes> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let command = match parse_line(&line) {
            Ok(c) => c,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };
        match command {
            ShellCommand::Empty => {}
            ShellCommand::List => {
                let _ = view.load_all().await;
            }
            ShellCommand::Set(field, value) => {
                view.edit_draft(field, value);
            }
            ShellCommand::Draft => {
                let state = view.state();
                print!("{}", render_draft(&state.draft, state.submitting));
            }
            ShellCommand::Clear => {
                view.replace_draft(DraftForm::default());
            }
            ShellCommand::Submit => {
                let _ = view.submit().await;
            }
            ShellCommand::Delete(id) => {
                match view.delete(&MovieId::new(id), &StdinConfirm).await {
                    Ok(false) => println!("Cancelled."),
                    Ok(true) => {}
                    Err(e) => debug!(error = %e, "delete refused"),
                }
            }
            ShellCommand::Dismiss => view.dismiss_error(),
            ShellCommand::Help => println!("{}", SHELL_HELP),
            ShellCommand::Quit => break,
        }
    }

    view.store().unsubscribe(sub);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shell_commands() {
        assert_eq!(parse_line("  "), Ok(ShellCommand::Empty));
        assert_eq!(parse_line("list"), Ok(ShellCommand::List));
        assert_eq!(
            parse_line("set name The Godfather"),
            Ok(ShellCommand::Set(DraftField::Name, "The Godfather".into()))
        );
        assert_eq!(
            parse_line("set nota 4"),
            Ok(ShellCommand::Set(DraftField::Rating, "4".into()))
        );
        assert_eq!(parse_line("set director"), Ok(ShellCommand::Set(DraftField::Director, String::new())));
        assert_eq!(parse_line("rm 12"), Ok(ShellCommand::Delete("12".into())));
        assert_eq!(parse_line("quit"), Ok(ShellCommand::Quit));
    }

    #[test]
    fn rejects_bad_shell_lines() {
        assert!(parse_line("set").is_err());
        assert!(parse_line("set colour red").is_err());
        assert!(parse_line("delete").is_err());
        assert!(parse_line("fly").is_err());
    }

    #[test]
    fn only_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn view_requires_token() {
        let resolved = ClientConfig::default().resolve_with(None, |_| None);
        let err = view_for(resolved).err().unwrap();
        assert!(err.to_string().contains("Not signed in"));
    }

    #[test]
    fn view_signs_in_with_env_token() {
        let env = |key: &str| (key == ENV_TOKEN).then(|| "opaque-access-token".to_string());
        let resolved = ClientConfig::default().resolve_with(Some("http://localhost:9999"), env);
        let view = view_for(resolved).unwrap();
        let state = view.state();
        assert!(state.is_authenticated());
        assert!(!state.is_admin());
    }
}
