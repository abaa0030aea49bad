//! Terminal front end for the notes client.
//!
//! Runs one-shot subcommands or, with no subcommand, an interactive session.

mod commands;
mod context;
mod interactive;
mod notifier;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notes_client::{ClientConfig, SortOrder};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::context::AppContext;

#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "List, write and schedule reminders for notes")]
struct Cli {
    /// Base URL of the notes API
    #[arg(long, global = true, env = "NOTES_API_URL")]
    api_url: Option<String>,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes
    List {
        /// Only notes whose title contains this text
        #[arg(long)]
        search: Option<String>,

        /// newest or oldest
        #[arg(long)]
        sort: Option<SortOrder>,
    },

    /// Create a note
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        /// Reminder time, YYYY-MM-DDTHH:MM in local time
        #[arg(long)]
        remind_at: Option<String>,
    },

    /// Change a note's title or content
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a note
    Delete { id: String },

    /// Interactive session (default)
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,notes_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load .env file if present (development), before clap reads the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = load_config(cli.api_url.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(api = %config.api_base_url, "Configuration loaded");

    let ctx = AppContext::new(config, cli.quiet)?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::List { search, sort } => commands::list(&ctx, search.as_deref(), sort).await,
        Commands::Add {
            title,
            content,
            remind_at,
        } => commands::add(&ctx, &title, &content, remind_at.as_deref()).await,
        Commands::Edit { id, title, content } => {
            commands::edit(&ctx, &id, title.as_deref(), content.as_deref()).await
        }
        Commands::Delete { id } => commands::delete(&ctx, &id).await,
        Commands::Interactive => interactive::run(&ctx).await,
    }
}

/// Build the client config. The API URL comes from clap, which already
/// fell back to `NOTES_API_URL`; the feature switches come from the environment.
fn load_config(api_url: Option<&str>) -> Result<ClientConfig> {
    let config = ClientConfig::from_vars(|key| match key {
        "NOTES_API_URL" => api_url.map(str::to_string),
        _ => env::var(key).ok(),
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_sort() {
        let cli = Cli::try_parse_from(["notes", "list", "--search", "al", "--sort", "oldest"]).unwrap();
        match cli.command {
            Some(Commands::List { search, sort }) => {
                assert_eq!(search.as_deref(), Some("al"));
                assert_eq!(sort, Some(SortOrder::Oldest));
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["notes", "list", "--sort", "alphabetical"]).is_err());
    }

    #[test]
    fn test_no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["notes", "--api-url", "http://localhost:3000"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn test_api_url_falls_back_to_environment() {
        let cmd = Cli::command();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id() == "api_url")
            .unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("NOTES_API_URL")));
    }

    #[test]
    fn test_missing_api_url_is_config_error() {
        assert!(load_config(None).is_err());
    }

    #[test]
    fn test_api_url_flag_overrides_environment() {
        let config = load_config(Some("http://flag.example.com/")).unwrap();
        assert_eq!(config.api_base_url, "http://flag.example.com");
    }
}
