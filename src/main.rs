//! Goodreader CLI - Goodreads genre and book lookup.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use goodreader::commands::{self, App};
use goodreader::config::Config;
use goodreader::console::Console;
use goodreader::engine::FetchOptions;
use goodreader::pager;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Look up Goodreads genres and the books shelved under them.
#[derive(Parser, Debug)]
#[command(name = "goodreader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to an alternative config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ignore cached results and do not write new ones.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Stop after fetching N pages.
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Items shown per pager page.
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Log every request and never write the cache.
    #[arg(long, global = true)]
    debug: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for books (placeholder).
    Search { keyword: String },
    /// Browse every genre.
    Genres,
    /// Find a genre and browse its books.
    Genre { keyword: String },
    /// Search for an author (placeholder).
    Author { keyword: String },
    /// Look up a book by ISBN (placeholder).
    Isbn { isbn_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.debug);
    let console = Console::new();
    tokio::spawn(handle_ctrl_c());

    match run(cli, console).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            console.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Ctrl-C at a pager prompt quits cleanly; anywhere else it aborts.
async fn handle_ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }

    if pager::awaiting_input() {
        println!();
        std::process::exit(0);
    }
    std::process::exit(130);
}

async fn run(cli: Cli, console: Console) -> Result<()> {
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Command::Search { keyword } => Ok(commands::search::execute(keyword)?),
        Command::Author { keyword } => Ok(commands::author::execute(keyword)?),
        Command::Isbn { isbn_id } => Ok(commands::isbn::execute(isbn_id)?),
        Command::Genres => {
            let app = build_app(&cli, console)?;
            commands::genres::execute(&app).await
        }
        Command::Genre { keyword } => {
            let app = build_app(&cli, console)?;
            commands::genre::execute(&app, keyword).await
        }
    }
}

/// Loads and validates the config, applies flag overrides and builds the
/// command context.
fn build_app(cli: &Cli, console: Console) -> Result<App> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(page_size) = cli.page_size {
        config.pager.page_size = page_size;
    }
    if let Some(max_pages) = cli.max_pages {
        config.fetch.max_pages = Some(max_pages);
    }
    config.validate().context("Invalid configuration")?;

    let options = FetchOptions {
        use_cache: config.cache.enabled && !cli.no_cache,
        max_pages: config.fetch.max_pages,
        debug: cli.debug,
    };
    App::from_config(&config, options, console)
}

/// Sets up the tracing subscriber based on verbosity.
///
/// `RUST_LOG` wins when set.
fn setup_logging(verbose: u8, debug: bool) {
    let level = if debug { verbose.max(2) } else { verbose };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        0 => EnvFilter::new("goodreader=warn"),
        1 => EnvFilter::new("goodreader=info"),
        2 => EnvFilter::new("goodreader=debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_placeholder_commands_skip_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        for args in [
            vec!["search", "dune"],
            vec!["author", "herbert"],
            vec!["isbn", "9780441013593"],
        ] {
            let cli = Cli::try_parse_from(
                ["goodreader", "--config", config_path.to_str().unwrap()]
                    .into_iter()
                    .chain(args),
            )
            .unwrap();
            run(cli, Console::with_colors(false)).await.unwrap();
        }

        assert!(!config_path.exists());
    }

    #[test]
    fn test_build_app_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.cache.directory = Some(dir.path().join("cache"));
        config.save_to(&config_path).unwrap();

        let cli = Cli::try_parse_from([
            "goodreader",
            "--config",
            config_path.to_str().unwrap(),
            "--page-size",
            "5",
            "genres",
        ])
        .unwrap();

        let app = build_app(&cli, Console::with_colors(false)).unwrap();

        assert_eq!(app.page_size, 5);
    }

    #[test]
    fn test_build_app_rejects_zero_page_size() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        let cli = Cli::try_parse_from([
            "goodreader",
            "--config",
            config_path.to_str().unwrap(),
            "--page-size",
            "0",
            "genres",
        ])
        .unwrap();

        assert!(build_app(&cli, Console::with_colors(false)).is_err());
    }
}
