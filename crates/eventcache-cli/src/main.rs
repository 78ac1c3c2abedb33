//! eventcache - browse the events and schedule cache from the terminal.
//!
//! Listing always reads the local cache, so it works offline. `refresh`
//! pulls a fresh snapshot; if the network is down the cache stays as it was.

mod output;

use std::io;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eventcache_core::{ApiClient, CacheRepository, Config, Database, EntityKind, Stores};

const USAGE: &str = "\
Usage: eventcache <command>

Commands:
  refresh [events|schedule]   Fetch a fresh snapshot (both kinds if omitted)
  refresh --stale             Refresh only kinds older than the stale threshold
  list events|schedule        Print cached rows ordered by date
  status                      Show when each kind was last synced
  clear [events|schedule]     Wipe cached rows (both kinds if omitted)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshTarget {
    One(EntityKind),
    All,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Refresh(RefreshTarget),
    List(EntityKind),
    Status,
    Clear(Option<EntityKind>),
    Help,
}

fn parse_kind(arg: &str) -> Result<EntityKind> {
    arg.parse::<EntityKind>()
        .with_context(|| format!("Unknown kind '{}' (expected events or schedule)", arg))
}

fn parse_args(args: &[String]) -> Result<Command> {
    let command = args.first().map(String::as_str);

    if args.len() > 2 {
        bail!("Too many arguments\n\n{}", USAGE);
    }

    if command == Some("refresh") && args.get(1).map(String::as_str) == Some("--stale") {
        return Ok(Command::Refresh(RefreshTarget::Stale));
    }
    let kind = args.get(1).map(|s| parse_kind(s)).transpose()?;

    match command {
        None | Some("help") | Some("--help") | Some("-h") => Ok(Command::Help),
        Some("refresh") => Ok(Command::Refresh(match kind {
            Some(kind) => RefreshTarget::One(kind),
            None => RefreshTarget::All,
        })),
        Some("list") => match kind {
            Some(kind) => Ok(Command::List(kind)),
            None => bail!("list needs a kind: events or schedule"),
        },
        Some("status") => Ok(Command::Status),
        Some("clear") => Ok(Command::Clear(kind)),
        Some(other) => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // RUST_LOG controls the level (e.g. RUST_LOG=eventcache_core=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn kinds(kind: Option<EntityKind>) -> Vec<EntityKind> {
    match kind {
        Some(kind) => vec![kind],
        None => EntityKind::ALL.to_vec(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    init_tracing();

    let config = Config::load()?;
    let db_path = config.database_path()?;
    let db = Database::open(&db_path)
        .await
        .with_context(|| format!("Failed to open cache database: {}", db_path.display()))?;
    let client = ApiClient::from_config(&config).context("Failed to create API client")?;
    let repo = CacheRepository::new(Arc::new(client), Stores::from_database(&db))
        .with_stale_after(config.stale_after_minutes);

    info!(?command, "eventcache starting");

    let mut failed = 0;
    match command {
        Command::Refresh(target) => {
            let results = match target {
                RefreshTarget::One(kind) => vec![(kind, repo.refresh(kind).await)],
                RefreshTarget::All => repo.refresh_all().await,
                RefreshTarget::Stale => repo.refresh_stale().await,
            };
            if results.is_empty() {
                println!("Cache is fresh, nothing to refresh");
            }
            for (kind, result) in results {
                match result {
                    Ok(()) => println!("Refreshed {}", kind),
                    Err(e) if e.is_fetch() => {
                        failed += 1;
                        eprintln!("Could not refresh {}: {} (cached data kept)", kind, e);
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("Could not refresh {}: {}", kind, e);
                    }
                }
            }
        }
        Command::List(EntityKind::Events) => output::print_events(&repo.events().await?),
        Command::List(EntityKind::Schedule) => output::print_schedule(&repo.schedule().await?),
        Command::Status => {
            for kind in EntityKind::ALL {
                output::print_status(&repo.sync_status(kind).await?);
            }
        }
        Command::Clear(kind) => {
            for kind in kinds(kind) {
                repo.clear(kind).await?;
                println!("Cleared {}", kind);
            }
        }
        Command::Help => {}
    }

    db.close().await?;

    if failed > 0 {
        bail!("{} refresh(es) failed", failed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_refresh() {
        assert_eq!(
            parse_args(&args(&["refresh"])).unwrap(),
            Command::Refresh(RefreshTarget::All)
        );
        assert_eq!(
            parse_args(&args(&["refresh", "schedule"])).unwrap(),
            Command::Refresh(RefreshTarget::One(EntityKind::Schedule))
        );
        assert_eq!(
            parse_args(&args(&["refresh", "--stale"])).unwrap(),
            Command::Refresh(RefreshTarget::Stale)
        );
    }

    #[test]
    fn test_parse_list_requires_kind() {
        assert!(parse_args(&args(&["list"])).is_err());
        assert_eq!(
            parse_args(&args(&["list", "events"])).unwrap(),
            Command::List(EntityKind::Events)
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_args(&args(&["sync"])).is_err());
        assert!(parse_args(&args(&["clear", "photos"])).is_err());
        assert!(parse_args(&args(&["clear", "events", "extra"])).is_err());
        assert!(parse_args(&args(&["list", "--stale"])).is_err());
    }

    #[test]
    fn test_no_args_is_help() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
    }
}
