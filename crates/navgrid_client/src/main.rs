//! Command-line client for the navgrid API.

use anyhow::Context;
use clap::{Parser, Subcommand};
use navgrid_client::{ApiClient, LocalCache, SyncEngine, SyncOutcome};
use navgrid_core::config::default_cache_dir;
use navgrid_core::models::NewLinkRequest;
use navgrid_core::DEFAULT_CLI_SERVER_URL;
use serde_json::{Map, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "navctl", about = "Navgrid sync CLI", version)]
struct Cli {
    /// Server URL (can also be set via NAVGRID_SERVER env var)
    #[arg(short, long, env = "NAVGRID_SERVER", default_value = DEFAULT_CLI_SERVER_URL)]
    server: String,

    /// Admin credential for mutating endpoints
    #[arg(short, long, env = "NAVGRID_TOKEN")]
    token: Option<String>,

    /// Local cache directory (defaults to ~/.cache/navgrid)
    #[arg(long, env = "NAVGRID_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List links from the local cache after a best-effort sync
    List,
    /// Add a link
    Add {
        name: String,
        url: String,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// Remove a link by id
    Remove { id: String },
    /// Show or update settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Pull remote state into the local cache
    Sync,
    /// Probe server health
    Health,
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    /// Merge a JSON object into the settings
    Set { patch: String },
}

fn outcome_note(outcome: SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Synced => "synced",
        SyncOutcome::LocalOnly => "saved locally; server not updated",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navctl=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cache_dir = cli.cache_dir.unwrap_or_else(default_cache_dir);
    let api = ApiClient::new(cli.server.clone(), cli.token);
    let cache = LocalCache::open(&cache_dir)
        .with_context(|| format!("cannot open cache at {}", cache_dir.display()))?;
    let mut engine = SyncEngine::new(api, cache)?;

    match cli.command {
        Commands::List => {
            engine.reconcile().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(engine.links())?);
            } else {
                for link in engine.links() {
                    println!("{:<36} {:<24} {}", link.id, link.name, link.url);
                }
            }
        }
        Commands::Add {
            name,
            url,
            category,
            icon,
        } => {
            let (link, outcome) = engine
                .add_link(NewLinkRequest {
                    name,
                    url,
                    category,
                    icon,
                })
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&link)?);
            } else {
                println!("Added: {} ({}) [{}]", link.name, link.id, outcome_note(outcome));
            }
        }
        Commands::Remove { id } => match engine.delete_link(&id).await? {
            Some(outcome) => println!("Removed: {} [{}]", id, outcome_note(outcome)),
            None => {
                eprintln!("Remove failed: no link with id '{}'", id);
                std::process::exit(1);
            }
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                engine.reconcile().await?;
                println!("{}", serde_json::to_string_pretty(engine.settings())?);
            }
            SettingsAction::Set { patch } => {
                let patch: Map<String, Value> = match serde_json::from_str::<Value>(&patch) {
                    Ok(Value::Object(map)) => map,
                    Ok(_) => {
                        eprintln!("Settings set failed: patch must be a JSON object");
                        std::process::exit(1);
                    }
                    Err(err) => {
                        eprintln!("Settings set failed: {}", err);
                        std::process::exit(1);
                    }
                };
                let outcome = engine.save_settings(patch).await?;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(engine.settings())?);
                } else {
                    println!("Settings updated [{}]", outcome_note(outcome));
                }
            }
        },
        Commands::Sync => {
            let outcome = engine.reconcile().await?;
            match outcome {
                SyncOutcome::Synced => println!("Synced {} links", engine.links().len()),
                SyncOutcome::LocalOnly => {
                    println!("Server unreachable; serving {} cached links", engine.links().len())
                }
            }
        }
        Commands::Health => {
            if engine.probe().await {
                println!("Server at {} is up", cli.server);
            } else {
                eprintln!("Server at {} is unreachable", cli.server);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
