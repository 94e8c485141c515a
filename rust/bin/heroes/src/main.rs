//! `heroes`: manage the hero catalog from the command line.
//!
//! Every invocation opens the catalog, applies one command and exits. With
//! the default browser platform the state lives in a redb file and survives
//! between runs; `--ephemeral` starts from the seed and keeps nothing.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use heroes::{HeroesModule, load_seed};
use heroes_core::{AppConfig, Platform};
use heroes_kv::{KVStore, RedbStore};
use tracing::debug;

/// Hero catalog CLI.
#[derive(Parser, Debug)]
#[command(name = "heroes", about = "Hero catalog manager")]
struct Cli {
    /// Path to config file (default: ~/.heroes/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    /// Keep state in memory only.
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the current page of heroes.
    List {
        /// Case-insensitive search over name and alter ego.
        #[arg(long)]
        filter: Option<String>,
        /// Page number, starting at 1.
        #[arg(long)]
        page: Option<usize>,
    },

    /// Show one hero.
    Get { id: u64 },

    /// Add a hero.
    Add {
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },

    /// Update a hero. Fields absent from the JSON keep their values.
    Update {
        id: u64,
        /// JSON body.
        #[arg(long = "json")]
        json_body: String,
    },

    /// Delete a hero.
    Delete {
        id: u64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Select a hero, or clear the selection.
    Select {
        #[arg(required_unless_present = "clear", conflicts_with = "clear")]
        id: Option<u64>,
        #[arg(long)]
        clear: bool,
    },

    /// Clear the filter and return to the first page.
    Reset,

    /// Show version.
    Version,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `-o json` stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let json_output = match cli.output.as_str() {
        "json" => true,
        "table" => false,
        other => anyhow::bail!("Unknown output format: {other} (expected table or json)."),
    };
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(AppConfig::default_path);

    match cli.command {
        Commands::Version => {
            println!("heroes cli v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let module = open(&config_path, cli.ephemeral)?;
            run(&module, command, json_output)
        }
    }
}

fn run(module: &HeroesModule, command: Commands, json_output: bool) -> anyhow::Result<()> {
    match command {
        Commands::List { filter, page } => {
            commands::list(module, filter, page, json_output)?;
        }

        Commands::Get { id } => {
            commands::get(module, id, json_output)?;
        }

        Commands::Add { json_body, file } => {
            let body = if let Some(path) = file {
                std::fs::read_to_string(&path)?
            } else if let Some(json) = json_body {
                json
            } else {
                anyhow::bail!("Provide --json or -f <file>.");
            };
            commands::add(module, &body, json_output)?;
        }

        Commands::Update { id, json_body } => {
            commands::update(module, id, &json_body, json_output)?;
        }

        Commands::Delete { id, yes } => {
            if !yes {
                eprint!("Delete hero {id}? [y/N]: ");
                let mut s = String::new();
                std::io::stdin().read_line(&mut s)?;
                if !s.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            commands::delete(module, id)?;
        }

        Commands::Select { id, clear } => {
            let id = if clear { None } else { id };
            commands::select(module, id)?;
        }

        Commands::Reset => {
            module.store().reset_filters();
            println!("Filters reset.");
        }

        Commands::Version => {}
    }

    Ok(())
}

/// Load config and the seed, then wire the module.
fn open(config_path: &std::path::Path, ephemeral: bool) -> anyhow::Result<HeroesModule> {
    let mut config = AppConfig::load(config_path)?;
    config.validate()?;
    if ephemeral {
        config.platform = Platform::Server;
    }

    let seed = match &config.seed_path {
        Some(path) => load_seed(path)?,
        None => Vec::new(),
    };

    let kv: Option<Arc<dyn KVStore>> = if config.platform.is_browser() {
        let db_path = config.resolve_db_path();
        debug!(path = %db_path.display(), "opening local storage");
        Some(Arc::new(RedbStore::open(&db_path)?))
    } else {
        None
    };

    Ok(HeroesModule::new(&config, kv, seed))
}
