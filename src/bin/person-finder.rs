//! Person Finder CLI: run a search and print the result as JSON.
//!
//! Usage:
//!   person-finder search <NAME> [--location L] [--context C] [--deadline-ms N]
//!                               [--config path] [--fixtures path] [--pretty]
//!   person-finder queries <NAME> [--location L] [--context C]
//!   person-finder config [--config path]

use clap::{Parser, Subcommand};
use person_finder::collector::{FixtureFetcher, SourceFetcher, UnavailableFetcher};
use person_finder::{generate, Finder, FinderConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "person-finder",
    version,
    about = "Concurrent multi-source person search"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every configured source for a person
    Search {
        /// Full name to search for
        name: String,
        /// Location to narrow the search
        #[arg(long)]
        location: Option<String>,
        /// Extra context such as a company or title
        #[arg(long)]
        context: Option<String>,
        /// Global search deadline in milliseconds
        #[arg(long)]
        deadline_ms: Option<u64>,
        /// Path to a config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Replay canned source responses from a fixture file
        #[arg(long)]
        fixtures: Option<PathBuf>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the queries a search would issue
    Queries {
        name: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        context: Option<String>,
    },
    /// Print the effective configuration
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Log to stderr so stdout stays machine-readable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<FinderConfig, String> {
    FinderConfig::load_or_default(path).map_err(|e| format!("Failed to load config: {}", e))
}

fn open_fetcher(fixtures: Option<&Path>) -> Result<Arc<dyn SourceFetcher>, String> {
    match fixtures {
        Some(path) => FixtureFetcher::from_path(path)
            .map(|f| Arc::new(f) as Arc<dyn SourceFetcher>)
            .map_err(|e| format!("Failed to load fixtures from {}: {}", path.display(), e)),
        None => {
            tracing::warn!("no fixtures given; every source is unavailable");
            Ok(Arc::new(UnavailableFetcher))
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> i32 {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match text {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

struct SearchArgs {
    name: String,
    location: Option<String>,
    context: Option<String>,
    deadline_ms: Option<u64>,
    config: Option<PathBuf>,
    fixtures: Option<PathBuf>,
    pretty: bool,
}

fn cmd_search(args: SearchArgs) -> i32 {
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let fetcher = match open_fetcher(args.fixtures.as_deref()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let deadline = args
        .deadline_ms
        .map(Duration::from_millis)
        .unwrap_or(config.search.global_deadline);

    let finder = Finder::new(config.build_registry(fetcher), config.search.clone());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    let result = rt.block_on(finder.try_search(
        &args.name,
        args.location.as_deref(),
        args.context.as_deref(),
        deadline,
    ));

    match result {
        Ok(result) => print_json(&result, args.pretty),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_queries(name: &str, location: Option<&str>, context: Option<&str>) -> i32 {
    let queries = generate(name, location, context);
    if queries.is_empty() {
        eprintln!("Error: name '{}' has no searchable characters", name);
        return 1;
    }
    for query in queries {
        println!("{}\t{}", query.intent(), query.text());
    }
    0
}

fn cmd_config(path: Option<&Path>) -> i32 {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match config.to_yaml() {
        Ok(text) => {
            print!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Search {
            name,
            location,
            context,
            deadline_ms,
            config,
            fixtures,
            pretty,
        } => cmd_search(SearchArgs {
            name,
            location,
            context,
            deadline_ms,
            config,
            fixtures,
            pretty,
        }),
        Commands::Queries {
            name,
            location,
            context,
        } => cmd_queries(&name, location.as_deref(), context.as_deref()),
        Commands::Config { config } => cmd_config(config.as_deref()),
    };
    std::process::exit(code);
}
