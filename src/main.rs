use anyhow::Context;
use clap::{Parser, Subcommand};
use gathermap::config::Config;
use gathermap::location::Gazetteer;
use gathermap::server::{self, build_resolver, AppState};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// gathermap: event registration with a registrant map
///
/// Resolves free-text locations to coordinates. Set OPENCAGE_API_KEY to
/// enable live geocoding; without it the built-in gazetteer is used.
///
/// Examples:
///   gathermap serve --listen 127.0.0.1:3000
///   gathermap resolve "Bihar India"
///   gathermap resolve Minneapolis --offline
///   gathermap gazetteer
#[derive(Parser)]
#[command(name = "gathermap", version, about, long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Replacement gazetteer file (JSON array of {key, lat, lng}).
    #[arg(long, global = true)]
    gazetteer: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        /// Listen address, e.g. 0.0.0.0:3000.
        #[arg(long)]
        listen: Option<String>,

        /// Registration data file.
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Resolve one location and print the result as JSON.
    Resolve {
        /// Free-text location.
        text: String,

        /// Skip the remote geocoder even if a key is configured.
        #[arg(long)]
        offline: bool,
    },
    /// List the gazetteer entries in match order.
    Gazetteer,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::from_env().context("invalid configuration")?;
    if let Some(path) = cli.gazetteer {
        config.gazetteer_path = Some(path);
    }

    match cli.command {
        Command::Serve { listen, data } => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            if let Some(data) = data {
                config.data_file = data;
            }
            let state = AppState::from_config(&config).context("failed to initialise state")?;
            server::start(&config.listen_addr, state).await
        }
        Command::Resolve { text, offline } => {
            if offline {
                config.opencage_api_key = None;
            }
            let resolver = build_resolver(&config).context("failed to load gazetteer")?;
            let resolution =
                tokio::task::spawn_blocking(move || resolver.resolve_detailed(&text)).await?;
            println!("{}", serde_json::to_string_pretty(&resolution)?);
            Ok(())
        }
        Command::Gazetteer => {
            let table = match &config.gazetteer_path {
                Some(path) => std::sync::Arc::new(Gazetteer::from_path(path)?),
                None => Gazetteer::builtin(),
            };
            for (key, c) in table.entries() {
                println!("{:<20} {:>9.4} {:>10.4}", key, c.lat, c.lng);
            }
            Ok(())
        }
    }
}
