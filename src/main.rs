use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use zonesync::api::HttpTransport;
use zonesync::config::SyncConfig;
use zonesync::sync::ReconciliationEngine;
use zonesync::watch::{self, ZoneWatcher};
use zonesync::zone::{ZoneCompiler, domain_from_path};

/// Keep control plane zones in sync with `<domain>.db` zone files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file (environment variables still apply on top)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Control plane API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Control plane API key
    #[arg(long)]
    api_key: Option<String>,

    /// Directory holding zone files
    #[arg(long)]
    watch_dir: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch the zone directory and reconcile every written zone file (default)
    Watch,
    /// Reconcile the given zone files once, in order
    Sync {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the request body a zone file compiles to, without contacting the API
    Render {
        file: PathBuf,
        /// Render the PATCH body for an existing zone instead of the POST body
        #[arg(long)]
        existing: bool,
    },
}

fn load_config(args: &Args) -> Result<SyncConfig, Box<dyn std::error::Error>> {
    let mut config = SyncConfig::load(args.config.as_deref())?;

    if let Some(api_url) = &args.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(api_key) = &args.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(watch_dir) = &args.watch_dir {
        config.watch_dir = watch_dir.clone();
    }
    if let Some(log_file) = &args.log_file {
        config.log_file = Some(log_file.clone());
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;

    zonesync::logging::init_tracing(config.log_file.as_deref())?;

    match args.command.unwrap_or(Command::Watch) {
        Command::Watch => {
            let engine = ReconciliationEngine::new(&config, HttpTransport::new(&config)?);
            let (watcher, events) = ZoneWatcher::start(&config.watch_dir)?;
            info!("Reconciling zone files from {}", watcher.dir().display());

            watch::run(&engine, events).await;
            warn!("Zone watcher stopped");
        }
        Command::Sync { files } => {
            let engine = ReconciliationEngine::new(&config, HttpTransport::new(&config)?);

            for file in files {
                let outcome = engine.process(&file).await;
                println!("{}", outcome);
            }
        }
        Command::Render { file, existing } => {
            let compiler = ZoneCompiler::new(&config);

            let body = if existing {
                let (_, request) = compiler.update_request(&file)?;
                serde_json::to_string_pretty(&request)?
            } else {
                let domain = domain_from_path(&file)?;
                let request = compiler.create_request(&domain, &file)?;
                serde_json::to_string_pretty(&request)?
            };

            info!("Rendered {}", file.display());
            println!("{}", body);
        }
    }

    Ok(())
}
