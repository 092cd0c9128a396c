//! pqpki CLI application.
//!
//! This binary runs the interactive hierarchy menu, or prints a listing of
//! the store for scripts.

use clap::{Parser, Subcommand};
use pqpki::config::{EngineConfig, EngineKind, DEFAULT_ALGORITHM, DEFAULT_IMAGE};
use pqpki::engine::{OpensslEngine, SigningEngine};
use pqpki::error::Result;
use pqpki::storage::layout::CertStore;
use pqpki::storage::listing::StoreListing;
use pqpki::ui::menu::run_menu;
use pqpki::ui::prompt::TextPrompt;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "pqpki")]
#[command(about = "Three-tier post-quantum certificate hierarchy manager", long_about = None)]
struct Cli {
    /// Store directory (default: current directory)
    #[arg(long, env = "PQPKI_STORE", default_value = ".", global = true)]
    store: PathBuf,

    /// How to run OpenSSL
    #[arg(long, env = "PQPKI_ENGINE", value_enum, default_value = "container", global = true)]
    engine: EngineKind,

    /// Container runtime program
    #[arg(long, env = "PQPKI_RUNTIME", default_value = "docker", global = true)]
    runtime: String,

    /// Container image with an OQS-enabled OpenSSL
    #[arg(long, env = "PQPKI_IMAGE", default_value = DEFAULT_IMAGE, global = true)]
    image: String,

    /// Signature algorithm for every key
    #[arg(long, env = "PQPKI_ALGORITHM", default_value = DEFAULT_ALGORITHM, global = true)]
    algorithm: String,

    /// OpenSSL program name
    #[arg(long, env = "PQPKI_OPENSSL", default_value = "openssl", global = true)]
    openssl: String,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (the default)
    Menu,

    /// List the root CA, intermediates and clients
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            kind: self.engine,
            runtime: self.runtime.clone(),
            image: self.image.clone(),
            openssl: self.openssl.clone(),
            algorithm: self.algorithm.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None | Some(Commands::Menu) => handle_menu(&cli),
        Some(Commands::List { json }) => handle_list(&cli, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn handle_menu(cli: &Cli) -> Result<()> {
    let store = CertStore::new(&cli.store);
    store.ensure_layout()?;

    let engine = OpensslEngine::new(cli.engine_config(), store.base())?;
    engine.ensure_available()?;
    info!(store = %store.base().display(), algorithm = %engine.algorithm(), "starting menu");

    let mut prompt = TextPrompt::stdio();
    run_menu(&store, &engine, &mut prompt)
}

fn handle_list(cli: &Cli, json: bool) -> Result<()> {
    let store = CertStore::new(&cli.store);
    let listing = StoreListing::collect(&store)?;

    if json {
        println!("{}", listing.to_json()?);
    } else {
        print!("{}", listing.to_text());
    }
    Ok(())
}
