use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use agora_core::{config::ConfigBuilder, JsonFileStore, Node};
use agora_exchange::Market;
use agora_network::{Gossip, NodeClient};
use agora_rpc::{exchange_router, node_router, AppState, LocalLedger};

#[derive(Parser)]
#[command(name = "agora")]
#[command(about = "Agora proof-of-stake ledger with a co-located exchange", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a ledger node
    Node {
        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,

        /// Host to bind to (0.0.0.0 allows external connections)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Comma-separated list of initial peer addresses (host:port)
        #[arg(long)]
        peers: Option<String>,

        /// Identifier used for staking; defaults to 127.0.0.1:<port>
        #[arg(long)]
        id: Option<String>,

        /// Directory holding the per-node snapshot file
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Also host the matching engine on this node
        #[arg(long)]
        with_exchange: bool,
    },
    /// Run a standalone exchange service settling against a remote node
    Exchange {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// host:port of the ledger node used for settlement
        #[arg(long, default_value = "127.0.0.1:10000")]
        node: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Node {
            port,
            host,
            peers,
            id,
            data_dir,
            with_exchange,
        } => run_node(port, host, peers, id, data_dir, with_exchange).await,
        Commands::Exchange { port, host, node } => run_exchange(port, host, node).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run_node(
    port: u16,
    host: String,
    peers: Option<String>,
    id: Option<String>,
    data_dir: PathBuf,
    with_exchange: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let identifier = id.unwrap_or_else(|| format!("127.0.0.1:{port}"));
    let data_file = data_dir.join(format!("node_{port}_data.json"));
    info!(%identifier, data_file = %data_file.display(), "starting node");

    let store = JsonFileStore::new(data_file);
    let node = Node::new(identifier, Box::new(store)).into_shared();

    if let Some(csv) = peers {
        let mut guard = node.write().expect("node state lock poisoned");
        let registered = guard.register_nodes(csv.split(',').map(str::trim));
        info!(registered, "initial peers registered");
    }

    let config = ConfigBuilder::new().data_dir(data_dir).finish();
    let gossip = Arc::new(Gossip::new(config.clone()));
    let state = AppState {
        node: node.clone(),
        gossip: gossip.clone(),
    };

    tokio::spawn(agora_network::run_forging_loop(node.clone(), gossip, config));
    info!("background forging loop started");

    let mut app = node_router(state);
    if with_exchange {
        let ledger = LocalLedger::new(node.clone());
        let market = tokio::task::spawn_blocking(move || Market::new(Box::new(ledger))).await??;
        app = app.merge(exchange_router(Arc::new(Mutex::new(market))));
        info!("co-located matching engine enabled");
    }

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("node api listening on {host}:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_exchange(
    port: u16,
    host: String,
    node: String,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!(node = %node, "starting exchange service");
    // The settlement client is blocking; build and pre-fund off the runtime.
    let market = tokio::task::spawn_blocking(
        move || -> Result<Market, Box<dyn std::error::Error + Send + Sync>> {
            let client = NodeClient::with_base(format!("http://{node}"))?;
            Ok(Market::new(Box::new(client))?)
        },
    )
    .await??;
    let app = exchange_router(Arc::new(Mutex::new(market)));

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("exchange api listening on {host}:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}
