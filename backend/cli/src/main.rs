mod doctor_cmd;

use std::net::SocketAddr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use stockscan_config::{config_dir, config_file_path, load_and_prepare, StockScanConfig};
use stockscan_gateway::{build_state, start_server};

#[derive(Parser)]
#[command(name = "stockscan")]
#[command(about = "StockScan — camera-driven inventory lookup backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the StockScan HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show gateway status
    Status,
    /// Check local OCR engines, storage and configuration
    Doctor,
    /// Generate a fresh AES-256 encryption key for api key storage
    GenerateKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_and_prepare(&config_file_path(&config_dir())).await?;

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.gateway.port = port;
            }
            run_server(config).await?;
        }
        Commands::Status => {
            println!("StockScan status: checking...");
            let client = reqwest::Client::new();
            match client
                .get(format!(
                    "http://localhost:{}/api/warehouse/health",
                    config.gateway.port
                ))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("StockScan is not running on port {}", config.gateway.port);
                }
            }
        }
        Commands::Doctor => {
            doctor_cmd::run(&config).await?;
        }
        Commands::GenerateKey => {
            println!("{}", stockscan_security::generate_key());
        }
    }

    Ok(())
}

async fn run_server(config: StockScanConfig) -> Result<()> {
    logging::init_logger(&config.logging.dir, &config.logging.level);

    info!(
        port = config.gateway.port,
        bind = %config.gateway.host,
        data_dir = %config.storage.data_dir,
        "Starting StockScan gateway"
    );

    let state = build_state(&config)?;
    let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port).parse()?;
    start_server(addr, state).await
}
