use std::path::PathBuf;

use bestex::app::App;
use bestex::config::Config;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{error, info};

/// Route a market buy to the exchange with the best depth-adjusted price.
#[derive(Parser)]
#[command(name = "bestex", version, about)]
struct Cli {
    /// Trading pair symbol, venue-native or base+quote (e.g. BTCUSD)
    symbol: String,

    /// Order size in the base asset
    size: Decimal,

    /// Execute the order on the winning venue instead of only quoting it
    #[arg(long)]
    execute: bool,

    /// Path to the config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load config: {err}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!("bestex starting");

    if let Err(err) = App::run(config, &cli.symbol, cli.size, cli.execute).await {
        error!(error = %err, "Fatal error");
        std::process::exit(1);
    }
}
