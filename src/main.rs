//! tickerbar - market price ticker for desktop status bars
//!
//! Prints one line of JSON (`text`, `tooltip`, `class`) for the instrument
//! selected by the current rotation slot, then exits.
//!
//! # Usage
//! ```sh
//! tickerbar ~/.config/tickerbar/config.toml --api-key-file ~/.config/tickerbar/tiingo.key
//! ```
//!
//! # Environment Variables
//! - `TICKERBAR_CONFIG` - Config file path when none is given
//! - `TICKERBAR_API_KEY` - API key when neither config nor `--api-key-file` sets one
//! - `RUST_LOG` - Log filter for stderr diagnostics (default: warn)

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tickerbar::application::system::Application;
use tickerbar::config::{Config, Overrides, default_config_path};
use tickerbar::domain::clock::Moment;
use tickerbar::domain::errors::TickerError;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "tickerbar", version, about = "Market price ticker for status bars")]
struct Cli {
    /// Config file (TOML)
    #[arg(env = "TICKERBAR_CONFIG")]
    config: Option<PathBuf>,

    /// Read the API key from this file
    #[arg(long)]
    api_key_file: Option<PathBuf>,

    /// API key, normally supplied through the environment
    #[arg(long, env = "TICKERBAR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Replace the configured instruments with a list file (`SYMBOL [GLYPH]` per line)
    #[arg(long)]
    tickers_file: Option<PathBuf>,
}

fn init_logging() {
    // stdout is reserved for the status-bar record
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(stderr_layer)
        .init();
}

async fn run(cli: Cli) -> Result<String, TickerError> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let overrides = Overrides {
        api_key: cli.api_key,
        api_key_file: cli.api_key_file,
        tickers_file: cli.tickers_file,
    };

    let config = Config::load(&config_path, &overrides)?;
    let app = Application::build(config)?;

    let record = app.run(Moment::now()).await?;
    debug!("class={} text={:?}", record.class, record.text);
    record.to_json()
}

fn main() -> ExitCode {
    // Load .env before clap reads TICKERBAR_* variables
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("tickerbar: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(line) => {
            println!("{}", line);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("tickerbar: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
