//! glucofetch server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use glucofetch_core::tracing::{TracingConfig, TracingOutputFormat, init_tracing};
use glucofetch_provider::{DexcomConfig, DexcomProvider};
use glucofetch_server::{AppState, CsvSink, ServerConfig, build_router};

#[derive(Debug, Parser)]
#[command(name = "glucofetch", about = "Dexcom OAuth + CSV export service")]
struct Cli {
    /// Address to bind the HTTP listener on
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Path where the OAuth credential is persisted
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Path where fetched readings are written
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// Retrieval lookback in days
    #[arg(long)]
    lookback_days: Option<i64>,

    /// Dexcom API base URL (point at the sandbox host for development)
    #[arg(long)]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let mut tracing_config = if cli.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::default()
    };
    if cli.json_logs {
        tracing_config = tracing_config.with_format(TracingOutputFormat::Json);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Environment first, flags override
    let mut config = ServerConfig::from_env();
    if let Some(bind) = cli.bind {
        config = config.with_bind(bind);
    }
    if let Some(token_file) = cli.token_file {
        config = config.with_token_path(token_file);
    }
    if let Some(csv_file) = cli.csv_file {
        config = config.with_csv_path(csv_file);
    }
    if let Some(days) = cli.lookback_days {
        config = config.with_lookback_days(days);
    }

    let mut provider_config =
        DexcomConfig::from_env(&config.token_path).with_lookback(config.lookback());
    if let Some(base_url) = cli.base_url {
        provider_config = provider_config.with_base_url(base_url);
    }

    let provider = DexcomProvider::new(provider_config);
    if provider.is_authenticated() {
        info!("loaded persisted credential; refresh will run on demand");
    } else {
        info!("no stored credential; visit /login to authenticate");
    }

    let state = Arc::new(AppState {
        provider,
        sink: CsvSink::new(&config.csv_path),
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("listening on http://{}", config.bind);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
