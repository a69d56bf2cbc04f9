use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;

use pagecheck_core::checker::Checker;
use pagecheck_core::config::Config;
use pagecheck_core::store::{SqliteStore, UrlStore};

use pagecheck_web::app::{self, AppState};
use pagecheck_web::flash::FlashStore;

#[derive(Parser, Debug)]
#[command(
    name = "pagecheck",
    version,
    about = "Register websites and check their status and SEO metadata"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0) => "info",
        (_, 1) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("cannot read configuration")?;

    let store = if config.database.as_os_str() == ":memory:" {
        SqliteStore::in_memory()
    } else {
        SqliteStore::open(&config.database)
    }
    .with_context(|| format!("cannot open database at {}", config.database.display()))?;

    let stats = store.stats().await?;
    info!(
        database = %config.database.display(),
        urls = stats.url_count,
        checks = stats.check_count,
        "store ready"
    );

    let checker = Checker::new(config.fetch_timeout).context("cannot build checker")?;

    let state = AppState {
        store: Arc::new(store),
        checker: Arc::new(checker),
        flash: FlashStore::new(),
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("cannot bind port {}", config.port))?;
    info!(port = config.port, "pagecheck listening");

    axum::serve(listener, app::router(state))
        .await
        .context("HTTP server error")?;
    Ok(())
}
