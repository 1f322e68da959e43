//! scanner: fetch raw metrics for a ticker universe, run the valuation
//! & scoring engine, persist both sides, and print the colorized report.
//!
//! Usage:
//!   cargo run -p scanner-cli -- --tickers tickers.csv
//!   cargo run -p scanner-cli -- --symbols AAPL MSFT GOOGL
//!   cargo run -p scanner-cli -- --tickers tickers.csv --offline
//!   cargo run -p scanner-cli -- --report-only

mod pipeline;

use std::sync::Arc;

use analysis_store::AnalysisStore;
use market_data::QuoteClient;
use pipeline::run_pipeline;

const DEFAULT_CONCURRENCY: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,market_data=warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let offline = args.iter().any(|a| a == "--offline");
    let report_only = args.iter().any(|a| a == "--report-only");

    let concurrency: usize = args
        .iter()
        .position(|a| a == "--concurrency")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CONCURRENCY);

    let db_path = args
        .iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("financial_analysis.db");

    let store = Arc::new(AnalysisStore::connect(db_path).await?);

    if report_only {
        let rows = store.fetch_report().await?;
        report::print_report(&rows);
        return Ok(());
    }

    let tickers: Vec<String> = if let Some(idx) = args.iter().position(|a| a == "--symbols") {
        args[idx + 1..]
            .iter()
            .take_while(|a| !a.starts_with("--"))
            .map(|s| s.to_uppercase())
            .collect()
    } else if let Some(idx) = args.iter().position(|a| a == "--tickers") {
        let path = args
            .get(idx + 1)
            .ok_or_else(|| anyhow::anyhow!("--tickers requires a path"))?;
        ticker_source::load_tickers(path)?
    } else {
        eprintln!("Usage:");
        eprintln!("  scanner --tickers PATH           Load ticker universe from CSV");
        eprintln!("  scanner --symbols AAPL MSFT ...  Analyze specific symbols");
        eprintln!("  scanner --report-only            Print the stored report and exit");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --db PATH          SQLite DB path (default: financial_analysis.db)");
        eprintln!("  --offline          Skip fetching; analyze with all-missing metrics");
        eprintln!(
            "  --concurrency N    Max parallel tickers (default: {})",
            DEFAULT_CONCURRENCY
        );
        std::process::exit(1);
    };

    if tickers.is_empty() {
        anyhow::bail!("No tickers to analyze");
    }
    tracing::info!(
        "scanner: {} tickers, db={}, offline={}, concurrency={}",
        tickers.len(),
        db_path,
        offline,
        concurrency
    );

    let provider = if offline {
        None
    } else {
        let api_key = std::env::var("QUOTE_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("QUOTE_API_KEY not set; provider calls will likely fail");
        }
        Some(Arc::new(QuoteClient::new(api_key)) as Arc<dyn analysis_core::MetricsProvider>)
    };

    let outcome = run_pipeline(provider, Arc::clone(&store), tickers, concurrency).await?;
    tracing::info!(
        "Done! {} analyzed ({} without provider data)",
        outcome.analyzed,
        outcome.fetch_failures
    );

    let rows = store.fetch_report().await?;
    report::print_report(&rows);
    Ok(())
}
