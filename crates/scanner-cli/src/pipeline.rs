//! Per-ticker fan-out: fetch -> analyze -> upsert, bounded by a
//! semaphore. Tickers are independent, so ordering between tasks is
//! irrelevant and one ticker's bad data never affects another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use analysis_core::{MetricsProvider, RawStockMetrics};
use analysis_store::AnalysisStore;
use tokio::sync::Semaphore;

pub struct PipelineOutcome {
    pub analyzed: u64,
    /// Tickers whose provider fetch failed and were analyzed from an
    /// all-missing record instead.
    pub fetch_failures: u64,
}

/// Run the scan over a ticker universe. `provider: None` means offline
/// mode: every ticker is analyzed from an all-missing record.
pub async fn run_pipeline(
    provider: Option<Arc<dyn MetricsProvider>>,
    store: Arc<AnalysisStore>,
    tickers: Vec<String>,
    concurrency: usize,
) -> anyhow::Result<PipelineOutcome> {
    let total = tickers.len();
    let analyzed = Arc::new(AtomicU64::new(0));
    let fetch_failures = Arc::new(AtomicU64::new(0));
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let mut handles = Vec::with_capacity(total);

    for ticker in tickers {
        let provider = provider.clone();
        let store = Arc::clone(&store);
        let analyzed = Arc::clone(&analyzed);
        let fetch_failures = Arc::clone(&fetch_failures);
        let semaphore = Arc::clone(&semaphore);

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            // Provider failures degrade to an all-missing record; the
            // engine still produces a well-formed N/A row for it.
            let raw = match &provider {
                Some(p) => match p.get_metrics(&ticker).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!("{}: provider failed ({}), recording as missing", ticker, e);
                        fetch_failures.fetch_add(1, Ordering::Relaxed);
                        RawStockMetrics::missing(ticker.as_str())
                    }
                },
                None => RawStockMetrics::missing(ticker.as_str()),
            };

            let record = valuation_engine::analyze(&raw);

            let stored = async {
                store.upsert_raw_metrics(&raw).await?;
                store.upsert_analysis(&record).await
            }
            .await;

            match stored {
                Ok(()) => {
                    let done = analyzed.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::info!(
                        "[{}/{}] {} => {} ({})",
                        done,
                        total,
                        ticker,
                        record
                            .investment_score
                            .as_f64()
                            .map(|s| format!("{:.1}", s))
                            .unwrap_or_else(|| "N/A".to_string()),
                        record.score_category.label()
                    );
                }
                Err(e) => tracing::warn!("{}: store failed: {}", ticker, e),
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        let _ = handle.await;
    }

    Ok(PipelineOutcome {
        analyzed: analyzed.load(Ordering::Relaxed),
        fetch_failures: fetch_failures.load(Ordering::Relaxed),
    })
}
