use async_trait::async_trait;

use crate::{AnalysisError, RawStockMetrics};

/// Trait for market-data providers supplying per-ticker raw metrics.
///
/// Implementations must return `Missing` fields for anything they cannot
/// supply rather than inventing numbers. A hard failure (network, auth)
/// is an `Err`; the caller absorbs it into an all-`Missing` record.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn get_metrics(&self, ticker: &str) -> Result<RawStockMetrics, AnalysisError>;
}
