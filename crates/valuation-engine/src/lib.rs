//! Valuation & scoring engine: the pure, per-ticker transformation from
//! raw provider metrics to a fully-populated [`AnalysisRecord`].
//!
//! Everything here is deterministic, synchronous, and free of I/O, so
//! running it over a ticker universe is embarrassingly parallel. Bad or
//! absent per-field data never errors; the affected derived values come
//! back `Missing` and the rest of the record is still filled in.

pub mod risk_return;
pub mod scoring;
pub mod valuation;

use analysis_core::{AnalysisRecord, RawStockMetrics, ScoreCategory};

pub use risk_return::compute_risk_return;
pub use scoring::{composite_score, undervalued_percent};
pub use valuation::compute_valuations;

/// Analyze a single ticker's raw metrics into an [`AnalysisRecord`].
///
/// Total: always terminates and always returns a well-formed record,
/// with `Missing` standing in for anything that could not be derived.
pub fn analyze(raw: &RawStockMetrics) -> AnalysisRecord {
    let valuations = compute_valuations(raw);
    let risk = compute_risk_return(raw);

    let undervalued = undervalued_percent(raw.current_price, valuations.dcf_value);
    let score = composite_score(
        risk.sharpe_ratio,
        raw.revenue_growth,
        undervalued,
        risk.capm_return,
    );

    AnalysisRecord {
        ticker: raw.ticker.clone(),
        dcf_value: valuations.dcf_value,
        graham_value: valuations.graham_value,
        capm_return: risk.capm_return,
        sharpe_ratio: risk.sharpe_ratio,
        investment_score: score,
        score_category: ScoreCategory::from_score(score),
        undervalued_percent: undervalued,
    }
}
