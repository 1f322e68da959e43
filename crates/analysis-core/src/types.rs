use serde::{Deserialize, Serialize};

use crate::metric::Metric;

/// Raw per-ticker metrics as delivered by the market-data provider.
///
/// Immutable once constructed; any field the provider could not supply
/// is `Missing`, never a fabricated number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStockMetrics {
    pub ticker: String,
    #[serde(default)]
    pub current_price: Metric<f64>,
    #[serde(default)]
    pub market_cap: Metric<f64>,
    #[serde(default)]
    pub revenue_growth: Metric<f64>,
    #[serde(default)]
    pub beta: Metric<f64>,
    #[serde(default)]
    pub pe_ratio: Metric<f64>,
    #[serde(default)]
    pub free_cash_flow: Metric<f64>,
    #[serde(default)]
    pub dividend_rate: Metric<f64>,
}

impl RawStockMetrics {
    /// All-`Missing` record for a ticker the provider failed on. The
    /// pipeline still produces a well-formed (N/A) analysis row for it.
    pub fn missing(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            current_price: Metric::Missing,
            market_cap: Metric::Missing,
            revenue_growth: Metric::Missing,
            beta: Metric::Missing,
            pe_ratio: Metric::Missing,
            free_cash_flow: Metric::Missing,
            dividend_rate: Metric::Missing,
        }
    }
}

/// Intrinsic-value estimates for one ticker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValuationEstimates {
    pub dcf_value: Metric<f64>,
    pub graham_value: Metric<f64>,
    pub future_value: Metric<f64>,
}

/// CAPM-implied expected return and risk-adjusted return.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskReturnEstimates {
    pub capm_return: Metric<f64>,
    pub sharpe_ratio: Metric<f64>,
}

/// Discrete rating band derived from the composite investment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreCategory {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
    /// No composite score could be computed.
    NotRated,
}

impl ScoreCategory {
    /// Threshold ladder over the 0-100 composite score. Each band is
    /// inclusive at its lower bound: exactly 80 is StrongBuy, exactly
    /// 65 is Buy, and so on.
    pub fn from_score(score: Metric<f64>) -> Self {
        match score {
            Metric::Present(s) if s >= 80.0 => ScoreCategory::StrongBuy,
            Metric::Present(s) if s >= 65.0 => ScoreCategory::Buy,
            Metric::Present(s) if s >= 50.0 => ScoreCategory::Hold,
            Metric::Present(s) if s >= 35.0 => ScoreCategory::Sell,
            Metric::Present(_) => ScoreCategory::StrongSell,
            Metric::Missing => ScoreCategory::NotRated,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreCategory::StrongBuy => "STRONG BUY",
            ScoreCategory::Buy => "BUY",
            ScoreCategory::Hold => "HOLD",
            ScoreCategory::Sell => "SELL",
            ScoreCategory::StrongSell => "STRONG SELL",
            ScoreCategory::NotRated => "N/A",
        }
    }

    /// Parse the stored label back into a category (DB round-trip).
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "STRONG BUY" => Some(ScoreCategory::StrongBuy),
            "BUY" => Some(ScoreCategory::Buy),
            "HOLD" => Some(ScoreCategory::Hold),
            "SELL" => Some(ScoreCategory::Sell),
            "STRONG SELL" => Some(ScoreCategory::StrongSell),
            "N/A" => Some(ScoreCategory::NotRated),
            _ => None,
        }
    }
}

/// The engine's sole output: one fully-populated analysis row per ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub ticker: String,
    pub dcf_value: Metric<f64>,
    pub graham_value: Metric<f64>,
    pub capm_return: Metric<f64>,
    pub sharpe_ratio: Metric<f64>,
    /// Composite score, clamped to [0, 100] when present.
    pub investment_score: Metric<f64>,
    pub score_category: ScoreCategory,
    pub undervalued_percent: Metric<f64>,
}

/// One row of the final report: a ticker's stored raw metrics joined
/// with its analysis record. Produced by the store, consumed read-only
/// by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub raw: RawStockMetrics,
    pub analysis: AnalysisRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_band_boundaries_inclusive_low() {
        let cases = [
            (100.0, ScoreCategory::StrongBuy),
            (80.0, ScoreCategory::StrongBuy),
            (79.9, ScoreCategory::Buy),
            (65.0, ScoreCategory::Buy),
            (64.9, ScoreCategory::Hold),
            (50.0, ScoreCategory::Hold),
            (49.9, ScoreCategory::Sell),
            (35.0, ScoreCategory::Sell),
            (34.9, ScoreCategory::StrongSell),
            (0.0, ScoreCategory::StrongSell),
        ];
        for (score, expected) in cases {
            assert_eq!(
                ScoreCategory::from_score(Metric::Present(score)),
                expected,
                "score {score}"
            );
        }
        assert_eq!(
            ScoreCategory::from_score(Metric::Missing),
            ScoreCategory::NotRated
        );
    }

    #[test]
    fn test_category_is_pure_in_score() {
        for s in [0.0, 17.5, 35.0, 50.0, 64.99, 80.0, 100.0] {
            assert_eq!(
                ScoreCategory::from_score(Metric::Present(s)),
                ScoreCategory::from_score(Metric::Present(s))
            );
        }
    }

    #[test]
    fn test_label_round_trip() {
        for cat in [
            ScoreCategory::StrongBuy,
            ScoreCategory::Buy,
            ScoreCategory::Hold,
            ScoreCategory::Sell,
            ScoreCategory::StrongSell,
            ScoreCategory::NotRated,
        ] {
            assert_eq!(ScoreCategory::from_label(cat.label()), Some(cat));
        }
        assert_eq!(ScoreCategory::from_label("MAYBE"), None);
    }

    #[test]
    fn test_missing_constructor_is_all_missing() {
        let raw = RawStockMetrics::missing("AAPL");
        assert_eq!(raw.ticker, "AAPL");
        assert!(raw.current_price.is_missing());
        assert!(raw.market_cap.is_missing());
        assert!(raw.revenue_growth.is_missing());
        assert!(raw.beta.is_missing());
        assert!(raw.pe_ratio.is_missing());
        assert!(raw.free_cash_flow.is_missing());
        assert!(raw.dividend_rate.is_missing());
    }
}
