//! CAPM expected return and a simplified Sharpe-style risk-adjusted
//! return using a fixed return spread instead of realized volatility.

use analysis_core::{Metric, RawStockMetrics, RiskReturnEstimates};

pub const RISK_FREE_RATE: f64 = 0.04;
pub const MARKET_RETURN: f64 = 0.10;
/// Fixed denominator standing in for return volatility.
pub const RISK_SPREAD: f64 = 0.20;

pub fn compute_risk_return(raw: &RawStockMetrics) -> RiskReturnEstimates {
    let capm_return = capm_return(raw.beta);
    RiskReturnEstimates {
        capm_return,
        sharpe_ratio: sharpe_ratio(capm_return),
    }
}

/// `rf + beta * (rm - rf)`. A zero beta carries no signal and is
/// treated as absent.
pub fn capm_return(beta: Metric<f64>) -> Metric<f64> {
    beta.filter(|b| *b != 0.0)
        .compute(|b| RISK_FREE_RATE + b * (MARKET_RETURN - RISK_FREE_RATE))
}

/// `(capm - rf) / RISK_SPREAD`.
pub fn sharpe_ratio(capm_return: Metric<f64>) -> Metric<f64> {
    capm_return.compute(|r| (r - RISK_FREE_RATE) / RISK_SPREAD)
}
