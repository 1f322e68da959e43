//! Intrinsic-value formulas: DCF, Gordon-growth ("Graham") dividend
//! value, and projected future market value.

use analysis_core::{Metric, RawStockMetrics, ValuationEstimates};

/// Fixed discount rate shared by the DCF and dividend models. A
/// simplifying assumption, not derived from CAPM.
pub const DISCOUNT_RATE: f64 = 0.10;
/// Projection horizon for DCF discounting and future-value compounding.
pub const PROJECTION_YEARS: i32 = 5;

pub fn compute_valuations(raw: &RawStockMetrics) -> ValuationEstimates {
    ValuationEstimates {
        dcf_value: dcf_value(raw.free_cash_flow),
        graham_value: graham_value(raw.dividend_rate, raw.revenue_growth),
        future_value: future_value(raw.market_cap, raw.revenue_growth),
    }
}

/// Free cash flow discounted over the fixed horizon:
/// `fcf / (1 + DISCOUNT_RATE)^5`. Zero FCF carries no signal, so it is
/// treated the same as absent data.
pub fn dcf_value(free_cash_flow: Metric<f64>) -> Metric<f64> {
    free_cash_flow
        .filter(|fcf| *fcf != 0.0)
        .compute(|fcf| fcf / (1.0 + DISCOUNT_RATE).powi(PROJECTION_YEARS))
}

/// Gordon-growth dividend value: `dividend / (DISCOUNT_RATE - growth)`.
///
/// Growth must stay strictly below the discount rate (and above -1000%)
/// to keep the denominator positive and bounded; anything outside that
/// band degrades to `Missing`.
pub fn graham_value(dividend_rate: Metric<f64>, revenue_growth: Metric<f64>) -> Metric<f64> {
    let dividend = dividend_rate.filter(|d| *d != 0.0);
    let growth = revenue_growth.filter(|g| *g > -10.0 && *g < DISCOUNT_RATE);
    dividend.compute2(growth, |d, g| d / (DISCOUNT_RATE - g))
}

/// Market cap compounded at the revenue growth rate:
/// `market_cap * (1 + growth)^5`. Requires a positive cap and growth
/// above -100% so the base of the exponent stays non-negative.
pub fn future_value(market_cap: Metric<f64>, revenue_growth: Metric<f64>) -> Metric<f64> {
    let cap = market_cap.filter(|mc| *mc > 0.0);
    let growth = revenue_growth.filter(|g| *g > -1.0);
    cap.compute2(growth, |mc, g| mc * (1.0 + g).powi(PROJECTION_YEARS))
}
