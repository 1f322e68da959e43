//! Colorized terminal report: the per-ticker analysis grid plus a
//! portfolio summary. Pure presentation — consumes [`ReportRow`]s that
//! are already sorted by the store, performs no computation beyond
//! formatting and aggregation for the summary.

pub mod format;

use analysis_core::{Metric, ReportRow, ScoreCategory};
use comfy_table::{presets, Attribute, Cell, Color, Table};

use format::{
    format_currency, format_general, format_percent_points, format_percentage, format_score,
};

/// Visual emphasis for a rating band. Must stay aligned with the
/// classifier bands; the report derives it from the stored category, so
/// a classifier change propagates here automatically.
fn category_color(category: ScoreCategory) -> (Color, bool) {
    match category {
        ScoreCategory::StrongBuy => (Color::Green, true),
        ScoreCategory::Buy => (Color::Green, false),
        ScoreCategory::Hold => (Color::Yellow, false),
        ScoreCategory::Sell => (Color::Red, false),
        ScoreCategory::StrongSell => (Color::Red, true),
        ScoreCategory::NotRated => (Color::White, false),
    }
}

/// Green for positive, red for negative, neutral otherwise.
fn value_color(value: Metric<f64>) -> Color {
    match value.as_f64() {
        Some(v) if v > 0.0 => Color::Green,
        Some(v) if v < 0.0 => Color::Red,
        _ => Color::White,
    }
}

fn category_cell(text: &str, category: ScoreCategory) -> Cell {
    let (color, bright) = category_color(category);
    let cell = Cell::new(text).fg(color);
    if bright {
        cell.add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

/// Build the 13-column analysis grid.
pub fn report_table(rows: &[ReportRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec![
        "Ticker", "Price", "Mkt Cap", "Rev Growth", "Beta", "P/E", "DCF Value", "GG Value",
        "CAPM", "Sharpe", "Score", "Rating", "Under/Over",
    ]);

    for row in rows {
        let category = row.analysis.score_category;
        table.add_row(vec![
            Cell::new(&row.raw.ticker).add_attribute(Attribute::Bold),
            Cell::new(format_currency(row.raw.current_price)),
            Cell::new(format_currency(row.raw.market_cap)),
            Cell::new(format_percentage(row.raw.revenue_growth)).fg(value_color(row.raw.revenue_growth)),
            Cell::new(format_general(row.raw.beta)),
            Cell::new(format_general(row.raw.pe_ratio)),
            Cell::new(format_currency(row.analysis.dcf_value))
                .fg(value_color(row.analysis.undervalued_percent)),
            Cell::new(format_currency(row.analysis.graham_value)),
            Cell::new(format_percentage(row.analysis.capm_return)),
            Cell::new(format_general(row.analysis.sharpe_ratio)),
            category_cell(&format_score(row.analysis.investment_score), category),
            category_cell(category.label(), category),
            Cell::new(format_percent_points(row.analysis.undervalued_percent))
                .fg(value_color(row.analysis.undervalued_percent)),
        ]);
    }

    table
}

/// Mean over present values only; `None` when nothing is present.
fn mean(values: impl Iterator<Item = Metric<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.filter_map(|m| m.as_f64()).collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Portfolio summary: category counts, key averages, top opportunities,
/// and low-score warnings.
pub fn summary_text(rows: &[ReportRow]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "PORTFOLIO SUMMARY");
    let _ = writeln!(out, "{}", "-".repeat(50));

    let categories = [
        ScoreCategory::StrongBuy,
        ScoreCategory::Buy,
        ScoreCategory::Hold,
        ScoreCategory::Sell,
        ScoreCategory::StrongSell,
        ScoreCategory::NotRated,
    ];
    let _ = writeln!(out, "\nInvestment Categories:");
    for category in categories {
        let count = rows
            .iter()
            .filter(|r| r.analysis.score_category == category)
            .count();
        if count > 0 {
            let _ = writeln!(out, "  {}: {} stocks", category.label(), count);
        }
    }

    let _ = writeln!(out, "\nKey Metrics:");
    if let Some(avg) = mean(rows.iter().map(|r| r.analysis.investment_score)) {
        let _ = writeln!(out, "  Average Investment Score: {:.1}", avg);
    }
    if let Some(avg) = mean(rows.iter().map(|r| r.analysis.sharpe_ratio)) {
        let _ = writeln!(out, "  Average Sharpe Ratio: {:.2}", avg);
    }
    if let Some(avg) = mean(rows.iter().map(|r| r.raw.beta)) {
        let _ = writeln!(out, "  Portfolio Average Beta: {:.2}", avg);
    }

    // Rows arrive sorted score-desc, so the top opportunities lead.
    let top: Vec<&ReportRow> = rows
        .iter()
        .filter(|r| r.analysis.investment_score.is_present())
        .take(3)
        .collect();
    if !top.is_empty() {
        let _ = writeln!(out, "\nTOP OPPORTUNITIES:");
        for row in top {
            let _ = writeln!(
                out,
                "  - {}: Score {}, Undervalued by {}",
                row.raw.ticker,
                format_score(row.analysis.investment_score),
                format_percent_points(row.analysis.undervalued_percent),
            );
        }
    }

    let risky: Vec<&ReportRow> = rows
        .iter()
        .filter(|r| matches!(r.analysis.investment_score.as_f64(), Some(s) if s < 35.0))
        .collect();
    if !risky.is_empty() {
        let _ = writeln!(out, "\nWARNINGS:");
        for row in risky {
            let _ = writeln!(
                out,
                "  - {}: Low score ({})",
                row.raw.ticker,
                format_score(row.analysis.investment_score),
            );
        }
    }

    let _ = writeln!(out, "\nScore bands: STRONG BUY 80-100 | BUY 65-79 | HOLD 50-64 | SELL 35-49 | STRONG SELL 0-34");
    out
}

/// Print the full report to stdout.
pub fn print_report(rows: &[ReportRow]) {
    println!("\n{}", "=".repeat(100));
    println!("FINANCIAL ANALYSIS RESULTS - DCF, CAPM & INVESTMENT SCORING");
    println!("{}\n", "=".repeat(100));

    if rows.is_empty() {
        println!("No analysis data found. Run analysis first.");
        return;
    }

    println!("{}", report_table(rows));
    println!("\n{}", summary_text(rows));
}
