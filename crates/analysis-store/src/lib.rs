//! SQLite persistence for raw metrics and analysis records.
//!
//! Two ticker-keyed tables, each written with upserts so a re-run
//! replaces a ticker's previous figures. `Missing` metrics round-trip
//! through SQL NULL.

use analysis_core::{
    AnalysisError, AnalysisRecord, Metric, RawStockMetrics, ReportRow, ScoreCategory,
};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

pub struct AnalysisStore {
    pool: SqlitePool,
}

impl AnalysisStore {
    /// Open (creating if needed) the database and bootstrap the schema.
    pub async fn connect(db_path: &str) -> Result<Self, AnalysisError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?;

        // WAL so concurrent per-ticker tasks can write without blocking reads
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await
            .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?;

        let store = Self { pool };
        store.ensure_tables().await?;
        tracing::debug!("Opened analysis store at {}", db_path);
        Ok(store)
    }

    async fn ensure_tables(&self) -> Result<(), AnalysisError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stock_data (
                ticker TEXT PRIMARY KEY,
                current_price REAL,
                market_cap REAL,
                revenue_growth REAL,
                beta REAL,
                pe_ratio REAL,
                free_cash_flow REAL,
                dividend_rate REAL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stock_analysis (
                ticker TEXT PRIMARY KEY,
                dcf_value REAL,
                graham_value REAL,
                capm_return REAL,
                sharpe_ratio REAL,
                investment_score REAL,
                score_category TEXT,
                undervalued_percent REAL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?;

        tracing::debug!("Schema bootstrap complete");
        Ok(())
    }

    pub async fn upsert_raw_metrics(&self, raw: &RawStockMetrics) -> Result<(), AnalysisError> {
        sqlx::query(
            r#"
            INSERT INTO stock_data
                (ticker, current_price, market_cap, revenue_growth, beta,
                 pe_ratio, free_cash_flow, dividend_rate)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(ticker) DO UPDATE SET
                current_price = excluded.current_price,
                market_cap = excluded.market_cap,
                revenue_growth = excluded.revenue_growth,
                beta = excluded.beta,
                pe_ratio = excluded.pe_ratio,
                free_cash_flow = excluded.free_cash_flow,
                dividend_rate = excluded.dividend_rate
            "#,
        )
        .bind(&raw.ticker)
        .bind(raw.current_price.as_f64())
        .bind(raw.market_cap.as_f64())
        .bind(raw.revenue_growth.as_f64())
        .bind(raw.beta.as_f64())
        .bind(raw.pe_ratio.as_f64())
        .bind(raw.free_cash_flow.as_f64())
        .bind(raw.dividend_rate.as_f64())
        .execute(&self.pool)
        .await
        .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    pub async fn upsert_analysis(&self, record: &AnalysisRecord) -> Result<(), AnalysisError> {
        sqlx::query(
            r#"
            INSERT INTO stock_analysis
                (ticker, dcf_value, graham_value, capm_return, sharpe_ratio,
                 investment_score, score_category, undervalued_percent)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(ticker) DO UPDATE SET
                dcf_value = excluded.dcf_value,
                graham_value = excluded.graham_value,
                capm_return = excluded.capm_return,
                sharpe_ratio = excluded.sharpe_ratio,
                investment_score = excluded.investment_score,
                score_category = excluded.score_category,
                undervalued_percent = excluded.undervalued_percent
            "#,
        )
        .bind(&record.ticker)
        .bind(record.dcf_value.as_f64())
        .bind(record.graham_value.as_f64())
        .bind(record.capm_return.as_f64())
        .bind(record.sharpe_ratio.as_f64())
        .bind(record.investment_score.as_f64())
        .bind(record.score_category.label())
        .bind(record.undervalued_percent.as_f64())
        .execute(&self.pool)
        .await
        .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Joined raw + analysis rows, best score first. SQLite treats NULL
    /// as smaller than any value, so DESC already puts unscored tickers
    /// last.
    pub async fn fetch_report(&self) -> Result<Vec<ReportRow>, AnalysisError> {
        let rows = sqlx::query(
            r#"
            SELECT
                a.ticker,
                d.current_price, d.market_cap, d.revenue_growth, d.beta,
                d.pe_ratio, d.free_cash_flow, d.dividend_rate,
                a.dcf_value, a.graham_value, a.capm_return, a.sharpe_ratio,
                a.investment_score, a.score_category, a.undervalued_percent
            FROM stock_analysis a
            JOIN stock_data d ON a.ticker = d.ticker
            ORDER BY a.investment_score DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AnalysisError::DatabaseError(e.to_string()))?;

        let mut report = Vec::with_capacity(rows.len());
        for row in rows {
            let ticker: String = row.get("ticker");
            let category: Option<String> = row.get("score_category");
            report.push(ReportRow {
                raw: RawStockMetrics {
                    ticker: ticker.clone(),
                    current_price: Metric::from_option(row.get("current_price")),
                    market_cap: Metric::from_option(row.get("market_cap")),
                    revenue_growth: Metric::from_option(row.get("revenue_growth")),
                    beta: Metric::from_option(row.get("beta")),
                    pe_ratio: Metric::from_option(row.get("pe_ratio")),
                    free_cash_flow: Metric::from_option(row.get("free_cash_flow")),
                    dividend_rate: Metric::from_option(row.get("dividend_rate")),
                },
                analysis: AnalysisRecord {
                    ticker,
                    dcf_value: Metric::from_option(row.get("dcf_value")),
                    graham_value: Metric::from_option(row.get("graham_value")),
                    capm_return: Metric::from_option(row.get("capm_return")),
                    sharpe_ratio: Metric::from_option(row.get("sharpe_ratio")),
                    investment_score: Metric::from_option(row.get("investment_score")),
                    score_category: category
                        .as_deref()
                        .and_then(ScoreCategory::from_label)
                        .unwrap_or(ScoreCategory::NotRated),
                    undervalued_percent: Metric::from_option(row.get("undervalued_percent")),
                },
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str, score: Metric<f64>) -> AnalysisRecord {
        AnalysisRecord {
            ticker: ticker.to_string(),
            dcf_value: Metric::Present(120.0),
            graham_value: Metric::Missing,
            capm_return: Metric::Present(0.10),
            sharpe_ratio: Metric::Present(0.30),
            investment_score: score,
            score_category: ScoreCategory::from_score(score),
            undervalued_percent: Metric::Present(20.0),
        }
    }

    fn raw(ticker: &str) -> RawStockMetrics {
        RawStockMetrics {
            ticker: ticker.to_string(),
            current_price: Metric::Present(100.0),
            market_cap: Metric::Present(1.0e9),
            revenue_growth: Metric::Missing,
            beta: Metric::Present(1.0),
            pe_ratio: Metric::Present(20.0),
            free_cash_flow: Metric::Present(1.0e6),
            dividend_rate: Metric::Missing,
        }
    }

    async fn temp_store() -> (tempfile::TempDir, AnalysisStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = AnalysisStore::connect(path.to_str().unwrap()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_upsert_and_null_round_trip() {
        let (_dir, store) = temp_store().await;
        store.upsert_raw_metrics(&raw("AAPL")).await.unwrap();
        store
            .upsert_analysis(&record("AAPL", Metric::Present(72.5)))
            .await
            .unwrap();

        let rows = store.fetch_report().await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.raw.ticker, "AAPL");
        assert!(row.raw.revenue_growth.is_missing());
        assert!(row.analysis.graham_value.is_missing());
        assert_eq!(row.analysis.investment_score, Metric::Present(72.5));
        assert_eq!(row.analysis.score_category, ScoreCategory::Buy);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let (_dir, store) = temp_store().await;
        store.upsert_raw_metrics(&raw("MSFT")).await.unwrap();
        store
            .upsert_analysis(&record("MSFT", Metric::Present(40.0)))
            .await
            .unwrap();
        store
            .upsert_analysis(&record("MSFT", Metric::Present(85.0)))
            .await
            .unwrap();

        let rows = store.fetch_report().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].analysis.investment_score, Metric::Present(85.0));
        assert_eq!(rows[0].analysis.score_category, ScoreCategory::StrongBuy);
    }

    #[tokio::test]
    async fn test_report_sorted_desc_nulls_last() {
        let (_dir, store) = temp_store().await;
        for (ticker, score) in [
            ("LOW", Metric::Present(20.0)),
            ("NONE", Metric::Missing),
            ("HIGH", Metric::Present(90.0)),
            ("MID", Metric::Present(55.0)),
        ] {
            store.upsert_raw_metrics(&raw(ticker)).await.unwrap();
            store.upsert_analysis(&record(ticker, score)).await.unwrap();
        }

        let rows = store.fetch_report().await.unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.analysis.ticker.as_str()).collect();
        assert_eq!(order, vec!["HIGH", "MID", "LOW", "NONE"]);
        assert_eq!(rows[3].analysis.score_category, ScoreCategory::NotRated);
    }
}
