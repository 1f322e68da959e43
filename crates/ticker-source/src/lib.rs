//! Ticker-universe loading from a delimited text file.
//!
//! The file is expected to carry a header row with a `ticker` column,
//! matched case-insensitively. Rows without a ticker are skipped with a
//! warning; duplicates keep their first occurrence.

use analysis_core::AnalysisError;
use std::collections::HashSet;
use std::path::Path;

/// Load the ticker universe from a CSV file.
pub fn load_tickers(path: impl AsRef<Path>) -> Result<Vec<String>, AnalysisError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AnalysisError::IoError(format!("{}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::IoError(e.to_string()))?
        .clone();
    let ticker_idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("ticker"))
        .ok_or_else(|| {
            AnalysisError::InvalidData(format!("{}: no 'ticker' column", path.display()))
        })?;

    parse_records(
        reader.records().map(|r| r.map_err(|e| e.to_string())),
        ticker_idx,
    )
}

fn parse_records(
    records: impl Iterator<Item = Result<csv::StringRecord, String>>,
    ticker_idx: usize,
) -> Result<Vec<String>, AnalysisError> {
    let mut seen = HashSet::new();
    let mut tickers = Vec::new();

    for (row, result) in records.enumerate() {
        let record = result.map_err(AnalysisError::IoError)?;
        let ticker = record
            .get(ticker_idx)
            .map(|t| t.trim().to_uppercase())
            .unwrap_or_default();
        if ticker.is_empty() {
            tracing::warn!("Skipping row {} with no ticker", row + 2);
            continue;
        }
        if seen.insert(ticker.clone()) {
            tickers.push(ticker);
        }
    }

    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_from_str(data: &str) -> Result<Vec<String>, AnalysisError> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(data.as_bytes()).unwrap();
        load_tickers(file.path())
    }

    #[test]
    fn test_load_basic() {
        let tickers = load_from_str("ticker,name\nAAPL,Apple\nMSFT,Microsoft\n").unwrap();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_header_case_insensitive() {
        assert_eq!(load_from_str("Ticker\nAAPL\n").unwrap(), vec!["AAPL"]);
        assert_eq!(load_from_str("TICKER\nAAPL\n").unwrap(), vec!["AAPL"]);
    }

    #[test]
    fn test_skips_empty_and_dedupes() {
        let tickers =
            load_from_str("name,ticker\nApple,AAPL\nBlank,\nApple again,aapl\nNvidia,NVDA\n")
                .unwrap();
        assert_eq!(tickers, vec!["AAPL", "NVDA"]);
    }

    #[test]
    fn test_missing_ticker_column_errors() {
        let err = load_from_str("symbol\nAAPL\n").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidData(_)));
    }

    #[test]
    fn test_empty_file_with_header() {
        assert!(load_from_str("ticker\n").unwrap().is_empty());
    }
}
