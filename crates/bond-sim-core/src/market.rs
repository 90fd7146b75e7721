//! Reference market data shown next to the simulator: end-of-day quotes for
//! benchmark government bonds and the daily "directors dealings" disclosure
//! file. Everything here works on payloads that have already been fetched.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;

use crate::error::BondSimError;
use crate::types::{with_metadata, ComputationOutput};
use crate::BondSimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Benchmark sovereign bonds tracked by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SovereignBenchmark {
    /// 10-year U.S. Treasury note
    Us10Y,
    /// 10-year French OAT
    Fr10Y,
}

impl SovereignBenchmark {
    pub fn name(&self) -> &'static str {
        match self {
            SovereignBenchmark::Us10Y => "10Y U.S. Treasury Note",
            SovereignBenchmark::Fr10Y => "10Y French OAT",
        }
    }

    /// End-of-day data ticker.
    pub fn ticker(&self) -> &'static str {
        match self {
            SovereignBenchmark::Us10Y => "US10Y.GBOND",
            SovereignBenchmark::Fr10Y => "FR10Y.GBOND",
        }
    }
}

/// One end-of-day OHLC record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondQuote {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub adjusted_close: Decimal,
    #[serde(default)]
    pub volume: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteInput {
    pub benchmark: SovereignBenchmark,
    pub quotes: Vec<BondQuote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub benchmark: String,
    pub ticker: String,
    pub latest: BondQuote,
    pub observations: usize,
}

/// A single disclosed transaction by a company director.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorsDealing {
    pub filename: String,
    #[serde(rename = "emetteur")]
    pub issuer: String,
    pub transaction: String,
    pub date: String,
    pub nature: String,
    #[serde(rename = "prix")]
    pub price: String,
    pub volume: String,
    #[serde(rename = "montant")]
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealingsSummary {
    pub count: usize,
    /// Distinct issuers, alphabetical
    pub issuers: Vec<String>,
    pub dealings: Vec<DirectorsDealing>,
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Decode a JSON array of end-of-day quotes.
pub fn parse_quotes(json: &str) -> BondSimResult<Vec<BondQuote>> {
    Ok(serde_json::from_str(json)?)
}

/// Most recent quote by date. On equal dates the earlier record wins.
pub fn latest_quote(quotes: &[BondQuote]) -> BondSimResult<&BondQuote> {
    // max_by_key keeps the last maximum, so scan backwards
    quotes
        .iter()
        .rev()
        .max_by_key(|q| q.date)
        .ok_or_else(|| BondSimError::InsufficientData("No bond quotes in response".into()))
}

/// Latest quote for a benchmark, wrapped in the standard envelope.
pub fn summarize_quotes(input: &QuoteInput) -> BondSimResult<ComputationOutput<QuoteSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let latest = latest_quote(&input.quotes)?.clone();
    debug!(
        ticker = input.benchmark.ticker(),
        date = %latest.date,
        close = %latest.close,
        "latest benchmark quote selected"
    );

    if latest.low > latest.high {
        warnings.push(format!(
            "Quote for {} has low {} above high {}.",
            latest.date, latest.low, latest.high
        ));
    }

    let output = QuoteSummary {
        benchmark: input.benchmark.name().to_string(),
        ticker: input.benchmark.ticker().to_string(),
        latest,
        observations: input.quotes.len(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "selection": "most recent date",
        "price_field": "close",
    });

    Ok(with_metadata(
        "Benchmark Sovereign Quote (end of day)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Directors dealings
// ---------------------------------------------------------------------------

/// Decode a JSON array of directors dealings records.
pub fn parse_dealings(json: &str) -> BondSimResult<Vec<DirectorsDealing>> {
    Ok(serde_json::from_str(json)?)
}

/// Name of the dealings file published for the day before `today`.
pub fn dealings_file_name(today: NaiveDate) -> BondSimResult<String> {
    let yesterday = today.pred_opt().ok_or_else(|| {
        BondSimError::invalid("date", "No calendar day precedes the given date.")
    })?;
    Ok(format!(
        "Directors_Dealings_{}.json",
        yesterday.format("%Y-%m-%d")
    ))
}

/// Count and list dealings. An empty file is reported, not rejected.
pub fn summarize_dealings(
    dealings: Vec<DirectorsDealing>,
) -> BondSimResult<ComputationOutput<DealingsSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if dealings.is_empty() {
        warnings.push("No directors dealings data available".to_string());
    }

    let issuers: Vec<String> = dealings
        .iter()
        .map(|d| d.issuer.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let output = DealingsSummary {
        count: dealings.len(),
        issuers,
        dealings,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "source": "daily directors dealings disclosure file",
    });

    Ok(with_metadata(
        "Directors Dealings Summary",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const QUOTES: &str = r#"[
        {"date":"2025-03-27","open":4.31,"high":4.37,"low":4.29,"close":4.36,"adjusted_close":4.36,"volume":0},
        {"date":"2025-03-28","open":4.36,"high":4.38,"low":4.25,"close":4.27,"adjusted_close":4.27,"volume":0},
        {"date":"2025-03-26","open":4.33,"high":4.35,"low":4.30,"close":4.33,"adjusted_close":4.33,"volume":0}
    ]"#;

    const DEALINGS: &str = r#"[
        {"filename":"a.pdf","emetteur":"TOTALENERGIES SE","transaction":"Acquisition","date":"2025-07-04",
         "nature":"Action","prix":"58.10 EUR","volume":"1000","montant":"58100 EUR"},
        {"filename":"b.pdf","emetteur":"AIRBUS SE","transaction":"Cession","date":"2025-07-04",
         "nature":"Action","prix":"170.00 EUR","volume":"200","montant":"34000 EUR"},
        {"filename":"c.pdf","emetteur":"AIRBUS SE","transaction":"Acquisition","date":"2025-07-03",
         "nature":"Action","prix":"168.50 EUR","volume":"50","montant":"8425 EUR"}
    ]"#;

    #[test]
    fn test_latest_quote_is_most_recent_date() {
        let quotes = parse_quotes(QUOTES).unwrap();
        let latest = latest_quote(&quotes).unwrap();
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2025, 3, 28).unwrap());
        assert_eq!(latest.close, dec!(4.27));
    }

    #[test]
    fn test_latest_quote_tie_keeps_first_record() {
        let mut quotes = parse_quotes(QUOTES).unwrap();
        let mut restated = quotes[1].clone();
        restated.close = dec!(4.99);
        quotes.push(restated);
        let latest = latest_quote(&quotes).unwrap();
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2025, 3, 28).unwrap());
        assert_eq!(latest.close, dec!(4.27));
    }

    #[test]
    fn test_latest_quote_empty_is_insufficient_data() {
        let err = latest_quote(&[]).unwrap_err();
        assert!(matches!(err, BondSimError::InsufficientData(_)));
    }

    #[test]
    fn test_bad_quote_payload_is_serialization_error() {
        let err = parse_quotes("{\"data\": []}").unwrap_err();
        assert!(matches!(err, BondSimError::SerializationError(_)));
    }

    #[test]
    fn test_summarize_quotes() {
        let input = QuoteInput {
            benchmark: SovereignBenchmark::Fr10Y,
            quotes: parse_quotes(QUOTES).unwrap(),
        };
        let out = summarize_quotes(&input).unwrap();
        assert_eq!(out.result.benchmark, "10Y French OAT");
        assert_eq!(out.result.ticker, "FR10Y.GBOND");
        assert_eq!(out.result.observations, 3);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_dealings_wire_names() {
        let dealings = parse_dealings(DEALINGS).unwrap();
        assert_eq!(dealings[0].issuer, "TOTALENERGIES SE");
        assert_eq!(dealings[0].price, "58.10 EUR");
        assert_eq!(dealings[0].amount, "58100 EUR");
    }

    #[test]
    fn test_summarize_dealings_distinct_issuers() {
        let out = summarize_dealings(parse_dealings(DEALINGS).unwrap()).unwrap();
        assert_eq!(out.result.count, 3);
        assert_eq!(
            out.result.issuers,
            vec!["AIRBUS SE".to_string(), "TOTALENERGIES SE".to_string()]
        );
    }

    #[test]
    fn test_empty_dealings_warns() {
        let out = summarize_dealings(Vec::new()).unwrap();
        assert_eq!(out.result.count, 0);
        assert_eq!(out.warnings, vec!["No directors dealings data available".to_string()]);
    }

    #[test]
    fn test_dealings_file_name_uses_previous_day() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(
            dealings_file_name(today).unwrap(),
            "Directors_Dealings_2025-02-28.json"
        );
    }
}
