use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use bond_sim_core::market::{self, BondQuote, DirectorsDealing, QuoteInput, SovereignBenchmark};

use crate::input;

/// Benchmark sovereign bond
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BenchmarkArg {
    Us10y,
    Fr10y,
}

impl From<BenchmarkArg> for SovereignBenchmark {
    fn from(arg: BenchmarkArg) -> Self {
        match arg {
            BenchmarkArg::Us10y => SovereignBenchmark::Us10Y,
            BenchmarkArg::Fr10y => SovereignBenchmark::Fr10Y,
        }
    }
}

/// Arguments for the benchmark quote lookup
#[derive(Args)]
pub struct QuoteArgs {
    /// Which benchmark the quotes belong to
    #[arg(long, value_enum, default_value = "us10y")]
    pub benchmark: BenchmarkArg,

    /// Path to the end-of-day JSON array (as returned by the data provider)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the directors dealings summary
#[derive(Args)]
pub struct DealingsArgs {
    /// Path to a directors dealings JSON array
    #[arg(long)]
    pub input: Option<String>,

    /// Print the name of the file published for the day before this date
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn run_quote(args: QuoteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let quotes: Vec<BondQuote> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <quotes.json> or stdin required for quote".into());
    };
    let result = market::summarize_quotes(&QuoteInput {
        benchmark: args.benchmark.into(),
        quotes,
    })?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_dealings(args: DealingsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dealings: Vec<DirectorsDealing> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else if let Some(date) = args.date {
        return Ok(json!({ "file_name": market::dealings_file_name(date)? }));
    } else {
        return Err("--input <dealings.json>, stdin or --date required for dealings".into());
    };
    let result = market::summarize_dealings(dealings)?;
    Ok(serde_json::to_value(result)?)
}
