use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bond_sim_core::credit::{self, RequiredRateInput};

use super::bond::RatingArg;
use crate::input;

/// Arguments for the required-rate build-up
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RequiredRateArgs {
    /// Reference (benchmark) rate, e.g. 0.005 for 0.5%
    #[arg(long)]
    pub reference_rate: Option<Decimal>,

    /// Credit spread over the reference rate (defaults by rating)
    #[arg(long)]
    pub credit_spread: Option<Decimal>,

    /// Credit rating bucket
    #[arg(long, value_enum, default_value = "investment-grade")]
    pub credit_rating: RatingArg,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_required_rate(args: RequiredRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rate_input: RequiredRateInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RequiredRateInput {
            reference_rate: args
                .reference_rate
                .ok_or("--reference-rate is required (or provide --input)")?,
            credit_spread: args.credit_spread,
            credit_rating: args.credit_rating.into(),
        }
    };
    let result = credit::compute_required_rate(&rate_input)?;
    Ok(serde_json::to_value(result)?)
}
