//! Required-rate build-up: reference rate plus a credit spread whose
//! admissible range depends on the issuer's rating.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::bond::spec::{CreditRating, RateRange};
use crate::error::BondSimError;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::BondSimResult;

/// Input for deriving a bond's required rate from its credit quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredRateInput {
    /// Benchmark (risk-free) rate as a decimal
    pub reference_rate: Rate,
    /// Spread over the benchmark; defaults to the rating's standard spread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_spread: Option<Rate>,
    #[serde(default)]
    pub credit_rating: CreditRating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredRateOutput {
    /// reference_rate + credit_spread
    pub required_rate: Rate,
    pub credit_spread: Rate,
    pub credit_spread_range: RateRange,
    pub typical_coupon_range: RateRange,
}

/// Derive the discount rate for a bond of the given rating.
pub fn compute_required_rate(
    input: &RequiredRateInput,
) -> BondSimResult<ComputationOutput<RequiredRateOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.reference_rate < Decimal::ZERO {
        return Err(BondSimError::invalid(
            "reference_rate",
            "Reference rate must be non-negative.",
        ));
    }

    let rating = input.credit_rating;
    let spread_range = rating.credit_spread_range();
    let credit_spread = match input.credit_spread {
        Some(spread) => spread,
        None => {
            warnings.push(format!(
                "No credit spread given; using the {rating} default of {}.",
                rating.default_credit_spread()
            ));
            rating.default_credit_spread()
        }
    };

    if !spread_range.contains(credit_spread) {
        return Err(BondSimError::invalid(
            "credit_spread",
            format!(
                "{rating} spreads must lie between {} and {}, got {credit_spread}.",
                spread_range.min, spread_range.max
            ),
        ));
    }

    let required_rate = input.reference_rate + credit_spread;
    if required_rate <= Decimal::ZERO {
        return Err(BondSimError::invalid(
            "required_rate",
            "Reference rate plus spread must be positive to discount cash flows.",
        ));
    }

    let output = RequiredRateOutput {
        required_rate,
        credit_spread,
        credit_spread_range: spread_range,
        typical_coupon_range: rating.typical_coupon_range(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "credit_rating": rating.label(),
        "build_up": "reference rate + credit spread",
    });

    Ok(with_metadata(
        "Required Rate Build-Up (reference rate + rating spread)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
