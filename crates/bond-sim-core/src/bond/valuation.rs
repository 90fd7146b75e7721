use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::types::{with_metadata, ComputationOutput, Money};
use crate::BondSimResult;

use super::duration::{compute_convexity, compute_duration, compute_modified_duration};
use super::pricing::{classify, compute_price, PriceClassification};
use super::sensitivity::{generate_sensitivity_curve, CurvePoint, YieldRange};
use super::spec::BondSpec;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a full single-bond valuation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuationInput {
    pub bond: BondSpec,
    /// Yields for the price-vs-yield curve (default 1%..10% by 50 bp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_range: Option<YieldRange>,
}

/// Everything the simulator displays for one bond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResult {
    /// Coupon paid each period
    pub coupon: Money,
    /// Present value at the required rate
    pub price: Money,
    /// Macaulay duration in periods
    pub duration: Decimal,
    /// Macaulay duration / (1 + r)
    pub modified_duration: Decimal,
    /// Second-order price sensitivity from the same cash flows
    pub convexity: Decimal,
    pub classification: PriceClassification,
    /// Price at each yield of the requested range
    pub curve: Vec<CurvePoint>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price a bond, measure its duration and convexity, and trace its
/// price-vs-yield curve.
pub fn value_bond(input: &ValuationInput) -> BondSimResult<ComputationOutput<ValuationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let bond = &input.bond;
    bond.validate()?;

    let coupon = bond.coupon()?;
    let price = compute_price(bond.face_value, bond.required_rate, coupon, bond.maturity)?;
    let duration = compute_duration(coupon, bond.face_value, bond.required_rate, bond.maturity)?;
    let modified_duration = compute_modified_duration(duration, bond.required_rate)?;
    let convexity = compute_convexity(coupon, bond.face_value, bond.required_rate, bond.maturity)?;
    let classification = classify(price, bond.face_value);

    let yield_range = input.yield_range.clone().unwrap_or_default();
    let curve = generate_sensitivity_curve(bond, &yield_range)?.points()?;

    let typical = bond.credit_rating.typical_coupon_range();
    if !typical.contains(bond.coupon_rate) {
        warnings.push(format!(
            "Coupon rate {} is outside the typical {} band ({} to {}).",
            bond.coupon_rate, bond.credit_rating, typical.min, typical.max
        ));
    }
    if let Some((low, high)) = yield_range.bounds() {
        if bond.required_rate < low || bond.required_rate > high {
            warnings.push(format!(
                "Required rate {} lies outside the charted yields ({low} to {high}).",
                bond.required_rate
            ));
        }
    }

    debug!(
        %price,
        %duration,
        maturity = bond.maturity,
        curve_points = curve.len(),
        "bond valued"
    );

    let output = ValuationResult {
        coupon,
        price,
        duration,
        modified_duration,
        convexity,
        classification,
        curve,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "cash_flows": "level coupon each period, face value at maturity",
        "discounting": "single required rate, compounded once per period",
        "credit_rating": bond.credit_rating.label(),
        "curve_points": output.curve.len(),
    });

    Ok(with_metadata(
        "Bond Price, Macaulay Duration & Convexity (level-annuity discounting)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
