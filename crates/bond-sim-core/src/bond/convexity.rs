use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BondSimError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::BondSimResult;

use super::duration::{compute_convexity, compute_duration, compute_modified_duration};
use super::pricing::{compute_price, price_at};
use super::spec::BondSpec;

/// Largest absolute yield shock accepted by [`estimate_price_change`].
const MAX_YIELD_CHANGE: Rate = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a duration + convexity shock estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceShockInput {
    pub bond: BondSpec,
    /// Parallel yield change as a decimal (0.01 = +100 bp)
    pub yield_change: Rate,
}

/// Second-order estimate of the price after a yield shock, next to the
/// exact reprice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceShockOutput {
    /// Price at the bond's required rate
    pub base_price: Money,
    pub modified_duration: Decimal,
    pub convexity: Decimal,
    /// -D_mod * dy
    pub duration_effect_pct: Decimal,
    /// 0.5 * C * dy^2
    pub convexity_effect_pct: Decimal,
    /// Sum of both effects, as a fraction of the base price
    pub estimated_change_pct: Decimal,
    pub estimated_price: Money,
    /// Full reprice at required_rate + yield_change
    pub repriced: Money,
    /// estimated_price - repriced
    pub approximation_error: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Second-order Taylor approximation with caller-supplied duration and
/// convexity:
///
/// ```text
/// change    = -duration * dy + 0.5 * convexity * dy^2
/// new_price = initial_price + change
/// ```
///
/// The figures are taken as given; see [`estimate_price_change`] for the
/// variant that derives them from the bond's own cash flows.
pub fn approximate_convexity_price_change(
    initial_price: Money,
    duration: Decimal,
    convexity: Decimal,
    yield_change: Rate,
) -> BondSimResult<Money> {
    let duration_term = duration.checked_mul(yield_change).map(|d| -d);
    let convexity_term = yield_change
        .checked_mul(yield_change)
        .and_then(|dy2| convexity.checked_mul(dy2))
        .and_then(|c| c.checked_mul(dec!(0.5)));

    duration_term
        .zip(convexity_term)
        .and_then(|(d, c)| d.checked_add(c))
        .and_then(|change| initial_price.checked_add(change))
        .ok_or_else(|| {
            BondSimError::invalid("yield_change", "Price change overflows decimal range.")
        })
}

/// Estimate the price after a parallel yield shock using the bond's modified
/// duration and convexity, and compare it with an exact reprice.
pub fn estimate_price_change(
    input: &PriceShockInput,
) -> BondSimResult<ComputationOutput<PriceShockOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let bond = &input.bond;
    bond.validate()?;
    let dy = input.yield_change;
    if dy.abs() > MAX_YIELD_CHANGE {
        return Err(BondSimError::invalid(
            "yield_change",
            format!("Yield change must be within +/-{MAX_YIELD_CHANGE}."),
        ));
    }
    let shocked_rate = bond.required_rate + dy;
    if shocked_rate <= -Decimal::ONE {
        return Err(BondSimError::invalid(
            "yield_change",
            "Shocked yield must stay above -100%.",
        ));
    }

    let coupon = bond.coupon()?;
    let base_price = compute_price(bond.face_value, bond.required_rate, coupon, bond.maturity)?;
    let macaulay = compute_duration(coupon, bond.face_value, bond.required_rate, bond.maturity)?;
    let modified_duration = compute_modified_duration(macaulay, bond.required_rate)?;
    let convexity = compute_convexity(coupon, bond.face_value, bond.required_rate, bond.maturity)?;

    let duration_effect_pct = -modified_duration * dy;
    let convexity_effect_pct = dec!(0.5) * convexity * dy * dy;
    let estimated_change_pct = duration_effect_pct + convexity_effect_pct;
    let estimated_price = base_price * (Decimal::ONE + estimated_change_pct);

    let repriced = price_at(bond.face_value, shocked_rate, coupon, bond.maturity)?;
    let approximation_error = estimated_price - repriced;

    if shocked_rate < Decimal::ZERO {
        warnings.push(format!(
            "Shocked yield {shocked_rate} is negative; the reprice discounts at a negative rate."
        ));
    }
    if dy.abs() >= dec!(0.02) {
        warnings.push(
            "Shocks of 200 bp or more stretch the second-order approximation; compare with the full reprice."
                .to_string(),
        );
    }

    let output = PriceShockOutput {
        base_price,
        modified_duration,
        convexity,
        duration_effect_pct,
        convexity_effect_pct,
        estimated_change_pct,
        estimated_price,
        repriced,
        approximation_error,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "yield_change": dy.to_string(),
        "duration_measure": "modified (Macaulay / (1 + r))",
        "convexity_measure": "sum t(t+1) PV(CF_t) / (P (1+r)^2)",
        "periods": "one coupon per period",
    });

    Ok(with_metadata(
        "Duration + Convexity Price Approximation",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::spec::CreditRating;

    fn par_bond() -> BondSpec {
        BondSpec::new(dec!(1000), dec!(0.05), 10, dec!(0.05), CreditRating::default()).unwrap()
    }

    #[test]
    fn test_literal_taylor_formula() {
        // -7 * 0.01 + 0.5 * 50 * 0.0001 = -0.0675
        let p = approximate_convexity_price_change(dec!(100), dec!(7), dec!(50), dec!(0.01))
            .unwrap();
        assert_eq!(p, dec!(99.9325));
    }

    #[test]
    fn test_literal_zero_shock_is_identity() {
        let p = approximate_convexity_price_change(dec!(1000), dec!(7), dec!(50), Decimal::ZERO)
            .unwrap();
        assert_eq!(p, dec!(1000));
    }

    #[test]
    fn test_literal_formula_overflow_is_error() {
        let err = approximate_convexity_price_change(dec!(100), Decimal::MAX, dec!(1), dec!(-2))
            .unwrap_err();
        assert!(
            matches!(err, BondSimError::InvalidInput { ref field, .. } if field == "yield_change")
        );
        assert!(
            approximate_convexity_price_change(dec!(100), dec!(7), Decimal::MAX, dec!(2)).is_err()
        );
    }

    #[test]
    fn test_estimate_close_to_reprice_for_small_shock() {
        let input = PriceShockInput {
            bond: par_bond(),
            yield_change: dec!(0.001),
        };
        let out = estimate_price_change(&input).unwrap().result;
        assert!(out.repriced < out.base_price);
        assert!(
            out.approximation_error.abs() < dec!(0.01),
            "10 bp error should be under a cent, got {}",
            out.approximation_error
        );
    }

    #[test]
    fn test_convexity_term_raises_estimate() {
        let down = estimate_price_change(&PriceShockInput {
            bond: par_bond(),
            yield_change: dec!(-0.01),
        })
        .unwrap()
        .result;
        assert!(down.convexity_effect_pct > Decimal::ZERO);
        assert!(down.estimated_price > down.base_price);
        // A duration-only estimate always undershoots the reprice
        let duration_only = down.base_price * (Decimal::ONE + down.duration_effect_pct);
        assert!(duration_only < down.repriced);
    }

    #[test]
    fn test_large_shock_warns() {
        let result = estimate_price_change(&PriceShockInput {
            bond: par_bond(),
            yield_change: dec!(0.03),
        })
        .unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_shock_out_of_range_rejected() {
        let err = estimate_price_change(&PriceShockInput {
            bond: par_bond(),
            yield_change: dec!(0.75),
        })
        .unwrap_err();
        assert!(
            matches!(err, BondSimError::InvalidInput { ref field, .. } if field == "yield_change")
        );
    }
}
